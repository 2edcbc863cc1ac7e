// src/analyzer.rs
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::date_normalizer::{normalize, CanonicalDate, DateInput};
use crate::days_remaining::{days_remaining, Clock};
use crate::priority::{priority, PriorityKey};
use crate::text_search::matches_lowercase_needle;
use crate::threshold_policy::ThresholdPolicy;
use crate::tier::{classify, Tier};

// --- Output Structures ---

/// A caller's record seen through one monitored date field.
///
/// Borrowed from the caller's snapshot and recomputed on every query.
#[derive(Debug, Serialize)]
pub struct ClassifiedRecord<'a, T> {
    pub record: &'a T,
    pub date: Option<CanonicalDate>,
    pub days_remaining: Option<i64>,
    pub tier: Tier,
    pub priority: u32,
}

// Manual impl: cloning a row never needs to clone the record it points at.
impl<T> Clone for ClassifiedRecord<'_, T> {
    fn clone(&self) -> Self {
        Self {
            record: self.record,
            date: self.date,
            days_remaining: self.days_remaining,
            tier: self.tier.clone(),
            priority: self.priority,
        }
    }
}

impl<T> ClassifiedRecord<'_, T> {
    pub fn sort_key(&self) -> PriorityKey {
        PriorityKey::new(self.priority, self.days_remaining)
    }

    /// Row text for status badges.
    pub fn status_text(&self) -> String {
        match self.days_remaining {
            None => "No date available".to_string(),
            Some(0) => "Expires today".to_string(),
            Some(days) if days < 0 => format!("Expired {} ago", day_count(-days)),
            Some(days) => format!("{} remaining", day_count(days)),
        }
    }
}

fn day_count(days: i64) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", days)
    }
}

/// Per-tier totals, most urgent tier first. Tiers with no records are kept at
/// zero so stat boxes don't disappear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierCounts {
    entries: Vec<(Tier, usize)>,
}

impl TierCounts {
    fn zeroed(policy: &ThresholdPolicy) -> Self {
        Self {
            entries: policy.tiers().into_iter().map(|tier| (tier, 0)).collect(),
        }
    }

    fn increment(&mut self, tier: &Tier) {
        match self.entries.iter_mut().find(|(known, _)| known == tier) {
            Some((_, count)) => *count += 1,
            None => {
                // Only reachable with rows classified under another policy.
                warn!("Tier '{}' is not part of this policy; counting it as Unknown", tier);
                if let Some((_, count)) =
                    self.entries.iter_mut().find(|(known, _)| *known == Tier::Unknown)
                {
                    *count += 1;
                }
            }
        }
    }

    pub fn get(&self, tier: &Tier) -> usize {
        self.entries
            .iter()
            .find(|(known, _)| known == tier)
            .map_or(0, |(_, count)| *count)
    }

    /// Count for a tier looked up by display name, ignoring case.
    pub fn by_name(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(tier, _)| tier.name().eq_ignore_ascii_case(name.trim()))
            .map(|(_, count)| *count)
    }

    /// Combined count of several tiers, e.g. Expired and Unknown shown as
    /// one "nonactive" box.
    pub fn sum_of(&self, tiers: &[Tier]) -> usize {
        tiers.iter().map(|tier| self.get(tier)).sum()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Tier, usize)> + '_ {
        self.entries.iter().map(|(tier, count)| (tier, *count))
    }
}

impl Serialize for TierCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (tier, count) in &self.entries {
            map.serialize_entry(tier.name(), count)?;
        }
        map.end()
    }
}

/// Which tiers a view shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TierFilter {
    /// Every record, Expired and Unknown included.
    #[default]
    All,
    Only(Tier),
}

impl TierFilter {
    /// `"all"` (any case) or a tier name known to `policy`.
    pub fn parse(value: &str, policy: &ThresholdPolicy) -> Option<Self> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Some(TierFilter::All);
        }
        policy.tier_named(value).map(TierFilter::Only)
    }

    pub fn matches(&self, tier: &Tier) -> bool {
        match self {
            TierFilter::All => true,
            TierFilter::Only(wanted) => wanted == tier,
        }
    }
}

/// Search term and tier selection for one dashboard table.
#[derive(Debug, Clone, Default)]
pub struct DashboardQuery {
    pub term: String,
    pub tier: TierFilter,
}

/// Everything a dashboard view renders: stat boxes over the whole set, table
/// rows after filtering and sorting.
#[derive(Debug, Serialize)]
pub struct DashboardView<'a, T> {
    pub as_of: CanonicalDate,
    pub counts: TierCounts,
    pub rows: Vec<ClassifiedRecord<'a, T>>,
}

// --- Analyzer ---

/// Classifies record sets for one monitored date field under one policy.
#[derive(Debug, Clone)]
pub struct RecordSetAnalyzer {
    policy: ThresholdPolicy,
}

impl RecordSetAnalyzer {
    pub fn new(policy: ThresholdPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ThresholdPolicy {
        &self.policy
    }

    /// Classifies every record as of `as_of`.
    ///
    /// A date that fails to parse makes its record `Unknown`; it is logged and
    /// the remaining records are still processed.
    pub fn classify_all<'a, T, F>(
        &self,
        records: &'a [T],
        date_of: F,
        as_of: CanonicalDate,
    ) -> Vec<ClassifiedRecord<'a, T>>
    where
        F: Fn(&'a T) -> DateInput<'a>,
    {
        let mut invalid = 0usize;
        let classified: Vec<_> = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let date = match normalize(date_of(record)) {
                    Ok(date) => date,
                    Err(e) => {
                        invalid += 1;
                        warn!("Record #{}: {}; classifying as Unknown", index, e);
                        None
                    }
                };
                self.classify_date(record, date, as_of)
            })
            .collect();

        debug!(
            "Classified {} records as of {} ({} with unparseable dates)",
            classified.len(),
            as_of,
            invalid
        );
        classified
    }

    /// `classify_all` with the as-of date taken from `clock`.
    pub fn classify_all_today<'a, T, F, C>(
        &self,
        records: &'a [T],
        date_of: F,
        clock: &C,
    ) -> Vec<ClassifiedRecord<'a, T>>
    where
        F: Fn(&'a T) -> DateInput<'a>,
        C: Clock + ?Sized,
    {
        self.classify_all(records, date_of, clock.today())
    }

    fn classify_date<'a, T>(
        &self,
        record: &'a T,
        date: Option<CanonicalDate>,
        as_of: CanonicalDate,
    ) -> ClassifiedRecord<'a, T> {
        let days = date.map(|date| days_remaining(date, as_of));
        let tier = classify(days, &self.policy);
        let priority = priority(&tier, &self.policy);
        ClassifiedRecord {
            record,
            date,
            days_remaining: days,
            tier,
            priority,
        }
    }

    /// Totals per tier. Every tier of the policy is present and the totals sum
    /// to `classified.len()`.
    pub fn count_by_tier<T>(&self, classified: &[ClassifiedRecord<'_, T>]) -> TierCounts {
        let mut counts = TierCounts::zeroed(&self.policy);
        for row in classified {
            counts.increment(&row.tier);
        }
        counts
    }

    /// Classify, count, then text-filter, tier-filter and sort the rows.
    pub fn dashboard<'a, T, F>(
        &self,
        records: &'a [T],
        date_of: F,
        as_of: CanonicalDate,
        query: &DashboardQuery,
    ) -> DashboardView<'a, T>
    where
        T: Serialize,
        F: Fn(&'a T) -> DateInput<'a>,
    {
        let classified = self.classify_all(records, date_of, as_of);
        let counts = self.count_by_tier(&classified);
        let searched = filter_classified_by_text(classified, &query.term);
        let rows = sort_by_priority(filter_by_tier(&searched, &query.tier));
        debug!(
            "Dashboard as of {}: {} of {} records shown (tier {:?}, term '{}')",
            as_of,
            rows.len(),
            records.len(),
            query.tier,
            query.term
        );
        DashboardView { as_of, counts, rows }
    }
}

// --- Set Operations ---

pub fn filter_by_tier<'a, T>(
    classified: &[ClassifiedRecord<'a, T>],
    filter: &TierFilter,
) -> Vec<ClassifiedRecord<'a, T>> {
    classified
        .iter()
        .filter(|row| filter.matches(&row.tier))
        .cloned()
        .collect()
}

/// Records with any field containing `term`, ignoring case, in input order.
/// An empty term keeps everything; spaces in the term are matched literally.
pub fn filter_by_text<'a, T: Serialize>(records: &'a [T], term: &str) -> Vec<&'a T> {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|record| matches_lowercase_needle(*record, &needle))
        .collect()
}

/// `filter_by_text` applied to the underlying records of classified rows.
pub fn filter_classified_by_text<'a, T: Serialize>(
    classified: Vec<ClassifiedRecord<'a, T>>,
    term: &str,
) -> Vec<ClassifiedRecord<'a, T>> {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return classified;
    }
    classified
        .into_iter()
        .filter(|row| matches_lowercase_needle(row.record, &needle))
        .collect()
}

/// Stable sort: most urgent tier first, fewer days left first within a tier,
/// undated rows last. Equal keys keep their input order.
pub fn sort_by_priority<'a, T>(
    mut classified: Vec<ClassifiedRecord<'a, T>>,
) -> Vec<ClassifiedRecord<'a, T>> {
    classified.sort_by_key(|row| row.sort_key());
    classified
}
