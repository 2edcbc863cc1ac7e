// src/priority.rs
use std::cmp::Ordering;
use tracing::warn;

use crate::threshold_policy::ThresholdPolicy;
use crate::tier::Tier;

/// Sort rank of a tier under `policy`; lower is more urgent.
///
/// `Expired` is 0, bands are `1..=N` in policy order, `Normal` is `N + 1` and
/// `Unknown` is `N + 2`. A band name the policy doesn't define ranks with
/// `Unknown`.
pub fn priority(tier: &Tier, policy: &ThresholdPolicy) -> u32 {
    let band_count = policy.band_count() as u32;
    match tier {
        Tier::Expired => 0,
        Tier::Band(name) => match policy.band_index(name) {
            Some(index) => index as u32 + 1,
            None => {
                warn!("Band '{}' is not part of this policy; ranking it as Unknown", name);
                band_count + 2
            }
        },
        Tier::Normal => band_count + 1,
        Tier::Unknown => band_count + 2,
    }
}

/// Ordering key for one classified row: tier rank first, then fewer days
/// left first, rows without a date last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityKey {
    pub priority: u32,
    pub days_remaining: Option<i64>,
}

impl PriorityKey {
    pub fn new(priority: u32, days_remaining: Option<i64>) -> Self {
        Self {
            priority,
            days_remaining,
        }
    }
}

impl Ord for PriorityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| compare_days(self.days_remaining, other.days_remaining))
    }
}

impl PartialOrd for PriorityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ascending days, with `None` after every `Some`.
pub fn compare_days(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
