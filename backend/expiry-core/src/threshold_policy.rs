// src/threshold_policy.rs
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::tier::{Tier, RESERVED_TIER_NAMES};

// --- Error Types ---

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Threshold policy must define at least one band")]
    Empty,
    #[error("Band '{name}' ends at {max_days} days, which is not after the previous band's {previous} days")]
    NotIncreasing {
        name: String,
        max_days: u32,
        previous: u32,
    },
    #[error("Band names must not be blank")]
    BlankName,
    #[error("Band name '{0}' is used more than once")]
    DuplicateName(String),
    #[error("Band name '{0}' is reserved for a built-in tier")]
    ReservedName(String),
}

// --- Policy ---

/// One named urgency band: records with `0..=max_days` days left (and more
/// than the previous band's bound) land here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub name: String,
    #[serde(alias = "max_days_inclusive")]
    pub max_days: u32,
}

impl Band {
    pub fn new(name: impl Into<String>, max_days: u32) -> Self {
        Self {
            name: name.into(),
            max_days,
        }
    }
}

/// Ordered, validated bands for one monitored date field.
///
/// `Expired` (negative days), `Normal` (past the last band) and `Unknown`
/// (no date) are implicit. A value of this type always satisfies the band
/// invariants, including when it comes from serde.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Band>", into = "Vec<Band>")]
pub struct ThresholdPolicy {
    bands: Vec<Band>,
}

impl ThresholdPolicy {
    /// Validates `bands`. Names are stored without surrounding whitespace.
    pub fn new(mut bands: Vec<Band>) -> Result<Self, PolicyError> {
        for band in &mut bands {
            let trimmed = band.name.trim();
            if trimmed.len() != band.name.len() {
                band.name = trimmed.to_string();
            }
        }
        validate_bands(&bands)?;
        Ok(Self { bands })
    }

    /// Shorthand for `new` from `(name, max_days)` pairs.
    pub fn from_pairs(pairs: &[(&str, u32)]) -> Result<Self, PolicyError> {
        Self::new(
            pairs
                .iter()
                .map(|(name, max_days)| Band::new(*name, *max_days))
                .collect(),
        )
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Position of a band by exact name.
    pub fn band_index(&self, name: &str) -> Option<usize> {
        self.bands.iter().position(|band| band.name == name)
    }

    /// Every tier this policy can produce, most urgent first.
    pub fn tiers(&self) -> Vec<Tier> {
        let mut tiers = Vec::with_capacity(self.bands.len() + 3);
        tiers.push(Tier::Expired);
        tiers.extend(self.bands.iter().map(|band| Tier::Band(band.name.clone())));
        tiers.push(Tier::Normal);
        tiers.push(Tier::Unknown);
        tiers
    }

    /// Looks up a tier by display name, ignoring case.
    pub fn tier_named(&self, name: &str) -> Option<Tier> {
        let name = name.trim();
        self.tiers()
            .into_iter()
            .find(|tier| tier.name().eq_ignore_ascii_case(name))
    }
}

impl TryFrom<Vec<Band>> for ThresholdPolicy {
    type Error = PolicyError;

    fn try_from(bands: Vec<Band>) -> Result<Self, Self::Error> {
        Self::new(bands)
    }
}

impl From<ThresholdPolicy> for Vec<Band> {
    fn from(policy: ThresholdPolicy) -> Self {
        policy.bands
    }
}

fn validate_bands(bands: &[Band]) -> Result<(), PolicyError> {
    if bands.is_empty() {
        return Err(PolicyError::Empty);
    }

    let mut seen = HashSet::new();
    let mut previous: Option<u32> = None;
    for band in bands {
        let name = band.name.as_str();
        if name.is_empty() {
            return Err(PolicyError::BlankName);
        }
        if RESERVED_TIER_NAMES
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(name))
        {
            return Err(PolicyError::ReservedName(band.name.clone()));
        }
        if !seen.insert(name.to_ascii_lowercase()) {
            return Err(PolicyError::DuplicateName(band.name.clone()));
        }
        if let Some(previous) = previous {
            if band.max_days <= previous {
                return Err(PolicyError::NotIncreasing {
                    name: band.name.clone(),
                    max_days: band.max_days,
                    previous,
                });
            }
        }
        previous = Some(band.max_days);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_strictly_increasing_bands() {
        let policy =
            ThresholdPolicy::from_pairs(&[("Critical", 14), ("Warning", 30), ("Notice", 45)])
                .unwrap();
        assert_eq!(policy.band_count(), 3);
        assert_eq!(policy.band_index("Warning"), Some(1));
        assert_eq!(policy.band_index("warning"), None);
    }

    #[test]
    fn a_zero_day_first_band_is_allowed() {
        assert!(ThresholdPolicy::from_pairs(&[("Today", 0), ("Soon", 7)]).is_ok());
    }

    #[test]
    fn rejects_empty_policy() {
        assert_eq!(ThresholdPolicy::new(Vec::new()), Err(PolicyError::Empty));
    }

    #[test]
    fn rejects_equal_or_decreasing_bounds() {
        assert_eq!(
            ThresholdPolicy::from_pairs(&[("Critical", 30), ("Warning", 30)]),
            Err(PolicyError::NotIncreasing {
                name: "Warning".to_string(),
                max_days: 30,
                previous: 30,
            })
        );
        assert!(matches!(
            ThresholdPolicy::from_pairs(&[("Critical", 60), ("Warning", 30)]),
            Err(PolicyError::NotIncreasing { .. })
        ));
    }

    #[test]
    fn rejects_bad_names() {
        assert_eq!(
            ThresholdPolicy::from_pairs(&[(" ", 10)]),
            Err(PolicyError::BlankName)
        );
        assert_eq!(
            ThresholdPolicy::from_pairs(&[("expired", 10)]),
            Err(PolicyError::ReservedName("expired".to_string()))
        );
        assert_eq!(
            ThresholdPolicy::from_pairs(&[("Soon", 10), ("SOON", 20)]),
            Err(PolicyError::DuplicateName("SOON".to_string()))
        );
    }

    #[test]
    fn tiers_are_listed_most_urgent_first() {
        let policy = ThresholdPolicy::from_pairs(&[("Critical", 30), ("Warning", 60)]).unwrap();
        assert_eq!(
            policy.tiers(),
            vec![
                Tier::Expired,
                Tier::Band("Critical".to_string()),
                Tier::Band("Warning".to_string()),
                Tier::Normal,
                Tier::Unknown,
            ]
        );
        assert_eq!(
            policy.tier_named(" critical "),
            Some(Tier::Band("Critical".to_string()))
        );
        assert_eq!(policy.tier_named("UNKNOWN"), Some(Tier::Unknown));
        assert_eq!(policy.tier_named("Notice"), None);
    }

    #[test]
    fn deserialization_runs_validation() {
        let policy: ThresholdPolicy = serde_json::from_str(
            r#"[{"name":"Critical","max_days":30},{"name":"Warning","max_days_inclusive":60}]"#,
        )
        .unwrap();
        assert_eq!(policy.bands()[1], Band::new("Warning", 60));

        let err = serde_json::from_str::<ThresholdPolicy>(
            r#"[{"name":"Critical","max_days":30},{"name":"Warning","max_days":10}]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("not after the previous band"));

        assert!(serde_json::from_str::<ThresholdPolicy>("[]").is_err());
    }

    #[test]
    fn band_names_are_stored_trimmed() {
        let policy: ThresholdPolicy = serde_json::from_str(
            r#"[{"name":"Critical ","max_days":14},{"name":" Warning","max_days":30}]"#,
        )
        .unwrap();
        assert_eq!(policy.bands()[0], Band::new("Critical", 14));
        assert_eq!(policy.band_index("Warning"), Some(1));
        assert_eq!(
            policy.tier_named("Critical"),
            Some(Tier::Band("Critical".to_string()))
        );
        assert_eq!(
            ThresholdPolicy::from_pairs(&[("Soon", 10), ("soon ", 20)]),
            Err(PolicyError::DuplicateName("soon".to_string()))
        );
    }

    #[test]
    fn serializes_as_band_list() {
        let policy = ThresholdPolicy::from_pairs(&[("Critical", 14)]).unwrap();
        assert_eq!(
            serde_json::to_string(&policy).unwrap(),
            r#"[{"name":"Critical","max_days":14}]"#
        );
    }
}
