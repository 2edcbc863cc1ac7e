// src/tier.rs
use serde::{Serialize, Serializer};
use std::fmt;

use crate::threshold_policy::ThresholdPolicy;

pub const EXPIRED: &str = "Expired";
pub const NORMAL: &str = "Normal";
pub const UNKNOWN: &str = "Unknown";

/// Names a policy band may not take, since the implicit tiers own them.
pub const RESERVED_TIER_NAMES: [&str; 3] = [EXPIRED, NORMAL, UNKNOWN];

/// The urgency bucket a record falls into for one date field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Date already passed (negative days remaining).
    Expired,
    /// One of the policy's named bands.
    Band(String),
    /// Further out than the last band.
    Normal,
    /// No usable date.
    Unknown,
}

impl Tier {
    pub fn name(&self) -> &str {
        match self {
            Tier::Expired => EXPIRED,
            Tier::Band(name) => name.as_str(),
            Tier::Normal => NORMAL,
            Tier::Unknown => UNKNOWN,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Tier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Maps days remaining (or `None` for a missing date) onto a tier.
pub fn classify(days_remaining: Option<i64>, policy: &ThresholdPolicy) -> Tier {
    let days = match days_remaining {
        None => return Tier::Unknown,
        Some(days) if days < 0 => return Tier::Expired,
        Some(days) => days,
    };

    policy
        .bands()
        .iter()
        .find(|band| i64::from(band.max_days) >= days)
        .map_or(Tier::Normal, |band| Tier::Band(band.name.clone()))
}
