// src/lib.rs
//! Expiry classification for compliance dashboards.
//!
//! Records carrying an expiry date (contract end, MCU, HSE passport, SIM) are
//! turned into days remaining, an urgency tier under a caller-supplied
//! [`ThresholdPolicy`], and a priority for sorting. [`RecordSetAnalyzer`] is the
//! entry point; the building blocks are public for callers that need only one step.

pub mod analyzer;
pub mod date_normalizer;
pub mod days_remaining;
pub mod priority;
pub mod text_search;
pub mod threshold_policy;
pub mod tier;


pub use analyzer::{
    filter_by_text, filter_by_tier, filter_classified_by_text, sort_by_priority,
    ClassifiedRecord, DashboardQuery, DashboardView, RecordSetAnalyzer, TierCounts, TierFilter,
};
pub use date_normalizer::{normalize, normalize_or_absent, CanonicalDate, DateError, DateInput};
pub use days_remaining::{days_remaining, days_remaining_from, Clock, FixedClock, SystemClock};
pub use priority::{priority, PriorityKey};
pub use text_search::record_matches_text;
pub use threshold_policy::{Band, PolicyError, ThresholdPolicy};
pub use tier::{classify, Tier};
