// src/date_normalizer.rs
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

// --- Error Types ---

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("Invalid date format: '{input}'")]
    InvalidDateFormat { input: String },
}

// --- Canonical Date ---

/// A calendar date with no time of day and no timezone.
///
/// All day arithmetic in the engine happens on this type, so two values compare
/// equal exactly when their (year, month, day) triples do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalDate(NaiveDate);

impl CanonicalDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Shifts the date by a signed number of calendar days.
    pub fn add_days(&self, days: i64) -> Option<Self> {
        self.0.checked_add_signed(Duration::days(days)).map(Self)
    }

    pub fn succ(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    pub fn pred(&self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }
}

impl From<NaiveDate> for CanonicalDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for CanonicalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for CanonicalDate {
    type Err = DateError;

    /// Parses any text form `normalize` accepts. Blank text is an error here,
    /// since there is no "absent" to return.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(DateInput::Text(s))?.ok_or_else(|| DateError::InvalidDateFormat {
            input: s.to_string(),
        })
    }
}

// --- Raw Inputs ---

/// The raw shapes a date field arrives in from API payloads and form fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DateInput<'a> {
    Absent,
    Text(&'a str),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Timestamp(DateTime<FixedOffset>),
}

impl<'a> From<&'a str> for DateInput<'a> {
    fn from(text: &'a str) -> Self {
        DateInput::Text(text)
    }
}

impl<'a> From<&'a String> for DateInput<'a> {
    fn from(text: &'a String) -> Self {
        DateInput::Text(text.as_str())
    }
}

impl<'a, I: Into<DateInput<'a>>> From<Option<I>> for DateInput<'a> {
    fn from(value: Option<I>) -> Self {
        value.map_or(DateInput::Absent, Into::into)
    }
}

impl From<NaiveDate> for DateInput<'_> {
    fn from(date: NaiveDate) -> Self {
        DateInput::Date(date)
    }
}

impl From<CanonicalDate> for DateInput<'_> {
    fn from(date: CanonicalDate) -> Self {
        DateInput::Date(date.as_naive())
    }
}

impl From<NaiveDateTime> for DateInput<'_> {
    fn from(date_time: NaiveDateTime) -> Self {
        DateInput::DateTime(date_time)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DateInput<'_> {
    fn from(date_time: DateTime<Tz>) -> Self {
        DateInput::Timestamp(date_time.fixed_offset())
    }
}

// --- Parsing ---

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("ISO date pattern compiles"));
static SLASH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("slash date pattern compiles"));

// Tried in order once the strict shapes have been ruled out.
const FALLBACK_DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d", // unpadded, e.g. 2024-3-5
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];
const FALLBACK_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Turns a raw date field into a calendar date.
///
/// Returns `Ok(None)` when the field is absent (missing or blank text). Text
/// is tried as `YYYY-MM-DD`, then `DD/MM/YYYY`, then as a timestamp whose
/// date part precedes a `T`, and finally against a short list of generic
/// formats. Anything left over is `InvalidDateFormat`.
pub fn normalize(input: DateInput<'_>) -> Result<Option<CanonicalDate>, DateError> {
    match input {
        DateInput::Absent => Ok(None),
        DateInput::Date(date) => Ok(Some(CanonicalDate(date))),
        DateInput::DateTime(date_time) => Ok(Some(CanonicalDate(date_time.date()))),
        // Calendar date as seen in the value's own offset, no conversion.
        DateInput::Timestamp(date_time) => Ok(Some(CanonicalDate(date_time.date_naive()))),
        DateInput::Text(raw) => {
            let text = raw.trim();
            if text.is_empty() {
                return Ok(None);
            }
            parse_text(text)
                .map(|date| Some(CanonicalDate(date)))
                .ok_or_else(|| DateError::InvalidDateFormat {
                    input: raw.to_string(),
                })
        }
    }
}

/// Like `normalize`, but an unparseable value is logged and treated as absent.
pub fn normalize_or_absent(input: DateInput<'_>) -> Option<CanonicalDate> {
    match normalize(input) {
        Ok(date) => date,
        Err(e) => {
            warn!("{}; treating the date as absent", e);
            None
        }
    }
}

fn parse_text(text: &str) -> Option<NaiveDate> {
    if ISO_DATE.is_match(text) {
        return NaiveDate::parse_from_str(text, "%Y-%m-%d").ok();
    }
    if SLASH_DATE.is_match(text) {
        return NaiveDate::parse_from_str(text, "%d/%m/%Y").ok();
    }
    if let Some((date_part, _time_part)) = text.split_once('T') {
        // Only an ISO date prefix makes this a timestamp; "Tue, 05 Mar ..." is not.
        if ISO_DATE.is_match(date_part) {
            return NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok();
        }
    }
    parse_fallback(text)
}

fn parse_fallback(text: &str) -> Option<NaiveDate> {
    if let Ok(date_time) = DateTime::parse_from_rfc2822(text) {
        return Some(date_time.date_naive());
    }
    FALLBACK_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|date_time| date_time.date())
        .or_else(|| {
            FALLBACK_DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        })
}
