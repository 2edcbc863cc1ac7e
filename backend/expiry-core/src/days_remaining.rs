// src/days_remaining.rs
use chrono::Local;

use crate::date_normalizer::CanonicalDate;

/// Signed number of calendar days from `as_of` until `target`.
///
/// `0` means the target is today, `1` tomorrow, `-1` yesterday. The subtraction
/// runs on plain dates, so daylight-saving changes never shift the result.
pub fn days_remaining(target: CanonicalDate, as_of: CanonicalDate) -> i64 {
    target
        .as_naive()
        .signed_duration_since(as_of.as_naive())
        .num_days()
}

/// `days_remaining` against whatever the clock says today is.
pub fn days_remaining_from<C: Clock + ?Sized>(target: CanonicalDate, clock: &C) -> i64 {
    days_remaining(target, clock.today())
}

// --- Clock ---

/// Source of "today" for callers that don't pass an explicit as-of date.
pub trait Clock {
    fn today(&self) -> CanonicalDate;
}

/// Local calendar date at the moment of the call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> CanonicalDate {
        CanonicalDate::from(Local::now().date_naive())
    }
}

/// A clock pinned to one date, moved only by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    today: CanonicalDate,
}

impl FixedClock {
    pub fn new(today: CanonicalDate) -> Self {
        Self { today }
    }

    pub fn set_today(&mut self, today: CanonicalDate) {
        self.today = today;
    }

    /// Moves the clock by `days`; stays put if that would leave chrono's date range.
    pub fn advance_days(&mut self, days: i64) {
        if let Some(next) = self.today.add_days(days) {
            self.today = next;
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> CanonicalDate {
        self.today
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ymd(year: i32, month: u32, day: u32) -> CanonicalDate {
        CanonicalDate::from_ymd(year, month, day).unwrap()
    }

    #[test]
    fn same_day_is_zero() {
        let today = ymd(2025, 1, 1);
        assert_eq!(days_remaining(today, today), 0);
    }

    #[test]
    fn adjacent_days_across_dst_changes() {
        // US and EU spring-forward / fall-back dates in 2024.
        for (year, month, day) in [(2024, 3, 10), (2024, 11, 3), (2024, 3, 31), (2024, 10, 27)] {
            let change = ymd(year, month, day);
            let before = change.pred().unwrap();
            let after = change.succ().unwrap();
            assert_eq!(days_remaining(after, change), 1, "after {change}");
            assert_eq!(days_remaining(before, change), -1, "before {change}");
            assert_eq!(days_remaining(after, before), 2, "across {change}");
        }
    }

    #[test]
    fn spans_month_and_year_boundaries() {
        assert_eq!(days_remaining(ymd(2025, 1, 10), ymd(2025, 1, 1)), 9);
        assert_eq!(days_remaining(ymd(2024, 12, 20), ymd(2025, 1, 1)), -12);
        assert_eq!(days_remaining(ymd(2025, 3, 1), ymd(2024, 3, 1)), 365);
        assert_eq!(days_remaining(ymd(2024, 3, 1), ymd(2023, 3, 1)), 366);
    }

    #[test]
    fn fixed_clock_drives_days_remaining_from() {
        let mut clock = FixedClock::new(ymd(2025, 1, 1));
        let target = ymd(2025, 1, 15);
        assert_eq!(days_remaining_from(target, &clock), 14);

        clock.advance_days(14);
        assert_eq!(days_remaining_from(target, &clock), 0);

        clock.set_today(ymd(2025, 2, 1));
        assert_eq!(days_remaining_from(target, &clock), -17);
    }

    proptest! {
        #[test]
        fn proptest_neighbouring_days(offset in -100_000i64..100_000) {
            let base = ymd(2000, 1, 1).add_days(offset).unwrap();
            prop_assert_eq!(days_remaining(base, base), 0);
            prop_assert_eq!(days_remaining(base.succ().unwrap(), base), 1);
            prop_assert_eq!(days_remaining(base.pred().unwrap(), base), -1);
        }

        #[test]
        fn proptest_difference_is_antisymmetric(a in -50_000i64..50_000, b in -50_000i64..50_000) {
            let origin = ymd(2000, 1, 1);
            let first = origin.add_days(a).unwrap();
            let second = origin.add_days(b).unwrap();
            prop_assert_eq!(days_remaining(first, second), a - b);
            prop_assert_eq!(days_remaining(first, second), -days_remaining(second, first));
        }
    }
}
