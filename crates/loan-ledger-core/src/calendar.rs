//! Calendar-month arithmetic for payment dates.
//!
//! Month addition clamps to the last day of the target month, so a loan that
//! starts on Jan 31 falls due on Feb 28 (or 29), Mar 31, Apr 30, and so on.

use chrono::{Months, NaiveDate};

/// `date` advanced by `months` calendar months, clamped to month end.
///
/// Saturates at `NaiveDate::MAX` rather than failing; loan terms never get
/// anywhere near that range.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Absolute distance between two dates in whole days.
pub fn days_apart(a: NaiveDate, b: NaiveDate) -> i64 {
    (a - b).num_days().abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_add_months_plain() {
        assert_eq!(add_months(d(2024, 1, 15), 1), d(2024, 2, 15));
        assert_eq!(add_months(d(2024, 1, 15), 12), d(2025, 1, 15));
        assert_eq!(add_months(d(2024, 1, 15), 0), d(2024, 1, 15));
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        assert_eq!(add_months(d(2024, 1, 31), 1), d(2024, 2, 29));
        assert_eq!(add_months(d(2023, 1, 31), 1), d(2023, 2, 28));
        assert_eq!(add_months(d(2024, 1, 31), 3), d(2024, 4, 30));
    }

    #[test]
    fn test_days_apart_is_symmetric() {
        assert_eq!(days_apart(d(2024, 3, 1), d(2024, 3, 4)), 3);
        assert_eq!(days_apart(d(2024, 3, 4), d(2024, 3, 1)), 3);
    }
}
