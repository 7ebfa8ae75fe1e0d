// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar window generation.
//!
//! Aggregation buckets are calendar weeks (Monday through Sunday) and
//! calendar months. Window ends are implied by their starts, so cache keys
//! only carry the start date.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Aggregation bucket granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grain {
    Week,
    Month,
}

impl Grain {
    pub fn as_str(self) -> &'static str {
        match self {
            Grain::Week => "week",
            Grain::Month => "month",
        }
    }
}

/// The Monday-Sunday week containing `date`.
pub fn surrounding_week(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = date - Days::new(u64::from(date.weekday().num_days_from_monday()));
    (monday, monday + Days::new(6))
}

/// The first and last calendar day of the month containing `date`.
pub fn surrounding_month(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = first_of_month(date.year(), date.month());
    let next_first = if date.month() == 12 {
        first_of_month(date.year() + 1, 1)
    } else {
        first_of_month(date.year(), date.month() + 1)
    };
    (first, next_first - Days::new(1))
}

/// `count` week windows: the week containing `start`, then each preceding
/// week, most recent first.
pub fn trailing_weeks(start: NaiveDate, count: u32) -> Vec<(NaiveDate, NaiveDate)> {
    let mut windows = Vec::with_capacity(count as usize);
    if count == 0 {
        return windows;
    }

    let (mut first, mut last) = surrounding_week(start);
    windows.push((first, last));
    for _ in 1..count {
        last = first - Days::new(1);
        first = first - Days::new(7);
        windows.push((first, last));
    }
    windows
}

/// `count` month windows: the month containing `start`, then each preceding
/// calendar month, most recent first, wrapping across year boundaries.
pub fn trailing_months(start: NaiveDate, count: u32) -> Vec<(NaiveDate, NaiveDate)> {
    let mut windows = Vec::with_capacity(count as usize);
    if count == 0 {
        return windows;
    }

    let (mut first, mut last) = surrounding_month(start);
    windows.push((first, last));
    for _ in 1..count {
        last = first - Days::new(1);
        first = if first.month() == 1 {
            first_of_month(first.year() - 1, 12)
        } else {
            first_of_month(first.year(), first.month() - 1)
        };
        windows.push((first, last));
    }
    windows
}

/// Number of calendar-week buckets spanning `[first_date, last_date]`.
pub fn weeks_in_range(first_date: NaiveDate, last_date: NaiveDate) -> u32 {
    let (first_monday, _) = surrounding_week(first_date);
    let (last_monday, _) = surrounding_week(last_date);
    let days = (last_monday - first_monday).num_days().max(0);
    (days / 7) as u32 + 1
}

/// Number of distinct (year, month) buckets spanning `[first_date, last_date]`
/// inclusive.
pub fn months_in_range(first_date: NaiveDate, last_date: NaiveDate) -> u32 {
    let first = first_date.year() * 12 + first_date.month() as i32;
    let last = last_date.year() * 12 + last_date.month() as i32;
    (last - first).max(0) as u32 + 1
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).expect("first of month is a valid date")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_surrounding_week_midweek() {
        // 2021-06-16 was a Wednesday
        let (monday, sunday) = surrounding_week(date(2021, 6, 16));
        assert_eq!(monday, date(2021, 6, 14));
        assert_eq!(sunday, date(2021, 6, 20));
        assert_eq!(monday.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_surrounding_week_on_boundaries() {
        let (monday, sunday) = surrounding_week(date(2021, 6, 14));
        assert_eq!((monday, sunday), (date(2021, 6, 14), date(2021, 6, 20)));

        let (monday, sunday) = surrounding_week(date(2021, 6, 20));
        assert_eq!((monday, sunday), (date(2021, 6, 14), date(2021, 6, 20)));
    }

    #[test]
    fn test_surrounding_month_february() {
        assert_eq!(
            surrounding_month(date(2021, 2, 15)),
            (date(2021, 2, 1), date(2021, 2, 28))
        );
        // leap year
        assert_eq!(
            surrounding_month(date(2020, 2, 15)),
            (date(2020, 2, 1), date(2020, 2, 29))
        );
    }

    #[test]
    fn test_surrounding_month_december_rollover() {
        assert_eq!(
            surrounding_month(date(2021, 12, 15)),
            (date(2021, 12, 1), date(2021, 12, 31))
        );
    }

    #[test]
    fn test_trailing_weeks_most_recent_first() {
        let windows = trailing_weeks(date(2021, 6, 16), 3);
        assert_eq!(
            windows,
            vec![
                (date(2021, 6, 14), date(2021, 6, 20)),
                (date(2021, 6, 7), date(2021, 6, 13)),
                (date(2021, 5, 31), date(2021, 6, 6)),
            ]
        );
    }

    #[test]
    fn test_trailing_months_wraps_the_year() {
        let windows = trailing_months(date(2021, 1, 15), 2);
        assert_eq!(
            windows,
            vec![
                (date(2021, 1, 1), date(2021, 1, 31)),
                (date(2020, 12, 1), date(2020, 12, 31)),
            ]
        );
    }

    #[test]
    fn test_trailing_windows_empty_scale() {
        assert!(trailing_weeks(date(2021, 6, 16), 0).is_empty());
        assert!(trailing_months(date(2021, 6, 16), 0).is_empty());
    }

    #[test]
    fn test_weeks_in_range() {
        assert_eq!(weeks_in_range(date(2021, 6, 16), date(2021, 6, 16)), 1);
        // Sunday and the following Monday are in different buckets
        assert_eq!(weeks_in_range(date(2021, 6, 20), date(2021, 6, 21)), 2);
        assert_eq!(weeks_in_range(date(2021, 6, 1), date(2021, 6, 30)), 5);
    }

    #[test]
    fn test_months_in_range() {
        assert_eq!(months_in_range(date(2021, 6, 1), date(2021, 6, 30)), 1);
        assert_eq!(months_in_range(date(2021, 6, 30), date(2021, 7, 1)), 2);
        // year wrap
        assert_eq!(months_in_range(date(2020, 11, 15), date(2021, 2, 15)), 4);
    }
}
