// Date utility functions

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike};

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(30)
}

/// Build the requested day-of-month in a month, clamped to the last valid
/// day for shorter months (Jan 31 -> Feb 29 in a leap year).
pub fn clamp_to_month(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day.min(days_in_month(year, month)))
}

/// Every date shown for a month view: the month itself plus the lead and
/// trail days filling a Monday-start 7-column grid.
pub fn month_grid(year: i32, month: u32) -> Vec<NaiveDate> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let Some(last) = clamp_to_month(year, month, 31) else {
        return Vec::new();
    };

    let lead = first.weekday().num_days_from_monday() as i64;
    let trail = 6 - last.weekday().num_days_from_monday() as i64;
    let start = first - Duration::days(lead);
    let end = last + Duration::days(trail);

    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        days.push(current);
        current += Duration::days(1);
    }
    days
}

/// Minutes elapsed since local midnight, for lead-time arithmetic.
pub fn minutes_of_day(time: NaiveTime) -> i64 {
    (time.hour() * 60 + time.minute()) as i64
}
