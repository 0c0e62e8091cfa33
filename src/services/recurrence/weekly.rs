use chrono::{Datelike, Duration, NaiveDate};

use crate::models::template::WeekdaySet;

pub(super) fn generate(days: &WeekdaySet, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    if days.is_empty() {
        return dates;
    }

    let mut current = start;
    while current <= end {
        if days.contains_weekday(current.weekday()) {
            dates.push(current);
        }
        current += Duration::days(1);
    }
    dates
}
