use chrono::{Datelike, NaiveDate};

use crate::utils::date::clamp_to_month;

/// Emit the anchor's day-of-month in every month touching the range,
/// clamped to the last valid day of shorter months.
pub(super) fn generate(anchor: NaiveDate, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut year = start.year();
    let mut month = start.month();

    loop {
        let Some(occurrence) = clamp_to_month(year, month, anchor.day()) else {
            break;
        };
        if occurrence > end {
            break;
        }
        if occurrence >= start {
            dates.push(occurrence);
        }

        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }

    dates
}
