//! Recurring-template expansion.
//! Turns a template's repeat rule into concrete calendar dates over a range,
//! with one submodule per supported frequency.

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::models::template::{RepeatInterval, Template};

mod daily;
mod monthly;
mod weekly;

/// Expand a template into the ordered set of dates on which it occurs
/// within `[range_start, range_end]`, both bounds inclusive.
///
/// Pure function of its inputs; repeated calls yield identical output.
/// A template whose interval this client does not recognize fails with
/// `Error::InvalidRule`; callers log and treat that template as producing
/// no occurrences rather than aborting the batch.
pub fn expand(
    template: &Template,
    range_start: NaiveDate,
    range_end: NaiveDate,
) -> Result<Vec<NaiveDate>> {
    if range_end < range_start {
        return Ok(Vec::new());
    }

    let lower = template.start_date.max(range_start);
    let upper = match template.repeat_until {
        Some(until) => until.min(range_end),
        None => range_end,
    };
    if upper < lower {
        return Ok(Vec::new());
    }

    match template.repeat_interval {
        RepeatInterval::None => Ok(Vec::new()),
        RepeatInterval::Daily => Ok(daily::generate(lower, upper)),
        RepeatInterval::Weekly => Ok(weekly::generate(&template.repeat_days, lower, upper)),
        RepeatInterval::Monthly => Ok(monthly::generate(template.start_date, lower, upper)),
        RepeatInterval::Unknown => Err(Error::invalid_rule(format!(
            "template {} carries an unrecognized repeat interval",
            template.id
        ))),
    }
}

/// Whether the template occurs on exactly this date.
pub fn occurs_on(template: &Template, date: NaiveDate) -> Result<bool> {
    Ok(!expand(template, date, date)?.is_empty())
}
