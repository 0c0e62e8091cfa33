//! Per-date occurrence merging.
//! Combines the concrete task rows stored for a date with the virtual
//! occurrences its templates imply, suppressing virtual duplicates that a
//! materialized exception already covers.

use chrono::NaiveDate;

use crate::models::occurrence::{Occurrence, VirtualOccurrence};
use crate::models::task::Task;
use crate::models::template::Template;
use crate::services::recurrence;

/// Project one calendar date into its ordered occurrence list.
///
/// Every concrete task passes through unchanged. Each template that occurs
/// on `date` contributes a virtual occurrence unless a concrete task already
/// overrides it there. A template whose rule cannot be evaluated is logged
/// and skipped; it never poisons the rest of the merge.
pub fn merge(date: NaiveDate, concrete: &[Task], templates: &[Template]) -> Vec<Occurrence> {
    merge_with_context(date, concrete, &[], templates)
}

/// Like [`merge`], with extra concrete tasks from surrounding dates that
/// participate in suppression only. An exception row moved away from its
/// origin date lives on another date but must still suppress the virtual
/// occurrence it overrode.
pub fn merge_with_context(
    date: NaiveDate,
    concrete: &[Task],
    context: &[Task],
    templates: &[Template],
) -> Vec<Occurrence> {
    let mut occurrences: Vec<Occurrence> = concrete
        .iter()
        .cloned()
        .map(Occurrence::Concrete)
        .collect();

    for template in templates {
        match recurrence::occurs_on(template, date) {
            Ok(true) => {
                let overridden = concrete
                    .iter()
                    .chain(context)
                    .any(|task| task.overrides_template(template.id, date));
                if !overridden {
                    occurrences.push(Occurrence::Virtual(VirtualOccurrence::new(
                        template.clone(),
                        date,
                    )));
                }
            }
            Ok(false) => {}
            Err(err) => {
                log::warn!("skipping template {} on {}: {}", template.id, date, err);
            }
        }
    }

    occurrences.sort_by(Occurrence::display_cmp);
    occurrences
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::template::{RepeatInterval, WeekdaySet};
    use chrono::NaiveTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily_template(id: i64, title: &str) -> Template {
        Template {
            id,
            title: title.to_string(),
            description: None,
            priority: Default::default(),
            estimated_time: 0,
            category_id: None,
            repeat_interval: RepeatInterval::Daily,
            repeat_days: WeekdaySet::new(),
            start_date: date(2024, 1, 1),
            repeat_until: None,
            time: None,
        }
    }

    #[test]
    fn test_concrete_tasks_pass_through() {
        let task = Task::new(1, "Ship release", date(2024, 2, 5)).unwrap();
        let merged = merge(date(2024, 2, 5), &[task.clone()], &[]);
        assert_eq!(merged, vec![Occurrence::Concrete(task)]);
    }

    #[test]
    fn test_template_contributes_virtual_occurrence() {
        let template = daily_template(3, "Stretch");
        let merged = merge(date(2024, 2, 5), &[], &[template.clone()]);

        assert_eq!(merged.len(), 1);
        assert!(merged[0].is_virtual());
        assert_eq!(merged[0].title(), "Stretch");
        assert_eq!(merged[0].date(), date(2024, 2, 5));
    }

    #[test]
    fn test_exception_suppresses_virtual_duplicate() {
        let template = daily_template(3, "Stretch");
        let mut exception = Task::new(10, "Stretch", date(2024, 2, 5)).unwrap();
        exception.template_id = Some(3);
        exception.is_exception = true;

        let merged = merge(date(2024, 2, 5), &[exception.clone()], &[template]);

        assert_eq!(merged, vec![Occurrence::Concrete(exception)]);
    }

    #[test]
    fn test_unrelated_concrete_task_does_not_suppress() {
        let template = daily_template(3, "Stretch");
        let mut other = Task::new(10, "Stretch", date(2024, 2, 5)).unwrap();
        other.template_id = Some(4); // different template

        let merged = merge(date(2024, 2, 5), &[other], &[template]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_moved_exception_suppresses_origin_via_context() {
        let template = daily_template(3, "Stretch");

        // Materialized for Feb 5, then moved to Feb 7.
        let mut moved = Task::new(10, "Stretch", date(2024, 2, 7)).unwrap();
        moved.template_id = Some(3);
        moved.is_exception = true;
        moved.exception_date = Some(date(2024, 2, 5));

        let origin = merge_with_context(date(2024, 2, 5), &[], &[moved.clone()], &[template.clone()]);
        assert!(origin.is_empty());

        // Other dates are unaffected by the context row.
        let next_day = merge_with_context(date(2024, 2, 6), &[], &[moved], &[template]);
        assert_eq!(next_day.len(), 1);
        assert!(next_day[0].is_virtual());
    }

    #[test]
    fn test_template_not_occurring_contributes_nothing() {
        let mut template = daily_template(3, "Stretch");
        template.start_date = date(2024, 3, 1);

        let merged = merge(date(2024, 2, 5), &[], &[template]);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_bad_template_is_skipped_not_fatal() {
        let mut bad = daily_template(3, "Mystery");
        bad.repeat_interval = RepeatInterval::Unknown;
        let good = daily_template(4, "Stretch");

        let merged = merge(date(2024, 2, 5), &[], &[bad, good]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title(), "Stretch");
    }

    #[test]
    fn test_ordering_timed_then_untimed_then_title() {
        let mut late = Task::new(1, "Late call", date(2024, 2, 5)).unwrap();
        late.time = NaiveTime::from_hms_opt(16, 0, 0);
        let mut early = Task::new(2, "Early call", date(2024, 2, 5)).unwrap();
        early.time = NaiveTime::from_hms_opt(9, 0, 0);
        let untimed_b = Task::new(3, "B chores", date(2024, 2, 5)).unwrap();
        let untimed_a = Task::new(4, "A chores", date(2024, 2, 5)).unwrap();

        let merged = merge(
            date(2024, 2, 5),
            &[late, early, untimed_b, untimed_a],
            &[],
        );
        let titles: Vec<&str> = merged.iter().map(|o| o.title()).collect();
        assert_eq!(titles, vec!["Early call", "Late call", "A chores", "B chores"]);
    }
}
