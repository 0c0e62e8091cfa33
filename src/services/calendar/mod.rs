//! Month-view aggregation.
//! Fans one per-date lookup out for every day of the visible grid, merges
//! each day with the active templates, and tolerates individual failures.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use futures::future::join_all;

use crate::error::Result;
use crate::models::occurrence::Occurrence;
use crate::models::task::Task;
use crate::models::template::Template;
use crate::services::api::PlannerStore;
use crate::services::merge;
use crate::utils::date::month_grid;

pub type MonthOccurrences = BTreeMap<NaiveDate, Vec<Occurrence>>;

/// Aggregates per-date lookups into a complete month view.
///
/// Each load is a full reload of the visible month; there is no incremental
/// diffing. A generation counter guards against results from a superseded
/// view being applied: `invalidate()` bumps it, and any load still in flight
/// at that point is discarded when it completes.
pub struct CalendarAggregator {
    generation: AtomicU64,
}

impl Default for CalendarAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarAggregator {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
        }
    }

    /// Mark every in-flight load stale. Called when the visible month
    /// changes or a mutation (move/complete/delete) lands.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Load the full month grid (including lead/trail days of the
    /// Monday-start 7-column view).
    ///
    /// All per-date fetches run concurrently and are all awaited. A date
    /// whose fetch fails is logged and yields an empty list so one bad date
    /// never blanks the month. Returns `None` when the view was invalidated
    /// while the load was in flight.
    pub async fn load_month<F, Fut>(
        &self,
        year: i32,
        month: u32,
        templates: &[Template],
        fetch: F,
    ) -> Option<MonthOccurrences>
    where
        F: Fn(NaiveDate) -> Fut,
        Fut: Future<Output = Result<Vec<Task>>>,
    {
        let generation = self.generation.load(Ordering::SeqCst);
        let days = month_grid(year, month);

        let lookups = days.iter().map(|&day| {
            let fetched = fetch(day);
            async move { (day, fetched.await) }
        });
        let results = join_all(lookups).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            log::debug!("discarding stale load for {year}-{month:02}");
            return None;
        }

        let fetched: Vec<(NaiveDate, Vec<Task>)> = results
            .into_iter()
            .map(|(day, result)| match result {
                Ok(tasks) => (day, tasks),
                Err(err) => {
                    log::warn!("calendar lookup failed for {day}: {err}");
                    (day, Vec::new())
                }
            })
            .collect();

        // Exception rows moved to another day of the grid must still
        // suppress the virtual occurrence at their origin date, so every
        // day merges against the whole month's rows.
        let context: Vec<Task> = fetched
            .iter()
            .flat_map(|(_, tasks)| tasks.iter().cloned())
            .collect();

        let mut view = MonthOccurrences::new();
        for (day, tasks) in fetched {
            view.insert(
                day,
                merge::merge_with_context(day, &tasks, &context, templates),
            );
        }
        Some(view)
    }

    /// Convenience wrapper driving `load_month` from the task service.
    pub async fn load_month_via(
        &self,
        store: &dyn PlannerStore,
        year: i32,
        month: u32,
        templates: &[Template],
    ) -> Option<MonthOccurrences> {
        self.load_month(year, month, templates, |day| store.fetch_day(day))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::template::{RepeatInterval, Template, WeekdaySet};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily_template(id: i64) -> Template {
        Template {
            id,
            title: "Daily".to_string(),
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

    #[tokio::test]
    async fn test_load_month_covers_full_grid() {
        let aggregator = CalendarAggregator::new();
        let view = aggregator
            .load_month(2024, 1, &[], |_| async { Ok(Vec::new()) })
            .await
            .unwrap();

        // Jan 2024 grid: Jan 1 (Monday) through Feb 4.
        assert_eq!(view.len(), 35);
        assert!(view.contains_key(&date(2024, 2, 4)));
    }

    #[tokio::test]
    async fn test_single_failed_date_yields_empty_list_only() {
        let aggregator = CalendarAggregator::new();
        let failing = date(2024, 1, 17);
        let templates = [daily_template(1)];

        let view = aggregator
            .load_month(2024, 1, &templates, |day| async move {
                if day == failing {
                    Err(Error::fetch("boom"))
                } else {
                    Ok(Vec::new())
                }
            })
            .await
            .unwrap();

        assert_eq!(view.len(), 35);
        assert!(view[&failing].is_empty());
        // Every other day still merged its template occurrence.
        assert_eq!(view[&date(2024, 1, 16)].len(), 1);
        let populated = view.values().filter(|o| !o.is_empty()).count();
        assert_eq!(populated, 34);
    }

    #[tokio::test]
    async fn test_invalidation_discards_in_flight_load() {
        let aggregator = CalendarAggregator::new();

        let view = aggregator
            .load_month(2024, 1, &[], |_| {
                // Simulate a navigation happening while fetches are pending.
                aggregator.invalidate();
                async { Ok(Vec::new()) }
            })
            .await;

        assert!(view.is_none());
    }

    #[tokio::test]
    async fn test_fresh_load_after_invalidation_applies() {
        let aggregator = CalendarAggregator::new();
        aggregator.invalidate();

        let view = aggregator
            .load_month(2024, 2, &[], |_| async { Ok(Vec::new()) })
            .await;
        assert!(view.is_some());
    }
}
