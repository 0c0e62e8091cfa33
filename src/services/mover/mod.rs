//! Occurrence mutation: moving an occurrence to another date, and the
//! materialize-first protocol that turns a virtual occurrence into a
//! concrete exception row before touching it.

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::models::occurrence::Occurrence;
use crate::models::task::{NewTask, Task};
use crate::services::api::PlannerStore;

/// Result of a successful move. Both the origin and destination dates may
/// now show different occurrence sets, so callers reload both.
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub task: Task,
    pub invalidated: [NaiveDate; 2],
}

pub struct OccurrenceMover<'a> {
    store: &'a dyn PlannerStore,
}

impl<'a> OccurrenceMover<'a> {
    pub fn new(store: &'a dyn PlannerStore) -> Self {
        Self { store }
    }

    /// Move an occurrence to `new_date`.
    ///
    /// A concrete task is a scoped date update. A virtual occurrence is
    /// first materialized: a concrete task copying the template's fields is
    /// created, pinned to the occurrence's original date and flagged as an
    /// exception (so the merger suppresses the virtual duplicate), then the
    /// created row is moved. If the move step fails after materialization,
    /// the error carries the created task id so the caller can
    /// `retry_move` without materializing twice.
    pub async fn move_occurrence(
        &self,
        occurrence: &Occurrence,
        new_date: NaiveDate,
    ) -> Result<MoveOutcome> {
        match occurrence {
            Occurrence::Concrete(task) => {
                let moved = self
                    .move_with_fallback(task, new_date)
                    .await
                    .map_err(|err| Error::Move {
                        reason: err.to_string(),
                        materialized_id: None,
                    })?;
                Ok(MoveOutcome {
                    invalidated: [task.date, new_date],
                    task: moved,
                })
            }
            Occurrence::Virtual(virtual_occurrence) => {
                let draft =
                    NewTask::from_template(&virtual_occurrence.template, virtual_occurrence.date);
                let created =
                    self.store
                        .create_task(&draft)
                        .await
                        .map_err(|err| Error::Move {
                            reason: format!("failed to materialize occurrence: {err}"),
                            materialized_id: None,
                        })?;

                match self.move_with_fallback(&created, new_date).await {
                    Ok(moved) => Ok(MoveOutcome {
                        invalidated: [virtual_occurrence.date, new_date],
                        task: moved,
                    }),
                    Err(err) => Err(Error::Move {
                        reason: format!("materialized as task {} but move failed: {err}", created.id),
                        materialized_id: Some(created.id),
                    }),
                }
            }
        }
    }

    /// Retry just the move step for an already-materialized task.
    pub async fn retry_move(&self, task_id: i64, new_date: NaiveDate) -> Result<Task> {
        self.store.move_task(task_id, new_date).await
    }

    /// Complete an occurrence. Virtual occurrences are materialized first,
    /// so the completed row suppresses the virtual duplicate and completion
    /// stays terminal for that date. Returns the concrete task id.
    pub async fn complete_occurrence(&self, occurrence: &Occurrence) -> Result<i64> {
        let id = match occurrence {
            Occurrence::Concrete(task) => task.id,
            Occurrence::Virtual(virtual_occurrence) => {
                let draft =
                    NewTask::from_template(&virtual_occurrence.template, virtual_occurrence.date);
                self.store.create_task(&draft).await?.id
            }
        };
        self.store.complete_task(id).await?;
        Ok(id)
    }

    /// Try the scoped move endpoint; on a transport-level failure fall back
    /// to a full read-modify-write update that resends every field with
    /// only the date changed. Partial-field overwrites would lose data, so
    /// the fallback body is the complete task.
    async fn move_with_fallback(&self, task: &Task, new_date: NaiveDate) -> Result<Task> {
        match self.store.move_task(task.id, new_date).await {
            Ok(moved) => Ok(moved),
            Err(Error::Fetch(reason)) => {
                log::warn!(
                    "scoped move failed for task {} ({reason}); falling back to full update",
                    task.id
                );
                let mut full = task.clone();
                full.date = new_date;
                self.store.update_task(&full).await
            }
            Err(err) => Err(err),
        }
    }
}
