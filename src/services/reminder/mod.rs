//! Local reminder scheduling.
//! Polls the active task list on a fixed cadence and fires at most one
//! notification per occurrence when its lead time crosses the threshold.
//! The scheduler owns its whole lifecycle explicitly; there are no ambient
//! timers or module-level registrations.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Local, NaiveTime};
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::models::occurrence::OccurrenceId;
use crate::models::task::Task;
use crate::services::api::PlannerStore;
use crate::utils::date::minutes_of_day;

pub mod coordinator;

pub const DEFAULT_LEAD_MINUTES: i64 = 30;
pub const POLL_PERIOD_SECS: u64 = 60;

/// Reminders for the same occurrence within this window are suppressed;
/// two ticks can both observe the matching lead minute under clock skew.
const DEDUP_WINDOW_SECS: i64 = 60;
const HISTORY_CAP: usize = 50;

/// Outcome of the environment's one-time alert-permission decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertPermission {
    Granted,
    Denied,
    Undecided,
}

/// Capability handed to the scheduler at construction; once the answer is
/// `Denied` the scheduler never re-prompts.
#[cfg_attr(test, mockall::automock)]
pub trait PermissionProbe: Send + Sync {
    fn current(&self) -> AlertPermission;
}

/// Where due reminders are delivered (the desktop notification service in
/// production, a mock in tests).
#[cfg_attr(test, mockall::automock)]
pub trait ReminderSink: Send + Sync {
    fn deliver(&self, reminder: &Reminder) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Uninitialized,
    Permitted,
    Polling,
    Idle,
    Stopped,
}

/// Control messages for a running scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerCommand {
    CheckNow,
    Stop,
}

/// A reminder due for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub occurrence: OccurrenceId,
    pub title: String,
    pub time: NaiveTime,
    pub lead_minutes: i64,
}

impl Reminder {
    pub fn body(&self) -> String {
        format!("In {} minutes: \"{}\"", self.lead_minutes, self.title)
    }

    /// Stable tag so platform-level dedup can collapse repeats.
    pub fn tag(&self) -> String {
        self.occurrence.tag()
    }
}

/// Record of a sent reminder, kept only for de-duplication within this
/// scheduler's lifetime.
#[derive(Debug, Clone)]
pub struct NotificationRecord {
    pub occurrence: OccurrenceId,
    pub title: String,
    pub time: Option<NaiveTime>,
    pub sent_at: DateTime<Local>,
}

pub struct ReminderScheduler {
    state: SchedulerState,
    lead_minutes: i64,
    poll_period: std::time::Duration,
    history: VecDeque<NotificationRecord>,
}

impl ReminderScheduler {
    pub fn new(lead_minutes: i64) -> Self {
        Self {
            state: SchedulerState::Uninitialized,
            lead_minutes,
            poll_period: std::time::Duration::from_secs(POLL_PERIOD_SECS),
            history: VecDeque::new(),
        }
    }

    pub fn with_poll_period(mut self, period: std::time::Duration) -> Self {
        self.poll_period = period;
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Resolve the permission decision. Granted moves to `Permitted`.
    /// Denied fails and undecided quietly stays `Uninitialized`; neither
    /// performs any polling.
    pub fn initialize(&mut self, probe: &dyn PermissionProbe) -> Result<bool> {
        match probe.current() {
            AlertPermission::Granted => {
                self.state = SchedulerState::Permitted;
                Ok(true)
            }
            AlertPermission::Denied => Err(Error::PermissionDenied),
            AlertPermission::Undecided => Ok(false),
        }
    }

    /// Begin polling. Only valid from `Permitted`.
    pub fn start(&mut self) -> bool {
        if self.state == SchedulerState::Permitted {
            self.state = SchedulerState::Polling;
            true
        } else {
            false
        }
    }

    /// Explicit teardown; no further ticks run.
    pub fn stop(&mut self) {
        self.state = SchedulerState::Stopped;
    }

    /// One polling pass over the active task list at a given instant.
    ///
    /// A reminder is due when the task has a time-of-day, is not completed,
    /// and its lead time equals the configured lead exactly (minute
    /// granularity, not a range). Occurrences already notified within the
    /// dedup window are suppressed.
    pub fn tick_at(&mut self, now: DateTime<Local>, tasks: &[Task]) -> Vec<Reminder> {
        if !matches!(self.state, SchedulerState::Polling | SchedulerState::Idle) {
            return Vec::new();
        }
        self.state = SchedulerState::Polling;

        let now_minutes = minutes_of_day(now.time());
        let mut due = Vec::new();

        for task in tasks {
            if task.completed {
                continue;
            }
            let Some(time) = task.time else {
                continue;
            };
            if minutes_of_day(time) - now_minutes != self.lead_minutes {
                continue;
            }

            let occurrence = OccurrenceId::Concrete(task.id);
            if self.recently_notified(occurrence, now) {
                log::debug!("reminder for {occurrence} already sent; suppressing");
                continue;
            }

            self.history.push_back(NotificationRecord {
                occurrence,
                title: task.title.clone(),
                time: Some(time),
                sent_at: now,
            });
            while self.history.len() > HISTORY_CAP {
                self.history.pop_front();
            }

            due.push(Reminder {
                occurrence,
                title: task.title.clone(),
                time,
                lead_minutes: self.lead_minutes,
            });
        }

        self.state = SchedulerState::Idle;
        due
    }

    fn recently_notified(&self, occurrence: OccurrenceId, now: DateTime<Local>) -> bool {
        self.history.iter().any(|record| {
            record.occurrence == occurrence
                && now - record.sent_at < Duration::seconds(DEDUP_WINDOW_SECS)
        })
    }

    /// Drive the scheduler: a fixed-period timer (with one immediate check)
    /// plus a control channel for "check now" requests and teardown.
    ///
    /// A sink failure caused by revoked permission stops the scheduler
    /// instead of retrying forever; fetch failures skip the tick.
    pub async fn run(
        mut self,
        store: &dyn PlannerStore,
        sink: &dyn ReminderSink,
        mut control: mpsc::Receiver<SchedulerCommand>,
    ) -> Result<SchedulerState> {
        if !self.start() {
            return Err(Error::PermissionDenied);
        }

        let mut timer = tokio::time::interval(self.poll_period);

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    self.poll_once(store, sink).await;
                }
                command = control.recv() => match command {
                    Some(SchedulerCommand::CheckNow) => {
                        self.poll_once(store, sink).await;
                    }
                    Some(SchedulerCommand::Stop) | None => {
                        self.stop();
                    }
                }
            }

            if self.state == SchedulerState::Stopped {
                break;
            }
        }

        Ok(self.state)
    }

    async fn poll_once(&mut self, store: &dyn PlannerStore, sink: &dyn ReminderSink) {
        let lists = match store.fetch_tasks().await {
            Ok(lists) => lists,
            Err(err) => {
                log::warn!("reminder poll skipped, task fetch failed: {err}");
                return;
            }
        };

        for reminder in self.tick_at(Local::now(), &lists.today_active) {
            match sink.deliver(&reminder) {
                Ok(()) => log::info!("reminder sent: {}", reminder.title),
                Err(Error::PermissionDenied) => {
                    log::warn!("alert permission revoked; stopping reminder scheduler");
                    self.stop();
                    return;
                }
                Err(err) => log::warn!("reminder delivery failed: {err}"),
            }
        }
    }
}
