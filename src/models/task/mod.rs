// Task module
// Concrete, persisted task occurrence pinned to a calendar date

use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::category::Category;
use crate::models::template::Template;

/// Task priority level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Rank used by the agenda ordering, high first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

/// A concrete task row owned by the task service.
///
/// Tasks generated from a recurring template carry `template_id`; a task that
/// overrides one occurrence of its template (completed, deleted, or moved
/// away from the template's schedule) is additionally flagged `is_exception`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub estimated_time: u32,
    /// Weak copy of the category; the service nulls this out when the
    /// category is deleted, so it is always safe to render.
    #[serde(default)]
    pub category: Option<Category>,
    pub date: NaiveDate,
    #[serde(default, with = "time_format")]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Local>>,
    #[serde(default)]
    pub template_id: Option<i64>,
    #[serde(default)]
    pub is_exception: bool,
    /// The template occurrence date this exception overrides. Stays pinned
    /// when the row is later moved, so the origin date keeps suppressing
    /// its virtual twin.
    #[serde(default)]
    pub exception_date: Option<NaiveDate>,
    #[serde(default)]
    pub overdue: bool,
}

impl Task {
    /// Create a task with required fields; everything else defaults.
    pub fn new(id: i64, title: impl Into<String>, date: NaiveDate) -> Result<Self, String> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err("Task title cannot be empty".to_string());
        }

        Ok(Self {
            id,
            title,
            description: None,
            priority: Priority::default(),
            estimated_time: 0,
            category: None,
            date,
            time: None,
            completed: false,
            completed_at: None,
            template_id: None,
            is_exception: false,
            exception_date: None,
            overdue: false,
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Task title cannot be empty".to_string());
        }
        Ok(())
    }

    /// Whether this row overrides the template's occurrence on `date`:
    /// either it sits on that date, or it was materialized for it and has
    /// since been moved elsewhere.
    pub fn overrides_template(&self, template_id: i64, date: NaiveDate) -> bool {
        self.template_id == Some(template_id)
            && (self.date == date || self.exception_date == Some(date))
    }
}

/// Draft body for `POST tasks/`; the category id is omitted from the wire
/// body entirely when no category is selected.
#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    pub priority: Priority,
    pub estimated_time: u32,
    pub date: NaiveDate,
    #[serde(with = "time_format")]
    pub time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<i64>,
    pub is_exception: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: None,
            category_id: None,
            priority: Priority::default(),
            estimated_time: 0,
            date,
            time: None,
            template_id: None,
            is_exception: false,
            exception_date: None,
        }
    }

    /// Materialize one occurrence of a template into a concrete draft.
    /// The draft is pinned to the occurrence date and flagged as an
    /// exception so the merger suppresses the virtual duplicate.
    pub fn from_template(template: &Template, date: NaiveDate) -> Self {
        Self {
            title: template.title.clone(),
            description: template.description.clone(),
            category_id: template.category_id,
            priority: template.priority,
            estimated_time: template.estimated_time,
            date,
            time: template.time,
            template_id: Some(template.id),
            is_exception: true,
            exception_date: Some(date),
        }
    }
}

/// Order today's active list: timed before untimed, earlier first, then
/// high priority first, then id for stability.
pub fn sort_agenda(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        let a_time = (a.time.is_none(), a.time);
        let b_time = (b.time.is_none(), b.time);
        a_time
            .cmp(&b_time)
            .then(a.priority.rank().cmp(&b.priority.rank()))
            .then(a.id.cmp(&b.id))
    });
}

/// Serde helper for the service's `"HH:MM"` time-of-day strings.
pub mod time_format {
    use chrono::NaiveTime;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => serializer.serialize_str(&t.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Option<String> = Option::deserialize(deserializer)?;
        match value.as_deref() {
            Some(s) if !s.is_empty() => NaiveTime::parse_from_str(s, FORMAT)
                .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
                .map(Some)
                .map_err(D::Error::custom),
            _ => Ok(None),
        }
    }
}
