// Occurrence module
// A task instance on a specific date: either a stored row (concrete) or a
// value computed from a template (virtual)

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveTime};

use crate::models::task::{Priority, Task};
use crate::models::template::Template;

/// Identifier distinguishing concrete task ids from synthetic
/// (template, date) virtual ids, so call sites pattern-match instead of
/// sniffing marker strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OccurrenceId {
    Concrete(i64),
    Virtual { template_id: i64, date: NaiveDate },
}

impl OccurrenceId {
    /// Stable tag usable for platform-level notification collapsing.
    pub fn tag(&self) -> String {
        match self {
            OccurrenceId::Concrete(id) => format!("task-{id}"),
            OccurrenceId::Virtual { template_id, date } => {
                format!("virtual-{template_id}-{date}")
            }
        }
    }
}

impl fmt::Display for OccurrenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

/// Transient occurrence derived from a template and a date. Never persisted;
/// identity is (template id, date) regardless of template field contents.
#[derive(Debug, Clone)]
pub struct VirtualOccurrence {
    pub template: Template,
    pub date: NaiveDate,
}

impl VirtualOccurrence {
    pub fn new(template: Template, date: NaiveDate) -> Self {
        Self { template, date }
    }

    pub fn id(&self) -> OccurrenceId {
        OccurrenceId::Virtual {
            template_id: self.template.id,
            date: self.date,
        }
    }
}

impl PartialEq for VirtualOccurrence {
    fn eq(&self, other: &Self) -> bool {
        self.template.id == other.template.id && self.date == other.date
    }
}

impl Eq for VirtualOccurrence {}

/// One entry in a per-date calendar view.
#[derive(Debug, Clone, PartialEq)]
pub enum Occurrence {
    Concrete(Task),
    Virtual(VirtualOccurrence),
}

impl Occurrence {
    pub fn id(&self) -> OccurrenceId {
        match self {
            Occurrence::Concrete(task) => OccurrenceId::Concrete(task.id),
            Occurrence::Virtual(v) => v.id(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Occurrence::Concrete(task) => &task.title,
            Occurrence::Virtual(v) => &v.template.title,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            Occurrence::Concrete(task) => task.date,
            Occurrence::Virtual(v) => v.date,
        }
    }

    pub fn time(&self) -> Option<NaiveTime> {
        match self {
            Occurrence::Concrete(task) => task.time,
            Occurrence::Virtual(v) => v.template.time,
        }
    }

    pub fn priority(&self) -> Priority {
        match self {
            Occurrence::Concrete(task) => task.priority,
            Occurrence::Virtual(v) => v.template.priority,
        }
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self, Occurrence::Virtual(_))
    }

    pub fn completed(&self) -> bool {
        match self {
            Occurrence::Concrete(task) => task.completed,
            Occurrence::Virtual(_) => false,
        }
    }

    /// Display order: time-of-day ascending with untimed entries after all
    /// timed ones, ties broken by title, then by id so the order is total.
    pub fn display_cmp(&self, other: &Self) -> Ordering {
        let self_time = (self.time().is_none(), self.time());
        let other_time = (other.time().is_none(), other.time());
        self_time
            .cmp(&other_time)
            .then_with(|| self.title().cmp(other.title()))
            .then_with(|| self.id().cmp(&other.id()))
    }
}
