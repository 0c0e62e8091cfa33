// Template module
// Recurring-task definition; occurrences are derived, never stored here

use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::models::task::{time_format, Priority};

/// How often a template repeats.
///
/// The service stores this as a plain string; values this client does not
/// understand deserialize to `Unknown` and are rejected at expansion time
/// rather than failing the whole response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatInterval {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for RepeatInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RepeatInterval::None => "none",
            RepeatInterval::Daily => "daily",
            RepeatInterval::Weekly => "weekly",
            RepeatInterval::Monthly => "monthly",
            RepeatInterval::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Normalized set of weekday indices, Monday = 0 through Sunday = 6.
///
/// The service has historically sent these as `"1,3,5"` strings, numeric
/// arrays, or arrays of string digits. All forms normalize into the same
/// typed set here, so downstream code never compares raw representations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WeekdaySet(BTreeSet<u8>);

impl WeekdaySet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn insert(&mut self, day: u8) -> bool {
        day <= 6 && self.0.insert(day)
    }

    pub fn contains(&self, day: u8) -> bool {
        self.0.contains(&day)
    }

    pub fn contains_weekday(&self, weekday: Weekday) -> bool {
        self.contains(weekday.num_days_from_monday() as u8)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }

    /// Parse a comma-separated day list, keeping tokens in 0..=6 and
    /// dropping everything else.
    pub fn parse(raw: &str) -> Self {
        let mut set = Self::new();
        for token in raw.split(',') {
            if let Ok(day) = token.trim().parse::<u8>() {
                set.insert(day);
            }
        }
        set
    }
}

impl FromIterator<u8> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = Self::new();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl Serialize for WeekdaySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let joined = self
            .0
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(",");
        serializer.serialize_str(&joined)
    }
}

impl<'de> Deserialize<'de> for WeekdaySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawDay {
            Number(i64),
            Text(String),
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawDays {
            Text(String),
            List(Vec<RawDay>),
        }

        let raw: Option<RawDays> = Option::deserialize(deserializer)?;
        Ok(match raw {
            None => WeekdaySet::new(),
            Some(RawDays::Text(text)) => WeekdaySet::parse(&text),
            Some(RawDays::List(items)) => {
                let mut set = WeekdaySet::new();
                for item in items {
                    match item {
                        RawDay::Number(n) if (0..=6).contains(&n) => {
                            set.insert(n as u8);
                        }
                        RawDay::Number(_) => {}
                        RawDay::Text(s) => {
                            if let Ok(day) = s.trim().parse::<u8>() {
                                set.insert(day);
                            }
                        }
                    }
                }
                set
            }
        })
    }
}

/// A recurring-task definition owned by the task service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub estimated_time: u32,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub repeat_interval: RepeatInterval,
    #[serde(default)]
    pub repeat_days: WeekdaySet,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub repeat_until: Option<NaiveDate>,
    #[serde(default, with = "time_format")]
    pub time: Option<NaiveTime>,
}

impl Template {
    pub fn new(
        id: i64,
        title: impl Into<String>,
        repeat_interval: RepeatInterval,
        start_date: NaiveDate,
    ) -> Result<Self, String> {
        let template = Self {
            id,
            title: title.into(),
            description: None,
            priority: Priority::default(),
            estimated_time: 0,
            category_id: None,
            repeat_interval,
            repeat_days: WeekdaySet::new(),
            start_date,
            repeat_until: None,
            time: None,
        };
        template.validate()?;
        Ok(template)
    }

    /// Repeat-days are meaningful only for weekly templates; a weekly
    /// template without any day selected can never occur.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Template title cannot be empty".to_string());
        }
        if self.repeat_interval == RepeatInterval::Weekly && self.repeat_days.is_empty() {
            return Err("Weekly template requires at least one repeat day".to_string());
        }
        if let Some(until) = self.repeat_until {
            if until < self.start_date {
                return Err("repeat_until cannot precede start_date".to_string());
            }
        }
        Ok(())
    }
}

/// Draft body for `POST templates/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewTemplate {
    pub title: String,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    pub priority: Priority,
    pub estimated_time: u32,
    pub repeat_interval: RepeatInterval,
    pub repeat_days: WeekdaySet,
    pub start_date: NaiveDate,
    pub repeat_until: Option<NaiveDate>,
    #[serde(with = "time_format")]
    pub time: Option<NaiveTime>,
}
