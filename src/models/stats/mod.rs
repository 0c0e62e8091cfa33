// Stats module
// Aggregate counts for the current day, served by `GET stats/`

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub total_tasks: u32,
    #[serde(default)]
    pub completed_tasks: u32,
    #[serde(default)]
    pub completion_rate: f64,
    #[serde(default)]
    pub high_priority: u32,
    #[serde(default)]
    pub medium_priority: u32,
    #[serde(default)]
    pub low_priority: u32,
    #[serde(default)]
    pub total_time_minutes: u32,
    #[serde(default)]
    pub completed_time_minutes: u32,
    #[serde(default)]
    pub time_completion_rate: f64,
}
