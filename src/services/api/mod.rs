//! Task service client.
//! Persistent storage lives behind a small HTTP service; everything the core
//! needs from it goes through the `PlannerStore` seam so tests can swap in
//! an in-memory store.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::error::{Error, Result};
use crate::models::category::{Category, NewCategory};
use crate::models::stats::Stats;
use crate::models::task::{NewTask, Task};
use crate::models::template::{NewTemplate, Template};

/// Response shape of `GET tasks/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskLists {
    #[serde(default)]
    pub today_active: Vec<Task>,
    #[serde(default)]
    pub today_completed: Vec<Task>,
    #[serde(default)]
    pub templates: Vec<Template>,
}

#[derive(Debug, Deserialize)]
struct CalendarDayResponse {
    #[serde(default)]
    tasks: Vec<Task>,
}

/// Storage operations the planner core consumes.
#[async_trait]
pub trait PlannerStore: Send + Sync {
    async fn fetch_tasks(&self) -> Result<TaskLists>;

    /// Concrete tasks stored for exactly one date. Missing dates are empty,
    /// never an error.
    async fn fetch_day(&self, date: NaiveDate) -> Result<Vec<Task>>;

    async fn create_task(&self, draft: &NewTask) -> Result<Task>;
    async fn create_template(&self, draft: &NewTemplate) -> Result<Template>;

    /// Terminal completion; completing twice is a no-op success.
    async fn complete_task(&self, id: i64) -> Result<()>;

    /// Scoped move of just the date field.
    async fn move_task(&self, id: i64, date: NaiveDate) -> Result<Task>;

    /// Full-body update; every field is resent.
    async fn update_task(&self, task: &Task) -> Result<Task>;

    async fn delete_task(&self, id: i64) -> Result<()>;

    /// Removes the template and, server-side, the occurrences derived
    /// from it.
    async fn delete_template(&self, id: i64) -> Result<()>;

    async fn fetch_stats(&self) -> Result<Stats>;
    async fn fetch_categories(&self) -> Result<Vec<Category>>;
    async fn create_category(&self, draft: &NewCategory) -> Result<Category>;
}

/// HTTP implementation of `PlannerStore`.
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|err| Error::fetch(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn expect_ok(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(Error::fetch(format!(
                "task service responded with HTTP {status}"
            )))
        }
    }
}

#[async_trait]
impl PlannerStore for HttpStore {
    async fn fetch_tasks(&self) -> Result<TaskLists> {
        let response = self.client.get(self.url("tasks/")).send().await?;
        let response = Self::expect_ok(response).await?;
        Ok(response.json().await?)
    }

    async fn fetch_day(&self, date: NaiveDate) -> Result<Vec<Task>> {
        let response = self
            .client
            .get(self.url(&format!("calendar/{date}")))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        let response = Self::expect_ok(response).await?;
        let day: CalendarDayResponse = response.json().await?;
        Ok(day.tasks)
    }

    async fn create_task(&self, draft: &NewTask) -> Result<Task> {
        let response = self
            .client
            .post(self.url("tasks/"))
            .json(draft)
            .send()
            .await?;
        let response = Self::expect_ok(response).await?;
        Ok(response.json().await?)
    }

    async fn create_template(&self, draft: &NewTemplate) -> Result<Template> {
        let response = self
            .client
            .post(self.url("templates/"))
            .json(draft)
            .send()
            .await?;
        let response = Self::expect_ok(response).await?;
        Ok(response.json().await?)
    }

    async fn complete_task(&self, id: i64) -> Result<()> {
        let response = self
            .client
            .put(self.url(&format!("tasks/{id}/complete")))
            .send()
            .await?;
        Self::expect_ok(response).await?;
        Ok(())
    }

    async fn move_task(&self, id: i64, date: NaiveDate) -> Result<Task> {
        let response = self
            .client
            .put(self.url(&format!("tasks/{id}/move")))
            .json(&json!({ "date": date }))
            .send()
            .await?;
        let response = Self::expect_ok(response).await?;
        Ok(response.json().await?)
    }

    async fn update_task(&self, task: &Task) -> Result<Task> {
        let response = self
            .client
            .put(self.url(&format!("tasks/{}", task.id)))
            .json(task)
            .send()
            .await?;
        let response = Self::expect_ok(response).await?;
        Ok(response.json().await?)
    }

    async fn delete_task(&self, id: i64) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("tasks/{id}")))
            .send()
            .await?;
        Self::expect_ok(response).await?;
        Ok(())
    }

    async fn delete_template(&self, id: i64) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("templates/{id}")))
            .send()
            .await?;
        Self::expect_ok(response).await?;
        Ok(())
    }

    async fn fetch_stats(&self) -> Result<Stats> {
        let response = self.client.get(self.url("stats/")).send().await?;
        let response = Self::expect_ok(response).await?;
        Ok(response.json().await?)
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>> {
        let response = self.client.get(self.url("categories/")).send().await?;
        let response = Self::expect_ok(response).await?;
        Ok(response.json().await?)
    }

    async fn create_category(&self, draft: &NewCategory) -> Result<Category> {
        let response = self
            .client
            .post(self.url("categories/"))
            .json(draft)
            .send()
            .await?;
        let response = Self::expect_ok(response).await?;
        Ok(response.json().await?)
    }
}
