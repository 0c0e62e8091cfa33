//! Shared builders and an in-memory `PlannerStore` for integration tests.
#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use dayplan::error::{Error, Result};
use dayplan::models::category::{Category, NewCategory};
use dayplan::models::stats::Stats;
use dayplan::models::task::{NewTask, Task};
use dayplan::models::template::{NewTemplate, RepeatInterval, Template, WeekdaySet};
use dayplan::services::api::{PlannerStore, TaskLists};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn task(id: i64, title: &str, on: NaiveDate) -> Task {
    Task::new(id, title, on).unwrap()
}

pub fn template(id: i64, title: &str, interval: RepeatInterval, start: NaiveDate) -> Template {
    Template {
        id,
        title: title.to_string(),
        description: None,
        priority: Default::default(),
        estimated_time: 0,
        category_id: None,
        repeat_interval: interval,
        repeat_days: WeekdaySet::new(),
        start_date: start,
        repeat_until: None,
        time: None,
    }
}

pub fn weekly_template(id: i64, title: &str, start: NaiveDate, days: &str) -> Template {
    let mut t = template(id, title, RepeatInterval::Weekly, start);
    t.repeat_days = WeekdaySet::parse(days);
    t
}

#[derive(Default)]
struct StoreInner {
    tasks: Vec<Task>,
    templates: Vec<Template>,
    next_id: i64,
    fail_move: bool,
    fail_update: bool,
    failing_days: Vec<NaiveDate>,
}

/// In-memory task service double. Failure injection flags let tests force
/// individual endpoints to error.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                next_id: 1,
                ..Default::default()
            }),
        }
    }

    pub fn with_templates(templates: Vec<Template>) -> Self {
        let store = Self::new();
        store.lock().templates = templates;
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap()
    }

    pub fn insert_task(&self, task: Task) {
        let mut inner = self.lock();
        inner.next_id = inner.next_id.max(task.id + 1);
        inner.tasks.push(task);
    }

    pub fn fail_moves(&self, fail: bool) {
        self.lock().fail_move = fail;
    }

    pub fn fail_updates(&self, fail: bool) {
        self.lock().fail_update = fail;
    }

    pub fn fail_day(&self, day: NaiveDate) {
        self.lock().failing_days.push(day);
    }

    pub fn templates(&self) -> Vec<Template> {
        self.lock().templates.clone()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    pub fn tasks_on(&self, day: NaiveDate) -> Vec<Task> {
        self.lock()
            .tasks
            .iter()
            .filter(|t| t.date == day)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PlannerStore for InMemoryStore {
    async fn fetch_tasks(&self) -> Result<TaskLists> {
        let inner = self.lock();
        Ok(TaskLists {
            today_active: inner.tasks.iter().filter(|t| !t.completed).cloned().collect(),
            today_completed: inner.tasks.iter().filter(|t| t.completed).cloned().collect(),
            templates: inner.templates.clone(),
        })
    }

    async fn fetch_day(&self, day: NaiveDate) -> Result<Vec<Task>> {
        let inner = self.lock();
        if inner.failing_days.contains(&day) {
            return Err(Error::fetch(format!("injected failure for {day}")));
        }
        Ok(inner.tasks.iter().filter(|t| t.date == day).cloned().collect())
    }

    async fn create_task(&self, draft: &NewTask) -> Result<Task> {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;

        let mut created = Task::new(id, draft.title.clone(), draft.date)
            .map_err(Error::fetch)?;
        created.description = draft.description.clone();
        created.priority = draft.priority;
        created.estimated_time = draft.estimated_time;
        created.time = draft.time;
        created.template_id = draft.template_id;
        created.is_exception = draft.is_exception;
        created.exception_date = draft.exception_date;

        inner.tasks.push(created.clone());
        Ok(created)
    }

    async fn create_template(&self, draft: &NewTemplate) -> Result<Template> {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;

        let created = Template {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            priority: draft.priority,
            estimated_time: draft.estimated_time,
            category_id: draft.category_id,
            repeat_interval: draft.repeat_interval,
            repeat_days: draft.repeat_days.clone(),
            start_date: draft.start_date,
            repeat_until: draft.repeat_until,
            time: draft.time,
        };
        inner.templates.push(created.clone());
        Ok(created)
    }

    async fn complete_task(&self, id: i64) -> Result<()> {
        let mut inner = self.lock();
        match inner.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = true;
                Ok(())
            }
            None => Err(Error::fetch(format!("no task {id}"))),
        }
    }

    async fn move_task(&self, id: i64, day: NaiveDate) -> Result<Task> {
        let mut inner = self.lock();
        if inner.fail_move {
            return Err(Error::fetch("injected move failure"));
        }
        match inner.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.date = day;
                Ok(task.clone())
            }
            None => Err(Error::fetch(format!("no task {id}"))),
        }
    }

    async fn update_task(&self, updated: &Task) -> Result<Task> {
        let mut inner = self.lock();
        if inner.fail_update {
            return Err(Error::fetch("injected update failure"));
        }
        match inner.tasks.iter_mut().find(|t| t.id == updated.id) {
            Some(task) => {
                *task = updated.clone();
                Ok(task.clone())
            }
            None => Err(Error::fetch(format!("no task {}", updated.id))),
        }
    }

    async fn delete_task(&self, id: i64) -> Result<()> {
        self.lock().tasks.retain(|t| t.id != id);
        Ok(())
    }

    async fn delete_template(&self, id: i64) -> Result<()> {
        let mut inner = self.lock();
        inner.templates.retain(|t| t.id != id);
        inner.tasks.retain(|t| t.template_id != Some(id));
        Ok(())
    }

    async fn fetch_stats(&self) -> Result<Stats> {
        let inner = self.lock();
        Ok(Stats {
            total_tasks: inner.tasks.len() as u32,
            completed_tasks: inner.tasks.iter().filter(|t| t.completed).count() as u32,
            ..Default::default()
        })
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>> {
        Ok(Vec::new())
    }

    async fn create_category(&self, draft: &NewCategory) -> Result<Category> {
        Ok(Category {
            id: 1,
            name: draft.name.clone(),
            color: draft.color.clone(),
            icon: draft.icon.clone(),
        })
    }
}
