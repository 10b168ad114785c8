use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Local, NaiveDate, Utc};
use parking_lot::Mutex;
use ulid::Ulid;

use super::TaskGateway;
use crate::capture::validate_title;
use crate::error::TaskError;
use crate::model::{NewTask, Task, TaskPatch, TaskStatus};

/// In-process backend that honours the same contract as the REST API.
///
/// Records are kept newest-first and every trait call counts as one request.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    tasks: Mutex<Vec<Task>>,
    requests: AtomicUsize,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            requests: AtomicUsize::new(0),
        }
    }

    /// Number of gateway calls served so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Server-side view of the records, bypassing the request counter.
    pub fn records(&self) -> Vec<Task> {
        self.tasks.lock().clone()
    }

    fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    fn modify<F>(&self, id: &str, change: F) -> Result<Task, TaskError>
    where
        F: FnOnce(&mut Task),
    {
        let mut tasks = self.tasks.lock();
        let task = tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| TaskError::not_found(id))?;
        change(task);
        task.updated_at = Utc::now();
        Ok(task.clone())
    }
}

#[async_trait]
impl TaskGateway for MemoryGateway {
    async fn list(&self, date: Option<NaiveDate>) -> Result<Vec<Task>, TaskError> {
        self.record_request();
        let tasks = self.tasks.lock();
        Ok(match date {
            Some(date) => tasks
                .iter()
                .filter(|task| task.scheduled_date_in(&Local) == Some(date))
                .cloned()
                .collect(),
            None => tasks.clone(),
        })
    }

    async fn get(&self, id: &str) -> Result<Task, TaskError> {
        self.record_request();
        self.tasks
            .lock()
            .iter()
            .find(|task| task.id == id)
            .cloned()
            .ok_or_else(|| TaskError::not_found(id))
    }

    async fn create(&self, draft: &NewTask) -> Result<Task, TaskError> {
        self.record_request();
        validate_title(&draft.title)?;
        let now = Utc::now();
        let task = Task {
            id: Ulid::new().to_string(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            status: TaskStatus::Pending,
            scheduled_at: draft.scheduled_at.clone(),
            created_at: now,
            updated_at: now,
        };
        self.tasks.lock().insert(0, task.clone());
        Ok(task)
    }

    async fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task, TaskError> {
        self.record_request();
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        self.modify(id, |task| patch.apply_to(task))
    }

    async fn toggle_status(&self, id: &str) -> Result<Task, TaskError> {
        self.record_request();
        self.modify(id, |task| task.status = task.status.toggled())
    }

    async fn delete(&self, id: &str) -> Result<(), TaskError> {
        self.record_request();
        let mut tasks = self.tasks.lock();
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        if tasks.len() == before {
            return Err(TaskError::not_found(id));
        }
        Ok(())
    }
}
