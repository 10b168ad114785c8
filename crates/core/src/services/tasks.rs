use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;

use crate::capture::validate_title;
use crate::error::TaskError;
use crate::gateway::TaskGateway;
use crate::model::{NewTask, Task, TaskPatch};

/// Point-in-time copy of everything the store exposes to readers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub tasks: Vec<Task>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct StoreState {
    tasks: Vec<Task>,
    in_flight: usize,
    error: Option<String>,
}

/// Session-scoped owner of the task collection.
///
/// Every mutation goes through the gateway first; local state only ever takes the
/// server's answer. Operations are not serialized against each other, so whichever
/// response lands last decides what the collection looks like. The lock is never held
/// across a gateway call.
pub struct TaskStore {
    gateway: Arc<dyn TaskGateway>,
    state: Mutex<StoreState>,
}

/// Marks a gateway call as in flight until dropped.
struct InFlight<'a> {
    state: &'a Mutex<StoreState>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

impl TaskStore {
    pub fn new(gateway: Arc<dyn TaskGateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(StoreState::default()),
        }
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().tasks.clone()
    }

    /// Run `f` against the current collection without cloning it.
    ///
    /// The store's lock is held while `f` runs: keep it to pure computation and never call
    /// back into the store from it. Use [`TaskStore::tasks`] when rendering or doing I/O.
    pub fn with_tasks<R>(&self, f: impl FnOnce(&[Task]) -> R) -> R {
        f(&self.state.lock().tasks)
    }

    pub fn loading(&self) -> bool {
        self.state.lock().in_flight > 0
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.lock();
        StoreSnapshot {
            tasks: state.tasks.clone(),
            loading: state.in_flight > 0,
            error: state.error.clone(),
        }
    }

    /// Local lookup; never touches the network.
    pub fn find(&self, id: &str) -> Option<Task> {
        self.state
            .lock()
            .tasks
            .iter()
            .find(|task| task.id == id)
            .cloned()
    }

    /// Replace the whole collection with the backend's list.
    pub async fn refresh(&self, date: Option<NaiveDate>) -> Result<usize, TaskError> {
        let _flight = self.begin();
        tracing::debug!(date = ?date, "refreshing tasks");
        match self.gateway.list(date).await {
            Ok(tasks) => {
                let count = tasks.len();
                self.state.lock().tasks = tasks;
                tracing::debug!(count, "tasks refreshed");
                Ok(count)
            }
            Err(err) => Err(self.fail("refresh", err)),
        }
    }

    /// Fetch one authoritative record; the collection is left as is.
    pub async fn fetch(&self, id: &str) -> Result<Task, TaskError> {
        let _flight = self.begin();
        tracing::debug!(task_id = id, "fetching task");
        self.gateway
            .get(id)
            .await
            .map_err(|err| self.fail("fetch", err))
    }

    pub async fn create(&self, draft: NewTask) -> Result<Task, TaskError> {
        self.clear_error();
        validate_title(&draft.title).map_err(|err| self.fail("create", err))?;

        let _flight = self.begin();
        tracing::debug!(title = draft.title.as_str(), "creating task");
        let task = self
            .gateway
            .create(&draft)
            .await
            .map_err(|err| self.fail("create", err))?;
        self.state.lock().tasks.insert(0, task.clone());
        tracing::debug!(task_id = task.id.as_str(), "task created");
        Ok(task)
    }

    pub async fn update(&self, id: &str, patch: TaskPatch) -> Result<Task, TaskError> {
        self.clear_error();
        if let Some(title) = &patch.title {
            validate_title(title).map_err(|err| self.fail("update", err))?;
        }

        let _flight = self.begin();
        tracing::debug!(task_id = id, "updating task");
        let task = self
            .gateway
            .update(id, &patch)
            .await
            .map_err(|err| self.fail("update", err))?;
        self.replace(id, &task);
        Ok(task)
    }

    pub async fn toggle_status(&self, id: &str) -> Result<Task, TaskError> {
        let _flight = self.begin();
        tracing::debug!(task_id = id, "toggling task status");
        let task = self
            .gateway
            .toggle_status(id)
            .await
            .map_err(|err| self.fail("toggle", err))?;
        self.replace(id, &task);
        Ok(task)
    }

    /// Remove a task, locally only once the backend confirmed the deletion.
    pub async fn delete(&self, id: &str) -> Result<(), TaskError> {
        let _flight = self.begin();
        tracing::debug!(task_id = id, "deleting task");
        self.gateway
            .delete(id)
            .await
            .map_err(|err| self.fail("delete", err))?;
        self.state.lock().tasks.retain(|task| task.id != id);
        Ok(())
    }

    fn begin(&self) -> InFlight<'_> {
        let mut state = self.state.lock();
        state.error = None;
        state.in_flight += 1;
        InFlight { state: &self.state }
    }

    fn clear_error(&self) {
        self.state.lock().error = None;
    }

    fn fail(&self, action: &'static str, err: TaskError) -> TaskError {
        tracing::warn!(action, error = %err, "task operation failed");
        self.state.lock().error = Some(err.to_string());
        err
    }

    fn replace(&self, id: &str, task: &Task) {
        let mut state = self.state.lock();
        match state.tasks.iter_mut().find(|existing| existing.id == id) {
            Some(slot) => *slot = task.clone(),
            None => tracing::debug!(task_id = id, "task not in local collection; nothing replaced"),
        }
    }
}
