//! Boundary between the task store and whichever backend owns the task records.

mod http;
mod memory;

pub use http::HttpGateway;
pub use memory::MemoryGateway;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::TaskError;
use crate::model::{NewTask, Task, TaskPatch};

/// One operation per backend capability, each a single request/response round trip.
#[async_trait]
pub trait TaskGateway: Send + Sync {
    async fn list(&self, date: Option<NaiveDate>) -> Result<Vec<Task>, TaskError>;

    async fn get(&self, id: &str) -> Result<Task, TaskError>;

    async fn create(&self, draft: &NewTask) -> Result<Task, TaskError>;

    async fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task, TaskError>;

    async fn toggle_status(&self, id: &str) -> Result<Task, TaskError>;

    async fn delete(&self, id: &str) -> Result<(), TaskError>;
}

/// Response envelope shared by every task endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    #[serde(default)]
    pub(crate) success: bool,
    pub(crate) data: Option<T>,
    pub(crate) message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub(crate) fn into_data(self) -> Result<T, TaskError> {
        if !self.success {
            return Err(TaskError::InvalidResponse(
                self.message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            ));
        }
        self.data
            .ok_or_else(|| TaskError::InvalidResponse("response carried no data".to_string()))
    }
}
