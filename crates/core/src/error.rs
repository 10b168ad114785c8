use thiserror::Error;

/// Failures surfaced by the gateway and the task store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskError {
    /// A local precondition failed; no request was issued.
    #[error("{0}")]
    Validation(String),
    /// The backend answered with a non-2xx status.
    #[error("task service returned {status}: {message}")]
    Gateway { status: u16, message: String },
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),
    /// A 2xx response whose body could not be understood.
    #[error("unexpected response from task service: {0}")]
    InvalidResponse(String),
}

impl TaskError {
    pub fn empty_title() -> Self {
        TaskError::Validation("Task title cannot be empty".to_string())
    }

    pub fn not_found(id: &str) -> Self {
        TaskError::Gateway {
            status: 404,
            message: format!("Task {id} not found"),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            TaskError::Gateway { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TaskError::Validation(_))
    }
}
