use anyhow::{bail, Result};

use crate::error::TaskError;
use crate::model::{NewTask, TaskPatch, TaskStatus};
use crate::parser::parse_schedule_spec;

/// Reject titles that are empty once surrounding whitespace is removed.
pub fn validate_title(title: &str) -> Result<(), TaskError> {
    if title.trim().is_empty() {
        return Err(TaskError::empty_title());
    }
    Ok(())
}

/// Normalized input for capturing a task from any client surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureInput {
    pub text: Vec<String>,
    pub description: Option<String>,
    /// Human schedule spec, resolved through [`parse_schedule_spec`].
    pub scheduled: Option<String>,
}

impl CaptureInput {
    pub fn require_text(&self) -> Result<(), TaskError> {
        validate_title(&self.text.join(" "))
    }

    pub fn into_new_task(self) -> Result<NewTask> {
        self.require_text()?;
        let scheduled_at = match &self.scheduled {
            Some(spec) => Some(parse_schedule_spec(spec)?.to_wire()),
            None => None,
        };
        Ok(NewTask {
            title: self.text.join(" "),
            description: non_blank(self.description),
            scheduled_at,
        })
    }
}

/// Field edits collected from a client before they become a [`TaskPatch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub scheduled: Option<String>,
    /// Remove any existing schedule; cannot be combined with `scheduled`.
    pub unschedule: bool,
}

impl EditInput {
    pub fn into_patch(self) -> Result<TaskPatch> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        let scheduled_at = match (&self.scheduled, self.unschedule) {
            (Some(_), true) => bail!("Choose either a new schedule or unschedule, not both"),
            (Some(spec), false) => Some(Some(parse_schedule_spec(spec)?.to_wire())),
            (None, true) => Some(None),
            (None, false) => None,
        };
        Ok(TaskPatch {
            title: self.title,
            description: self.description,
            status: self.status,
            scheduled_at,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
