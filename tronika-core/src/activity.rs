//! Activity entries: an audit trail of board mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Created,
    Updated,
    Completed,
    Reopened,
    Deleted,
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActivityAction::Created => "created",
            ActivityAction::Updated => "updated",
            ActivityAction::Completed => "completed",
            ActivityAction::Reopened => "reopened",
            ActivityAction::Deleted => "deleted",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub action: ActivityAction,
    pub task_id: String,
    pub details: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl ActivityEntry {
    pub fn new(
        action: ActivityAction,
        task_id: impl Into<String>,
        details: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            action,
            task_id: task_id.into(),
            details: details.into(),
            timestamp,
            user: None,
        }
    }

    /// Entry describing `task`, titled after it. The task owner becomes the
    /// acting user.
    pub fn for_task(action: ActivityAction, task: &Task, timestamp: DateTime<Utc>) -> Self {
        Self {
            action,
            task_id: task.id.clone(),
            details: task.title.clone(),
            timestamp,
            user: task.owner.clone(),
        }
    }

    /// `Completed` or `Reopened` depending on the new completion state.
    pub fn completion(task: &Task, timestamp: DateTime<Utc>) -> Self {
        let action = if task.completed {
            ActivityAction::Completed
        } else {
            ActivityAction::Reopened
        };
        Self::for_task(action, task, timestamp)
    }
}
