//! Task and course model.
//!
//! A task belongs to at most one course. The deadline engine only reads
//! `id`, `deadline` and `completed`; the rest is carried for the board and
//! for building reminder text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Longest description a task may carry, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 2500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        };
        f.write_str(s)
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "med" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(Error::invalid(format!(
                "unknown priority '{other}' (expected low, medium or high)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Course {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,

    /// Hard deadline (UTC).
    pub deadline: DateTime<Utc>,

    #[serde(default)]
    pub completed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    /// Owning user identity. Only used to look up where reminders go.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl Task {
    /// A fresh, not-yet-completed task. Timestamps are stamped with `deadline`
    /// until the board overwrites them; tests rarely care.
    pub fn new(id: impl Into<String>, title: impl Into<String>, deadline: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            deadline,
            completed: false,
            submission_link: None,
            course_id: None,
            priority: None,
            owner: None,
            created_at: deadline,
            last_modified: deadline,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_course(mut self, course_id: impl Into<String>) -> Self {
        self.course_id = Some(course_id.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_submission_link(mut self, link: impl Into<String>) -> Self {
        self.submission_link = Some(link.into());
        self
    }

    pub fn mark_completed(mut self) -> Self {
        self.completed = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" med ".parse::<Priority>().unwrap(), Priority::Medium);
        assert!(matches!(
            "urgent".parse::<Priority>(),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn task_serializes_without_empty_optionals() {
        let deadline = Utc.with_ymd_and_hms(2024, 1, 12, 0, 0, 0).unwrap();
        let t = Task::new("t1", "Laporan praktikum", deadline).with_priority(Priority::High);
        let json = serde_json::to_value(&t).unwrap();

        assert_eq!(json["priority"], "high");
        assert_eq!(json["completed"], false);
        assert!(json.get("course_id").is_none());
        assert!(json.get("owner").is_none());
    }

    #[test]
    fn task_deserializes_with_missing_defaults() {
        let raw = r#"{
            "id": "t9",
            "title": "Quiz",
            "deadline": "2024-01-10T12:00:00Z",
            "created_at": "2024-01-01T00:00:00Z",
            "last_modified": "2024-01-01T00:00:00Z"
        }"#;
        let t: Task = serde_json::from_str(raw).unwrap();
        assert!(!t.completed);
        assert!(t.description.is_empty());
        assert_eq!(t.priority, None);
    }
}
