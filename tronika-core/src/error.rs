//! Error kinds surfaced by the core.
//!
//! Everything here is pure computation, so there is nothing transient to
//! retry: an error always means the caller handed in something wrong.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A precondition on the input was violated (unparseable timestamp,
    /// missing deadline, empty title, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

impl Error {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub fn task_not_found(id: impl Into<String>) -> Self {
        Error::NotFound {
            kind: "task",
            id: id.into(),
        }
    }

    pub fn course_not_found(id: impl Into<String>) -> Self {
        Error::NotFound {
            kind: "course",
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
