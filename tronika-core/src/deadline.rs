//! Deadline engine: status classification + reminder eligibility.
//!
//! Pure and stateless. Every call takes `now` explicitly; nothing in here
//! reads the system clock, so identical arguments always give identical
//! results and any number of threads may call it at once.
//!
//! Day arithmetic:
//! - `days_until_deadline = ceil((deadline - now) / 1 day)`, computed on
//!   milliseconds. A deadline 30 minutes away is 1 day out; 30 minutes ago
//!   is 0 days out.
//! - Overdue is decided on the instant (`now > deadline`), not on the day
//!   count.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{Error, Result};
use crate::task::Task;

pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// `days <= URGENT_MAX_DAYS` is urgent.
pub const URGENT_MAX_DAYS: i64 = 1;
/// `days <= NEAR_MAX_DAYS` is near.
pub const NEAR_MAX_DAYS: i64 = 3;
/// `days <= APPROACHING_MAX_DAYS` is approaching; anything beyond is far.
pub const APPROACHING_MAX_DAYS: i64 = 7;
/// Reminders go out for `0 < days <= REMINDER_WINDOW_MAX_DAYS`.
pub const REMINDER_WINDOW_MAX_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeadlineStatus {
    Completed,
    Far,
    Approaching,
    Near,
    Urgent,
    Overdue,
}

impl DeadlineStatus {
    pub const ALL: [DeadlineStatus; 6] = [
        DeadlineStatus::Urgent,
        DeadlineStatus::Near,
        DeadlineStatus::Approaching,
        DeadlineStatus::Far,
        DeadlineStatus::Overdue,
        DeadlineStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeadlineStatus::Completed => "completed",
            DeadlineStatus::Far => "far",
            DeadlineStatus::Approaching => "approaching",
            DeadlineStatus::Near => "near",
            DeadlineStatus::Urgent => "urgent",
            DeadlineStatus::Overdue => "overdue",
        }
    }

    /// Short human label for list views.
    pub fn label(&self) -> &'static str {
        match self {
            DeadlineStatus::Completed => "Completed",
            DeadlineStatus::Far => "Plenty of time",
            DeadlineStatus::Approaching => "Due this week",
            DeadlineStatus::Near => "Due in a few days",
            DeadlineStatus::Urgent => "Due within a day",
            DeadlineStatus::Overdue => "Overdue",
        }
    }
}

impl fmt::Display for DeadlineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for DeadlineStatus {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        DeadlineStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| Error::invalid(format!("unknown status '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub status: DeadlineStatus,
    pub days_until_deadline: i64,
    pub is_reminder_eligible: bool,
}

/// Ceiling-rounded whole days from `now` to `deadline` (negative once past).
pub fn days_until_deadline(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = (deadline - now).num_milliseconds();
    // Integer division truncates toward zero, which is already the ceiling
    // for negative values.
    let q = ms / MILLIS_PER_DAY;
    if ms % MILLIS_PER_DAY > 0 { q + 1 } else { q }
}

/// Standalone reminder predicate. Independent of the status thresholds so
/// batch sweeps can use it without a full classification.
pub fn is_reminder_eligible(days_until_deadline: i64, completed: bool) -> bool {
    !completed && days_until_deadline > 0 && days_until_deadline <= REMINDER_WINDOW_MAX_DAYS
}

fn status_for_days(days: i64) -> DeadlineStatus {
    match days {
        d if d <= URGENT_MAX_DAYS => DeadlineStatus::Urgent,
        d if d <= NEAR_MAX_DAYS => DeadlineStatus::Near,
        d if d <= APPROACHING_MAX_DAYS => DeadlineStatus::Approaching,
        _ => DeadlineStatus::Far,
    }
}

/// Classify a deadline relative to `now`.
///
/// Completion wins over everything, then a passed deadline is overdue, then
/// the day count picks a bucket.
pub fn classify(deadline: DateTime<Utc>, completed: bool, now: DateTime<Utc>) -> EvaluationResult {
    let days = days_until_deadline(deadline, now);

    if completed {
        return EvaluationResult {
            status: DeadlineStatus::Completed,
            days_until_deadline: days,
            is_reminder_eligible: false,
        };
    }

    if now > deadline {
        return EvaluationResult {
            status: DeadlineStatus::Overdue,
            days_until_deadline: days,
            is_reminder_eligible: false,
        };
    }

    EvaluationResult {
        status: status_for_days(days),
        days_until_deadline: days,
        is_reminder_eligible: is_reminder_eligible(days, completed),
    }
}

/// Checked variant for callers whose deadline may be absent (e.g. a record
/// that failed to parse upstream).
pub fn try_classify(
    deadline: Option<DateTime<Utc>>,
    completed: bool,
    now: DateTime<Utc>,
) -> Result<EvaluationResult> {
    let deadline = deadline.ok_or_else(|| Error::invalid("deadline is missing"))?;
    Ok(classify(deadline, completed, now))
}

pub fn classify_task(task: &Task, now: DateTime<Utc>) -> EvaluationResult {
    classify(task.deadline, task.completed, now)
}

/// The minimal record shape the engine needs.
pub trait DeadlineRecord {
    fn id(&self) -> &str;
    fn deadline(&self) -> DateTime<Utc>;
    fn completed(&self) -> bool;
}

impl DeadlineRecord for Task {
    fn id(&self) -> &str {
        &self.id
    }

    fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    fn completed(&self) -> bool {
        self.completed
    }
}

/// Bare `(id, deadline, completed)` record for callers that don't hold a
/// full [`Task`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineEntry {
    pub id: String,
    pub deadline: DateTime<Utc>,
    pub completed: bool,
}

impl DeadlineEntry {
    pub fn new(id: impl Into<String>, deadline: DateTime<Utc>, completed: bool) -> Self {
        Self {
            id: id.into(),
            deadline,
            completed,
        }
    }
}

impl DeadlineRecord for DeadlineEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    fn completed(&self) -> bool {
        self.completed
    }
}

impl<T: DeadlineRecord + ?Sized> DeadlineRecord for &T {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn deadline(&self) -> DateTime<Utc> {
        (**self).deadline()
    }

    fn completed(&self) -> bool {
        (**self).completed()
    }
}

/// Ids of every reminder-eligible record, in input order.
pub fn select_reminder_candidates<I, R>(tasks: I, now: DateTime<Utc>) -> Vec<String>
where
    I: IntoIterator<Item = R>,
    R: DeadlineRecord,
{
    let mut out = Vec::new();
    for t in tasks {
        let res = classify(t.deadline(), t.completed(), now);
        if res.is_reminder_eligible {
            debug!(
                task_id = t.id(),
                days = res.days_until_deadline,
                status = %res.status,
                "reminder candidate"
            );
            out.push(t.id().to_string());
        }
    }
    out
}
