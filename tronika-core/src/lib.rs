//! tronika-core: deadline engine, task board and reminder planning for TaskaTronika

pub mod activity;
pub mod board;
pub mod deadline;
pub mod error;
pub mod reminders;
pub mod task;
pub mod time;

pub use activity::{ActivityAction, ActivityEntry};
pub use board::{NewTask, TaskBoard, TaskPatch, default_courses};
pub use deadline::{
    APPROACHING_MAX_DAYS, DeadlineEntry, DeadlineRecord, DeadlineStatus, EvaluationResult,
    NEAR_MAX_DAYS, REMINDER_WINDOW_MAX_DAYS, URGENT_MAX_DAYS, classify, classify_task,
    days_until_deadline, is_reminder_eligible, select_reminder_candidates, try_classify,
};
pub use error::{Error, Result};
pub use reminders::{
    ReminderDispatcher, ReminderNotice, SweepReport, build_notice, dispatch_reminders,
    is_valid_destination, plan_reminders,
};
pub use task::{Course, MAX_DESCRIPTION_CHARS, Priority, Task};
pub use time::{format_local, parse_deadline, parse_local_deadline_to_utc, parse_tz};
