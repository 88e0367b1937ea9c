//! TaskBoard: the student's collection of tasks and courses.
//!
//! Pure in-memory state. Callers load it from a store, apply one operation,
//! and save it back; nothing here touches disk.
//!
//! Rules:
//! - task titles and course names are trimmed and must be non-empty
//! - descriptions are capped at [`MAX_DESCRIPTION_CHARS`]
//! - a task may only point at a course that exists
//! - removing a course unlinks its tasks instead of deleting them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::task::{Course, MAX_DESCRIPTION_CHARS, Priority, Task};

/// Input for [`TaskBoard::add_task`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub submission_link: Option<String>,
    pub course_id: Option<String>,
    pub priority: Option<Priority>,
    pub owner: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, deadline: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            deadline,
            submission_link: None,
            course_id: None,
            priority: None,
            owner: None,
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
}

/// Partial update. `None` leaves a field alone; for optional fields
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub submission_link: Option<Option<String>>,
    pub course_id: Option<Option<String>>,
    pub priority: Option<Option<Priority>>,
    pub owner: Option<Option<String>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskBoard {
    tasks: Vec<Task>,
    courses: Vec<Course>,
}

/// Course list a fresh board starts with.
pub fn default_courses() -> Vec<Course> {
    [
        "Sistem Hidraulika",
        "Statistika",
        "IMK",
        "Dinamika Teknik",
        "Pneumatik",
        "AOK",
        "PJOK",
        "Termodinamika",
        "PLC",
        "Pendidikan Pancasila",
    ]
    .iter()
    .enumerate()
    .map(|(i, name)| Course::new((i + 1).to_string(), *name))
    .collect()
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_courses() -> Self {
        Self {
            tasks: Vec::new(),
            courses: default_courses(),
        }
    }

    pub fn from_parts(tasks: Vec<Task>, courses: Vec<Course>) -> Self {
        Self { tasks, courses }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn course(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    /// Tasks linked to `course_id`, or every task when `None`.
    pub fn tasks_for_course(&self, course_id: Option<&str>) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| match course_id {
                Some(cid) => t.course_id.as_deref() == Some(cid),
                None => true,
            })
            .collect()
    }

    /// Courses ordered by name, ignoring case.
    pub fn sorted_courses(&self) -> Vec<&Course> {
        let mut out: Vec<&Course> = self.courses.iter().collect();
        out.sort_by_key(|c| c.name.to_lowercase());
        out
    }

    pub fn add_task(&mut self, new: NewTask, now: DateTime<Utc>) -> Result<&Task> {
        let title = clean_title(&new.title)?;
        let description = clean_description(&new.description)?;
        let submission_link = clean_link(new.submission_link)?;
        if let Some(cid) = new.course_id.as_deref() {
            self.require_course(cid)?;
        }

        let task = Task {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            deadline: new.deadline,
            completed: false,
            submission_link,
            course_id: new.course_id,
            priority: new.priority,
            owner: clean_optional(new.owner),
            created_at: now,
            last_modified: now,
        };
        self.tasks.push(task);
        let idx = self.tasks.len() - 1;
        Ok(&self.tasks[idx])
    }

    pub fn update_task(&mut self, id: &str, patch: TaskPatch, now: DateTime<Utc>) -> Result<&Task> {
        // Validate everything before touching the task so a bad patch is a no-op.
        let title = patch.title.as_deref().map(clean_title).transpose()?;
        let description = patch
            .description
            .as_deref()
            .map(clean_description)
            .transpose()?;
        let submission_link = patch.submission_link.map(clean_link).transpose()?;
        if let Some(Some(cid)) = patch.course_id.as_ref() {
            self.require_course(cid)?;
        }

        let task = self.task_mut(id)?;
        if let Some(t) = title {
            task.title = t;
        }
        if let Some(d) = description {
            task.description = d;
        }
        if let Some(deadline) = patch.deadline {
            task.deadline = deadline;
        }
        if let Some(link) = submission_link {
            task.submission_link = link;
        }
        if let Some(course_id) = patch.course_id {
            task.course_id = course_id;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(owner) = patch.owner {
            task.owner = clean_optional(owner);
        }
        task.last_modified = now;
        Ok(&*task)
    }

    /// Flip completion; returns the new state.
    pub fn toggle_complete(&mut self, id: &str, now: DateTime<Utc>) -> Result<bool> {
        let task = self.task_mut(id)?;
        task.completed = !task.completed;
        task.last_modified = now;
        Ok(task.completed)
    }

    /// Set completion explicitly; returns whether anything changed.
    pub fn set_completed(&mut self, id: &str, completed: bool, now: DateTime<Utc>) -> Result<bool> {
        let task = self.task_mut(id)?;
        if task.completed == completed {
            return Ok(false);
        }
        task.completed = completed;
        task.last_modified = now;
        Ok(true)
    }

    pub fn remove_task(&mut self, id: &str) -> Result<Task> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::task_not_found(id))?;
        Ok(self.tasks.remove(idx))
    }

    pub fn add_course(&mut self, name: &str, color: Option<String>) -> Result<&Course> {
        let name = clean_course_name(name)?;
        self.courses.push(Course {
            id: Uuid::new_v4().to_string(),
            name,
            color: clean_optional(color),
        });
        let idx = self.courses.len() - 1;
        Ok(&self.courses[idx])
    }

    pub fn rename_course(&mut self, id: &str, name: &str) -> Result<&Course> {
        let name = clean_course_name(name)?;
        let course = self
            .courses
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::course_not_found(id))?;
        course.name = name;
        Ok(&*course)
    }

    /// Remove a course and unlink its tasks. Returns the removed course and
    /// how many tasks were unlinked.
    pub fn remove_course(&mut self, id: &str, now: DateTime<Utc>) -> Result<(Course, usize)> {
        let idx = self
            .courses
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| Error::course_not_found(id))?;
        let course = self.courses.remove(idx);

        let mut unlinked = 0;
        for t in self.tasks.iter_mut() {
            if t.course_id.as_deref() == Some(id) {
                t.course_id = None;
                t.last_modified = now;
                unlinked += 1;
            }
        }
        Ok((course, unlinked))
    }

    fn task_mut(&mut self, id: &str) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::task_not_found(id))
    }

    fn require_course(&self, id: &str) -> Result<()> {
        self.course(id)
            .map(|_| ())
            .ok_or_else(|| Error::course_not_found(id))
    }
}

fn clean_title(title: &str) -> Result<String> {
    let t = title.trim();
    if t.is_empty() {
        return Err(Error::invalid("task title must not be empty"));
    }
    Ok(t.to_string())
}

fn clean_course_name(name: &str) -> Result<String> {
    let n = name.trim();
    if n.is_empty() {
        return Err(Error::invalid("course name must not be empty"));
    }
    Ok(n.to_string())
}

fn clean_description(description: &str) -> Result<String> {
    let d = description.trim();
    let len = d.chars().count();
    if len > MAX_DESCRIPTION_CHARS {
        return Err(Error::invalid(format!(
            "description is {len} characters (max {MAX_DESCRIPTION_CHARS})"
        )));
    }
    Ok(d.to_string())
}

fn clean_link(link: Option<String>) -> Result<Option<String>> {
    let Some(link) = clean_optional(link) else {
        return Ok(None);
    };
    if !(link.starts_with("https://") || link.starts_with("http://")) {
        return Err(Error::invalid(format!(
            "submission link must be an http(s) URL: {link}"
        )));
    }
    Ok(Some(link))
}

fn clean_optional(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
    }

    #[test]
    fn add_task_trims_and_stamps() {
        let mut b = TaskBoard::with_default_courses();
        let t = b
            .add_task(
                NewTask::new("  Laporan PLC  ", now() + Duration::days(2))
                    .with_course("9")
                    .with_description(" ladder diagram "),
                now(),
            )
            .unwrap();

        assert_eq!(t.title, "Laporan PLC");
        assert_eq!(t.description, "ladder diagram");
        assert!(!t.completed);
        assert_eq!(t.created_at, now());
        assert_eq!(t.course_id.as_deref(), Some("9"));
    }

    #[test]
    fn add_task_rejects_blank_title_and_unknown_course() {
        let mut b = TaskBoard::new();
        let err = b.add_task(NewTask::new("   ", now()), now()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = b
            .add_task(NewTask::new("Quiz", now()).with_course("nope"), now())
            .unwrap_err();
        assert_eq!(err, Error::course_not_found("nope"));
        assert!(b.tasks().is_empty());
    }

    #[test]
    fn description_cap_counts_chars() {
        let mut b = TaskBoard::new();
        let ok = "é".repeat(MAX_DESCRIPTION_CHARS);
        assert!(b.add_task(NewTask::new("a", now()).with_description(ok), now()).is_ok());

        let too_long = "x".repeat(MAX_DESCRIPTION_CHARS + 1);
        let err = b
            .add_task(NewTask::new("b", now()).with_description(too_long), now())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn submission_link_must_be_http() {
        let mut b = TaskBoard::new();
        let err = b
            .add_task(NewTask::new("a", now()).with_submission_link("ftp://x"), now())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let t = b
            .add_task(
                NewTask::new("a", now()).with_submission_link("https://elearning.example/ac"),
                now(),
            )
            .unwrap();
        assert!(t.submission_link.is_some());
    }

    #[test]
    fn bad_patch_leaves_task_untouched() {
        let mut b = TaskBoard::new();
        let id = b.add_task(NewTask::new("Quiz", now()), now()).unwrap().id.clone();

        let patch = TaskPatch {
            title: Some("Quiz 2".into()),
            course_id: Some(Some("missing".into())),
            ..TaskPatch::default()
        };
        assert!(b.update_task(&id, patch, now() + Duration::hours(1)).is_err());

        let t = b.task(&id).unwrap();
        assert_eq!(t.title, "Quiz");
        assert_eq!(t.last_modified, now());
    }

    #[test]
    fn patch_can_clear_optional_fields() {
        let mut b = TaskBoard::with_default_courses();
        let id = b
            .add_task(NewTask::new("Quiz", now()).with_course("2").with_priority(Priority::High), now())
            .unwrap()
            .id
            .clone();

        let later = now() + Duration::hours(3);
        let patch = TaskPatch {
            course_id: Some(None),
            priority: Some(None),
            deadline: Some(now() + Duration::days(4)),
            ..TaskPatch::default()
        };
        let t = b.update_task(&id, patch, later).unwrap();
        assert_eq!(t.course_id, None);
        assert_eq!(t.priority, None);
        assert_eq!(t.deadline, now() + Duration::days(4));
        assert_eq!(t.last_modified, later);
    }

    #[test]
    fn toggle_and_set_completed() {
        let mut b = TaskBoard::new();
        let id = b.add_task(NewTask::new("Quiz", now()), now()).unwrap().id.clone();

        assert!(b.toggle_complete(&id, now()).unwrap());
        assert!(!b.set_completed(&id, true, now()).unwrap());
        assert!(!b.toggle_complete(&id, now()).unwrap());
        assert!(b.set_completed(&id, true, now()).unwrap());

        assert_eq!(
            b.toggle_complete("missing", now()).unwrap_err(),
            Error::task_not_found("missing")
        );
    }

    #[test]
    fn removing_course_unlinks_tasks() {
        let mut b = TaskBoard::with_default_courses();
        b.add_task(NewTask::new("a", now()).with_course("3"), now()).unwrap();
        b.add_task(NewTask::new("b", now()).with_course("3"), now()).unwrap();
        b.add_task(NewTask::new("c", now()).with_course("4"), now()).unwrap();

        let (course, unlinked) = b.remove_course("3", now()).unwrap();
        assert_eq!(course.name, "IMK");
        assert_eq!(unlinked, 2);
        assert_eq!(b.tasks().len(), 3);
        assert!(b.tasks_for_course(Some("3")).is_empty());
        assert_eq!(b.tasks_for_course(Some("4")).len(), 1);
        assert_eq!(b.tasks_for_course(None).len(), 3);
    }

    #[test]
    fn courses_sort_case_insensitively() {
        let mut b = TaskBoard::new();
        b.add_course("statistika", None).unwrap();
        b.add_course("AOK", None).unwrap();
        b.add_course("Pneumatik", Some("teal".into())).unwrap();

        let names: Vec<&str> = b.sorted_courses().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["AOK", "Pneumatik", "statistika"]);
    }

    #[test]
    fn rename_course_validates() {
        let mut b = TaskBoard::with_default_courses();
        assert!(matches!(b.rename_course("1", " "), Err(Error::InvalidInput(_))));
        assert_eq!(b.rename_course("1", "Hidrolika").unwrap().name, "Hidrolika");
        assert!(b.rename_course("99", "x").is_err());
    }

    #[test]
    fn remove_task_returns_it() {
        let mut b = TaskBoard::new();
        let id = b.add_task(NewTask::new("Quiz", now()), now()).unwrap().id.clone();
        let t = b.remove_task(&id).unwrap();
        assert_eq!(t.title, "Quiz");
        assert!(b.remove_task(&id).is_err());
    }
}
