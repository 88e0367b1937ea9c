use anyhow::{Result, bail};
use clap::Subcommand;
use std::collections::HashMap;
use tronika_core::{
    ActivityAction, ActivityEntry, DeadlineStatus, NewTask, Priority, Task, TaskBoard, TaskPatch,
    classify_task, format_local, parse_deadline,
};

use crate::context::Ctx;

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Add a task
    Add {
        title: String,

        /// Deadline: RFC 3339, "YYYY-MM-DD HH:MM" (local), or "YYYY-MM-DD" (23:59 local)
        #[arg(long)]
        deadline: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Course id
        #[arg(long)]
        course: Option<String>,

        /// Submission link (http/https)
        #[arg(long)]
        link: Option<String>,

        /// low | medium | high
        #[arg(long)]
        priority: Option<Priority>,

        /// Owning user; picks the reminder recipient
        #[arg(long)]
        owner: Option<String>,
    },

    /// List tasks with their deadline status
    List {
        /// Only tasks of this course id
        #[arg(long)]
        course: Option<String>,

        /// Only tasks in this status (urgent, near, approaching, far, overdue, completed)
        #[arg(long)]
        status: Option<DeadlineStatus>,
    },

    /// Show one task in full
    Show { id: String },

    /// Mark a task completed
    Done { id: String },

    /// Mark a task not completed
    Undo { id: String },

    /// Flip a task's completion
    Toggle { id: String },

    /// Change fields of a task
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        deadline: Option<String>,

        #[arg(long, conflicts_with = "no_course")]
        course: Option<String>,

        /// Unlink the task from its course
        #[arg(long)]
        no_course: bool,

        #[arg(long, conflicts_with = "no_link")]
        link: Option<String>,

        #[arg(long)]
        no_link: bool,

        #[arg(long)]
        priority: Option<Priority>,

        #[arg(long)]
        owner: Option<String>,
    },

    /// Delete a task
    Remove { id: String },
}

pub fn run(ctx: &Ctx, cmd: TaskCommand) -> Result<()> {
    match cmd {
        TaskCommand::Add {
            title,
            deadline,
            description,
            course,
            link,
            priority,
            owner,
        } => {
            let new = NewTask {
                title,
                description,
                deadline: parse_deadline(&deadline, &ctx.config.general.timezone)?,
                submission_link: link,
                course_id: course,
                priority,
                owner,
            };
            add(ctx, new)
        }
        TaskCommand::List { course, status } => list(ctx, course.as_deref(), status),
        TaskCommand::Show { id } => show(ctx, &id),
        TaskCommand::Done { id } => set_completed(ctx, &id, Some(true)),
        TaskCommand::Undo { id } => set_completed(ctx, &id, Some(false)),
        TaskCommand::Toggle { id } => set_completed(ctx, &id, None),
        TaskCommand::Edit {
            id,
            title,
            description,
            deadline,
            course,
            no_course,
            link,
            no_link,
            priority,
            owner,
        } => {
            let deadline = deadline
                .map(|d| parse_deadline(&d, &ctx.config.general.timezone))
                .transpose()?;
            let patch = TaskPatch {
                title,
                description,
                deadline,
                submission_link: if no_link { Some(None) } else { link.map(Some) },
                course_id: if no_course { Some(None) } else { course.map(Some) },
                priority: priority.map(Some),
                owner: owner.map(Some),
            };
            edit(ctx, &id, patch)
        }
        TaskCommand::Remove { id } => remove(ctx, &id),
    }
}

/// Accept a full id or any unique prefix of one.
pub fn resolve_task_id(board: &TaskBoard, needle: &str) -> Result<String> {
    let needle = needle.trim();
    if needle.is_empty() {
        bail!("task id must not be empty");
    }
    if let Some(t) = board.task(needle) {
        return Ok(t.id.clone());
    }
    let matches: Vec<&Task> = board
        .tasks()
        .iter()
        .filter(|t| t.id.starts_with(needle))
        .collect();
    match matches.as_slice() {
        [one] => Ok(one.id.clone()),
        [] => bail!("no task matches '{needle}'"),
        many => bail!("'{needle}' matches {} tasks; use a longer id", many.len()),
    }
}

pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn add(ctx: &Ctx, new: NewTask) -> Result<()> {
    let now = ctx.now();
    let mut board = ctx.load_board()?;
    let task = board.add_task(new, now)?.clone();
    ctx.commit(
        &board,
        &[ActivityEntry::for_task(ActivityAction::Created, &task, now)],
    )?;

    let res = classify_task(&task, now);
    println!(
        "Added {} '{}' due {} [{}]",
        short_id(&task.id),
        task.title,
        format_local(task.deadline, ctx.tz),
        res.status
    );
    Ok(())
}

fn list(ctx: &Ctx, course: Option<&str>, status: Option<DeadlineStatus>) -> Result<()> {
    let now = ctx.now();
    let board = ctx.load_board()?;
    if let Some(cid) = course {
        if board.course(cid).is_none() {
            bail!("no course with id '{cid}'");
        }
    }

    let mut shown = 0usize;
    for t in board.tasks_for_course(course) {
        let res = classify_task(t, now);
        if status.is_some_and(|s| s != res.status) {
            continue;
        }
        let course_name = t
            .course_id
            .as_deref()
            .and_then(|cid| board.course(cid))
            .map(|c| c.name.as_str())
            .unwrap_or("-");
        println!(
            "[{:<11}] {} | {} | {} | due {} ({})",
            res.status,
            short_id(&t.id),
            t.title,
            course_name,
            format_local(t.deadline, ctx.tz),
            due_phrase(res.status, res.days_until_deadline)
        );
        shown += 1;
    }

    if shown == 0 {
        println!("{}", empty_list_message(status, course.is_some()));
    }
    Ok(())
}

fn empty_list_message(status: Option<DeadlineStatus>, for_course: bool) -> String {
    match (status, for_course) {
        (Some(s), true) => format!("No {} tasks for this course.", s.as_str()),
        (Some(s), false) => format!("No {} tasks.", s.as_str()),
        (None, true) => "No tasks for this course yet. Add one: tronika task add".to_string(),
        (None, false) => "No tasks yet. Add one: tronika task add".to_string(),
    }
}

fn due_phrase(status: DeadlineStatus, days: i64) -> String {
    match status {
        DeadlineStatus::Completed => "done".to_string(),
        DeadlineStatus::Overdue => "overdue".to_string(),
        _ if days <= 0 => "due now".to_string(),
        _ if days == 1 => "within 1 day".to_string(),
        _ => format!("in {days} days"),
    }
}

fn show(ctx: &Ctx, needle: &str) -> Result<()> {
    let board = ctx.load_board()?;
    let id = resolve_task_id(&board, needle)?;
    let Some(t) = board.task(&id) else {
        bail!("no task matches '{needle}'");
    };
    let res = classify_task(t, ctx.now());

    println!("{}", t.title);
    println!("  id:         {}", t.id);
    println!("  status:     {} ({})", res.status, res.status.label());
    println!(
        "  deadline:   {} ({})",
        format_local(t.deadline, ctx.tz),
        due_phrase(res.status, res.days_until_deadline)
    );
    if let Some(c) = t.course_id.as_deref().and_then(|cid| board.course(cid)) {
        println!("  course:     {}", c.name);
    }
    if let Some(p) = t.priority {
        println!("  priority:   {p}");
    }
    if let Some(link) = &t.submission_link {
        println!("  submit at:  {link}");
    }
    if let Some(owner) = &t.owner {
        println!("  owner:      {owner}");
    }
    println!("  reminder:   {}", if res.is_reminder_eligible { "yes" } else { "no" });
    if !t.description.is_empty() {
        println!("\n{}", t.description);
    }
    Ok(())
}

fn set_completed(ctx: &Ctx, needle: &str, completed: Option<bool>) -> Result<()> {
    let now = ctx.now();
    let mut board = ctx.load_board()?;
    let id = resolve_task_id(&board, needle)?;

    let changed = match completed {
        Some(c) => board.set_completed(&id, c, now)?,
        None => {
            board.toggle_complete(&id, now)?;
            true
        }
    };

    let Some(task) = board.task(&id).cloned() else {
        bail!("no task matches '{needle}'");
    };
    if !changed {
        println!(
            "'{}' is already {}",
            task.title,
            if task.completed { "completed" } else { "open" }
        );
        return Ok(());
    }

    ctx.commit(&board, &[ActivityEntry::completion(&task, now)])?;
    println!(
        "'{}' marked {}",
        task.title,
        if task.completed { "completed" } else { "open" }
    );
    Ok(())
}

fn edit(ctx: &Ctx, needle: &str, patch: TaskPatch) -> Result<()> {
    if patch.is_empty() {
        bail!("nothing to change; pass at least one field flag");
    }
    let now = ctx.now();
    let mut board = ctx.load_board()?;
    let id = resolve_task_id(&board, needle)?;
    let task = board.update_task(&id, patch, now)?.clone();

    ctx.commit(
        &board,
        &[ActivityEntry::for_task(ActivityAction::Updated, &task, now)],
    )?;
    println!("Updated '{}'", task.title);
    Ok(())
}

fn remove(ctx: &Ctx, needle: &str) -> Result<()> {
    let now = ctx.now();
    let mut board = ctx.load_board()?;
    let id = resolve_task_id(&board, needle)?;
    let task = board.remove_task(&id)?;

    ctx.commit(
        &board,
        &[ActivityEntry::for_task(ActivityAction::Deleted, &task, now)],
    )?;
    println!("Removed '{}'", task.title);
    Ok(())
}

/// Counts per status category plus how many tasks a sweep would remind.
pub fn status(ctx: &Ctx) -> Result<()> {
    let now = ctx.now();
    let board = ctx.load_board()?;

    let mut counts: HashMap<DeadlineStatus, usize> = HashMap::new();
    let mut remindable = 0usize;
    for t in board.tasks() {
        let res = classify_task(t, now);
        *counts.entry(res.status).or_default() += 1;
        if res.is_reminder_eligible {
            remindable += 1;
        }
    }

    println!("{} tasks as of {}\n", board.tasks().len(), format_local(now, ctx.tz));
    for s in DeadlineStatus::ALL {
        let n = counts.get(&s).copied().unwrap_or(0);
        println!("  {:<12} {:>3}  {}", s.as_str(), n, s.label());
    }
    println!("\nReminder-eligible: {remindable}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn board_with(ids: &[&str]) -> TaskBoard {
        let at = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let tasks = ids.iter().map(|id| Task::new(*id, "t", at)).collect();
        TaskBoard::from_parts(tasks, vec![])
    }

    #[test]
    fn resolves_exact_and_prefix_ids() {
        let b = board_with(&["abc123", "abd999", "abc"]);
        assert_eq!(resolve_task_id(&b, "abc").unwrap(), "abc");
        assert_eq!(resolve_task_id(&b, "abd").unwrap(), "abd999");
        assert!(resolve_task_id(&b, "ab").is_err());
        assert!(resolve_task_id(&b, "zzz").is_err());
    }

    #[test]
    fn blank_id_never_matches() {
        let b = board_with(&["only-task"]);
        assert!(resolve_task_id(&b, "").is_err());
        assert!(resolve_task_id(&b, "   ").is_err());
        assert_eq!(resolve_task_id(&b, " only ").unwrap(), "only-task");
    }

    #[test]
    fn empty_list_names_the_status_filter() {
        assert_eq!(
            empty_list_message(Some(DeadlineStatus::Far), false),
            "No far tasks."
        );
        assert_eq!(
            empty_list_message(Some(DeadlineStatus::Overdue), true),
            "No overdue tasks for this course."
        );
        assert!(empty_list_message(None, false).starts_with("No tasks yet."));
    }

    #[test]
    fn due_phrases() {
        assert_eq!(due_phrase(DeadlineStatus::Urgent, 0), "due now");
        assert_eq!(due_phrase(DeadlineStatus::Urgent, 1), "within 1 day");
        assert_eq!(due_phrase(DeadlineStatus::Near, 3), "in 3 days");
        assert_eq!(due_phrase(DeadlineStatus::Overdue, -4), "overdue");
        assert_eq!(due_phrase(DeadlineStatus::Completed, 9), "done");
    }
}
