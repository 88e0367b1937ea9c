//! Reminder planning + dispatch primitives.
//!
//! Planning is pure: the engine picks candidates and we turn them into
//! notices. Delivery goes through a [`ReminderDispatcher`] the caller
//! supplies, so swapping email for a webhook never touches classification.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use crate::deadline::classify_task;
use crate::task::Task;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderNotice {
    pub task_id: String,
    pub owner: Option<String>,
    pub title: String,
    pub deadline: DateTime<Utc>,
    pub days_until_deadline: i64,
    pub subject: String,
    pub body: String,
    /// One send per task per UTC day.
    pub dedupe_key: String,
}

/// Delivery capability. Implementations own the transport.
pub trait ReminderDispatcher {
    fn send(&mut self, destination: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Dedupe keys of notices that went out.
    pub sent: Vec<String>,
    /// Task ids already reminded today.
    pub skipped_duplicate: Vec<String>,
    /// Task ids with no resolvable destination.
    pub skipped_no_destination: Vec<String>,
    /// (task id, error text) per failed send.
    pub failed: Vec<(String, String)>,
}

impl SweepReport {
    pub fn attempted(&self) -> usize {
        self.sent.len() + self.failed.len()
    }
}

pub fn dedupe_key(task_id: &str, now: DateTime<Utc>) -> String {
    format!("{}:{}", task_id, now.format("%Y-%m-%d"))
}

fn day_word(days: i64) -> &'static str {
    if days == 1 { "day" } else { "days" }
}

pub fn build_notice(task: &Task, days_until_deadline: i64, now: DateTime<Utc>) -> ReminderNotice {
    let subject = format!("Task deadline: {}", task.title);
    let body = format!(
        "{} is due in {} {} ({}).",
        task.title,
        days_until_deadline,
        day_word(days_until_deadline),
        task.deadline.to_rfc3339()
    );
    ReminderNotice {
        task_id: task.id.clone(),
        owner: task.owner.clone(),
        title: task.title.clone(),
        deadline: task.deadline,
        days_until_deadline,
        subject,
        body,
        dedupe_key: dedupe_key(&task.id, now),
    }
}

/// Notices for every reminder-eligible task, in board order.
///
/// Each notice is built from the record that was classified, so two records
/// sharing an id can never swap places.
pub fn plan_reminders(tasks: &[Task], now: DateTime<Utc>) -> Vec<ReminderNotice> {
    tasks
        .iter()
        .filter_map(|t| {
            let res = classify_task(t, now);
            res.is_reminder_eligible
                .then(|| build_notice(t, res.days_until_deadline, now))
        })
        .collect()
}

/// Hand each notice to `dispatcher`.
///
/// A failed send is recorded and the sweep moves on; it never aborts the
/// remaining notices. `on_sent` runs right after each successful send. If it
/// fails the notice is reported as failed and the sweep stops.
pub fn dispatch_reminders<D, F, S>(
    notices: &[ReminderNotice],
    resolve_destination: F,
    already_sent: &HashSet<String>,
    dispatcher: &mut D,
    mut on_sent: S,
) -> SweepReport
where
    D: ReminderDispatcher + ?Sized,
    F: Fn(&ReminderNotice) -> Option<String>,
    S: FnMut(&ReminderNotice) -> anyhow::Result<()>,
{
    let mut report = SweepReport::default();

    for n in notices {
        if already_sent.contains(&n.dedupe_key) {
            debug!(task_id = %n.task_id, "already reminded today");
            report.skipped_duplicate.push(n.task_id.clone());
            continue;
        }

        let Some(dest) = resolve_destination(n) else {
            warn!(task_id = %n.task_id, owner = ?n.owner, "no reminder destination");
            report.skipped_no_destination.push(n.task_id.clone());
            continue;
        };

        if let Err(e) = dispatcher.send(&dest, &n.subject, &n.body) {
            warn!(task_id = %n.task_id, destination = %dest, error = %e, "reminder send failed");
            report.failed.push((n.task_id.clone(), format!("{e:#}")));
            continue;
        }

        if let Err(e) = on_sent(n) {
            warn!(task_id = %n.task_id, error = %e, "reminder sent but not recorded, stopping");
            report
                .failed
                .push((n.task_id.clone(), format!("sent but not recorded: {e:#}")));
            break;
        }
        debug!(task_id = %n.task_id, destination = %dest, "reminder sent");
        report.sent.push(n.dedupe_key.clone());
    }

    info!(
        planned = notices.len(),
        sent = report.sent.len(),
        duplicate = report.skipped_duplicate.len(),
        no_destination = report.skipped_no_destination.len(),
        failed = report.failed.len(),
        "reminder sweep finished"
    );
    report
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern is valid")
    })
}

/// Whether `addr` looks like a deliverable email address.
pub fn is_valid_destination(addr: &str) -> bool {
    email_re().is_match(addr.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        sent: Vec<(String, String, String)>,
        fail_for: Option<String>,
    }

    impl ReminderDispatcher for Recorder {
        fn send(&mut self, destination: &str, subject: &str, body: &str) -> anyhow::Result<()> {
            if self.fail_for.as_deref() == Some(destination) {
                bail!("mailbox full");
            }
            self.sent
                .push((destination.to_string(), subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    fn board() -> Vec<Task> {
        vec![
            Task::new("far", "Tugas besar", now() + Duration::days(10)).with_owner("ani"),
            Task::new("urgent", "Kuis IMK", now() + Duration::hours(12)).with_owner("budi"),
            Task::new("late", "Laporan", now() - Duration::days(5)).with_owner("ani"),
            Task::new("near", "Presentasi PLC", now() + Duration::days(2)).with_owner("ani"),
            Task::new("done", "UTS", now() + Duration::days(1)).with_owner("ani").mark_completed(),
        ]
    }

    #[test]
    fn plans_only_eligible_tasks_in_order() {
        let notices = plan_reminders(&board(), now());
        let ids: Vec<&str> = notices.iter().map(|n| n.task_id.as_str()).collect();
        assert_eq!(ids, vec!["urgent", "near"]);

        assert_eq!(notices[0].days_until_deadline, 1);
        assert_eq!(notices[0].subject, "Task deadline: Kuis IMK");
        assert!(notices[0].body.starts_with("Kuis IMK is due in 1 day ("));
        assert!(notices[1].body.contains("in 2 days"));
        assert_eq!(notices[1].dedupe_key, "near:2024-01-10");
    }

    #[test]
    fn dispatch_resolves_destinations_and_dedupes() {
        let notices = plan_reminders(&board(), now());
        let mut already = HashSet::new();
        already.insert("urgent:2024-01-10".to_string());

        let mut rec = Recorder::default();
        let report = dispatch_reminders(
            &notices,
            |n| n.owner.as_ref().map(|o| format!("{o}@kampus.ac.id")),
            &already,
            &mut rec,
            |_| Ok(()),
        );

        assert_eq!(report.skipped_duplicate, vec!["urgent".to_string()]);
        assert_eq!(report.sent, vec!["near:2024-01-10".to_string()]);
        assert_eq!(rec.sent.len(), 1);
        assert_eq!(rec.sent[0].0, "ani@kampus.ac.id");
    }

    #[test]
    fn failed_send_does_not_abort_sweep() {
        let notices = plan_reminders(&board(), now());
        let mut rec = Recorder {
            fail_for: Some("budi@kampus.ac.id".to_string()),
            ..Recorder::default()
        };
        let report = dispatch_reminders(
            &notices,
            |n| n.owner.as_ref().map(|o| format!("{o}@kampus.ac.id")),
            &HashSet::new(),
            &mut rec,
            |_| Ok(()),
        );

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "urgent");
        assert!(report.failed[0].1.contains("mailbox full"));
        assert_eq!(report.sent.len(), 1);
        assert_eq!(report.attempted(), 2);
    }

    #[test]
    fn missing_destination_is_skipped() {
        let notices = plan_reminders(&board(), now());
        let mut rec = Recorder::default();
        let report = dispatch_reminders(&notices, |_| None, &HashSet::new(), &mut rec, |_| Ok(()));
        assert_eq!(report.skipped_no_destination.len(), 2);
        assert!(rec.sent.is_empty());
    }

    #[test]
    fn shared_id_does_not_leak_ineligible_record() {
        let tasks = vec![
            Task::new("dup", "Kuis", now() + Duration::hours(12)),
            Task::new("dup", "Tugas besar", now() + Duration::days(10)),
        ];
        let notices = plan_reminders(&tasks, now());
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "Kuis");
        assert_eq!(notices[0].days_until_deadline, 1);
    }

    #[test]
    fn each_send_is_recorded_before_the_next() {
        let notices = plan_reminders(&board(), now());
        let mut rec = Recorder::default();
        let mut recorded = Vec::new();
        let report = dispatch_reminders(
            &notices,
            |n| n.owner.as_ref().map(|o| format!("{o}@kampus.ac.id")),
            &HashSet::new(),
            &mut rec,
            |n| {
                recorded.push(n.dedupe_key.clone());
                Ok(())
            },
        );
        assert_eq!(recorded, report.sent);
        assert_eq!(recorded.len(), 2);
    }

    #[test]
    fn unrecordable_send_stops_the_sweep() {
        let notices = plan_reminders(&board(), now());
        let mut rec = Recorder::default();
        let report = dispatch_reminders(
            &notices,
            |n| n.owner.as_ref().map(|o| format!("{o}@kampus.ac.id")),
            &HashSet::new(),
            &mut rec,
            |_| bail!("disk full"),
        );
        assert_eq!(rec.sent.len(), 1);
        assert!(report.sent.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].1.contains("not recorded"));
    }

    #[test]
    fn destination_validation() {
        assert!(is_valid_destination("student@example.com"));
        assert!(is_valid_destination(" a.b+c@mail.kampus.ac.id "));
        assert!(!is_valid_destination("student@localhost"));
        assert!(!is_valid_destination("not-an-email"));
        assert!(!is_valid_destination(""));
    }
}
