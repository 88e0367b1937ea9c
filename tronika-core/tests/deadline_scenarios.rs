use chrono::{DateTime, Duration, TimeZone, Utc};
use tronika_core::{
    DeadlineEntry, DeadlineStatus, NewTask, TaskBoard, classify, is_reminder_eligible,
    plan_reminders, select_reminder_candidates,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

#[test]
fn half_day_out_is_urgent_and_remindable() {
    let res = classify(at(2024, 1, 10, 12), false, now());
    assert_eq!(res.days_until_deadline, 1);
    assert_eq!(res.status, DeadlineStatus::Urgent);
    assert!(res.is_reminder_eligible);
}

#[test]
fn two_days_out_is_near_and_remindable() {
    let res = classify(at(2024, 1, 12, 0), false, now());
    assert_eq!(res.days_until_deadline, 2);
    assert_eq!(res.status, DeadlineStatus::Near);
    assert!(res.is_reminder_eligible);
}

#[test]
fn ten_days_out_is_far() {
    let res = classify(at(2024, 1, 20, 0), false, now());
    assert_eq!(res.days_until_deadline, 10);
    assert_eq!(res.status, DeadlineStatus::Far);
    assert!(!res.is_reminder_eligible);
}

#[test]
fn passed_deadline_is_overdue() {
    let res = classify(at(2024, 1, 5, 0), false, now());
    assert_eq!(res.status, DeadlineStatus::Overdue);
    assert!(!res.is_reminder_eligible);
}

#[test]
fn completed_late_task_is_completed() {
    let res = classify(at(2024, 1, 5, 0), true, now());
    assert_eq!(res.status, DeadlineStatus::Completed);
    assert!(!res.is_reminder_eligible);
}

#[test]
fn batch_selects_urgent_and_near_in_input_order() {
    let tasks = vec![
        DeadlineEntry::new("A", at(2024, 1, 20, 0), false),
        DeadlineEntry::new("B", at(2024, 1, 10, 12), false),
        DeadlineEntry::new("C", at(2024, 1, 5, 0), false),
        DeadlineEntry::new("D", at(2024, 1, 12, 0), false),
    ];
    assert_eq!(select_reminder_candidates(&tasks, now()), vec!["B", "D"]);
}

#[test]
fn batch_result_matches_per_task_classification() {
    let tasks: Vec<DeadlineEntry> = (-48..=240)
        .step_by(7)
        .enumerate()
        .map(|(i, h)| DeadlineEntry::new(format!("t{i}"), now() + Duration::hours(h), i % 5 == 0))
        .collect();

    let expected: Vec<String> = tasks
        .iter()
        .filter(|t| classify(t.deadline, t.completed, now()).is_reminder_eligible)
        .map(|t| t.id.clone())
        .collect();

    assert_eq!(select_reminder_candidates(tasks.iter(), now()), expected);
}

#[test]
fn status_is_monotone_in_deadline() {
    fn rank(s: DeadlineStatus) -> u8 {
        match s {
            DeadlineStatus::Urgent => 0,
            DeadlineStatus::Near => 1,
            DeadlineStatus::Approaching => 2,
            DeadlineStatus::Far => 3,
            other => panic!("unexpected {other} for a future deadline"),
        }
    }

    let mut prev_days = i64::MIN;
    let mut prev_rank = 0;
    for minutes in (0..=(12 * 24 * 60)).step_by(37) {
        let res = classify(now() + Duration::minutes(minutes), false, now());
        assert!(res.days_until_deadline >= prev_days);
        let r = rank(res.status);
        assert!(r >= prev_rank, "status went backwards at +{minutes}m");
        prev_days = res.days_until_deadline;
        prev_rank = r;
    }
}

#[test]
fn reminder_flag_matches_standalone_predicate() {
    for hours in (-96..=240).step_by(5) {
        for completed in [false, true] {
            let res = classify(now() + Duration::hours(hours), completed, now());
            assert_eq!(
                res.is_reminder_eligible,
                is_reminder_eligible(res.days_until_deadline, completed)
            );
            assert_eq!(
                res.is_reminder_eligible,
                !completed && res.days_until_deadline > 0 && res.days_until_deadline <= 3
            );
        }
    }
}

#[test]
fn classification_is_idempotent() {
    let d = now() + Duration::hours(77);
    assert_eq!(classify(d, false, now()), classify(d, false, now()));
}

#[test]
fn board_tasks_flow_into_reminder_plan() {
    let mut board = TaskBoard::with_default_courses();
    board
        .add_task(NewTask::new("Tugas besar", at(2024, 1, 20, 0)).with_course("2"), now())
        .unwrap();
    let quiz_id = board
        .add_task(NewTask::new("Kuis PLC", at(2024, 1, 11, 0)).with_course("9"), now())
        .unwrap()
        .id
        .clone();
    let report_id = board
        .add_task(NewTask::new("Laporan", at(2024, 1, 12, 0)), now())
        .unwrap()
        .id
        .clone();

    board.toggle_complete(&report_id, now()).unwrap();

    let notices = plan_reminders(board.tasks(), now());
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].task_id, quiz_id);
}
