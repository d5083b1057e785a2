//! Lifecycle transitions for a single task. These mutate a task record in
//! place; the store is responsible for persisting the result before
//! committing it (see `store`).

use chrono::{DateTime, Duration, Local, NaiveDate};

use crate::model::{Bucket, Status, Task};

/// Flip open ↔ done. Open → done stamps `completed_at`; done → open clears
/// it and returns the task to scheduling with its bucket unchanged.
pub fn toggle_done(task: &mut Task, now: DateTime<Local>) {
    match task.status {
        Status::Open => {
            task.status = Status::Done;
            task.completed_at = Some(now);
        }
        Status::Done => {
            task.status = Status::Open;
            task.completed_at = None;
        }
    }
}

/// Push the one-shot reminder forward by `minutes`. Status and bucket are
/// untouched.
pub fn snooze_reminder(task: &mut Task, minutes: i64, now: DateTime<Local>) {
    task.remind_at = Some(now + Duration::minutes(minutes));
}

/// Arm the one-shot reminder to fire `minutes` from now.
pub fn set_reminder(task: &mut Task, minutes: i64, now: DateTime<Local>) {
    task.remind_at = Some(now + Duration::minutes(minutes));
}

pub fn clear_reminder(task: &mut Task) {
    task.remind_at = None;
}

/// Bring a task back onto today's plate: bucket → today, date → today.
/// This is the one legal date rewrite — it's an explicit user action on a
/// missed or backlogged task, not the sweep.
pub fn reschedule_today(task: &mut Task, today: NaiveDate) {
    task.bucket = Bucket::Today;
    task.scheduled_date = today;
}

/// Park a task in the backlog without touching its date.
pub fn move_to_backlog(task: &mut Task) {
    task.bucket = Bucket::Backlog;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;
    use chrono::TimeZone;

    fn sample_task(bucket: Bucket) -> Task {
        Task {
            id: "T-0001".into(),
            title: "Call Tom".into(),
            client_id: None,
            status: Status::Open,
            bucket,
            priority: Priority::Normal,
            scheduled_date: NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
            scheduled_time: None,
            remind_at: None,
            completed_at: None,
            sort_order: 1,
        }
    }

    fn at_noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 9, 12, 0, 0).unwrap()
    }

    #[test]
    fn toggle_open_to_done_stamps_completed_at() {
        let mut task = sample_task(Bucket::Today);
        toggle_done(&mut task, at_noon());
        assert_eq!(task.status, Status::Done);
        assert_eq!(task.completed_at, Some(at_noon()));
    }

    #[test]
    fn toggle_back_to_open_restores_bucket_and_clears_completed_at() {
        let mut task = sample_task(Bucket::Carryover);
        toggle_done(&mut task, at_noon());
        assert_eq!(task.bucket, Bucket::Carryover);

        toggle_done(&mut task, at_noon() + Duration::hours(1));
        assert_eq!(task.status, Status::Open);
        assert_eq!(task.completed_at, None);
        assert_eq!(task.bucket, Bucket::Carryover);
    }

    #[test]
    fn snooze_moves_reminder_forward_only() {
        let mut task = sample_task(Bucket::Today);
        task.remind_at = Some(at_noon() - Duration::minutes(1));
        snooze_reminder(&mut task, 10, at_noon());
        assert_eq!(task.remind_at, Some(at_noon() + Duration::minutes(10)));
        assert_eq!(task.status, Status::Open);
        assert_eq!(task.bucket, Bucket::Today);
    }

    #[test]
    fn reschedule_today_rewrites_bucket_and_date() {
        let mut task = sample_task(Bucket::Carryover);
        let new_day = NaiveDate::from_ymd_opt(2026, 3, 11).unwrap();
        reschedule_today(&mut task, new_day);
        assert_eq!(task.bucket, Bucket::Today);
        assert_eq!(task.scheduled_date, new_day);
    }

    #[test]
    fn move_to_backlog_keeps_date() {
        let mut task = sample_task(Bucket::Today);
        let original_date = task.scheduled_date;
        move_to_backlog(&mut task);
        assert_eq!(task.bucket, Bucket::Backlog);
        assert_eq!(task.scheduled_date, original_date);
    }
}
