//! Reminder surfacing: which task is due, and when to notify again.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Local};

use crate::model::Task;

/// How often the poll loop runs (plus once immediately on start).
pub const POLL_INTERVAL: StdDuration = StdDuration::from_secs(30);

/// How long past its due time a reminder is still surfaced. A poll that
/// lands late still catches it; anything older is considered stale.
pub const LATE_WINDOW_MINUTES: i64 = 2;

/// True when the task's reminder falls in the half-open window
/// `(now - 2min, now]`.
pub fn is_due(task: &Task, now: DateTime<Local>) -> bool {
    let Some(remind_at) = task.remind_at else {
        return false;
    };
    if !task.is_open() {
        return false;
    }
    let floor = now - Duration::minutes(LATE_WINDOW_MINUTES);
    remind_at > floor && remind_at <= now
}

/// The due task with the earliest reminder time, if any.
pub fn due_task<'a>(tasks: &[&'a Task], now: DateTime<Local>) -> Option<&'a Task> {
    tasks
        .iter()
        .copied()
        .filter(|t| is_due(t, now))
        .min_by_key(|t| t.remind_at)
}

/// Tracks which reminder is currently on screen so the same task is not
/// re-triggered poll after poll. At most one reminder is surfaced at a time.
#[derive(Debug, Default)]
pub struct ReminderScheduler {
    shown: Option<String>,
    /// Identity of the last surfaced firing: task id plus the remind_at it
    /// fired for. A snooze moves remind_at, so the snoozed firing counts as
    /// a fresh identity; a dismissed one does not.
    last_fired: Option<(String, DateTime<Local>)>,
}

impl ReminderScheduler {
    pub fn new() -> ReminderScheduler {
        ReminderScheduler::default()
    }

    /// Run one poll pass. Returns the id of a newly surfaced reminder, or
    /// None when nothing is due or that firing was already surfaced.
    pub fn poll(&mut self, tasks: &[&Task], now: DateTime<Local>) -> Option<String> {
        let due = due_task(tasks, now)?;
        let firing = (due.id.clone(), due.remind_at?);
        if self.last_fired.as_ref() == Some(&firing) {
            return None;
        }
        self.last_fired = Some(firing);
        self.shown = Some(due.id.clone());
        Some(due.id.clone())
    }

    /// The reminder currently on screen, if any.
    pub fn shown(&self) -> Option<&str> {
        self.shown.as_deref()
    }

    /// Dismiss clears display state only; the task itself keeps its
    /// `remind_at` and simply ages out of the window.
    pub fn dismiss(&mut self) {
        self.shown = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bucket, Priority, Status};
    use chrono::{NaiveDate, TimeZone};

    fn at_noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 9, 12, 0, 0).unwrap()
    }

    fn task_reminding_at(id: &str, remind_at: Option<DateTime<Local>>) -> Task {
        Task {
            id: id.into(),
            title: format!("task {}", id),
            client_id: None,
            status: Status::Open,
            bucket: Bucket::Today,
            priority: Priority::Normal,
            scheduled_date: NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
            scheduled_time: None,
            remind_at,
            completed_at: None,
            sort_order: 0,
        }
    }

    #[test]
    fn due_inside_the_late_window() {
        let now = at_noon();
        let fresh = task_reminding_at("T-0001", Some(now - Duration::seconds(90)));
        let stale = task_reminding_at("T-0002", Some(now - Duration::minutes(3)));
        let future = task_reminding_at("T-0003", Some(now + Duration::seconds(1)));

        assert!(is_due(&fresh, now));
        assert!(!is_due(&stale, now));
        assert!(!is_due(&future, now));
    }

    #[test]
    fn exactly_now_is_due_exactly_two_minutes_ago_is_not() {
        let now = at_noon();
        let boundary_now = task_reminding_at("T-0001", Some(now));
        let boundary_old = task_reminding_at("T-0002", Some(now - Duration::minutes(2)));

        assert!(is_due(&boundary_now, now));
        assert!(!is_due(&boundary_old, now));
    }

    #[test]
    fn done_tasks_never_fire() {
        let now = at_noon();
        let mut task = task_reminding_at("T-0001", Some(now));
        task.status = Status::Done;
        assert!(!is_due(&task, now));
    }

    #[test]
    fn earliest_due_reminder_wins() {
        let now = at_noon();
        let older = task_reminding_at("T-0001", Some(now - Duration::seconds(100)));
        let newer = task_reminding_at("T-0002", Some(now - Duration::seconds(10)));

        assert_eq!(due_task(&[&newer, &older], now).unwrap().id, "T-0001");
    }

    #[test]
    fn same_task_is_not_retriggered_across_polls() {
        let now = at_noon();
        let task = task_reminding_at("T-0001", Some(now - Duration::seconds(30)));
        let mut scheduler = ReminderScheduler::new();

        assert_eq!(scheduler.poll(&[&task], now), Some("T-0001".to_string()));
        assert_eq!(scheduler.poll(&[&task], now + Duration::seconds(30)), None);
        assert_eq!(scheduler.shown(), Some("T-0001"));
    }

    #[test]
    fn a_different_due_task_replaces_the_shown_one() {
        let now = at_noon();
        let first = task_reminding_at("T-0001", Some(now - Duration::seconds(30)));
        let mut scheduler = ReminderScheduler::new();
        scheduler.poll(&[&first], now);

        let later = now + Duration::minutes(3);
        let second = task_reminding_at("T-0002", Some(later - Duration::seconds(5)));
        assert_eq!(
            scheduler.poll(&[&first, &second], later),
            Some("T-0002".to_string())
        );
    }

    #[test]
    fn dismiss_clears_display_state_without_touching_the_task() {
        let now = at_noon();
        let task = task_reminding_at("T-0001", Some(now));
        let mut scheduler = ReminderScheduler::new();
        scheduler.poll(&[&task], now);

        scheduler.dismiss();
        assert_eq!(scheduler.shown(), None);
        assert!(task.remind_at.is_some());

        // the dismissed firing does not come back on the next poll
        assert_eq!(scheduler.poll(&[&task], now + Duration::seconds(30)), None);
    }

    #[test]
    fn snoozed_reminder_fires_again_at_its_new_time() {
        let now = at_noon();
        let mut task = task_reminding_at("T-0001", Some(now));
        let mut scheduler = ReminderScheduler::new();
        assert!(scheduler.poll(&[&task], now).is_some());

        // snooze forward 10 minutes: same id, new firing identity
        task.remind_at = Some(now + Duration::minutes(10));
        assert_eq!(scheduler.poll(&[&task], now + Duration::minutes(5)), None);
        assert_eq!(
            scheduler.poll(&[&task], now + Duration::minutes(10)),
            Some("T-0001".to_string())
        );
    }
}
