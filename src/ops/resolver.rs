//! Next-action resolution and the pure selectors the views read through.
//!
//! Everything here is a deterministic function of a task-set snapshot; no
//! derived state is cached anywhere.

use crate::model::{Bucket, Priority, Task};
use crate::parse::time::scheduled_minutes;

/// Sort key inside a precedence group: scheduled time ascending (untimed
/// tasks carry a sentinel and land last), then the manual order.
fn group_key(task: &Task) -> (u32, i64) {
    (
        scheduled_minutes(task.scheduled_time.as_deref()),
        task.sort_order,
    )
}

/// Pick the single highest-priority open task, or None if there is nothing
/// to do. Precedence: priority-now, then carryover, then today, then any
/// backlog task (first found, no time ordering). Invoked identically for
/// the global set and for a single client's tasks.
pub fn next_action<'a>(tasks: &[&'a Task]) -> Option<&'a Task> {
    let open: Vec<&Task> = tasks.iter().copied().filter(|t| t.is_open()).collect();

    let urgent = open.iter().copied().filter(|t| t.priority == Priority::Now);
    if let Some(best) = urgent.min_by_key(|t| group_key(t)) {
        return Some(best);
    }

    for bucket in [Bucket::Carryover, Bucket::Today] {
        let group = open.iter().copied().filter(|t| t.bucket == bucket);
        if let Some(best) = group.min_by_key(|t| group_key(t)) {
            return Some(best);
        }
    }

    open.into_iter().find(|t| t.bucket == Bucket::Backlog)
}

/// All open tasks, in store order.
pub fn open_tasks<'a, I>(tasks: I) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks.into_iter().filter(|t| t.is_open()).collect()
}

/// A single client's open tasks, in store order.
pub fn client_open_tasks<'a, I>(tasks: I, client_id: &str) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .filter(|t| t.is_open() && t.client_id.as_deref() == Some(client_id))
        .collect()
}

/// Open tasks in one bucket, ordered by time then manual order.
pub fn bucket_tasks<'a, I>(tasks: I, bucket: Bucket) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut group: Vec<&Task> = tasks
        .into_iter()
        .filter(|t| t.is_open() && t.bucket == bucket)
        .collect();
    group.sort_by_key(|t| group_key(t));
    group
}

/// Tasks that slipped: open and carried over from an earlier day.
pub fn missed_tasks<'a, I>(tasks: I) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    bucket_tasks(tasks, Bucket::Carryover)
}

/// Case-insensitive substring search over titles, open and done alike.
pub fn search_tasks<'a, I>(tasks: I, query: &str) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let needle = query.to_lowercase();
    tasks
        .into_iter()
        .filter(|t| t.title.to_lowercase().contains(&needle))
        .collect()
}
