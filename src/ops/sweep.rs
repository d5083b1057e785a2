//! Carryover sweep: stale today-tasks get reclassified, never re-dated.

use chrono::NaiveDate;

use crate::model::{Bucket, Task};

/// IDs of tasks the sweep should move to carryover: open, in the today
/// bucket, scheduled before `today`. Backlog and carryover tasks are never
/// touched, and no dates are rewritten, so a second pass with the same
/// `today` finds nothing — the sweep is idempotent.
pub fn carryover_candidates<'a, I>(tasks: I, today: NaiveDate) -> Vec<String>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .filter(|t| t.is_open() && t.bucket == Bucket::Today && t.scheduled_date < today)
        .map(|t| t.id.clone())
        .collect()
}
