use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Open/closed state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Open,
    Done,
}

/// Scheduling bucket. Only consulted while a task is open; once done the
/// bucket is frozen at its last value (kept for history).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Today,
    Backlog,
    Carryover,
}

impl Bucket {
    /// Parse a bucket name as typed on the CLI
    pub fn from_arg(s: &str) -> Option<Bucket> {
        match s.to_ascii_lowercase().as_str() {
            "today" => Some(Bucket::Today),
            "backlog" => Some(Bucket::Backlog),
            "carryover" => Some(Bucket::Carryover),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Bucket::Today => "today",
            Bucket::Backlog => "backlog",
            Bucket::Carryover => "carryover",
        }
    }
}

/// Urgency derived once at creation from lexical cues; never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Now,
    Normal,
    Later,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::Now => "now",
            Priority::Normal => "normal",
            Priority::Later => "later",
        }
    }
}

/// A single tracked task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned ID like `T-0042`, immutable
    pub id: String,
    /// Display title, non-empty after quick-add stripping
    pub title: String,
    /// Owning client, or None for an unassigned task
    #[serde(default)]
    pub client_id: Option<String>,
    pub status: Status,
    pub bucket: Bucket,
    pub priority: Priority,
    /// Calendar date the task is scheduled for (no timezone handling)
    pub scheduled_date: NaiveDate,
    /// Normalized time-of-day like `4PM` or `11:30AM`; None means "no time"
    #[serde(default)]
    pub scheduled_time: Option<String>,
    /// One-shot reminder timestamp; cleared or snoozed forward, never recurring
    #[serde(default)]
    pub remind_at: Option<DateTime<Local>>,
    /// Set on the transition to done, cleared on undo
    #[serde(default)]
    pub completed_at: Option<DateTime<Local>>,
    /// Manual-ordering tie-break within a bucket
    #[serde(default)]
    pub sort_order: i64,
}

impl Task {
    pub fn is_open(&self) -> bool {
        self.status == Status::Open
    }
}
