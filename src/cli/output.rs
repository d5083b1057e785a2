use serde::Serialize;

use crate::model::{Bucket, Client, Priority, Status, Task};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub title: String,
    pub status: Status,
    pub bucket: Bucket,
    pub priority: Priority,
    pub scheduled_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remind_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl TaskJson {
    pub fn from_task(task: &Task, client_name: Option<&str>) -> TaskJson {
        TaskJson {
            id: task.id.clone(),
            title: task.title.clone(),
            status: task.status,
            bucket: task.bucket,
            priority: task.priority,
            scheduled_date: task.scheduled_date.to_string(),
            scheduled_time: task.scheduled_time.clone(),
            client: client_name.map(str::to_string),
            remind_at: task.remind_at.map(|t| t.to_rfc3339()),
            completed_at: task.completed_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Serialize)]
pub struct TaskListJson {
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct NextActionJson {
    pub next: Option<TaskJson>,
}

#[derive(Serialize)]
pub struct ClientJson {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub emoji: String,
    pub open_tasks: usize,
}

impl ClientJson {
    pub fn from_client(client: &Client, open_tasks: usize) -> ClientJson {
        ClientJson {
            id: client.id.clone(),
            name: client.name.clone(),
            slug: client.slug.clone(),
            emoji: client.emoji.clone(),
            open_tasks,
        }
    }
}

#[derive(Serialize)]
pub struct SweepJson {
    pub moved: Vec<String>,
}

// ---------------------------------------------------------------------------
// Plain-text formatting
// ---------------------------------------------------------------------------

/// One-line task rendering:
/// `[ ] T-0001  Call Tom  @Acme Corp  4PM  (today, now)`
pub fn task_line(task: &Task, client_name: Option<&str>) -> String {
    let checkbox = match task.status {
        Status::Open => "[ ]",
        Status::Done => "[x]",
    };
    let mut line = format!("{} {}  {}", checkbox, task.id, task.title);
    if let Some(name) = client_name {
        line.push_str(&format!("  @{}", name));
    }
    if let Some(time) = &task.scheduled_time {
        line.push_str(&format!("  {}", time));
    }
    let mut notes = vec![task.bucket.label().to_string()];
    if task.priority != Priority::Normal {
        notes.push(task.priority.label().to_string());
    }
    line.push_str(&format!("  ({})", notes.join(", ")));
    line
}

pub fn print_task_list(lines: &[String]) {
    if lines.is_empty() {
        println!("nothing here.");
    } else {
        for line in lines {
            println!("{}", line);
        }
    }
}
