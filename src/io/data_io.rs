//! File-backed persistence collaborator: one JSON data file, rewritten
//! atomically on every confirmed mutation.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::model::{Client, Status, Task, slugify};
use crate::store::{NewTask, PersistError, Persistence};

/// On-disk shape of the data file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct DataFile {
    #[serde(default)]
    next_task_id: u64,
    #[serde(default)]
    next_client_id: u64,
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    clients: Vec<Client>,
}

pub struct JsonStore {
    path: PathBuf,
    data: DataFile,
}

impl JsonStore {
    /// Open the data file, or start empty when it doesn't exist yet.
    pub fn open(path: &Path) -> Result<JsonStore, PersistError> {
        let data = match fs::read_to_string(path) {
            Ok(text) => {
                serde_json::from_str(&text).map_err(|e| PersistError::Parse(e.to_string()))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => DataFile::default(),
            Err(e) => return Err(PersistError::Read(e.to_string())),
        };
        Ok(JsonStore {
            path: path.to_path_buf(),
            data,
        })
    }

    fn save(&self) -> Result<(), PersistError> {
        let content = serde_json::to_string_pretty(&self.data)
            .map_err(|e| PersistError::Write(e.to_string()))?;
        atomic_write(&self.path, content.as_bytes())
            .map_err(|e| PersistError::Write(e.to_string()))
    }
}

impl Persistence for JsonStore {
    fn create_task(&mut self, new: NewTask) -> Result<Task, PersistError> {
        self.data.next_task_id += 1;
        let task = Task {
            id: format!("T-{:04}", self.data.next_task_id),
            title: new.title,
            client_id: new.client_id,
            status: Status::Open,
            bucket: new.bucket,
            priority: new.priority,
            scheduled_date: new.scheduled_date,
            scheduled_time: new.scheduled_time,
            remind_at: None,
            completed_at: None,
            sort_order: self.data.next_task_id as i64,
        };
        self.data.tasks.push(task.clone());
        if let Err(e) = self.save() {
            self.data.tasks.pop();
            self.data.next_task_id -= 1;
            return Err(e);
        }
        Ok(task)
    }

    fn update_task(&mut self, task: &Task) -> Result<Task, PersistError> {
        let idx = self
            .data
            .tasks
            .iter()
            .position(|t| t.id == task.id)
            .ok_or_else(|| PersistError::Rejected(format!("no such task: {}", task.id)))?;
        let previous = std::mem::replace(&mut self.data.tasks[idx], task.clone());
        if let Err(e) = self.save() {
            self.data.tasks[idx] = previous;
            return Err(e);
        }
        Ok(task.clone())
    }

    fn delete_task(&mut self, id: &str) -> Result<(), PersistError> {
        let before = self.data.tasks.clone();
        self.data.tasks.retain(|t| t.id != id);
        if let Err(e) = self.save() {
            self.data.tasks = before;
            return Err(e);
        }
        Ok(())
    }

    fn list_tasks(&mut self) -> Result<Vec<Task>, PersistError> {
        Ok(self.data.tasks.clone())
    }

    fn list_clients(&mut self) -> Result<Vec<Client>, PersistError> {
        Ok(self.data.clients.clone())
    }

    fn create_client(&mut self, name: &str) -> Result<Client, PersistError> {
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(PersistError::Rejected("client name is empty".into()));
        }
        if self.data.clients.iter().any(|c| c.slug == slug) {
            return Err(PersistError::Rejected(format!(
                "a client with slug '{}' already exists",
                slug
            )));
        }
        self.data.next_client_id += 1;
        let client = Client::new(
            format!("C-{:03}", self.data.next_client_id),
            name,
            (self.data.next_client_id - 1) as usize,
        );
        self.data.clients.push(client.clone());
        if let Err(e) = self.save() {
            self.data.clients.pop();
            self.data.next_client_id -= 1;
            return Err(e);
        }
        Ok(client)
    }

    fn delete_client(&mut self, id: &str) -> Result<(), PersistError> {
        let before = self.data.clients.clone();
        self.data.clients.retain(|c| c.id != id);
        if let Err(e) = self.save() {
            self.data.clients = before;
            return Err(e);
        }
        Ok(())
    }
}

/// Session flags (last-active date and friends) live in their own small
/// JSON file beside the data file.
pub struct FileKv {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileKv {
    pub fn open(path: &Path) -> FileKv {
        let entries = fs::read_to_string(path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default();
        FileKv {
            path: path.to_path_buf(),
            entries,
        }
    }
}

impl crate::ops::session::KvStore for FileKv {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        // best-effort: losing a session flag only re-shows the summary
        if let Ok(content) = serde_json::to_string_pretty(&self.entries) {
            let _ = atomic_write(&self.path, content.as_bytes());
        }
    }
}

/// Write via a temp file in the same directory, then rename into place.
pub fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bucket, Priority};
    use crate::ops::session::KvStore as _;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.into(),
            client_id: None,
            bucket: Bucket::Today,
            priority: Priority::Normal,
            scheduled_date: NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
            scheduled_time: None,
        }
    }

    #[test]
    fn create_and_reload_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nextup.json");

        let mut store = JsonStore::open(&path).unwrap();
        let created = store.create_task(new_task("Call Tom")).unwrap();
        assert_eq!(created.id, "T-0001");

        let mut reloaded = JsonStore::open(&path).unwrap();
        let tasks = reloaded.list_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Call Tom");
        assert_eq!(tasks[0].sort_order, 1);
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::open(&dir.path().join("absent.json")).unwrap();
        assert!(store.list_tasks().unwrap().is_empty());
        assert!(store.list_clients().unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nextup.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonStore::open(&path),
            Err(PersistError::Parse(_))
        ));
    }

    #[test]
    fn update_of_unknown_task_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::open(&dir.path().join("nextup.json")).unwrap();
        let mut ghost = store.create_task(new_task("real")).unwrap();
        store.delete_task(&ghost.id).unwrap();
        ghost.title = "late write".into();
        assert!(matches!(
            store.update_task(&ghost),
            Err(PersistError::Rejected(_))
        ));
    }

    #[test]
    fn duplicate_client_slug_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::open(&dir.path().join("nextup.json")).unwrap();
        store.create_client("Acme Corp").unwrap();
        assert!(matches!(
            store.create_client("ACME-corp"),
            Err(PersistError::Rejected(_))
        ));
    }

    #[test]
    fn ids_keep_counting_after_deletes() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::open(&dir.path().join("nextup.json")).unwrap();
        let first = store.create_task(new_task("one")).unwrap();
        store.delete_task(&first.id).unwrap();
        let second = store.create_task(new_task("two")).unwrap();
        assert_eq!(second.id, "T-0002");
    }

    #[test]
    fn file_kv_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        let mut kv = FileKv::open(&path);
        assert_eq!(kv.get("last_active"), None);
        kv.set("last_active", "2026-03-09");

        let kv = FileKv::open(&path);
        assert_eq!(kv.get("last_active").as_deref(), Some("2026-03-09"));
    }
}
