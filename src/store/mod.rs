//! The in-memory authoritative task collection, kept in lockstep with a
//! persistence collaborator: every mutation goes to the collaborator first
//! and is committed locally only once it confirms. A failed call leaves
//! local and durable state identical (nothing was pre-committed).

use std::collections::HashSet;

use chrono::{DateTime, Local, NaiveDate};
use indexmap::IndexMap;
use thiserror::Error;

use crate::model::{Bucket, Client, MentionMatch, Status, Task, match_mention, slugify};
use crate::ops::{sweep, task_ops};
use crate::parse::parse_quick_add;

/// Failure from the persistence collaborator. Never fatal; the user action
/// that triggered it is simply not committed.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("could not read data: {0}")]
    Read(String),
    #[error("could not write data: {0}")]
    Write(String),
    #[error("data file is invalid: {0}")]
    Parse(String),
    #[error("{0}")]
    Rejected(String),
}

/// Fields for a task about to be created. The collaborator assigns the id
/// and the sort order.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub client_id: Option<String>,
    pub bucket: Bucket,
    pub priority: crate::model::Priority,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: Option<String>,
}

/// The persistence collaborator. Synchronous here; the contract that
/// matters is confirm-before-commit, which the store enforces.
pub trait Persistence {
    fn create_task(&mut self, new: NewTask) -> Result<Task, PersistError>;
    fn update_task(&mut self, task: &Task) -> Result<Task, PersistError>;
    fn delete_task(&mut self, id: &str) -> Result<(), PersistError>;
    fn list_tasks(&mut self) -> Result<Vec<Task>, PersistError>;
    fn list_clients(&mut self) -> Result<Vec<Client>, PersistError>;
    fn create_client(&mut self, name: &str) -> Result<Client, PersistError>;
    fn delete_client(&mut self, id: &str) -> Result<(), PersistError>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("nothing to add: the input was all cues and no title")]
    EmptyTitle,
    #[error("ambiguous client mention '@{token}': matches {candidates}")]
    AmbiguousMention { token: String, candidates: String },
    #[error("unknown client '{0}' (pass --create-clients to add it)")]
    UnknownClient(String),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// How a quick-add input's client association was settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientResolution {
    None,
    Existing(String),
    Created(String),
}

pub struct Store {
    tasks: IndexMap<String, Task>,
    clients: IndexMap<String, Client>,
    /// Ids deleted this session. A delete is terminal: later updates for
    /// the same id must not resurrect the task.
    deleted: HashSet<String>,
    persistence: Box<dyn Persistence>,
}

impl Store {
    /// Load the full collection from the collaborator.
    pub fn load(mut persistence: Box<dyn Persistence>) -> Result<Store, StoreError> {
        let tasks = persistence.list_tasks()?;
        let clients = persistence.list_clients()?;
        Ok(Store {
            tasks: tasks.into_iter().map(|t| (t.id.clone(), t)).collect(),
            clients: clients.into_iter().map(|c| (c.id.clone(), c)).collect(),
            deleted: HashSet::new(),
            persistence,
        })
    }

    // ------------------------------------------------------------------
    // Snapshot reads
    // ------------------------------------------------------------------

    pub fn iter_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn iter_clients(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    pub fn client(&self, id: &str) -> Option<&Client> {
        self.clients.get(id)
    }

    /// Find a client by exact name or slug, case-insensitive.
    pub fn client_by_name(&self, name: &str) -> Option<&Client> {
        let slug = slugify(name);
        self.clients.values().find(|c| c.slug == slug)
    }

    // ------------------------------------------------------------------
    // Intake
    // ------------------------------------------------------------------

    /// Quick-add: parse the raw input, resolve the client association, and
    /// create the task. Empty titles are rejected before anything is sent
    /// to the collaborator.
    pub fn add_task(
        &mut self,
        raw: &str,
        today: NaiveDate,
        explicit_client: Option<&str>,
        create_clients: bool,
    ) -> Result<(Task, ClientResolution), StoreError> {
        let parsed = parse_quick_add(raw, today);
        if parsed.title.is_empty() {
            return Err(StoreError::EmptyTitle);
        }

        let wanted = explicit_client.or(parsed.mentions.first().map(String::as_str));
        let resolution = match wanted {
            None => ClientResolution::None,
            Some(token) => self.resolve_client(token, create_clients)?,
        };
        let client_id = match &resolution {
            ClientResolution::None => None,
            ClientResolution::Existing(id) | ClientResolution::Created(id) => Some(id.clone()),
        };

        let created = self.persistence.create_task(NewTask {
            title: parsed.title,
            client_id,
            bucket: parsed.bucket,
            priority: parsed.priority,
            scheduled_date: parsed.scheduled_date,
            scheduled_time: parsed.scheduled_time,
        })?;
        self.tasks.insert(created.id.clone(), created.clone());
        Ok((created, resolution))
    }

    /// Resolve a mention token to a client id, optionally creating the
    /// client when nothing matches. A prefix hit on exactly one client
    /// counts; several candidates is an error the user has to settle.
    fn resolve_client(
        &mut self,
        token: &str,
        create_clients: bool,
    ) -> Result<ClientResolution, StoreError> {
        let resolved = match match_mention(self.clients.values(), token) {
            MentionMatch::Exact(client) => Some(client.id.clone()),
            MentionMatch::Prefix(hits) if hits.len() == 1 => Some(hits[0].id.clone()),
            MentionMatch::Prefix(hits) => {
                return Err(StoreError::AmbiguousMention {
                    token: token.to_string(),
                    candidates: hits
                        .iter()
                        .map(|c| c.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
            MentionMatch::None => None,
        };

        match resolved {
            Some(id) => Ok(ClientResolution::Existing(id)),
            None if create_clients => {
                let client = self.persistence.create_client(token)?;
                let id = client.id.clone();
                self.clients.insert(id.clone(), client);
                Ok(ClientResolution::Created(id))
            }
            None => Err(StoreError::UnknownClient(token.to_string())),
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle mutations
    // ------------------------------------------------------------------

    /// Apply a lifecycle mutation to one task, collaborator-first. Unknown
    /// and already-deleted ids are no-ops, not errors.
    fn update_task_with<F>(&mut self, id: &str, mutate: F) -> Result<Option<Task>, StoreError>
    where
        F: FnOnce(&mut Task),
    {
        if self.deleted.contains(id) {
            return Ok(None);
        }
        let Some(current) = self.tasks.get(id) else {
            return Ok(None);
        };
        let mut updated = current.clone();
        mutate(&mut updated);
        let confirmed = self.persistence.update_task(&updated)?;
        self.tasks.insert(id.to_string(), confirmed.clone());
        Ok(Some(confirmed))
    }

    pub fn toggle_task(
        &mut self,
        id: &str,
        now: DateTime<Local>,
    ) -> Result<Option<Task>, StoreError> {
        self.update_task_with(id, |t| task_ops::toggle_done(t, now))
    }

    pub fn snooze_task(
        &mut self,
        id: &str,
        minutes: i64,
        now: DateTime<Local>,
    ) -> Result<Option<Task>, StoreError> {
        self.update_task_with(id, |t| task_ops::snooze_reminder(t, minutes, now))
    }

    pub fn remind_task_in(
        &mut self,
        id: &str,
        minutes: i64,
        now: DateTime<Local>,
    ) -> Result<Option<Task>, StoreError> {
        self.update_task_with(id, |t| task_ops::set_reminder(t, minutes, now))
    }

    pub fn clear_reminder(&mut self, id: &str) -> Result<Option<Task>, StoreError> {
        self.update_task_with(id, task_ops::clear_reminder)
    }

    pub fn reschedule_today(
        &mut self,
        id: &str,
        today: NaiveDate,
    ) -> Result<Option<Task>, StoreError> {
        self.update_task_with(id, |t| task_ops::reschedule_today(t, today))
    }

    pub fn move_to_backlog(&mut self, id: &str) -> Result<Option<Task>, StoreError> {
        self.update_task_with(id, task_ops::move_to_backlog)
    }

    /// Destructive removal. Returns false for unknown ids (no-op).
    pub fn delete_task(&mut self, id: &str) -> Result<bool, StoreError> {
        if !self.tasks.contains_key(id) {
            return Ok(false);
        }
        self.persistence.delete_task(id)?;
        self.tasks.shift_remove(id);
        self.deleted.insert(id.to_string());
        Ok(true)
    }

    /// Reclassify stale today-tasks as carryover. Each task is persisted
    /// before its local commit, so local state never runs ahead of the
    /// durable store even when the batch fails partway.
    pub fn sweep_carryover(&mut self, today: NaiveDate) -> Result<Vec<String>, StoreError> {
        let candidates = sweep::carryover_candidates(self.tasks.values(), today);
        let mut moved = Vec::with_capacity(candidates.len());
        for id in candidates {
            if self
                .update_task_with(&id, |t| t.bucket = Bucket::Carryover)?
                .is_some()
            {
                moved.push(id);
            }
        }
        Ok(moved)
    }

    // ------------------------------------------------------------------
    // Clients
    // ------------------------------------------------------------------

    pub fn add_client(&mut self, name: &str) -> Result<Client, StoreError> {
        let client = self.persistence.create_client(name)?;
        self.clients.insert(client.id.clone(), client.clone());
        Ok(client)
    }

    /// Delete a client and every task filed under it, tasks first so a
    /// failure partway never leaves orphaned tasks pointing at a missing
    /// client.
    pub fn delete_client(&mut self, id: &str) -> Result<bool, StoreError> {
        if !self.clients.contains_key(id) {
            return Ok(false);
        }
        let task_ids: Vec<String> = self
            .tasks
            .values()
            .filter(|t| t.client_id.as_deref() == Some(id))
            .map(|t| t.id.clone())
            .collect();
        for task_id in task_ids {
            self.delete_task(&task_id)?;
        }
        self.persistence.delete_client(id)?;
        self.clients.shift_remove(id);
        Ok(true)
    }

    /// Count of open tasks for a client (used by the client listing).
    pub fn open_task_count(&self, client_id: &str) -> usize {
        self.tasks
            .values()
            .filter(|t| t.status == Status::Open && t.client_id.as_deref() == Some(client_id))
            .count()
    }
}
