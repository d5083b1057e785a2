//! Session tracking: decides when the "welcome back" summary (and the
//! once-per-day startup sweep) should run, without reading real timers.

use chrono::NaiveDate;

use crate::util::Clock;

const LAST_ACTIVE_KEY: &str = "last_active";

/// Minimal key-value persistence for ambient session flags. The data file
/// backs this in production; tests use [`MemoryKv`].
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory KvStore for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: std::collections::HashMap<String, String>,
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

/// Tracks the last calendar day the user was active.
pub struct SessionTracker<'a, C: Clock> {
    clock: &'a C,
    kv: &'a mut dyn KvStore,
}

impl<'a, C: Clock> SessionTracker<'a, C> {
    pub fn new(clock: &'a C, kv: &'a mut dyn KvStore) -> Self {
        SessionTracker { clock, kv }
    }

    fn last_active(&self) -> Option<NaiveDate> {
        self.kv.get(LAST_ACTIVE_KEY)?.parse().ok()
    }

    /// True when the previous recorded activity was on an earlier calendar
    /// day (or there is none at all): time to show the welcome-back summary
    /// and run the startup sweep.
    pub fn new_day(&self) -> bool {
        match self.last_active() {
            Some(date) => date < self.clock.today(),
            None => true,
        }
    }

    /// Record activity for today.
    pub fn touch(&mut self) {
        let today = self.clock.today().to_string();
        self.kv.set(LAST_ACTIVE_KEY, &today);
    }
}
