//! In-memory store adapter: the default for tests and single-process
//! deployments.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::{ActionRecord, EngineStore, ReplayRecord, StoreError, UserRecord};
use crate::domain::scoring::SeatSettlement;

#[derive(Default)]
pub struct InMemoryStore {
    users: Mutex<HashMap<String, UserRecord>>,
    actions: Mutex<HashMap<String, Vec<ActionRecord>>>,
    replays: Mutex<HashMap<String, ReplayRecord>>,
    /// Failure injection for write paths, used to exercise the audit
    /// writer's retention behaviour.
    fail_writes: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("write failure injected".into()))
        } else {
            Ok(())
        }
    }

    fn lock<'a, T>(mutex: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
        mutex.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl EngineStore for InMemoryStore {
    fn load_user(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(Self::lock(&self.users).get(user_id).cloned())
    }

    fn upsert_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        Self::lock(&self.users).insert(user.id.clone(), user.clone());
        Ok(())
    }

    fn record_action(&self, record: &ActionRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        Self::lock(&self.actions)
            .entry(record.room_id.clone())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    fn fetch_actions(&self, room_id: &str) -> Result<Vec<ActionRecord>, StoreError> {
        Ok(Self::lock(&self.actions)
            .get(room_id)
            .cloned()
            .unwrap_or_default())
    }

    fn upsert_replay(&self, record: &ReplayRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        Self::lock(&self.replays).insert(record.room_id.clone(), record.clone());
        Ok(())
    }

    fn fetch_replay(&self, room_id: &str) -> Result<Option<ReplayRecord>, StoreError> {
        Ok(Self::lock(&self.replays).get(room_id).cloned())
    }

    fn record_results(&self, _room_id: &str, results: &[SeatSettlement]) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut users = Self::lock(&self.users);
        for result in results {
            if let Some(user) = users.get_mut(&result.user_id) {
                user.level = result.new_level;
                if result.is_winner {
                    user.wins += 1;
                } else {
                    user.losses += 1;
                }
            }
        }
        Ok(())
    }
}
