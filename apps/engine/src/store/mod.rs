//! Persistence write-through boundary.
//!
//! The engine owns no schema; everything it persists goes through
//! [`EngineStore`]. Deployments wire a real adapter; tests and single-process
//! setups use [`memory::InMemoryStore`].

pub mod memory;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;

use crate::domain::scoring::{SeatSettlement, Team};
use crate::domain::{ActionType, Rank};
use crate::errors::domain::{DomainError, InfraErrorKind};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("stored data corrupt: {0}")]
    Corrupt(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(d) => DomainError::infra(InfraErrorKind::StoreUnavailable, d),
            StoreError::Corrupt(d) => DomainError::infra(InfraErrorKind::DataCorruption, d),
        }
    }
}

/// A user as the account system knows them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub level: Rank,
    pub wins: u32,
    pub losses: u32,
}

/// One audited action. `action_data` and `result_data` are schema-flexible
/// payloads persisted opaquely next to the typed envelope fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub room_id: String,
    pub action_type: ActionType,
    /// 1..=5, or 0 for table-level actions.
    pub seat: u8,
    pub principal: String,
    pub action_data: Value,
    pub result_data: Value,
    pub timestamp: OffsetDateTime,
}

/// The replay record upserted at settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayRecord {
    pub room_id: String,
    pub initial_state: Value,
    pub final_state: Value,
    pub total_actions: usize,
    pub duration_seconds: i64,
    pub winner_team: Team,
    pub final_score: u32,
}

/// Write-through persistence used by the engine. Implementations must be
/// thread-safe; the engine calls them from inside room handlers and from the
/// audit worker.
pub trait EngineStore: Send + Sync {
    fn load_user(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError>;
    fn upsert_user(&self, user: &UserRecord) -> Result<(), StoreError>;

    /// Append one audit record. Per-room insertion order is the action order.
    fn record_action(&self, record: &ActionRecord) -> Result<(), StoreError>;
    fn fetch_actions(&self, room_id: &str) -> Result<Vec<ActionRecord>, StoreError>;

    fn upsert_replay(&self, record: &ReplayRecord) -> Result<(), StoreError>;
    fn fetch_replay(&self, room_id: &str) -> Result<Option<ReplayRecord>, StoreError>;

    /// Apply settlement results: level updates plus win/loss tallies for
    /// every known user. Must be atomic per call.
    fn record_results(&self, room_id: &str, results: &[SeatSettlement]) -> Result<(), StoreError>;
}
