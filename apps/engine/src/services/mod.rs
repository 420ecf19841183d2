//! Services layer: the engine facade, room registry, and audit writer.

pub mod audit;
pub mod game_flow;
pub mod registry;
pub mod rooms;

use std::sync::Arc;

use serde_json::Value;
use time::OffsetDateTime;

use crate::ai::{AutoSeat, GreedyHeuristic};
use crate::domain::ActionType;
use crate::store::{ActionRecord, EngineStore};
use crate::utils::room_id::RoomIdGen;
use audit::AuditWriter;
use registry::RoomRegistry;

/// The engine facade the boundary talks to. One instance per process; every
/// action takes `(room_id, principal, payload)` and runs under the target
/// room's single-writer lock.
pub struct Engine {
    registry: RoomRegistry,
    store: Arc<dyn EngineStore>,
    audit: AuditWriter,
    ids: RoomIdGen,
    auto: Box<dyn AutoSeat>,
    /// Base seed mixed into every deal; fixed by tests, entropy otherwise.
    base_seed: u64,
}

impl Engine {
    pub fn new(store: Arc<dyn EngineStore>) -> Self {
        let audit = AuditWriter::spawn(Arc::clone(&store));
        Self {
            registry: RoomRegistry::new(),
            store,
            audit,
            ids: RoomIdGen::new(),
            auto: Box::new(GreedyHeuristic::new()),
            base_seed: rand::random(),
        }
    }

    /// Pin the deal seed (tests).
    pub fn with_deal_seed(mut self, seed: u64) -> Self {
        self.base_seed = seed;
        self
    }

    /// Pin the room id sequence (tests).
    pub fn with_id_seed(mut self, seed: u64) -> Self {
        self.ids = RoomIdGen::with_seed(seed);
        self
    }

    /// Swap the automated-seat implementation.
    pub fn with_auto_seat(mut self, auto: Box<dyn AutoSeat>) -> Self {
        self.auto = auto;
        self
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn EngineStore> {
        &self.store
    }

    /// Block until every audit record emitted so far has been attempted.
    pub fn flush_audit(&self) {
        self.audit.flush();
    }

    pub(crate) fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    /// Emit one audit record (best-effort, decoupled from the action path).
    pub(crate) fn emit_audit(
        &self,
        room_id: &str,
        action_type: ActionType,
        seat: u8,
        principal: &str,
        action_data: Value,
        result_data: Value,
    ) {
        self.audit.emit(ActionRecord {
            room_id: room_id.to_string(),
            action_type,
            seat,
            principal: principal.to_string(),
            action_data,
            result_data,
            timestamp: self.now(),
        });
    }
}
