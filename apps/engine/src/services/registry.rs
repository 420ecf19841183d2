//! Room registry: the process-wide map from room id to its authoritative
//! state, with per-room single-writer discipline.
//!
//! Every action on a room runs under that room's mutex; actions on distinct
//! rooms proceed in parallel. Reads take the same lock, so the boundary never
//! observes a torn table.

use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::snapshot::InitialSnapshot;
use crate::domain::{Rank, Table};
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

/// A principal occupying (or about to occupy) a seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProfile {
    pub user_id: String,
    pub display_name: String,
    pub level: Rank,
    pub is_ai: bool,
}

/// One room: lobby data plus, once started, the authoritative table.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub host_id: String,
    pub status: RoomStatus,
    pub level: Rank,
    pub max_players: usize,
    pub players: Vec<PlayerProfile>,
    pub table: Option<Table>,
    /// Captured the moment the table enters trick play; becomes the replay's
    /// initial state.
    pub play_snapshot: Option<InitialSnapshot>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Room {
    pub fn require_table(&self) -> Result<&Table, DomainError> {
        self.table.as_ref().ok_or_else(|| {
            DomainError::conflict(ConflictKind::PhaseMismatch, "the game has not started")
        })
    }

    pub fn require_table_mut(&mut self) -> Result<&mut Table, DomainError> {
        self.table.as_mut().ok_or_else(|| {
            DomainError::conflict(ConflictKind::PhaseMismatch, "the game has not started")
        })
    }
}

/// Lobby summary for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub room_id: String,
    pub name: String,
    pub host_id: String,
    pub status: RoomStatus,
    pub level: Rank,
    pub player_count: usize,
    pub max_players: usize,
}

impl RoomSummary {
    pub fn of(room: &Room) -> Self {
        Self {
            room_id: room.id.clone(),
            name: room.name.clone(),
            host_id: room.host_id.clone(),
            status: room.status,
            level: room.level,
            player_count: room.players.len(),
            max_players: room.max_players,
        }
    }
}

/// The registry itself. `DashMap` gives lock-free lookup; the per-room
/// `Mutex` serialises all mutation and reads of one room.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, Arc<Mutex<Room>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh room; a duplicate id is a conflict (the id generator
    /// retries on it).
    pub fn insert_new(&self, room: Room) -> Result<(), DomainError> {
        let id = room.id.clone();
        let entry = self.rooms.entry(id.clone());
        match entry {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(DomainError::conflict(
                ConflictKind::DuplicateRoomId,
                format!("room id {id} already exists"),
            )),
            dashmap::mapref::entry::Entry::Vacant(v) => {
                v.insert(Arc::new(Mutex::new(room)));
                Ok(())
            }
        }
    }

    pub fn get(&self, room_id: &str) -> Result<Arc<Mutex<Room>>, DomainError> {
        self.rooms
            .get(room_id)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| {
                DomainError::not_found(NotFoundKind::Room, format!("unknown room: {room_id}"))
            })
    }

    /// Lock a room slot, recovering from a poisoned lock (the table is
    /// value-consistent; a panicked writer only loses its own action).
    pub fn lock(slot: &Arc<Mutex<Room>>) -> MutexGuard<'_, Room> {
        slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn summaries(&self) -> Vec<RoomSummary> {
        let mut out: Vec<RoomSummary> = self
            .rooms
            .iter()
            .map(|e| RoomSummary::of(&Self::lock(e.value())))
            .collect();
        out.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        out
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
