//! Room lifecycle: create, join, list, start, and the read surface.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::registry::{PlayerProfile, Room, RoomRegistry, RoomStatus, RoomSummary};
use super::Engine;
use crate::domain::dealing;
use crate::domain::player_view::{table_view, SeatPublic, TableView};
use crate::domain::rules::{AI_ID_PREFIX, SEATS};
use crate::domain::seed_derivation::derive_deal_seed;
use crate::domain::state::{BidStage, SeatState};
use crate::domain::{ActionType, Phase, Rank, Seat, Table};
use crate::error::EngineError;
use crate::errors::domain::{ConflictKind, DomainError};
use crate::errors::ErrorCode;
use crate::store::{ActionRecord, ReplayRecord, UserRecord};

/// How often a colliding room id is regenerated before giving up.
const ID_RETRIES: usize = 10;

/// Lobby view returned by `join_room`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomView {
    #[serde(flatten)]
    pub summary: RoomSummary,
    pub players: Vec<RoomPlayer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomPlayer {
    pub seat: Seat,
    pub user_id: String,
    pub display_name: String,
    pub level: Rank,
    pub is_ai: bool,
}

fn room_view(room: &Room) -> RoomView {
    RoomView {
        summary: RoomSummary::of(room),
        players: room
            .players
            .iter()
            .enumerate()
            .map(|(i, p)| RoomPlayer {
                seat: i as Seat + 1,
                user_id: p.user_id.clone(),
                display_name: p.display_name.clone(),
                level: p.level,
                is_ai: p.is_ai,
            })
            .collect(),
    }
}

impl Engine {
    fn require_user(&self, user_id: &str) -> Result<UserRecord, EngineError> {
        match self.store().load_user(user_id) {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(EngineError::not_found(
                ErrorCode::UserNotFound,
                format!("unknown user: {user_id}"),
            )),
            Err(err) => Err(DomainError::from(err).into()),
        }
    }

    fn new_room(
        &self,
        name: &str,
        principal: &str,
        extra_players: impl Fn(&str, &UserRecord) -> Vec<PlayerProfile>,
    ) -> Result<String, EngineError> {
        let host = self.require_user(principal)?;
        let now = self.now();

        let mut last_err = None;
        for _ in 0..ID_RETRIES {
            let id = self.ids.generate();
            let mut players = vec![PlayerProfile {
                user_id: host.id.clone(),
                display_name: host.username.clone(),
                level: host.level,
                is_ai: false,
            }];
            players.extend(extra_players(&id, &host));
            let room = Room {
                id: id.clone(),
                name: name.to_string(),
                host_id: host.id.clone(),
                status: RoomStatus::Waiting,
                level: host.level,
                max_players: SEATS,
                players,
                table: None,
                play_snapshot: None,
                created_at: now,
                updated_at: now,
            };
            match self.registry().insert_new(room) {
                Ok(()) => {
                    info!(room_id = %id, host = principal, "room created");
                    self.emit_audit(
                        &id,
                        ActionType::GameCreate,
                        0,
                        principal,
                        serde_json::json!({ "name": name }),
                        serde_json::json!({ "room_id": id }),
                    );
                    return Ok(id);
                }
                Err(err @ DomainError::Conflict(ConflictKind::DuplicateRoomId, _)) => {
                    last_err = Some(err);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(last_err
            .unwrap_or_else(|| {
                DomainError::conflict(ConflictKind::DuplicateRoomId, "room id space exhausted")
            })
            .into())
    }

    /// Create a five-human room; the creator takes the first slot.
    pub fn create_room(&self, name: &str, principal: &str) -> Result<String, EngineError> {
        self.new_room(name, principal, |_, _| Vec::new())
    }

    /// Create a room with one human principal and four automated seats.
    pub fn create_solo_room(&self, name: &str, principal: &str) -> Result<String, EngineError> {
        self.new_room(name, principal, |room_id, host| {
            (1..SEATS)
                .map(|n| PlayerProfile {
                    user_id: format!("{AI_ID_PREFIX}{}_{n}", room_id.to_lowercase()),
                    display_name: format!("AI Player {n}"),
                    level: host.level,
                    is_ai: true,
                })
                .collect()
        })
    }

    pub fn join_room(&self, room_id: &str, principal: &str) -> Result<RoomView, EngineError> {
        let user = self.require_user(principal)?;
        let slot = self.registry().get(room_id)?;
        let mut room = RoomRegistry::lock(&slot);

        if room.status != RoomStatus::Waiting {
            return Err(EngineError::conflict(
                ErrorCode::PhaseMismatch,
                "the game has already started",
            ));
        }
        if room.players.iter().any(|p| p.user_id == principal) {
            return Err(EngineError::conflict(
                ErrorCode::SeatTaken,
                "already seated in this room",
            ));
        }
        if room.players.len() >= room.max_players {
            return Err(EngineError::conflict(ErrorCode::RoomFull, "room is full"));
        }

        room.players.push(PlayerProfile {
            user_id: user.id.clone(),
            display_name: user.username.clone(),
            level: user.level,
            is_ai: false,
        });
        room.updated_at = self.now();
        debug!(room_id, user = principal, seats = room.players.len(), "player joined");
        self.emit_audit(
            room_id,
            ActionType::PlayerJoin,
            room.players.len() as u8,
            principal,
            serde_json::Value::Null,
            serde_json::json!({ "seat": room.players.len() }),
        );
        Ok(room_view(&room))
    }

    pub fn list_rooms(&self) -> Vec<RoomSummary> {
        self.registry().summaries()
    }

    /// Start the game: deal 31 cards to each of the five seats, set aside the
    /// bottom, and open the bidding window.
    pub fn start_game(&self, room_id: &str, principal: &str) -> Result<TableView, EngineError> {
        let slot = self.registry().get(room_id)?;
        let mut room = RoomRegistry::lock(&slot);

        if room.host_id != principal {
            return Err(EngineError::unauthorized(
                ErrorCode::NotAllowed,
                "only the host may start the game",
            ));
        }
        if room.status != RoomStatus::Waiting {
            return Err(EngineError::conflict(
                ErrorCode::PhaseMismatch,
                "game already started",
            ));
        }
        if room.players.len() != SEATS {
            return Err(EngineError::validation(
                ErrorCode::InvalidSeat,
                format!("need exactly {SEATS} players to start"),
            ));
        }

        let seed = derive_deal_seed(room_id, self.base_seed);
        let deal = dealing::deal(seed);
        let starting_dealer = (seed % SEATS as u64) as Seat + 1;

        let seats: Vec<SeatState> = room
            .players
            .iter()
            .zip(deal.hands.iter())
            .map(|(p, hand)| {
                let mut seat = SeatState::new(p.user_id.clone(), p.display_name.clone(), p.level);
                seat.hand = hand.clone();
                seat
            })
            .collect();
        let seats: [SeatState; SEATS] = seats.try_into().expect("five seats were just built");

        let now = self.now();
        let table = Table {
            room_id: room_id.to_string(),
            phase: Phase::Bidding {
                stage: BidStage::Counting,
            },
            level: room.level,
            seats,
            bottom: deal.bottom,
            flipped_count: 0,
            trump: None,
            pending_trump: None,
            dealer_seat: None,
            starting_dealer,
            current_player: starting_dealer,
            trick_leader: starting_dealer,
            current_trick: Vec::new(),
            tricks_won: Vec::new(),
            called_card: None,
            friend_revealed: false,
            friend_seat: None,
            solo_mode: false,
            call_records: Vec::new(),
            bid_countdown: crate::domain::rules::BID_COUNTDOWN_SECS,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        room.table = Some(table);
        room.status = RoomStatus::Playing;
        room.updated_at = now;

        info!(
            room_id,
            starting_dealer,
            level = room.level.as_level_str(),
            "game started, bidding open"
        );
        self.emit_audit(
            room_id,
            ActionType::GameStart,
            0,
            principal,
            serde_json::json!({
                "starting_dealer": starting_dealer,
                "current_level": room.level,
                "player_count": SEATS,
            }),
            serde_json::json!({ "status": "success" }),
        );

        let table = room.require_table()?;
        Ok(table_view(table, principal))
    }

    /// The table as `principal` may see it. Waiting rooms produce a stub view
    /// with seat counts only.
    pub fn get_table(&self, room_id: &str, principal: &str) -> Result<TableView, EngineError> {
        let slot = self.registry().get(room_id)?;
        let room = RoomRegistry::lock(&slot);
        match &room.table {
            Some(table) => Ok(table_view(table, principal)),
            None => Ok(waiting_view(&room)),
        }
    }

    pub fn get_replay(&self, room_id: &str, _principal: &str) -> Result<ReplayRecord, EngineError> {
        // Make sure the room exists so unknown ids 404 as rooms, not replays.
        let _ = self.registry().get(room_id)?;
        match self.store().fetch_replay(room_id) {
            Ok(Some(replay)) => Ok(replay),
            Ok(None) => Err(EngineError::not_found(
                ErrorCode::ReplayNotFound,
                format!("no replay recorded for room {room_id}"),
            )),
            Err(err) => Err(DomainError::from(err).into()),
        }
    }

    pub fn get_actions(
        &self,
        room_id: &str,
        _principal: &str,
    ) -> Result<Vec<ActionRecord>, EngineError> {
        let _ = self.registry().get(room_id)?;
        self.flush_audit();
        self.store()
            .fetch_actions(room_id)
            .map_err(|err| DomainError::from(err).into())
    }
}

/// Stub view for a room that has not dealt yet.
fn waiting_view(room: &Room) -> TableView {
    TableView {
        room_id: room.id.clone(),
        phase: "waiting".to_string(),
        level: room.level,
        trump_suit: None,
        trump_rank: room.level,
        dealer_seat: None,
        starting_dealer: 0,
        current_player: 0,
        trick_leader: 0,
        bid_countdown: 0,
        call_records: Vec::new(),
        flipped_bottom: Vec::new(),
        current_trick: Vec::new(),
        tricks_completed: 0,
        called_card: None,
        friend_revealed: false,
        friend_seat: None,
        solo_mode: false,
        dealer_team: Vec::new(),
        seats: room
            .players
            .iter()
            .enumerate()
            .map(|(i, p)| SeatPublic {
                seat: i as Seat + 1,
                user_id: p.user_id.clone(),
                display_name: p.display_name.clone(),
                is_ai: p.is_ai,
                level: p.level,
                card_count: 0,
                collected_points: 0,
                is_friend: false,
            })
            .collect(),
        my_seat: None,
        my_hand: Vec::new(),
        version: 0,
    }
}
