//! In-game actions: bidding, bottom flip, discard, friend call, trick play,
//! and the automated-seat driver. Every entry point locks the target room,
//! validates against the phase accept-set, mutates through the domain, and
//! emits audit records.

use serde_json::json;
use tracing::{debug, info, warn};

use super::registry::{Room, RoomRegistry, RoomStatus};
use super::Engine;
use crate::ai::AiError;
use crate::domain::bidding::{self, FlipOutcome};
use crate::domain::combos::{classify_lead, ComboShape};
use crate::domain::friend::{self, FriendCallOutcome};
use crate::domain::player_view::{table_view, PlayResultView, TableView};
use crate::domain::scoring::{self, Settlement};
use crate::domain::snapshot::{FinalSnapshot, InitialSnapshot};
use crate::domain::state::BidStage;
use crate::domain::{tricks, ActionType, Card, Phase, Rank, Seat, Suit, Table, TrumpContext};
use crate::error::EngineError;
use crate::errors::domain::{ConflictKind, DomainError};
use crate::errors::ErrorCode;
use crate::store::ReplayRecord;

/// Upper bound on automated steps per `ai_play` call: the longest possible
/// run is one auto-bid, seven flips, a discard, a friend call, and 155 plays.
const MAX_AI_STEPS: usize = 200;

fn seat_of_principal(table: &Table, principal: &str) -> Result<Seat, EngineError> {
    table.seat_of(principal).ok_or_else(|| {
        EngineError::unauthorized(
            ErrorCode::NotSeated,
            format!("{principal} is not seated in this room"),
        )
    })
}

/// Capture the replay's initial state the moment trick play begins.
fn maybe_capture_snapshot(room: &mut Room) {
    if room.play_snapshot.is_some() {
        return;
    }
    if let Some(table) = &room.table {
        if table.phase == Phase::Playing
            && table.tricks_won.is_empty()
            && table.current_trick.is_empty()
        {
            room.play_snapshot = InitialSnapshot::capture(table);
        }
    }
}

/// Shape label for the audit trail.
fn play_type(cards: &[Card], trump: &TrumpContext) -> &'static str {
    match classify_lead(cards, trump).map(|c| c.shape) {
        Ok(ComboShape::Single) => "single",
        Ok(ComboShape::Pair) => "pair",
        Ok(ComboShape::Triple) => "triple",
        Ok(ComboShape::Tractor { .. }) => "tractor",
        Ok(ComboShape::Throw) => "throw",
        Err(_) => "mixed",
    }
}

impl Engine {
    /// Bid (or counter-bid) for the dealer seat by revealing level cards.
    pub fn call_dealer(
        &self,
        room_id: &str,
        principal: &str,
        suit: Suit,
        card_indices: &[usize],
    ) -> Result<TableView, EngineError> {
        let slot = self.registry().get(room_id)?;
        let mut room = RoomRegistry::lock(&slot);
        let now = self.now();
        let table = room.require_table_mut()?;
        table.phase.require_accepts(ActionType::CallDealer)?;
        let seat = seat_of_principal(table, principal)?;

        bidding::call_dealer(table, seat, suit, card_indices, now)?;
        table.touch();

        let record = table.call_records.last();
        debug!(
            room_id,
            seat,
            count = record.map(|r| r.card_count).unwrap_or(0),
            "dealer bid accepted"
        );
        self.emit_audit(
            room_id,
            ActionType::CallDealer,
            seat,
            principal,
            json!({
                "suit": suit,
                "count": record.map(|r| r.card_count),
                "card_indices": card_indices,
            }),
            json!({
                "dealer_seat": table.dealer_seat,
                "trump_suit": table.pending_trump.map(|t| t.suit),
                "trump_rank": table.pending_trump.map(|t| t.rank),
            }),
        );
        Ok(table_view(table, principal))
    }

    /// Close the bidding window (the boundary's countdown expired). With a
    /// standing bid the dealer absorbs the bottom; with none the flip
    /// fallback opens.
    pub fn bidding_closed(
        &self,
        room_id: &str,
        principal: &str,
    ) -> Result<TableView, EngineError> {
        let slot = self.registry().get(room_id)?;
        let mut room = RoomRegistry::lock(&slot);
        let table = room.require_table_mut()?;
        if table.phase
            != (Phase::Bidding {
                stage: BidStage::Counting,
            })
        {
            return Err(DomainError::conflict(
                ConflictKind::PhaseMismatch,
                format!("bidding is not open in phase {}", table.phase),
            )
            .into());
        }
        bidding::close_bidding(table)?;
        table.touch();
        info!(room_id, phase = %table.phase, "bidding window closed");
        Ok(table_view(table, principal))
    }

    /// Reveal the next bottom card (flip fallback).
    pub fn flip_bottom(&self, room_id: &str, principal: &str) -> Result<TableView, EngineError> {
        let slot = self.registry().get(room_id)?;
        let mut room = RoomRegistry::lock(&slot);
        self.do_flip(&mut room, principal)?;
        let table = room.require_table()?;
        Ok(table_view(table, principal))
    }

    fn do_flip(&self, room: &mut Room, principal: &str) -> Result<FlipOutcome, EngineError> {
        let room_id = room.id.clone();
        let table = room.require_table_mut()?;
        table.phase.require_accepts(ActionType::FlipBottom)?;
        let outcome = bidding::flip_bottom(table)?;
        table.touch();
        self.emit_audit(
            &room_id,
            ActionType::FlipBottom,
            0,
            principal,
            json!({
                "card": outcome.card,
                "flipped_count": outcome.flipped_count,
            }),
            json!({ "dealer_seat": outcome.dealer_seat }),
        );
        Ok(outcome)
    }

    /// Dealer buries seven cards back into the bottom.
    pub fn discard_bottom(
        &self,
        room_id: &str,
        principal: &str,
        card_indices: &[usize],
    ) -> Result<TableView, EngineError> {
        let slot = self.registry().get(room_id)?;
        let mut room = RoomRegistry::lock(&slot);
        let seat = {
            let table = room.require_table()?;
            table.phase.require_accepts(ActionType::DiscardBottom)?;
            seat_of_principal(table, principal)?
        };
        self.do_discard(&mut room, seat, principal, card_indices)?;
        let table = room.require_table()?;
        Ok(table_view(table, principal))
    }

    fn do_discard(
        &self,
        room: &mut Room,
        seat: Seat,
        principal: &str,
        card_indices: &[usize],
    ) -> Result<(), EngineError> {
        let room_id = room.id.clone();
        {
            let table = room.require_table_mut()?;
            table.phase.require_accepts(ActionType::DiscardBottom)?;
            bidding::discard_bottom(table, seat, card_indices)?;
            table.touch();
            let buried = table.bottom.clone();
            debug!(room_id = %room_id, seat, "dealer buried the bottom");
            self.emit_audit(
                &room_id,
                ActionType::DiscardBottom,
                seat,
                principal,
                json!({
                    "card_indices": card_indices,
                    "discarded_cards": buried,
                }),
                json!({ "status": "success", "dealer_seat": seat }),
            );
        }
        maybe_capture_snapshot(room);
        Ok(())
    }

    /// Dealer declares the friend card (or triggers solo mode).
    pub fn call_friend(
        &self,
        room_id: &str,
        principal: &str,
        suit: Suit,
        rank: Rank,
        position: u8,
    ) -> Result<TableView, EngineError> {
        let slot = self.registry().get(room_id)?;
        let mut room = RoomRegistry::lock(&slot);
        let seat = {
            let table = room.require_table()?;
            table.phase.require_accepts(ActionType::CallFriend)?;
            seat_of_principal(table, principal)?
        };
        self.do_call_friend(&mut room, seat, principal, suit, rank, position)?;
        let table = room.require_table()?;
        Ok(table_view(table, principal))
    }

    fn do_call_friend(
        &self,
        room: &mut Room,
        seat: Seat,
        principal: &str,
        suit: Suit,
        rank: Rank,
        position: u8,
    ) -> Result<FriendCallOutcome, EngineError> {
        let room_id = room.id.clone();
        let outcome = {
            let table = room.require_table_mut()?;
            table.phase.require_accepts(ActionType::CallFriend)?;
            let outcome = friend::call_friend(table, seat, suit, rank, position)?;
            table.touch();
            info!(
                room_id = %room_id,
                seat,
                solo = outcome.solo_mode,
                "friend card called"
            );
            self.emit_audit(
                &room_id,
                ActionType::CallFriend,
                seat,
                principal,
                json!({ "suit": suit, "rank": rank, "position": position }),
                json!({
                    "is_solo_mode": outcome.solo_mode,
                    "friend_revealed": outcome.friend_revealed,
                    "game_mode": if outcome.solo_mode { "1v4" } else { "2v3" },
                }),
            );
            outcome
        };
        maybe_capture_snapshot(room);
        Ok(outcome)
    }

    /// Play cards into the current trick.
    pub fn play_cards(
        &self,
        room_id: &str,
        principal: &str,
        card_indices: &[usize],
    ) -> Result<PlayResultView, EngineError> {
        let slot = self.registry().get(room_id)?;
        let mut room = RoomRegistry::lock(&slot);
        let seat = {
            let table = room.require_table()?;
            table.phase.require_accepts(ActionType::PlayCards)?;
            seat_of_principal(table, principal)?
        };
        self.do_play(&mut room, seat, principal, card_indices)
    }

    fn do_play(
        &self,
        room: &mut Room,
        seat: Seat,
        principal: &str,
        card_indices: &[usize],
    ) -> Result<PlayResultView, EngineError> {
        let room_id = room.id.clone();
        maybe_capture_snapshot(room);

        let (mut view, settlement_bundle) = {
            let table = room.require_table_mut()?;
            table.phase.require_accepts(ActionType::PlayCards)?;
            let trump = table.require_trump()?;
            let was_lead = table.current_trick.is_empty();

            let outcome = tricks::play_cards(table, seat, card_indices)?;

            self.emit_audit(
                &room_id,
                ActionType::PlayCards,
                seat,
                principal,
                json!({
                    "cards": outcome.played,
                    "is_lead": was_lead,
                    "play_type": play_type(&outcome.played, &trump),
                    "downgraded": outcome.downgraded,
                }),
                json!({ "success": true }),
            );
            if let Some(winner) = outcome.trick_winner {
                self.emit_audit(
                    &room_id,
                    ActionType::TrickComplete,
                    winner,
                    &table.seat_state(winner).user_id.clone(),
                    json!({ "trick_number": table.tricks_won.len() }),
                    json!({
                        "winner_seat": winner,
                        "points_collected": outcome.points_collected,
                        "next_leader": winner,
                    }),
                );
            }

            let mut view = PlayResultView::from_outcome(table, &outcome);
            let bundle = if outcome.round_over {
                let settlement = scoring::settle(table)?;
                table.phase = Phase::Finished;
                let final_snapshot = FinalSnapshot::capture(table, &settlement);
                info!(
                    room_id = %room_id,
                    final_score = settlement.final_score,
                    winner = ?settlement.winner_team,
                    solo = settlement.solo,
                    "round settled"
                );
                self.emit_audit(
                    &room_id,
                    ActionType::GameEnd,
                    0,
                    principal,
                    json!({ "results": settlement.seats }),
                    json!({
                        "winner_team": settlement.winner_team,
                        "final_score": settlement.final_score,
                        "game_status": "finished",
                    }),
                );
                view.game_ended = true;
                view.winner_team = Some(settlement.winner_team);
                view.final_score = Some(settlement.final_score);
                let created_at = table.created_at;
                Some((settlement, final_snapshot, created_at))
            } else {
                None
            };
            table.touch();
            (view, bundle)
        };

        if let Some((settlement, final_snapshot, created_at)) = settlement_bundle {
            room.status = RoomStatus::Finished;
            view.advisory = self.persist_settlement(room, &settlement, &final_snapshot, created_at);
            view.settlement = Some(settlement);
        }
        Ok(view)
    }

    /// Settlement write-through. Failures never roll back the table; they
    /// surface as an advisory on the response.
    fn persist_settlement(
        &self,
        room: &Room,
        settlement: &Settlement,
        final_snapshot: &FinalSnapshot,
        created_at: time::OffsetDateTime,
    ) -> Option<String> {
        self.flush_audit();
        let mut advisory: Option<String> = None;
        let mut note = |msg: String| {
            warn!(room_id = %room.id, "{msg}");
            advisory = Some(match advisory.take() {
                Some(prev) => format!("{prev}; {msg}"),
                None => msg,
            });
        };

        if let Err(err) = self.store().record_results(&room.id, &settlement.seats) {
            note(format!("recording results failed: {err}"));
        }

        let initial_state = room
            .play_snapshot
            .as_ref()
            .and_then(|s| serde_json::to_value(s).ok())
            .unwrap_or(serde_json::Value::Null);
        let final_state =
            serde_json::to_value(final_snapshot).unwrap_or(serde_json::Value::Null);
        let total_actions = self
            .store()
            .fetch_actions(&room.id)
            .map(|a| a.len())
            .unwrap_or(0);
        let duration_seconds = (self.now() - created_at).whole_seconds();
        let replay = ReplayRecord {
            room_id: room.id.clone(),
            initial_state,
            final_state,
            total_actions,
            duration_seconds,
            winner_team: settlement.winner_team,
            final_score: settlement.final_score,
        };
        if let Err(err) = self.store().upsert_replay(&replay) {
            note(format!("storing replay failed: {err}"));
        }
        advisory
    }

    /// Drive every automated seat forward until a human must act, the room is
    /// waiting, or the game has finished.
    pub fn ai_play(&self, room_id: &str, principal: &str) -> Result<TableView, EngineError> {
        let slot = self.registry().get(room_id)?;
        let mut room = RoomRegistry::lock(&slot);

        enum Step {
            Stop,
            AutoDealer,
            Flip,
            Discard(Seat),
            Friend(Seat),
            Play(Seat),
        }

        for _ in 0..MAX_AI_STEPS {
            let step = {
                let Some(table) = room.table.as_ref() else {
                    break;
                };
                match table.phase {
                    Phase::Bidding {
                        stage: BidStage::Counting,
                    } => {
                        if table.is_single_principal()
                            && table.call_records.is_empty()
                            && table.dealer_seat.is_none()
                        {
                            Step::AutoDealer
                        } else {
                            Step::Stop
                        }
                    }
                    Phase::Bidding {
                        stage: BidStage::Flipping,
                    } => Step::Flip,
                    Phase::Discarding => {
                        let dealer = table.require_dealer()?;
                        if table.seat_state(dealer).is_ai {
                            Step::Discard(dealer)
                        } else {
                            Step::Stop
                        }
                    }
                    Phase::CallingFriend => {
                        let dealer = table.require_dealer()?;
                        if table.seat_state(dealer).is_ai {
                            Step::Friend(dealer)
                        } else {
                            Step::Stop
                        }
                    }
                    Phase::Playing => {
                        let actor = table.current_player;
                        if table.seat_state(actor).is_ai {
                            Step::Play(actor)
                        } else {
                            Step::Stop
                        }
                    }
                    Phase::Waiting | Phase::Finished => Step::Stop,
                }
            };

            match step {
                Step::Stop => break,
                Step::AutoDealer => self.auto_dealer(&mut room)?,
                Step::Flip => {
                    self.do_flip(&mut room, principal)?;
                }
                Step::Discard(dealer) => {
                    let (user_id, indices) = {
                        let table = room.require_table()?;
                        let indices = self
                            .auto
                            .choose_discard(table, dealer)
                            .map_err(ai_internal)?;
                        (table.seat_state(dealer).user_id.clone(), indices)
                    };
                    self.do_discard(&mut room, dealer, &user_id, &indices)?;
                }
                Step::Friend(dealer) => {
                    let (user_id, suit, rank, position) = {
                        let table = room.require_table()?;
                        let (suit, rank, position) =
                            self.auto.choose_friend(table, dealer).map_err(ai_internal)?;
                        (table.seat_state(dealer).user_id.clone(), suit, rank, position)
                    };
                    self.do_call_friend(&mut room, dealer, &user_id, suit, rank, position)?;
                }
                Step::Play(actor) => {
                    let (user_id, indices) = {
                        let table = room.require_table()?;
                        let indices =
                            self.auto.choose_play(table, actor).map_err(ai_internal)?;
                        (table.seat_state(actor).user_id.clone(), indices)
                    };
                    self.do_play(&mut room, actor, &user_id, &indices)?;
                }
            }
        }

        let table = room.require_table()?;
        Ok(table_view(table, principal))
    }

    /// Solo rooms skip the bidding protocol: the human seat takes the dealer
    /// role with their longest suit as trump (the friend phase follows as
    /// usual).
    fn auto_dealer(&self, room: &mut Room) -> Result<(), EngineError> {
        let room_id = room.id.clone();
        let table = room.require_table_mut()?;
        let human = table
            .seats
            .iter()
            .position(|s| !s.is_ai)
            .map(|i| i as Seat + 1)
            .unwrap_or(table.starting_dealer);
        let hand = &table.seat_state(human).hand;
        let suit = Suit::ALL
            .iter()
            .copied()
            .max_by_key(|&s| hand.iter().filter(|c| c.suit() == Some(s)).count())
            .unwrap_or(Suit::Hearts);

        table.dealer_seat = Some(human);
        table.pending_trump = Some(TrumpContext::new(suit, table.level));
        bidding::finalize_dealer(table)?;
        table.touch();
        info!(room_id = %room_id, dealer = human, ?suit, "solo room: dealer auto-assigned");
        let principal = table.seat_state(human).user_id.clone();
        self.emit_audit(
            &room_id,
            ActionType::CallDealer,
            human,
            &principal,
            json!({ "suit": suit, "auto": true }),
            json!({
                "dealer_seat": human,
                "trump_suit": suit,
                "trump_rank": table.level,
            }),
        );
        Ok(())
    }
}

fn ai_internal(err: AiError) -> EngineError {
    EngineError::internal(ErrorCode::InternalError, err.to_string())
}
