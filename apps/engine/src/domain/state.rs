//! The authoritative table state and phase machine data.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::cards_types::{Card, Rank, Suit, TrumpContext};
use super::rules::{AI_ID_PREFIX, SEATS};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

pub type Seat = u8; // 1..=5

/// Sub-stage of the bidding phase: the countdown window, then (only when the
/// window closed with zero bids) the bottom-flip fallback.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BidStage {
    Counting,
    Flipping,
}

/// Overall table phases. Dealing and settling are transient: dealing happens
/// inside the start action, settling inside the final play action.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Phase {
    /// Seats are still filling up.
    Waiting,
    /// Dealer bidding window; `stage` distinguishes the flip fallback.
    Bidding { stage: BidStage },
    /// Dealer holds 38 cards and must bury 7.
    Discarding,
    /// Dealer declares the friend card.
    CallingFriend,
    /// Trick play, 31 tricks.
    Playing,
    /// Settled and recorded.
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Waiting => "waiting",
            Phase::Bidding {
                stage: BidStage::Counting,
            } => "bidding",
            Phase::Bidding {
                stage: BidStage::Flipping,
            } => "bidding(flipping)",
            Phase::Discarding => "discarding",
            Phase::CallingFriend => "calling_friend",
            Phase::Playing => "playing",
            Phase::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Action types recorded in the audit log.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    GameCreate,
    PlayerJoin,
    GameStart,
    CallDealer,
    FlipBottom,
    DiscardBottom,
    CallFriend,
    PlayCards,
    TrickComplete,
    GameEnd,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::GameCreate => "game_create",
            ActionType::PlayerJoin => "player_join",
            ActionType::GameStart => "game_start",
            ActionType::CallDealer => "call_dealer",
            ActionType::FlipBottom => "flip_bottom",
            ActionType::DiscardBottom => "discard_bottom",
            ActionType::CallFriend => "call_friend",
            ActionType::PlayCards => "play_cards",
            ActionType::TrickComplete => "trick_complete",
            ActionType::GameEnd => "game_end",
        }
    }
}

impl Phase {
    /// Whether this phase accepts the given player action. Reads and the
    /// `ai_play` driver are not phase-gated.
    pub fn accepts(&self, action: ActionType) -> bool {
        use ActionType::*;
        match self {
            Phase::Waiting => matches!(action, PlayerJoin | GameStart),
            Phase::Bidding {
                stage: BidStage::Counting,
            } => matches!(action, CallDealer),
            Phase::Bidding {
                stage: BidStage::Flipping,
            } => matches!(action, FlipBottom),
            // The dealer may call the friend while still burying cards.
            Phase::Discarding => matches!(action, DiscardBottom | CallFriend),
            Phase::CallingFriend => matches!(action, CallFriend),
            Phase::Playing => matches!(action, PlayCards),
            Phase::Finished => false,
        }
    }

    /// Reject `action` unless the accept-set allows it. The error names the
    /// current phase.
    pub fn require_accepts(&self, action: ActionType) -> Result<(), DomainError> {
        if self.accepts(action) {
            Ok(())
        } else {
            Err(DomainError::conflict(
                ConflictKind::PhaseMismatch,
                format!("action {} not allowed in phase {}", action.as_str(), self),
            ))
        }
    }
}

/// One seat at the table.
#[derive(Debug, Clone)]
pub struct SeatState {
    pub user_id: String,
    pub display_name: String,
    /// The seat's own level (its current trump rank in the ladder).
    pub level: Rank,
    pub is_ai: bool,
    pub hand: Vec<Card>,
    /// Scoring cards collected from won tricks.
    pub collected: Vec<Card>,
    pub is_friend: bool,
}

impl SeatState {
    pub fn new(user_id: String, display_name: String, level: Rank) -> Self {
        let is_ai = user_id.starts_with(AI_ID_PREFIX);
        Self {
            user_id,
            display_name,
            level,
            is_ai,
            hand: Vec::new(),
            collected: Vec::new(),
            is_friend: false,
        }
    }
}

/// One seat's contribution to the current trick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatPlay {
    pub seat: Seat,
    pub cards: Vec<Card>,
}

/// An archived, completed trick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTrick {
    pub winner: Seat,
    pub plays: Vec<SeatPlay>,
}

impl CompletedTrick {
    pub fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.plays.iter().flat_map(|p| p.cards.iter().copied())
    }
}

/// The friend declaration: the `position`-th public play of (suit, rank)
/// marks the friend. `seen_count` advances as copies hit the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalledCard {
    pub suit: Suit,
    pub rank: Rank,
    pub position: u8,
    pub seen_count: u8,
}

/// One dealer bid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub seat: Seat,
    pub suit: Suit,
    pub rank: Rank,
    pub card_count: u8,
    pub timestamp: OffsetDateTime,
}

/// The authoritative per-room game state. Exclusively owned by the room slot;
/// every mutation happens under the room's single-writer lock.
#[derive(Debug, Clone)]
pub struct Table {
    pub room_id: String,
    pub phase: Phase,
    /// The level (trump rank) this round is played at.
    pub level: Rank,
    pub seats: [SeatState; SEATS],
    pub bottom: Vec<Card>,
    /// How many bottom cards the flip fallback has revealed.
    pub flipped_count: usize,
    /// Trump context once the dealer is finalised (phase ≥ discarding).
    pub trump: Option<TrumpContext>,
    /// Prospective trump carried by the standing bid during the window.
    pub pending_trump: Option<TrumpContext>,
    pub dealer_seat: Option<Seat>,
    pub starting_dealer: Seat,
    pub current_player: Seat,
    pub trick_leader: Seat,
    pub current_trick: Vec<SeatPlay>,
    pub tricks_won: Vec<CompletedTrick>,
    pub called_card: Option<CalledCard>,
    pub friend_revealed: bool,
    pub friend_seat: Option<Seat>,
    pub solo_mode: bool,
    pub call_records: Vec<CallRecord>,
    /// Advisory countdown for the bidding window, seconds.
    pub bid_countdown: u32,
    /// Monotonic update counter; bumped on every successful action.
    pub version: u64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Validate hand indices: non-empty, in range, distinct. Returns them in the
/// caller's order.
pub fn validate_hand_indices(
    indices: &[usize],
    hand_len: usize,
) -> Result<Vec<usize>, DomainError> {
    if indices.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::InvalidCardIndex,
            "no cards selected",
        ));
    }
    let mut seen = vec![false; hand_len];
    for &idx in indices {
        if idx >= hand_len {
            return Err(DomainError::validation(
                ValidationKind::InvalidCardIndex,
                format!("invalid card index: {idx}"),
            ));
        }
        if seen[idx] {
            return Err(DomainError::validation(
                ValidationKind::InvalidCardIndex,
                format!("duplicate card index: {idx}"),
            ));
        }
        seen[idx] = true;
    }
    Ok(indices.to_vec())
}

/// Counter-clockwise seat rotation: 1 → 5 → 4 → 3 → 2 → 1.
#[inline]
pub fn next_seat(seat: Seat) -> Seat {
    ((seat + 3) % 5) + 1
}

/// Index into the seats array for a 1-based seat number.
#[inline]
pub fn seat_index(seat: Seat) -> usize {
    debug_assert!((1..=SEATS as u8).contains(&seat));
    (seat - 1) as usize
}

/// The `n`-th seat counter-clockwise from `start`.
#[inline]
pub fn nth_counter_clockwise(start: Seat, n: u8) -> Seat {
    let mut s = start;
    for _ in 0..n {
        s = next_seat(s);
    }
    s
}

impl Table {
    pub fn seat_state(&self, seat: Seat) -> &SeatState {
        &self.seats[seat_index(seat)]
    }

    pub fn seat_state_mut(&mut self, seat: Seat) -> &mut SeatState {
        &mut self.seats[seat_index(seat)]
    }

    /// Seat of a principal, if they sit at this table.
    pub fn seat_of(&self, user_id: &str) -> Option<Seat> {
        self.seats
            .iter()
            .position(|s| s.user_id == user_id)
            .map(|i| i as Seat + 1)
    }

    pub fn require_seat_of(&self, user_id: &str) -> Result<Seat, DomainError> {
        self.seat_of(user_id).ok_or_else(|| {
            DomainError::validation(
                ValidationKind::InvalidSeat,
                format!("user {user_id} is not seated at this table"),
            )
        })
    }

    pub fn require_trump(&self) -> Result<TrumpContext, DomainError> {
        self.trump.ok_or_else(|| {
            DomainError::validation_other("Invariant violated: trump must be set".to_string())
        })
    }

    pub fn require_dealer(&self) -> Result<Seat, DomainError> {
        self.dealer_seat.ok_or_else(|| {
            DomainError::validation_other("Invariant violated: dealer must be set".to_string())
        })
    }

    /// True when at most one seat is a human principal.
    pub fn is_single_principal(&self) -> bool {
        self.seats.iter().filter(|s| s.is_ai).count() >= SEATS - 1
    }

    /// Every seat on the dealer's team. Before the friend reveals, only the
    /// dealer is known.
    pub fn dealer_team(&self) -> Vec<Seat> {
        let Some(dealer) = self.dealer_seat else {
            return Vec::new();
        };
        let mut team = vec![dealer];
        if let Some(friend) = self.friend_seat {
            if self.friend_revealed && friend != dealer {
                team.push(friend);
            }
        }
        team
    }

    pub fn is_on_dealer_team(&self, seat: Seat) -> bool {
        self.dealer_team().contains(&seat)
    }

    /// Bump the monotonic version and the update timestamp. Called at the end
    /// of every successful action.
    pub fn touch(&mut self) {
        self.version += 1;
        self.updated_at = OffsetDateTime::now_utc();
    }

    /// Total cards tracked by the table: hands + bottom + current trick +
    /// archived tricks. Equals 162 outside of a mutating action.
    pub fn card_census(&self) -> usize {
        let in_hands: usize = self.seats.iter().map(|s| s.hand.len()).sum();
        let in_trick: usize = self.current_trick.iter().map(|p| p.cards.len()).sum();
        let archived: usize = self
            .tricks_won
            .iter()
            .map(|t| t.plays.iter().map(|p| p.cards.len()).sum::<usize>())
            .sum();
        in_hands + self.bottom.len() + in_trick + archived
    }
}
