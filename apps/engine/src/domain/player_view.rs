//! Public views of the table: what a seated principal is allowed to see.

use serde::{Deserialize, Serialize};

use super::cards_types::{Card, Rank, Suit};
use super::scoring::{Settlement, Team};
use super::state::{Seat, SeatPlay, Table};
use super::tricks::PlayOutcome;

/// Public info about a single seat: card count, never the cards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatPublic {
    pub seat: Seat,
    pub user_id: String,
    pub display_name: String,
    pub is_ai: bool,
    pub level: Rank,
    pub card_count: usize,
    pub collected_points: u32,
    pub is_friend: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrickPlayPublic {
    pub seat: Seat,
    pub cards: Vec<Card>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecordPublic {
    pub seat: Seat,
    pub suit: Suit,
    pub rank: Rank,
    pub card_count: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalledCardPublic {
    pub suit: Suit,
    pub rank: Rank,
    pub position: u8,
}

/// The table as one principal sees it: every other hand reduced to a count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableView {
    pub room_id: String,
    pub phase: String,
    pub level: Rank,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trump_suit: Option<Suit>,
    pub trump_rank: Rank,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dealer_seat: Option<Seat>,
    pub starting_dealer: Seat,
    pub current_player: Seat,
    pub trick_leader: Seat,
    pub bid_countdown: u32,
    pub call_records: Vec<CallRecordPublic>,
    /// The revealed prefix of the bottom during the flip fallback.
    pub flipped_bottom: Vec<Card>,
    pub current_trick: Vec<TrickPlayPublic>,
    pub tricks_completed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub called_card: Option<CalledCardPublic>,
    pub friend_revealed: bool,
    /// Only present once the friend has revealed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friend_seat: Option<Seat>,
    pub solo_mode: bool,
    /// Dealer-team composition, when resolvable.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dealer_team: Vec<Seat>,
    pub seats: Vec<SeatPublic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_seat: Option<Seat>,
    pub my_hand: Vec<Card>,
    pub version: u64,
}

/// Build the redacted view of `table` for `viewer`.
pub fn table_view(table: &Table, viewer: &str) -> TableView {
    let my_seat = table.seat_of(viewer);
    let my_hand = my_seat
        .map(|s| table.seat_state(s).hand.clone())
        .unwrap_or_default();

    let seats = table
        .seats
        .iter()
        .enumerate()
        .map(|(i, s)| SeatPublic {
            seat: i as Seat + 1,
            user_id: s.user_id.clone(),
            display_name: s.display_name.clone(),
            is_ai: s.is_ai,
            level: s.level,
            card_count: s.hand.len(),
            collected_points: s.collected.iter().map(|&c| super::scoring::card_points(c)).sum(),
            is_friend: table.friend_revealed && s.is_friend,
        })
        .collect();

    TableView {
        room_id: table.room_id.clone(),
        phase: table.phase.to_string(),
        level: table.level,
        trump_suit: table.trump.map(|t| t.suit),
        trump_rank: table.trump.map(|t| t.rank).unwrap_or(table.level),
        dealer_seat: table.dealer_seat,
        starting_dealer: table.starting_dealer,
        current_player: table.current_player,
        trick_leader: table.trick_leader,
        bid_countdown: table.bid_countdown,
        call_records: table
            .call_records
            .iter()
            .map(|r| CallRecordPublic {
                seat: r.seat,
                suit: r.suit,
                rank: r.rank,
                card_count: r.card_count,
            })
            .collect(),
        flipped_bottom: table.bottom[..table.flipped_count].to_vec(),
        current_trick: table
            .current_trick
            .iter()
            .map(|SeatPlay { seat, cards }| TrickPlayPublic {
                seat: *seat,
                cards: cards.clone(),
            })
            .collect(),
        tricks_completed: table.tricks_won.len(),
        called_card: table.called_card.map(|c| CalledCardPublic {
            suit: c.suit,
            rank: c.rank,
            position: c.position,
        }),
        friend_revealed: table.friend_revealed,
        friend_seat: if table.friend_revealed {
            table.friend_seat
        } else {
            None
        },
        solo_mode: table.solo_mode,
        dealer_team: table.dealer_team(),
        seats,
        my_seat,
        my_hand,
        version: table.version,
    }
}

/// Result of a `play_cards` action, as returned to the boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayResultView {
    pub message: String,
    pub downgraded: bool,
    pub played: Vec<Card>,
    pub next_player: Seat,
    pub trick_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trick_winner: Option<Seat>,
    pub friend_revealed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friend_seat: Option<Seat>,
    pub game_ended: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_team: Option<Team>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement: Option<Settlement>,
    /// Persistence trouble that did not affect the table (advisory only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
}

impl PlayResultView {
    pub fn from_outcome(table: &Table, outcome: &PlayOutcome) -> Self {
        Self {
            message: outcome.message.clone(),
            downgraded: outcome.downgraded,
            played: outcome.played.clone(),
            next_player: table.current_player,
            trick_complete: outcome.trick_complete,
            trick_winner: outcome.trick_winner,
            friend_revealed: table.friend_revealed,
            friend_seat: if table.friend_revealed {
                table.friend_seat
            } else {
                None
            },
            game_ended: false,
            winner_team: None,
            final_score: None,
            settlement: None,
            advisory: None,
        }
    }
}
