//! Replay snapshots: the state entering trick play, and the settled end
//! state. Together with the audited `play_cards` sequence they reconstruct a
//! full round.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::cards_types::{Card, Rank, TrumpContext};
use super::scoring::{Settlement, Team};
use super::state::{CalledCard, Phase, Seat, SeatState, Table};

/// One seat in a snapshot, hand included (snapshots are server-side records,
/// never shown to principals).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSnapshot {
    pub user_id: String,
    pub display_name: String,
    pub level: Rank,
    pub hand: Vec<Card>,
}

/// The table as trick play begins: everything a replay needs to re-run the
/// 31 tricks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialSnapshot {
    pub room_id: String,
    pub level: Rank,
    pub trump: TrumpContext,
    pub dealer_seat: Seat,
    pub starting_dealer: Seat,
    pub seats: Vec<SeatSnapshot>,
    pub bottom: Vec<Card>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub called_card: Option<CalledCard>,
    pub solo_mode: bool,
}

impl InitialSnapshot {
    /// Capture the table at the moment it enters the playing phase.
    pub fn capture(table: &Table) -> Option<Self> {
        Some(Self {
            room_id: table.room_id.clone(),
            level: table.level,
            trump: table.trump?,
            dealer_seat: table.dealer_seat?,
            starting_dealer: table.starting_dealer,
            seats: table
                .seats
                .iter()
                .map(|s| SeatSnapshot {
                    user_id: s.user_id.clone(),
                    display_name: s.display_name.clone(),
                    level: s.level,
                    hand: s.hand.clone(),
                })
                .collect(),
            bottom: table.bottom.clone(),
            called_card: table.called_card,
            solo_mode: table.solo_mode,
        })
    }

    /// Rebuild a playing-phase table from this snapshot. The dealer leads;
    /// the trick archive starts empty.
    pub fn restore(&self) -> Table {
        let now = OffsetDateTime::now_utc();
        let seats: Vec<SeatState> = self
            .seats
            .iter()
            .map(|s| {
                let mut seat = SeatState::new(s.user_id.clone(), s.display_name.clone(), s.level);
                seat.hand = s.hand.clone();
                seat
            })
            .collect();
        let seats: [SeatState; super::rules::SEATS] = seats
            .try_into()
            .expect("snapshot carries exactly five seats");

        let mut table = Table {
            room_id: self.room_id.clone(),
            phase: Phase::Playing,
            level: self.level,
            seats,
            bottom: self.bottom.clone(),
            flipped_count: 0,
            trump: Some(self.trump),
            pending_trump: None,
            dealer_seat: Some(self.dealer_seat),
            starting_dealer: self.starting_dealer,
            current_player: self.dealer_seat,
            trick_leader: self.dealer_seat,
            current_trick: Vec::new(),
            tricks_won: Vec::new(),
            called_card: self.called_card,
            friend_revealed: false,
            friend_seat: None,
            solo_mode: self.solo_mode,
            call_records: Vec::new(),
            bid_countdown: 0,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        if self.solo_mode {
            table.friend_revealed = true;
            table.friend_seat = Some(self.dealer_seat);
            let dealer = self.dealer_seat;
            table.seat_state_mut(dealer).is_friend = true;
        }
        table
    }
}

/// The settled end state of a round; a pure function of the table, so a
/// replay can be checked for exact agreement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalSnapshot {
    pub winner_team: Team,
    pub final_score: u32,
    pub solo: bool,
    pub dealer_seat: Seat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friend_seat: Option<Seat>,
    pub tricks_completed: usize,
    /// Points collected per seat, in seat order.
    pub collected_points: Vec<u32>,
    /// New level per seat, in seat order.
    pub new_levels: Vec<Rank>,
}

impl FinalSnapshot {
    pub fn capture(table: &Table, settlement: &Settlement) -> Self {
        Self {
            winner_team: settlement.winner_team,
            final_score: settlement.final_score,
            solo: settlement.solo,
            dealer_seat: table.dealer_seat.unwrap_or(table.starting_dealer),
            friend_seat: if table.friend_revealed {
                table.friend_seat
            } else {
                None
            },
            tricks_completed: table.tricks_won.len(),
            collected_points: table
                .seats
                .iter()
                .map(|s| s.collected.iter().map(|&c| super::scoring::card_points(c)).sum())
                .collect(),
            new_levels: settlement.seats.iter().map(|s| s.new_level).collect(),
        }
    }
}
