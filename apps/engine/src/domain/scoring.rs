//! Settlement: point cards, the bottom multiplier, winner team, and the
//! level-upgrade tables.

use serde::{Deserialize, Serialize};

use super::cards_types::{Card, Rank};
use super::combos::{classify_lead, ComboShape};
use super::state::{Seat, Table};
use crate::errors::domain::DomainError;

/// Every 5 is worth 5 points, every 10 and K worth 10: 300 points in the
/// pack.
pub fn card_points(card: Card) -> u32 {
    match card.rank() {
        Some(Rank::Five) => 5,
        Some(Rank::Ten) | Some(Rank::King) => 10,
        _ => 0,
    }
}

pub fn is_scoring_card(card: Card) -> bool {
    card_points(card) > 0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Dealer,
    Defenders,
}

/// Multiplier the bottom earns when the defenders take the final trick,
/// keyed on the final trick's lead shape: single ×2, pair ×4, triple ×8,
/// tractors ×2·groups. A failed-throw single counts as a single.
pub fn bottom_multiplier(final_lead: &[Card], trump: &super::cards_types::TrumpContext) -> u32 {
    let Ok(combo) = classify_lead(final_lead, trump) else {
        return 2;
    };
    match combo.shape {
        ComboShape::Single => 2,
        ComboShape::Pair => 4,
        ComboShape::Triple => 8,
        ComboShape::Tractor { group_count, .. } => 2 * u32::from(group_count),
        ComboShape::Throw => 2,
    }
}

/// Advance a level by `steps` on the ladder 2..A, saturating at A.
pub fn upgrade_level(level: Rank, steps: u8) -> Rank {
    let idx = (level as usize + steps as usize).min(Rank::ALL.len() - 1);
    Rank::ALL[idx]
}

/// Per-seat settlement record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSettlement {
    pub seat: Seat,
    pub user_id: String,
    pub old_level: Rank,
    pub new_level: Rank,
    pub is_winner: bool,
}

/// The complete settlement of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub winner_team: Team,
    /// Points the defenders collected from tricks.
    pub collected_points: u32,
    /// Raw points buried in the bottom.
    pub bottom_points: u32,
    /// Bottom multiplier; 0 when the dealer team took the final trick.
    pub multiplier: u32,
    /// Adjusted defender score.
    pub final_score: u32,
    pub solo: bool,
    pub dealer_levels_up: u8,
    pub defender_levels_up: u8,
    pub seats: Vec<SeatSettlement>,
}

/// Levels gained by the winning side, per the upgrade tables.
pub(crate) fn level_delta(score: u32, solo: bool, dealer_won: bool) -> u8 {
    if solo {
        if dealer_won {
            match score {
                0..=59 => 4,
                _ => 2, // 60..=119
            }
        } else {
            match score {
                120..=179 => 1,
                _ => 2, // 180+
            }
        }
    } else if dealer_won {
        match score {
            0 => 3,
            1..=59 => 2,
            _ => 1, // 60..=119
        }
    } else {
        match score {
            120..=179 => 1,
            180..=239 => 2,
            240..=299 => 3,
            _ => 4, // 300+
        }
    }
}

/// Settle a finished round. The table's 31 tricks are archived and every hand
/// is empty; this is read-only over the table.
pub fn settle(table: &Table) -> Result<Settlement, DomainError> {
    let trump = table.require_trump()?;
    let dealer = table.require_dealer()?;

    // A friend call left unanswered (the remaining copies were buried) means
    // the dealer fought alone: the solo table applies.
    let solo = table.solo_mode || !table.friend_revealed;
    let dealer_team: Vec<Seat> = if solo {
        vec![dealer]
    } else {
        table.dealer_team()
    };

    let collected_points: u32 = table
        .seats
        .iter()
        .enumerate()
        .filter(|(i, _)| !dealer_team.contains(&(*i as Seat + 1)))
        .flat_map(|(_, s)| s.collected.iter())
        .map(|&c| card_points(c))
        .sum();

    let bottom_points: u32 = table.bottom.iter().map(|&c| card_points(c)).sum();

    let final_trick = table.tricks_won.last().ok_or_else(|| {
        DomainError::validation_other("cannot settle before any trick completed")
    })?;
    let defenders_took_bottom = !dealer_team.contains(&final_trick.winner);
    let multiplier = if defenders_took_bottom {
        bottom_multiplier(&final_trick.plays[0].cards, &trump)
    } else {
        0
    };
    let final_score = collected_points + bottom_points * multiplier;

    let dealer_won = final_score < 120;
    let winner_team = if dealer_won {
        Team::Dealer
    } else {
        Team::Defenders
    };
    let delta = level_delta(final_score, solo, dealer_won);
    let (dealer_levels_up, defender_levels_up) = if dealer_won { (delta, 0) } else { (0, delta) };

    let seats = table
        .seats
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let seat = i as Seat + 1;
            let on_dealer_team = dealer_team.contains(&seat);
            let is_winner = on_dealer_team == dealer_won;
            let steps = if is_winner { delta } else { 0 };
            SeatSettlement {
                seat,
                user_id: s.user_id.clone(),
                old_level: s.level,
                new_level: upgrade_level(s.level, steps),
                is_winner,
            }
        })
        .collect();

    Ok(Settlement {
        winner_team,
        collected_points,
        bottom_points,
        multiplier,
        final_score,
        solo,
        dealer_levels_up,
        defender_levels_up,
        seats,
    })
}
