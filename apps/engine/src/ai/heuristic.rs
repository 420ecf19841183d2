//! GreedyHeuristic: a deterministic baseline for automated seats.
//!
//! Goals:
//! - Stay 100% legal by building plays with the engine's own constructors.
//! - Be deterministic (no RNG), so seeded games replay exactly.
//!
//! Lead strategy: lead the lowest pair from the longest plain suit when one
//! exists, otherwise the lowest single from the longest plain suit; an
//! all-trump hand leads its lowest trump. Throws are never attempted.
//!
//! Follow strategy: the engine's default follow (shape duties, then weakest
//! lead-class cards, then lowest discards).
//!
//! Discard: bury the seven weakest non-trump, non-point cards first.
//!
//! Friend call: the shortest plain suit's highest callable rank, positioned
//! just past the copies the dealer already controls.

use super::trait_def::{AiError, AutoSeat};
use crate::domain::cards_logic::{count_in_class, strength, suit_class, SuitClass};
use crate::domain::combos::find_group_in_class;
use crate::domain::scoring::card_points;
use crate::domain::tricks::{default_follow, indices_of_cards};
use crate::domain::{Card, Rank, Seat, Suit, Table};

#[derive(Debug, Clone, Default)]
pub struct GreedyHeuristic;

impl GreedyHeuristic {
    pub fn new() -> Self {
        Self
    }

    /// Plain suit where the hand is longest; None when the hand is all trump.
    fn longest_plain_class(table: &Table, hand: &[Card]) -> Option<SuitClass> {
        let trump = table.trump?;
        Suit::ALL
            .iter()
            .map(|&s| SuitClass::Plain(s))
            .filter(|&class| class != SuitClass::Plain(trump.suit))
            .max_by_key(|&class| count_in_class(hand, class, &trump))
            .filter(|&class| count_in_class(hand, class, &trump) > 0)
    }

    fn choose_lead(&self, table: &Table, seat: Seat) -> Result<Vec<usize>, AiError> {
        let trump = table
            .trump
            .ok_or_else(|| AiError::Internal("no trump during play".into()))?;
        let hand = &table.seat_state(seat).hand;
        if hand.is_empty() {
            return Err(AiError::Internal("empty hand on lead".into()));
        }

        let class = Self::longest_plain_class(table, hand).unwrap_or(SuitClass::Trump);
        if let Some(card) = find_group_in_class(hand, class, 2, &trump) {
            return indices_of_cards(hand, &[card, card])
                .map_err(|e| AiError::Internal(e.to_string()));
        }
        let lowest = (0..hand.len())
            .filter(|&i| suit_class(hand[i], &trump) == class)
            .min_by_key(|&i| strength(hand[i], class, &trump))
            .unwrap_or(0);
        Ok(vec![lowest])
    }
}

impl AutoSeat for GreedyHeuristic {
    fn choose_discard(&self, table: &Table, seat: Seat) -> Result<Vec<usize>, AiError> {
        let trump = table
            .trump
            .ok_or_else(|| AiError::Internal("no trump while discarding".into()))?;
        let hand = &table.seat_state(seat).hand;
        let mut indices: Vec<usize> = (0..hand.len()).collect();
        // Weakest first: plain before trump, point cards last within a band.
        indices.sort_by_key(|&i| {
            let card = hand[i];
            let is_trump = suit_class(card, &trump) == SuitClass::Trump;
            (
                is_trump,
                card_points(card) > 0,
                strength(card, SuitClass::Trump, &trump),
                card.rank().map(|r| r.value()).unwrap_or(u8::MAX),
            )
        });
        indices.truncate(crate::domain::rules::BOTTOM_SIZE);
        Ok(indices)
    }

    fn choose_friend(&self, table: &Table, seat: Seat) -> Result<(Suit, Rank, u8), AiError> {
        let trump = table
            .trump
            .ok_or_else(|| AiError::Internal("no trump while calling the friend".into()))?;
        let hand = &table.seat_state(seat).hand;
        let banned: Vec<Rank> = table.call_records.iter().map(|r| r.rank).collect();

        // Shortest plain suit: the dealer is least likely to hold the copies.
        let suit = Suit::ALL
            .iter()
            .copied()
            .filter(|&s| s != trump.suit)
            .min_by_key(|&s| count_in_class(hand, SuitClass::Plain(s), &trump))
            .unwrap_or(Suit::Spades);

        // Highest rank that is neither the trump rank nor a bidding rank.
        let rank = Rank::ALL
            .iter()
            .rev()
            .copied()
            .find(|r| *r != trump.rank && !banned.contains(r))
            .ok_or_else(|| AiError::Internal("no callable rank left".into()))?;

        let target = Card::suited(suit, rank);
        let own = hand.iter().filter(|&&c| c == target).count()
            + table.bottom.iter().filter(|&&c| c == target).count();
        let position = ((own as u8) + 1).min(3);
        Ok((suit, rank, position))
    }

    fn choose_play(&self, table: &Table, seat: Seat) -> Result<Vec<usize>, AiError> {
        if table.current_trick.is_empty() {
            self.choose_lead(table, seat)
        } else {
            default_follow(table, seat).map_err(|e| AiError::Internal(e.to_string()))
        }
    }
}
