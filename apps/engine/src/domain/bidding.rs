//! Dealer bidding: initial and counter bids, the bidding window close, and
//! the bottom-flip fallback.

use time::OffsetDateTime;

use super::cards_types::{Card, Suit, TrumpContext};
use super::rules::{BOTTOM_SIZE, MAX_BID_CARDS, SEATS};
use super::state::{
    nth_counter_clockwise, validate_hand_indices, BidStage, CallRecord, Phase, Seat, Table,
};
use crate::errors::domain::{DomainError, ValidationKind};

/// Claim or contest the dealer role by revealing level cards of one suit.
///
/// The first bid must reveal cards of the table's level, by a seat playing at
/// that level. A counter-bid must reveal strictly more cards (at most three)
/// and is one of two variants:
/// - the standing bid's rank: the standing dealer keeps the seat, only the
///   prospective trump suit changes;
/// - the counter-bidder's own level: the counter-bidder takes the dealer seat
///   and re-points trump suit and rank.
pub fn call_dealer(
    table: &mut Table,
    seat: Seat,
    suit: Suit,
    indices: &[usize],
    now: OffsetDateTime,
) -> Result<(), DomainError> {
    let hand = &table.seat_state(seat).hand;
    let selected = validate_hand_indices(indices, hand.len())?;
    let cards: Vec<Card> = selected.iter().map(|&i| hand[i]).collect();

    if cards.len() > MAX_BID_CARDS {
        return Err(DomainError::validation(
            ValidationKind::InvalidBid,
            format!("a bid reveals at most {MAX_BID_CARDS} cards"),
        ));
    }

    // All revealed cards must share one rank and one suit, matching the
    // declared suit.
    let first = cards[0];
    let (bid_suit, bid_rank) = match first {
        Card::Suited { suit, rank } => (suit, rank),
        Card::Joker(_) => {
            return Err(DomainError::validation(
                ValidationKind::NotLevelCards,
                "jokers cannot bid for dealer",
            ))
        }
    };
    if cards.iter().any(|&c| c != first) {
        return Err(DomainError::validation(
            ValidationKind::MixedSuits,
            "bid cards must be level cards of a single suit",
        ));
    }
    if bid_suit != suit {
        return Err(DomainError::validation(
            ValidationKind::MixedSuits,
            "declared suit does not match the revealed cards",
        ));
    }

    let bidder_level = table.seat_state(seat).level;
    let standing = table.call_records.last().map(|r| (r.rank, r.card_count));
    match standing {
        None => {
            // Initial bid: the bidder plays at the table's level.
            if bid_rank != table.level {
                return Err(DomainError::validation(
                    ValidationKind::NotLevelCards,
                    format!(
                        "the first bid reveals {} cards, the level being played",
                        table.level.as_level_str()
                    ),
                ));
            }
            if bidder_level != table.level {
                return Err(DomainError::validation(
                    ValidationKind::InvalidBid,
                    "the first bid must use the bidder's own level",
                ));
            }
            table.dealer_seat = Some(seat);
            table.pending_trump = Some(TrumpContext::new(suit, bid_rank));
        }
        Some((standing_rank, standing_count)) => {
            if cards.len() as u8 <= standing_count {
                return Err(DomainError::validation(
                    ValidationKind::InvalidBid,
                    "a counter-bid must reveal more cards than the standing bid",
                ));
            }
            if bid_rank == standing_rank {
                // Suit-only counter: the standing dealer keeps the seat.
                table.pending_trump = Some(TrumpContext::new(suit, bid_rank));
            } else if bid_rank == bidder_level {
                table.dealer_seat = Some(seat);
                table.pending_trump = Some(TrumpContext::new(suit, bid_rank));
            } else {
                return Err(DomainError::validation(
                    ValidationKind::InvalidBid,
                    "a counter-bid uses the standing rank or the bidder's own level",
                ));
            }
        }
    }

    table.call_records.push(CallRecord {
        seat,
        suit,
        rank: bid_rank,
        card_count: cards.len() as u8,
        timestamp: now,
    });
    Ok(())
}

/// Close the bidding window. With a standing bid the dealer is finalised;
/// with none the bottom-flip fallback opens.
pub fn close_bidding(table: &mut Table) -> Result<(), DomainError> {
    if table.call_records.is_empty() {
        table.phase = Phase::Bidding {
            stage: BidStage::Flipping,
        };
        Ok(())
    } else {
        finalize_dealer(table)
    }
}

/// The effect of one bottom flip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlipOutcome {
    pub card: Card,
    pub flipped_count: usize,
    /// Set once this flip fixed the dealer (phase advanced to discarding).
    pub dealer_seat: Option<Seat>,
}

/// Reveal the next bottom card. The first level card fixes trump suit and
/// hands the dealer seat to the closest seat (counter-clockwise from the
/// starting dealer) currently playing at that level; if the whole bottom
/// flips without a match, the starting dealer takes it with the last
/// non-joker bottom card's suit as trump.
pub fn flip_bottom(table: &mut Table) -> Result<FlipOutcome, DomainError> {
    if table.flipped_count >= table.bottom.len() {
        return Err(DomainError::validation(
            ValidationKind::InvalidCardIndex,
            "all bottom cards have been flipped",
        ));
    }
    let card = table.bottom[table.flipped_count];
    table.flipped_count += 1;

    if card.rank() == Some(table.level) {
        let candidates: Vec<Seat> = (1..=SEATS as u8)
            .filter(|&s| table.seat_state(s).level == table.level)
            .collect();
        if let Some(dealer) = closest_counter_clockwise(table.starting_dealer, &candidates) {
            let suit = card.suit().expect("level cards are suited");
            table.dealer_seat = Some(dealer);
            table.pending_trump = Some(TrumpContext::new(suit, table.level));
            finalize_dealer(table)?;
            return Ok(FlipOutcome {
                card,
                flipped_count: table.flipped_count,
                dealer_seat: Some(dealer),
            });
        }
    }

    if table.flipped_count >= table.bottom.len() {
        // Exhausted: the starting dealer takes it.
        let suit = table
            .bottom
            .iter()
            .rev()
            .find_map(|c| c.suit())
            .unwrap_or(Suit::Hearts);
        table.dealer_seat = Some(table.starting_dealer);
        table.pending_trump = Some(TrumpContext::new(suit, table.level));
        finalize_dealer(table)?;
        return Ok(FlipOutcome {
            card,
            flipped_count: table.flipped_count,
            dealer_seat: Some(table.starting_dealer),
        });
    }

    Ok(FlipOutcome {
        card,
        flipped_count: table.flipped_count,
        dealer_seat: None,
    })
}

/// First candidate met walking counter-clockwise from `start` (inclusive).
fn closest_counter_clockwise(start: Seat, candidates: &[Seat]) -> Option<Seat> {
    if candidates.is_empty() {
        return None;
    }
    (0..SEATS as u8)
        .map(|step| nth_counter_clockwise(start, step))
        .find(|s| candidates.contains(s))
}

/// Fix the trump context, hand the 7 bottom cards to the dealer, and enter
/// the discarding phase.
pub fn finalize_dealer(table: &mut Table) -> Result<(), DomainError> {
    let dealer = table.require_dealer()?;
    let trump = table.pending_trump.ok_or_else(|| {
        DomainError::validation_other("Invariant violated: no standing trump to finalise")
    })?;
    table.trump = Some(trump);

    let bottom: Vec<Card> = table.bottom.drain(..).collect();
    table.flipped_count = 0;
    table.seat_state_mut(dealer).hand.extend(bottom);
    table.phase = Phase::Discarding;
    table.current_player = dealer;
    table.trick_leader = dealer;
    Ok(())
}

/// Dealer buries exactly seven cards; they become the new bottom, unknown to
/// the other seats.
pub fn discard_bottom(
    table: &mut Table,
    seat: Seat,
    indices: &[usize],
) -> Result<(), DomainError> {
    let dealer = table.require_dealer()?;
    if seat != dealer {
        return Err(DomainError::not_your_turn(
            "only the dealer may bury the bottom",
        ));
    }
    if indices.len() != BOTTOM_SIZE {
        return Err(DomainError::validation(
            ValidationKind::InvalidDiscard,
            format!("must select exactly {BOTTOM_SIZE} cards to bury"),
        ));
    }
    let hand_len = table.seat_state(seat).hand.len();
    let selected = validate_hand_indices(indices, hand_len)?;

    let hand = &mut table.seat_state_mut(seat).hand;
    let discarded: Vec<Card> = selected.iter().map(|&i| hand[i]).collect();
    let mut order = selected;
    order.sort_unstable_by(|a, b| b.cmp(a));
    for idx in order {
        hand.remove(idx);
    }
    table.bottom = discarded;

    // A friend already called (or solo) goes straight to play.
    if table.called_card.is_some() || table.solo_mode {
        table.phase = Phase::Playing;
        table.current_player = dealer;
        table.trick_leader = dealer;
    } else {
        table.phase = Phase::CallingFriend;
    }
    Ok(())
}
