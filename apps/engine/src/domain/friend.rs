//! Friend call: the dealer's (suit, rank, position) declaration, solo-mode
//! detection, and the reveal-on-play tracking.

use super::cards_types::{Card, Rank, Suit};
use super::state::{CalledCard, Phase, Seat, Table};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

/// The effect of a friend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FriendCallOutcome {
    pub solo_mode: bool,
    pub friend_revealed: bool,
    /// Set when the call also moved the table into the playing phase.
    pub advanced_to_playing: bool,
}

/// Declare the friend card. If the dealer's own hand plus the bottom already
/// hold `position` copies, the declaration can never be answered from another
/// seat: solo mode activates and the dealer plays one against four.
pub fn call_friend(
    table: &mut Table,
    seat: Seat,
    suit: Suit,
    rank: Rank,
    position: u8,
) -> Result<FriendCallOutcome, DomainError> {
    let dealer = table.require_dealer()?;
    if seat != dealer {
        return Err(DomainError::not_your_turn(
            "only the dealer may call the friend",
        ));
    }
    if !(1..=3).contains(&position) {
        return Err(DomainError::validation(
            ValidationKind::InvalidFriendCall,
            "position must be between 1 and 3",
        ));
    }
    if table.called_card.is_some() {
        return Err(DomainError::conflict(
            ConflictKind::Other("FRIEND_ALREADY_CALLED".into()),
            "the friend card has already been called",
        ));
    }
    // A rank shown during bidding is off-limits, whatever its suit.
    if table.call_records.iter().any(|r| r.rank == rank) {
        return Err(DomainError::validation(
            ValidationKind::InvalidFriendCall,
            "cannot call a rank that was shown during bidding",
        ));
    }

    let target = Card::suited(suit, rank);
    let in_dealer_hand = table
        .seat_state(dealer)
        .hand
        .iter()
        .filter(|&&c| c == target)
        .count();
    let in_bottom = table.bottom.iter().filter(|&&c| c == target).count();
    let unreachable = (in_dealer_hand + in_bottom) as u8 >= position;

    table.called_card = Some(CalledCard {
        suit,
        rank,
        position,
        seen_count: 0,
    });

    if unreachable {
        table.solo_mode = true;
        table.friend_revealed = true;
        table.friend_seat = Some(dealer);
        table.seat_state_mut(dealer).is_friend = true;
    }

    let advanced = if table.phase == Phase::CallingFriend {
        table.phase = Phase::Playing;
        table.current_player = dealer;
        table.trick_leader = dealer;
        true
    } else {
        false
    };

    Ok(FriendCallOutcome {
        solo_mode: table.solo_mode,
        friend_revealed: table.friend_revealed,
        advanced_to_playing: advanced,
    })
}

/// Track called-card occurrences in a play. The seat that lands the
/// `position`-th public copy becomes the friend; counting stops there so the
/// reveal fires exactly once.
pub fn note_played_cards(table: &mut Table, seat: Seat, cards: &[Card]) -> bool {
    if table.friend_revealed {
        return false;
    }
    let Some(mut called) = table.called_card else {
        return false;
    };
    let target = Card::suited(called.suit, called.rank);
    for &card in cards {
        if card != target {
            continue;
        }
        called.seen_count += 1;
        if called.seen_count == called.position {
            table.called_card = Some(called);
            table.friend_revealed = true;
            table.friend_seat = Some(seat);
            table.seat_state_mut(seat).is_friend = true;
            return true;
        }
    }
    table.called_card = Some(called);
    false
}
