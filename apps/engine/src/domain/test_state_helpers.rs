//! Shared constructors for domain tests.

use time::OffsetDateTime;

use super::cards_types::{Card, Rank, TrumpContext};
use super::rules::SEATS;
use super::state::{BidStage, Phase, Seat, SeatState, Table};

pub(crate) fn parse_cards(tokens: &[&str]) -> Vec<Card> {
    tokens
        .iter()
        .map(|t| t.parse::<Card>().expect("hardcoded valid card token"))
        .collect()
}

fn seats_with_hands(hands: [Vec<Card>; SEATS]) -> [SeatState; SEATS] {
    let mut iter = hands.into_iter();
    std::array::from_fn(|i| {
        let mut seat = SeatState::new(
            format!("u{}", i + 1),
            format!("User {}", i + 1),
            Rank::Two,
        );
        seat.hand = iter.next().unwrap_or_default();
        seat
    })
}

/// A table in the bidding window with the given hands dealt.
pub(crate) fn make_bidding_table(hands: [Vec<Card>; SEATS], starting_dealer: Seat) -> Table {
    let now = OffsetDateTime::now_utc();
    Table {
        room_id: "test-room".into(),
        phase: Phase::Bidding {
            stage: BidStage::Counting,
        },
        level: Rank::Two,
        seats: seats_with_hands(hands),
        bottom: Vec::new(),
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
        bid_countdown: 10,
        version: 0,
        created_at: now,
        updated_at: now,
    }
}

/// A table mid-play: trump fixed, dealer leading.
pub(crate) fn make_playing_table(
    hands: [Vec<Card>; SEATS],
    trump: TrumpContext,
    dealer: Seat,
) -> Table {
    let mut table = make_bidding_table(hands, dealer);
    table.phase = Phase::Playing;
    table.trump = Some(trump);
    table.dealer_seat = Some(dealer);
    table.current_player = dealer;
    table.trick_leader = dealer;
    table
}
