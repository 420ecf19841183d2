//! Dealer bidding tests: initial bids, counter-bids, the window close, and
//! the bottom-flip fallback.

use time::OffsetDateTime;

use super::bidding::{call_dealer, close_bidding, discard_bottom, flip_bottom};
use super::cards_types::{Rank, Suit, TrumpContext};
use super::state::{BidStage, Phase, Table};
use super::test_state_helpers::{make_bidding_table, parse_cards};
use crate::errors::domain::DomainError;

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

fn bidding_table() -> Table {
    let mut table = make_bidding_table(
        [
            parse_cards(&["2H", "2H", "AS"]),
            parse_cards(&["2S", "2S", "2S"]),
            parse_cards(&["3D", "3D", "3D"]),
            parse_cards(&["3H", "KC", "QC"]),
            parse_cards(&["4C", "5C", "6C"]),
        ],
        3,
    );
    table.bottom = parse_cards(&["7C", "8C", "9C", "TC", "JC", "QD", "KD"]);
    table
}

#[test]
fn first_bid_fixes_prospective_dealer_and_trump() {
    let mut table = bidding_table();
    call_dealer(&mut table, 1, Suit::Hearts, &[0, 1], now()).unwrap();
    assert_eq!(table.dealer_seat, Some(1));
    assert_eq!(
        table.pending_trump,
        Some(TrumpContext::new(Suit::Hearts, Rank::Two))
    );
    // Trump itself is not fixed until the window closes.
    assert_eq!(table.trump, None);
    assert_eq!(table.call_records.len(), 1);
    assert_eq!(table.call_records[0].card_count, 2);
}

#[test]
fn first_bid_must_reveal_level_cards() {
    let mut table = bidding_table();
    // 3♥ is not a level card at level 2.
    let err = call_dealer(&mut table, 4, Suit::Hearts, &[0], now()).unwrap_err();
    assert!(matches!(err, DomainError::Validation(..)));
    assert!(table.call_records.is_empty());
}

#[test]
fn first_bid_requires_the_bidder_at_the_table_level() {
    let mut table = bidding_table();
    table.seats[0].level = Rank::Three;
    let err = call_dealer(&mut table, 1, Suit::Hearts, &[0, 1], now()).unwrap_err();
    assert!(err.to_string().contains("own level"));
}

#[test]
fn declared_suit_must_match_the_cards() {
    let mut table = bidding_table();
    let err = call_dealer(&mut table, 1, Suit::Spades, &[0, 1], now()).unwrap_err();
    assert!(matches!(err, DomainError::Validation(..)));
}

#[test]
fn counter_bid_must_reveal_more_cards() {
    let mut table = bidding_table();
    call_dealer(&mut table, 1, Suit::Hearts, &[0, 1], now()).unwrap();
    // Two cards against two is not enough.
    let err = call_dealer(&mut table, 2, Suit::Spades, &[0, 1], now()).unwrap_err();
    assert!(matches!(err, DomainError::Validation(..)));
}

#[test]
fn same_rank_counter_changes_suit_but_keeps_the_dealer() {
    let mut table = bidding_table();
    call_dealer(&mut table, 1, Suit::Hearts, &[0, 1], now()).unwrap();
    call_dealer(&mut table, 2, Suit::Spades, &[0, 1, 2], now()).unwrap();
    assert_eq!(table.dealer_seat, Some(1));
    assert_eq!(
        table.pending_trump,
        Some(TrumpContext::new(Suit::Spades, Rank::Two))
    );
    assert_eq!(table.call_records.len(), 2);
}

#[test]
fn own_level_counter_takes_the_dealer_seat() {
    let mut table = bidding_table();
    table.seats[2].level = Rank::Three;
    call_dealer(&mut table, 1, Suit::Hearts, &[0, 1], now()).unwrap();
    call_dealer(&mut table, 3, Suit::Diamonds, &[0, 1, 2], now()).unwrap();
    assert_eq!(table.dealer_seat, Some(3));
    assert_eq!(
        table.pending_trump,
        Some(TrumpContext::new(Suit::Diamonds, Rank::Three))
    );
}

#[test]
fn close_with_no_bids_opens_the_flip_fallback() {
    let mut table = bidding_table();
    close_bidding(&mut table).unwrap();
    assert_eq!(
        table.phase,
        Phase::Bidding {
            stage: BidStage::Flipping
        }
    );
}

#[test]
fn close_with_a_standing_bid_finalises_the_dealer() {
    let mut table = bidding_table();
    call_dealer(&mut table, 1, Suit::Hearts, &[0, 1], now()).unwrap();
    close_bidding(&mut table).unwrap();
    assert_eq!(table.phase, Phase::Discarding);
    assert_eq!(
        table.trump,
        Some(TrumpContext::new(Suit::Hearts, Rank::Two))
    );
    // The dealer absorbed the bottom.
    assert_eq!(table.seat_state(1).hand.len(), 3 + 7);
    assert!(table.bottom.is_empty());
    assert_eq!(table.current_player, 1);
}

#[test]
fn flip_stops_at_the_first_level_card() {
    let mut table = bidding_table();
    table.bottom = parse_cards(&["7C", "2D", "9C", "TC", "JC", "QD", "KD"]);
    close_bidding(&mut table).unwrap();

    let first = flip_bottom(&mut table).unwrap();
    assert_eq!(first.dealer_seat, None);
    let second = flip_bottom(&mut table).unwrap();
    // 2♦ is a level card: the starting dealer (seat 3, at the level) takes it.
    assert_eq!(second.dealer_seat, Some(3));
    assert_eq!(table.phase, Phase::Discarding);
    assert_eq!(
        table.trump,
        Some(TrumpContext::new(Suit::Diamonds, Rank::Two))
    );
}

#[test]
fn flip_prefers_the_closest_counter_clockwise_seat_at_the_level() {
    let mut table = bidding_table();
    table.bottom = parse_cards(&["2D", "9C", "TC", "JC", "QD", "KD", "7C"]);
    // Only seats 1 and 2 still play level 2; starting dealer is 3.
    for seat in [3u8, 4, 5] {
        table.seats[(seat - 1) as usize].level = Rank::Five;
    }
    close_bidding(&mut table).unwrap();
    let outcome = flip_bottom(&mut table).unwrap();
    // Counter-clockwise from 3: 3, 2, 1; seat 2 is closest.
    assert_eq!(outcome.dealer_seat, Some(2));
}

#[test]
fn flip_exhaustion_falls_back_to_the_starting_dealer() {
    let mut table = bidding_table();
    table.bottom = parse_cards(&["7C", "8C", "9C", "TC", "JC", "QD", "BJ"]);
    close_bidding(&mut table).unwrap();
    let mut last = None;
    for _ in 0..7 {
        last = Some(flip_bottom(&mut table).unwrap());
    }
    // Last non-joker bottom card is Q♦.
    assert_eq!(last.unwrap().dealer_seat, Some(3));
    assert_eq!(
        table.trump,
        Some(TrumpContext::new(Suit::Diamonds, Rank::Two))
    );
    assert_eq!(table.phase, Phase::Discarding);
}

#[test]
fn discard_restores_a_seven_card_bottom() {
    let mut table = bidding_table();
    call_dealer(&mut table, 1, Suit::Hearts, &[0, 1], now()).unwrap();
    close_bidding(&mut table).unwrap();
    assert_eq!(table.seat_state(1).hand.len(), 10);

    // Only the dealer may bury.
    let err = discard_bottom(&mut table, 2, &[0, 1, 2, 3, 4, 5, 6]).unwrap_err();
    assert!(matches!(err, DomainError::NotYourTurn(_)));

    // Exactly seven cards.
    let err = discard_bottom(&mut table, 1, &[0, 1, 2]).unwrap_err();
    assert!(matches!(err, DomainError::Validation(..)));

    discard_bottom(&mut table, 1, &[3, 4, 5, 6, 7, 8, 9]).unwrap();
    assert_eq!(table.bottom.len(), 7);
    assert_eq!(table.seat_state(1).hand.len(), 3);
    assert_eq!(table.phase, Phase::CallingFriend);
}

#[test]
fn discard_goes_straight_to_play_when_the_friend_is_already_called() {
    let mut table = bidding_table();
    call_dealer(&mut table, 1, Suit::Hearts, &[0, 1], now()).unwrap();
    close_bidding(&mut table).unwrap();
    super::friend::call_friend(&mut table, 1, Suit::Spades, Rank::King, 1).unwrap();
    discard_bottom(&mut table, 1, &[3, 4, 5, 6, 7, 8, 9]).unwrap();
    assert_eq!(table.phase, Phase::Playing);
    assert_eq!(table.current_player, 1);
}
