//! Friend-call tests: the declaration, solo detection, and reveal-on-play.

use time::OffsetDateTime;

use super::cards_types::{Rank, Suit, TrumpContext};
use super::friend::{call_friend, note_played_cards};
use super::state::{CallRecord, Phase, Table};
use super::test_state_helpers::{make_playing_table, parse_cards};
use crate::errors::domain::DomainError;

const TRUMP: TrumpContext = TrumpContext::new(Suit::Hearts, Rank::Two);

fn table_with_dealer_hand(dealer_hand: &[&str], bottom: &[&str]) -> Table {
    let mut table = make_playing_table(
        [
            parse_cards(dealer_hand),
            parse_cards(&["3C"]),
            parse_cards(&["4C"]),
            parse_cards(&["5C"]),
            parse_cards(&["6C"]),
        ],
        TRUMP,
        1,
    );
    table.phase = Phase::CallingFriend;
    table.bottom = parse_cards(bottom);
    table
}

#[test]
fn only_the_dealer_may_call() {
    let mut table = table_with_dealer_hand(&["3S"], &[]);
    let err = call_friend(&mut table, 2, Suit::Hearts, Rank::Ace, 1).unwrap_err();
    assert!(matches!(err, DomainError::NotYourTurn(_)));
}

#[test]
fn position_must_be_one_to_three() {
    let mut table = table_with_dealer_hand(&["3S"], &[]);
    assert!(call_friend(&mut table, 1, Suit::Hearts, Rank::Ace, 0).is_err());
    assert!(call_friend(&mut table, 1, Suit::Hearts, Rank::Ace, 4).is_err());
}

#[test]
fn ranks_shown_during_bidding_are_off_limits() {
    let mut table = table_with_dealer_hand(&["3S"], &[]);
    table.call_records.push(CallRecord {
        seat: 2,
        suit: Suit::Spades,
        rank: Rank::Two,
        card_count: 1,
        timestamp: OffsetDateTime::now_utc(),
    });
    // Any suit of the bid rank is rejected.
    let err = call_friend(&mut table, 1, Suit::Diamonds, Rank::Two, 1).unwrap_err();
    assert!(matches!(err, DomainError::Validation(..)));
}

#[test]
fn normal_call_stays_pending_and_advances_to_play() {
    let mut table = table_with_dealer_hand(&["3S"], &[]);
    let outcome = call_friend(&mut table, 1, Suit::Hearts, Rank::Ace, 1).unwrap();
    assert!(!outcome.solo_mode);
    assert!(!outcome.friend_revealed);
    assert!(outcome.advanced_to_playing);
    assert_eq!(table.phase, Phase::Playing);
    assert_eq!(table.current_player, 1);
    assert!(!table.friend_revealed);
}

#[test]
fn self_unreachable_call_triggers_solo_mode() {
    // Dealer holds two A♥ and calls the 2nd occurrence: nobody else can ever
    // answer it.
    let mut table = table_with_dealer_hand(&["AH", "AH", "3S"], &[]);
    let outcome = call_friend(&mut table, 1, Suit::Hearts, Rank::Ace, 2).unwrap();
    assert!(outcome.solo_mode);
    assert!(outcome.friend_revealed);
    assert_eq!(table.friend_seat, Some(1));
    assert!(table.solo_mode);
    assert_eq!(table.phase, Phase::Playing);
}

#[test]
fn bottom_copies_count_toward_solo_detection() {
    let mut table = table_with_dealer_hand(&["AH", "3S"], &["AH"]);
    let outcome = call_friend(&mut table, 1, Suit::Hearts, Rank::Ace, 2).unwrap();
    assert!(outcome.solo_mode);
}

#[test]
fn friend_reveals_on_the_nth_occurrence() {
    let mut table = table_with_dealer_hand(&["3S"], &[]);
    call_friend(&mut table, 1, Suit::Hearts, Rank::Ace, 2).unwrap();

    // First A♥ (seat 4): counted, no reveal.
    assert!(!note_played_cards(&mut table, 4, &parse_cards(&["AH"])));
    assert!(!table.friend_revealed);
    assert_eq!(table.called_card.unwrap().seen_count, 1);

    // Second A♥ (seat 2): the friend reveals.
    assert!(note_played_cards(&mut table, 2, &parse_cards(&["AH"])));
    assert!(table.friend_revealed);
    assert_eq!(table.friend_seat, Some(2));
    assert!(table.seat_state(2).is_friend);

    // Further copies change nothing.
    assert!(!note_played_cards(&mut table, 5, &parse_cards(&["AH"])));
    assert_eq!(table.friend_seat, Some(2));
}

#[test]
fn a_pair_of_called_cards_advances_the_count_twice() {
    let mut table = table_with_dealer_hand(&["3S"], &[]);
    call_friend(&mut table, 1, Suit::Hearts, Rank::Ace, 2).unwrap();
    assert!(note_played_cards(&mut table, 3, &parse_cards(&["AH", "AH"])));
    assert_eq!(table.friend_seat, Some(3));
}

#[test]
fn duplicate_call_is_a_conflict() {
    let mut table = table_with_dealer_hand(&["3S"], &[]);
    call_friend(&mut table, 1, Suit::Hearts, Rank::Ace, 1).unwrap();
    let err = call_friend(&mut table, 1, Suit::Spades, Rank::King, 1).unwrap_err();
    assert!(matches!(err, DomainError::Conflict(..)));
}
