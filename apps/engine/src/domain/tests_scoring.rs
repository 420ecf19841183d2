//! Settlement tests: points, the bottom multiplier, winner decision, and the
//! level tables.

use super::cards_types::{Card, Rank, Suit, TrumpContext};
use super::scoring::{
    bottom_multiplier, card_points, level_delta, settle, upgrade_level, Team,
};
use super::state::{CompletedTrick, SeatPlay, Table};
use super::test_state_helpers::{make_playing_table, parse_cards};

const TRUMP: TrumpContext = TrumpContext::new(Suit::Hearts, Rank::Two);

#[test]
fn point_cards_are_fives_tens_and_kings() {
    assert_eq!(card_points("5S".parse::<Card>().unwrap()), 5);
    assert_eq!(card_points("TD".parse::<Card>().unwrap()), 10);
    assert_eq!(card_points("KH".parse::<Card>().unwrap()), 10);
    assert_eq!(card_points("AS".parse::<Card>().unwrap()), 0);
    assert_eq!(card_points(Card::BIG_JOKER), 0);
}

#[test]
fn pack_carries_300_points() {
    let total: u32 = super::dealing::full_pack()
        .iter()
        .map(|&c| card_points(c))
        .sum();
    assert_eq!(total, 300);
}

#[test]
fn multiplier_follows_the_final_lead_shape() {
    assert_eq!(bottom_multiplier(&parse_cards(&["AS"]), &TRUMP), 2);
    assert_eq!(bottom_multiplier(&parse_cards(&["AS", "AS"]), &TRUMP), 4);
    assert_eq!(bottom_multiplier(&parse_cards(&["AS", "AS", "AS"]), &TRUMP), 8);
    // Tractor of two pairs: ×4; of three pairs: ×6.
    assert_eq!(
        bottom_multiplier(&parse_cards(&["9S", "9S", "TS", "TS"]), &TRUMP),
        4
    );
    assert_eq!(
        bottom_multiplier(&parse_cards(&["8S", "8S", "9S", "9S", "TS", "TS"]), &TRUMP),
        6
    );
    // Tractor of two triples: ×4.
    assert_eq!(
        bottom_multiplier(&parse_cards(&["9S", "9S", "9S", "TS", "TS", "TS"]), &TRUMP),
        4
    );
}

#[test]
fn level_tables_match_the_two_vs_three_rows() {
    assert_eq!(level_delta(0, false, true), 3);
    assert_eq!(level_delta(1, false, true), 2);
    assert_eq!(level_delta(59, false, true), 2);
    assert_eq!(level_delta(60, false, true), 1);
    assert_eq!(level_delta(119, false, true), 1);
    assert_eq!(level_delta(120, false, false), 1);
    assert_eq!(level_delta(179, false, false), 1);
    assert_eq!(level_delta(180, false, false), 2);
    assert_eq!(level_delta(240, false, false), 3);
    assert_eq!(level_delta(300, false, false), 4);
}

#[test]
fn level_tables_match_the_solo_rows() {
    assert_eq!(level_delta(0, true, true), 4);
    assert_eq!(level_delta(59, true, true), 4);
    assert_eq!(level_delta(60, true, true), 2);
    assert_eq!(level_delta(119, true, true), 2);
    assert_eq!(level_delta(120, true, false), 1);
    assert_eq!(level_delta(179, true, false), 1);
    assert_eq!(level_delta(180, true, false), 2);
    assert_eq!(level_delta(299, true, false), 2);
}

#[test]
fn ladder_saturates_at_ace() {
    assert_eq!(upgrade_level(Rank::Two, 3), Rank::Five);
    assert_eq!(upgrade_level(Rank::King, 1), Rank::Ace);
    assert_eq!(upgrade_level(Rank::King, 5), Rank::Ace);
    assert_eq!(upgrade_level(Rank::Ace, 2), Rank::Ace);
}

/// A settled table: dealer seat 1, friend seat 2 (revealed unless solo),
/// defender points split over seats 3..5, final trick as given.
fn settled_table(
    defender_cards: &[&str],
    final_trick_lead: &[&str],
    final_winner: u8,
    revealed: bool,
) -> Table {
    let mut table = make_playing_table(
        [vec![], vec![], vec![], vec![], vec![]],
        TRUMP,
        1,
    );
    if revealed {
        table.friend_revealed = true;
        table.friend_seat = Some(2);
        table.seats[1].is_friend = true;
    }
    table.seats[2].collected = parse_cards(defender_cards);
    table.tricks_won.push(CompletedTrick {
        winner: final_winner,
        plays: vec![SeatPlay {
            seat: 1,
            cards: parse_cards(final_trick_lead),
        }],
    });
    table
}

#[test]
fn dealer_team_win_without_the_bottom() {
    // Defenders collected 95; the dealer team took the last trick.
    let mut cards = vec!["KS"; 8]; // 80
    cards.extend(["TS", "5H"]); // 95
    let mut table = settled_table(&cards, &["AS"], 1, true);
    table.bottom = parse_cards(&["TS", "TS"]);

    let settlement = settle(&table).unwrap();
    assert_eq!(settlement.winner_team, Team::Dealer);
    assert_eq!(settlement.final_score, 95);
    assert_eq!(settlement.multiplier, 0);
    assert_eq!(settlement.dealer_levels_up, 1);
    assert_eq!(settlement.defender_levels_up, 0);
    // Seats 1 and 2 won; their levels moved.
    let s1 = &settlement.seats[0];
    assert!(s1.is_winner);
    assert_eq!(s1.new_level, Rank::Three);
    assert!(!settlement.seats[2].is_winner);
    assert_eq!(settlement.seats[2].new_level, Rank::Two);
}

#[test]
fn defenders_take_the_bottom_with_a_pair_multiplier() {
    // 110 from tricks; the final trick was led with a pair and won by a
    // defender; 20 raw points in the bottom → 110 + 20×4 = 190.
    let cards = vec!["KS"; 11]; // 110
    let mut table = settled_table(&cards, &["AS", "AS"], 3, true);
    table.bottom = parse_cards(&["TS", "TS"]);

    let settlement = settle(&table).unwrap();
    assert_eq!(settlement.multiplier, 4);
    assert_eq!(settlement.final_score, 190);
    assert_eq!(settlement.winner_team, Team::Defenders);
    assert_eq!(settlement.defender_levels_up, 2);
    assert_eq!(settlement.dealer_levels_up, 0);
    assert!(settlement.seats[2].is_winner);
    assert!(!settlement.seats[0].is_winner);
}

#[test]
fn unrevealed_friend_settles_as_solo() {
    let table = settled_table(&["KS", "KS"], &["AS"], 1, false);
    let settlement = settle(&table).unwrap();
    assert!(settlement.solo);
    // 20 points, dealer won, solo: four levels.
    assert_eq!(settlement.dealer_levels_up, 4);
    // Only the dealer is on the winning team.
    assert!(settlement.seats[0].is_winner);
    assert!(!settlement.seats[1].is_winner);
}

#[test]
fn exactly_one_side_gains_levels_for_every_score() {
    for score in (0..=360).step_by(5) {
        for solo in [false, true] {
            let dealer_won = score < 120;
            let delta = level_delta(score, solo, dealer_won);
            assert!(delta >= 1, "score {score} solo {solo} must move a team");
        }
    }
}
