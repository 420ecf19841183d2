//! Combination recognition tests.

use super::cards_logic::SuitClass;
use super::cards_types::{Card, Rank, Suit, TrumpContext};
use super::combos::{
    classify_lead, classify_strict, decompose_throw, decomposition_sizes, find_tractor_in_class,
    has_group_above, tractor_dimensions, ComboShape,
};
use super::test_state_helpers::parse_cards;

const TRUMP: TrumpContext = TrumpContext::new(Suit::Hearts, Rank::Two);

#[test]
fn classifies_singles_pairs_triples() {
    let single = classify_lead(&parse_cards(&["AS"]), &TRUMP).unwrap();
    assert_eq!(single.shape, ComboShape::Single);
    assert_eq!(single.class, SuitClass::Plain(Suit::Spades));

    let pair = classify_lead(&parse_cards(&["TS", "TS"]), &TRUMP).unwrap();
    assert_eq!(pair.shape, ComboShape::Pair);

    let triple = classify_lead(&parse_cards(&["KC", "KC", "KC"]), &TRUMP).unwrap();
    assert_eq!(triple.shape, ComboShape::Triple);
}

#[test]
fn two_same_rank_cards_of_different_suits_are_not_a_pair() {
    // Both are off-suit level cards (trump class), but not identical cards.
    let combo = classify_lead(&parse_cards(&["2S", "2C"]), &TRUMP).unwrap();
    assert_eq!(combo.shape, ComboShape::Throw);
}

#[test]
fn mixed_suits_rejected() {
    assert!(classify_lead(&parse_cards(&["AS", "AH"]), &TRUMP).is_err());
}

#[test]
fn joker_pair_is_a_pair() {
    let combo = classify_lead(&parse_cards(&["BJ", "BJ"]), &TRUMP).unwrap();
    assert_eq!(combo.shape, ComboShape::Pair);
    assert_eq!(combo.class, SuitClass::Trump);
}

#[test]
fn plain_tractor_of_pairs() {
    let cards = parse_cards(&["9S", "9S", "TS", "TS"]);
    assert_eq!(tractor_dimensions(&cards, &TRUMP), Some((2, 2)));
    let combo = classify_lead(&cards, &TRUMP).unwrap();
    assert_eq!(
        combo.shape,
        ComboShape::Tractor {
            group_size: 2,
            group_count: 2
        }
    );
}

#[test]
fn tractor_of_triples() {
    let cards = parse_cards(&["7D", "7D", "7D", "8D", "8D", "8D"]);
    assert_eq!(tractor_dimensions(&cards, &TRUMP), Some((3, 2)));
}

#[test]
fn plain_tractor_skips_the_trump_rank() {
    // Level 4: 3s and 5s of spades are adjacent.
    let ctx = TrumpContext::new(Suit::Hearts, Rank::Four);
    let cards = parse_cards(&["3S", "3S", "5S", "5S"]);
    assert_eq!(tractor_dimensions(&cards, &ctx), Some((2, 2)));
    // At level 2 they are not adjacent.
    assert_eq!(tractor_dimensions(&cards, &TRUMP), None);
}

#[test]
fn trump_tractor_spans_the_strips() {
    // Hearts trump at level 2: A♥A♥ (top suited rank) chains into 2♥2♥
    // (suited level), then 2♠2♠ (off-suit level), then jokers.
    let cards = parse_cards(&["AH", "AH", "2H", "2H"]);
    assert_eq!(tractor_dimensions(&cards, &TRUMP), Some((2, 2)));

    let long = parse_cards(&["2H", "2H", "2S", "2S", "SJ", "SJ", "BJ", "BJ"]);
    assert_eq!(tractor_dimensions(&long, &TRUMP), Some((2, 4)));
}

#[test]
fn two_offsuit_level_pairs_do_not_chain() {
    // 2♠2♠ and 2♣2♣ share the same ladder position.
    let cards = parse_cards(&["2S", "2S", "2C", "2C"]);
    assert_eq!(tractor_dimensions(&cards, &TRUMP), None);
}

#[test]
fn nonconsecutive_pairs_are_a_throw() {
    let cards = parse_cards(&["9S", "9S", "JS", "JS"]);
    assert_eq!(tractor_dimensions(&cards, &TRUMP), None);
    let combo = classify_lead(&cards, &TRUMP).unwrap();
    assert_eq!(combo.shape, ComboShape::Throw);
}

#[test]
fn throw_decomposition_orders_triples_pairs_singles() {
    let cards = parse_cards(&["AS", "AS", "5S", "KS", "KS", "KS"]);
    let groups = decompose_throw(&cards, &TRUMP);
    let sizes: Vec<u8> = groups.iter().map(|g| g.size).collect();
    assert_eq!(sizes, vec![3, 2, 1]);
    assert_eq!(groups[0].cards[0], "KS".parse::<Card>().unwrap());
    assert_eq!(groups[2].cards[0], "5S".parse::<Card>().unwrap());
}

#[test]
fn decomposition_sizes_match_shape_multisets() {
    let a = parse_cards(&["AS", "AS", "5S"]);
    let b = parse_cards(&["KS", "KS", "3S"]);
    assert_eq!(
        decomposition_sizes(&a, &TRUMP),
        decomposition_sizes(&b, &TRUMP)
    );
}

#[test]
fn has_group_above_respects_class_and_ladder() {
    let hand = parse_cards(&["6C", "6C", "KS", "QD"]);
    let five_clubs_key = super::cards_logic::ladder_index("5C".parse().unwrap(), &TRUMP);
    // A pair of 6♣ beats a pair keyed at 5♣.
    assert!(has_group_above(&hand, SuitClass::Plain(Suit::Clubs), 2, five_clubs_key, &TRUMP));
    // No club triple.
    assert!(!has_group_above(&hand, SuitClass::Plain(Suit::Clubs), 3, five_clubs_key, &TRUMP));
    // Spades in hand never answer a clubs group.
    let king_clubs_key = super::cards_logic::ladder_index("KC".parse().unwrap(), &TRUMP);
    assert!(!has_group_above(&hand, SuitClass::Plain(Suit::Clubs), 1, king_clubs_key, &TRUMP));
}

#[test]
fn find_tractor_prefers_the_lowest_run() {
    let hand = parse_cards(&["3S", "3S", "4S", "4S", "9S", "9S", "TS", "TS"]);
    let found = find_tractor_in_class(&hand, SuitClass::Plain(Suit::Spades), 2, 2, &TRUMP)
        .expect("hand holds two pair-tractors");
    assert_eq!(found, parse_cards(&["3S", "3S", "4S", "4S"]));
}

#[test]
fn classify_strict_rejects_throws() {
    assert!(classify_strict(&parse_cards(&["AS", "KS"]), &TRUMP).is_none());
    assert!(classify_strict(&parse_cards(&["AS", "AS"]), &TRUMP).is_some());
}

#[test]
fn same_shape_comparison_by_magnitude() {
    let lead_class = SuitClass::Plain(Suit::Spades);
    let aces = classify_strict(&parse_cards(&["AS", "AS"]), &TRUMP).unwrap();
    let kings = classify_strict(&parse_cards(&["KS", "KS"]), &TRUMP).unwrap();
    let trumps = classify_strict(&parse_cards(&["3H", "3H"]), &TRUMP).unwrap();
    assert!(super::combos::beats(&aces, &kings, lead_class, &TRUMP));
    assert!(!super::combos::beats(&kings, &aces, lead_class, &TRUMP));
    // A trump pair outranks any plain pair of the led suit.
    assert!(super::combos::beats(&trumps, &aces, lead_class, &TRUMP));
}
