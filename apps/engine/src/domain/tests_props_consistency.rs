//! Property tests for deck and point conservation.

use proptest::prelude::*;

use super::cards_logic::ladder_index;
use super::cards_types::{Card, Rank, Suit, TrumpContext};
use super::dealing::{deal, full_pack};
use super::rules::{BOTTOM_SIZE, CARDS_PER_SEAT, DECK_SIZE, TOTAL_POINTS};
use super::scoring::card_points;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any seed deals a perfect partition of the 162-card pack.
    #[test]
    fn prop_deal_partitions_the_pack(seed in any::<u64>()) {
        let d = deal(seed);
        for hand in &d.hands {
            prop_assert_eq!(hand.len(), CARDS_PER_SEAT);
        }
        prop_assert_eq!(d.bottom.len(), BOTTOM_SIZE);

        let mut all: Vec<Card> = d.hands.iter().flatten().copied().collect();
        all.extend(d.bottom.iter().copied());
        prop_assert_eq!(all.len(), DECK_SIZE);
        all.sort();
        let mut expected = full_pack();
        expected.sort();
        prop_assert_eq!(all, expected);
    }

    /// The 300 points are wherever the deal put them, never created or lost.
    #[test]
    fn prop_points_conserved_across_deals(seed in any::<u64>()) {
        let d = deal(seed);
        let in_hands: u32 = d.hands.iter().flatten().map(|&c| card_points(c)).sum();
        let in_bottom: u32 = d.bottom.iter().map(|&c| card_points(c)).sum();
        prop_assert_eq!(in_hands + in_bottom, TOTAL_POINTS);
    }

    /// Ladder positions are dense: plain classes use 0..=11, the trump class
    /// 0..=15.
    #[test]
    fn prop_ladder_indices_in_range(
        s in 0..4usize,
        r in 0..13usize,
        ts in 0..4usize,
        tr in 0..13usize,
    ) {
        let card = Card::suited(Suit::ALL[s], Rank::ALL[r]);
        let trump = TrumpContext::new(Suit::ALL[ts], Rank::ALL[tr]);
        let idx = ladder_index(card, &trump);
        if super::cards_logic::is_trump(card, &trump) {
            prop_assert!(idx <= 13);
        } else {
            prop_assert!(idx <= 11);
        }
    }
}
