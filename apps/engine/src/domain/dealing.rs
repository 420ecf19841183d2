//! Deterministic card dealing for the 162-card three-deck pack.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::cards_types::{Card, Rank, Suit};
use super::rules::{BOTTOM_SIZE, CARDS_PER_SEAT, DECK_SIZE, SEATS};

/// Build the full 162-card pack: three copies of the 52-card deck plus three
/// small and three big jokers.
pub fn full_pack() -> Vec<Card> {
    let mut pack = Vec::with_capacity(DECK_SIZE);
    for _ in 0..3 {
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                pack.push(Card::suited(suit, rank));
            }
        }
        pack.push(Card::SMALL_JOKER);
        pack.push(Card::BIG_JOKER);
    }
    pack
}

/// The result of a deal: one 31-card hand per seat (index = seat − 1) and the
/// 7 bottom cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deal {
    pub hands: [Vec<Card>; SEATS],
    pub bottom: Vec<Card>,
}

/// Deal hands deterministically from a shuffle seed.
///
/// Fisher–Yates over a seeded RNG; hands are sorted for convenience. The
/// bottom keeps its shuffle order because the flip fallback reveals it one
/// card at a time.
pub fn deal(seed: u64) -> Deal {
    let mut pack = full_pack();
    let mut rng = StdRng::seed_from_u64(seed);
    pack.shuffle(&mut rng);

    let mut hands: [Vec<Card>; SEATS] = Default::default();
    for (i, hand) in hands.iter_mut().enumerate() {
        let start = i * CARDS_PER_SEAT;
        let mut cards = pack[start..start + CARDS_PER_SEAT].to_vec();
        cards.sort();
        *hand = cards;
    }
    let bottom = pack[SEATS * CARDS_PER_SEAT..].to_vec();
    debug_assert_eq!(bottom.len(), BOTTOM_SIZE);

    Deal { hands, bottom }
}
