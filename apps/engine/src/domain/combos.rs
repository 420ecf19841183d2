//! Combination recognition and comparison: single, pair, triple, tractor,
//! throw.

use std::collections::HashMap;

use super::cards_logic::{ladder_index, strength, suit_class, SuitClass};
use super::cards_types::{Card, TrumpContext};
use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ComboShape {
    Single,
    Pair,
    Triple,
    Tractor { group_size: u8, group_count: u8 },
    Throw,
}

/// A classified play from one seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination {
    pub shape: ComboShape,
    pub class: SuitClass,
    pub cards: Vec<Card>,
}

impl Combination {
    /// Magnitude key against a lead class: the strongest card of the
    /// combination. Trump combinations outrank plain ones of the same shape
    /// because `strength` already bands trumps above everything else.
    pub fn magnitude(&self, lead: SuitClass, trump: &TrumpContext) -> i32 {
        self.cards
            .iter()
            .map(|&c| strength(c, lead, trump))
            .max()
            .unwrap_or(0)
    }
}

/// One sub-group of a throw: a triple, pair, or single.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrowGroup {
    /// 1, 2, or 3.
    pub size: u8,
    /// Ladder position of the group's card within its class.
    pub key: u8,
    pub cards: Vec<Card>,
}

/// The single class all `cards` share, or a MixedSuits error.
pub fn single_class(cards: &[Card], trump: &TrumpContext) -> Result<SuitClass, DomainError> {
    let mut it = cards.iter();
    let first = it.next().ok_or_else(|| {
        DomainError::validation(ValidationKind::InvalidCombination, "no cards to play")
    })?;
    let class = suit_class(*first, trump);
    if it.any(|&c| suit_class(c, trump) != class) {
        return Err(DomainError::validation(
            ValidationKind::MixedSuits,
            "all cards must belong to one suit",
        ));
    }
    Ok(class)
}

/// Count identical cards: Card -> copies.
fn copies(cards: &[Card]) -> HashMap<Card, u8> {
    let mut map = HashMap::new();
    for &c in cards {
        *map.entry(c).or_insert(0u8) += 1;
    }
    map
}

/// Detect a tractor: N ≥ 2 consecutive identical-card groups of uniform size
/// 2 or 3, all in one suit class. Consecutiveness is ladder adjacency, so
/// trump tractors may span the rank strips and plain suits skip the trump
/// rank.
pub fn tractor_dimensions(cards: &[Card], trump: &TrumpContext) -> Option<(u8, u8)> {
    if cards.len() < 4 {
        return None;
    }
    single_class(cards, trump).ok()?;

    let groups = copies(cards);
    let mut group_size = 0u8;
    for &count in groups.values() {
        if count != 2 && count != 3 {
            return None;
        }
        if group_size == 0 {
            group_size = count;
        } else if count != group_size {
            return None;
        }
    }
    if groups.len() < 2 {
        return None;
    }

    let mut ladder: Vec<u8> = groups.keys().map(|&c| ladder_index(c, trump)).collect();
    ladder.sort_unstable();
    for pair in ladder.windows(2) {
        if pair[1] != pair[0] + 1 {
            return None;
        }
    }
    Some((group_size, ladder.len() as u8))
}

/// Classify a lead play. Multi-card plays that are neither pair, triple, nor
/// tractor become throws (adjudicated by the trick engine).
pub fn classify_lead(cards: &[Card], trump: &TrumpContext) -> Result<Combination, DomainError> {
    let class = single_class(cards, trump)?;
    let shape = match cards.len() {
        1 => ComboShape::Single,
        2 if cards[0] == cards[1] => ComboShape::Pair,
        3 if cards[0] == cards[1] && cards[1] == cards[2] => ComboShape::Triple,
        _ => match tractor_dimensions(cards, trump) {
            Some((group_size, group_count)) => ComboShape::Tractor {
                group_size,
                group_count,
            },
            None => ComboShape::Throw,
        },
    };
    Ok(Combination {
        shape,
        class,
        cards: cards.to_vec(),
    })
}

/// Classify a structured combination only: single, pair, triple, or tractor.
/// Returns None for anything loose (mixed classes, throws, discards).
pub fn classify_strict(cards: &[Card], trump: &TrumpContext) -> Option<Combination> {
    let class = single_class(cards, trump).ok()?;
    let shape = match cards.len() {
        1 => ComboShape::Single,
        2 if cards[0] == cards[1] => ComboShape::Pair,
        3 if cards[0] == cards[1] && cards[1] == cards[2] => ComboShape::Triple,
        _ => {
            let (group_size, group_count) = tractor_dimensions(cards, trump)?;
            ComboShape::Tractor {
                group_size,
                group_count,
            }
        }
    };
    Some(Combination {
        shape,
        class,
        cards: cards.to_vec(),
    })
}

/// Decompose a throw into sub-groups: triples first, then pairs, then
/// singles; within a size, strongest first.
pub fn decompose_throw(cards: &[Card], trump: &TrumpContext) -> Vec<ThrowGroup> {
    let mut groups = Vec::new();
    for (card, mut count) in copies(cards) {
        let key = ladder_index(card, trump);
        while count >= 3 {
            groups.push(ThrowGroup {
                size: 3,
                key,
                cards: vec![card; 3],
            });
            count -= 3;
        }
        if count == 2 {
            groups.push(ThrowGroup {
                size: 2,
                key,
                cards: vec![card; 2],
            });
            count = 0;
        }
        if count == 1 {
            groups.push(ThrowGroup {
                size: 1,
                key,
                cards: vec![card],
            });
        }
    }
    // Ties on (size, key) happen for off-suit level cards; the display order
    // keeps the result deterministic.
    groups.sort_by(|a, b| {
        b.size
            .cmp(&a.size)
            .then(b.key.cmp(&a.key))
            .then(a.cards[0].cmp(&b.cards[0]))
    });
    groups
}

/// Group-size multiset of an arbitrary play, sorted descending. Used to match
/// a cover against a throw lead.
pub fn decomposition_sizes(cards: &[Card], trump: &TrumpContext) -> Vec<u8> {
    decompose_throw(cards, trump)
        .into_iter()
        .map(|g| g.size)
        .collect()
}

/// True if `hand` holds, within `class`, an identical-card group of
/// `group_size` copies whose ladder position is strictly above `key`.
pub fn has_group_above(
    hand: &[Card],
    class: SuitClass,
    group_size: u8,
    key: u8,
    trump: &TrumpContext,
) -> bool {
    let in_class: Vec<Card> = hand
        .iter()
        .copied()
        .filter(|&c| suit_class(c, trump) == class)
        .collect();
    copies(&in_class)
        .iter()
        .any(|(&c, &n)| n >= group_size && ladder_index(c, trump) > key)
}

/// True if `hand` holds an identical-card group of `group_size` copies in
/// `class`.
pub fn has_group_in_class(
    hand: &[Card],
    class: SuitClass,
    group_size: u8,
    trump: &TrumpContext,
) -> bool {
    let in_class: Vec<Card> = hand
        .iter()
        .copied()
        .filter(|&c| suit_class(c, trump) == class)
        .collect();
    copies(&in_class).values().any(|&n| n >= group_size)
}

/// Lowest identical-card group of `group_size` copies in `class`, if any.
pub fn find_group_in_class(
    hand: &[Card],
    class: SuitClass,
    group_size: u8,
    trump: &TrumpContext,
) -> Option<Card> {
    let in_class: Vec<Card> = hand
        .iter()
        .copied()
        .filter(|&c| suit_class(c, trump) == class)
        .collect();
    copies(&in_class)
        .into_iter()
        .filter(|&(_, n)| n >= group_size)
        .min_by_key(|&(c, _)| ladder_index(c, trump))
        .map(|(c, _)| c)
}

/// True if `hand` holds a tractor of the given dimensions inside `class`.
pub fn has_tractor_in_class(
    hand: &[Card],
    class: SuitClass,
    group_size: u8,
    group_count: u8,
    trump: &TrumpContext,
) -> bool {
    find_tractor_in_class(hand, class, group_size, group_count, trump).is_some()
}

/// Find the lowest tractor of the given dimensions inside `class`, if any.
/// Returns the cards to play.
pub fn find_tractor_in_class(
    hand: &[Card],
    class: SuitClass,
    group_size: u8,
    group_count: u8,
    trump: &TrumpContext,
) -> Option<Vec<Card>> {
    let in_class: Vec<Card> = hand
        .iter()
        .copied()
        .filter(|&c| suit_class(c, trump) == class)
        .collect();
    // Ladder position -> a card there with enough copies.
    let mut at_ladder: HashMap<u8, Card> = HashMap::new();
    for (&c, &n) in copies(&in_class).iter() {
        if n >= group_size {
            at_ladder.entry(ladder_index(c, trump)).or_insert(c);
        }
    }
    let mut positions: Vec<u8> = at_ladder.keys().copied().collect();
    positions.sort_unstable();
    // Slide a window over the positions looking for a consecutive run.
    for &start in &positions {
        let run: Vec<u8> = (start..start + group_count).collect();
        if run.iter().all(|p| at_ladder.contains_key(p)) {
            let mut cards = Vec::with_capacity((group_size * group_count) as usize);
            for p in run {
                let card = at_ladder[&p];
                for _ in 0..group_size {
                    cards.push(card);
                }
            }
            return Some(cards);
        }
    }
    None
}

/// Whether `candidate` beats `best` in the same trick. Both must already be
/// shape-compatible with the lead; this compares magnitudes only.
pub fn beats(
    candidate: &Combination,
    best: &Combination,
    lead: SuitClass,
    trump: &TrumpContext,
) -> bool {
    candidate.magnitude(lead, trump) > best.magnitude(lead, trump)
}
