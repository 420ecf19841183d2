//! Trick engine: lead validation, throw adjudication, follow enforcement,
//! and trick-winner computation.

use super::cards_logic::{count_in_class, strength, suit_class, SuitClass};
use super::cards_types::{Card, TrumpContext};
use super::combos::{
    self, classify_lead, classify_strict, decompose_throw, decomposition_sizes, Combination,
    ComboShape, ThrowGroup,
};
use super::friend;
use super::rules::SEATS;
use super::scoring::card_points;
use super::state::{next_seat, nth_counter_clockwise, CompletedTrick, Seat, SeatPlay, Table};
use crate::errors::domain::{DomainError, ValidationKind};

/// The effect of one seat's play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayOutcome {
    /// Cards that actually hit the table (after any throw downgrade).
    pub played: Vec<Card>,
    /// Set when a failed throw was downgraded to its weakest sub-group.
    pub downgraded: bool,
    pub message: String,
    pub trick_complete: bool,
    pub trick_winner: Option<Seat>,
    pub points_collected: u32,
    /// True once every hand is empty: the 31st trick just closed.
    pub round_over: bool,
    pub friend_revealed_now: bool,
}

/// Outcome of adjudicating a throw lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThrowVerdict {
    /// No opponent can beat any sub-group: every card is played.
    Stands,
    /// Some opponent beats a sub-group: only the weakest sub-group is played.
    Downgraded { group: ThrowGroup, beaten_by: Seat },
}

/// Adjudicate a throw: scan opponents counter-clockwise from the seat after
/// the leader; the throw fails if any opponent holds a same-class group that
/// beats one of the throw's sub-groups. Trumps never participate against a
/// plain-suit throw.
pub fn adjudicate_throw(
    table: &Table,
    leader: Seat,
    combo: &Combination,
    trump: &TrumpContext,
) -> ThrowVerdict {
    let groups = decompose_throw(&combo.cards, trump);
    for step in 1..SEATS as u8 {
        let seat = nth_counter_clockwise(leader, step);
        let hand = &table.seat_state(seat).hand;
        let can_beat = groups
            .iter()
            .any(|g| combos::has_group_above(hand, combo.class, g.size, g.key, trump));
        if can_beat {
            // Penalty: the weakest sub-group is played. Priority single <
            // pair < triple, then lowest ladder position.
            let group = groups
                .iter()
                .min_by_key(|g| (g.size, g.key))
                .cloned()
                .expect("throw has at least two sub-groups");
            return ThrowVerdict::Downgraded {
                group,
                beaten_by: seat,
            };
        }
    }
    ThrowVerdict::Stands
}

/// Validate a follower's cards against the lead combination.
///
/// Priority ladder:
/// 1. holding lead-class cards: play as many as possible, and match the
///    lead's shape when the hand holds that shape in the lead class;
/// 2. void: anything goes. Trump covers of the exact shape compete for the
///    trick, everything else is a discard.
pub fn validate_follow(
    hand: &[Card],
    cards: &[Card],
    lead: &Combination,
    trump: &TrumpContext,
) -> Result<(), DomainError> {
    let lead_len = lead.cards.len();
    if cards.len() != lead_len {
        return Err(DomainError::validation(
            ValidationKind::InvalidCombination,
            format!("must play {lead_len} cards"),
        ));
    }

    let held = count_in_class(hand, lead.class, trump);
    let required = held.min(lead_len);
    let played_in_class = cards
        .iter()
        .filter(|&&c| suit_class(c, trump) == lead.class)
        .count();
    if played_in_class < required {
        return Err(DomainError::validation(
            ValidationKind::MustFollowSuit,
            format!("must play {required} cards of the led suit"),
        ));
    }

    // Shape duty: a matching shape held in the lead class must be played.
    match lead.shape {
        ComboShape::Pair if combos::has_group_in_class(hand, lead.class, 2, trump) => {
            match classify_strict(cards, trump) {
                Some(c) if c.class == lead.class && c.shape == ComboShape::Pair => {}
                _ => {
                    return Err(DomainError::validation(
                        ValidationKind::MustFollowSuit,
                        "holding a pair of the led suit: must follow with it",
                    ))
                }
            }
        }
        ComboShape::Triple if combos::has_group_in_class(hand, lead.class, 3, trump) => {
            match classify_strict(cards, trump) {
                Some(c) if c.class == lead.class && c.shape == ComboShape::Triple => {}
                _ => {
                    return Err(DomainError::validation(
                        ValidationKind::MustFollowSuit,
                        "holding a triple of the led suit: must follow with it",
                    ))
                }
            }
        }
        ComboShape::Tractor {
            group_size,
            group_count,
        } if combos::has_tractor_in_class(hand, lead.class, group_size, group_count, trump) => {
            match classify_strict(cards, trump) {
                Some(c)
                    if c.class == lead.class
                        && c.shape
                            == (ComboShape::Tractor {
                                group_size,
                                group_count,
                            }) => {}
                _ => {
                    return Err(DomainError::validation(
                        ValidationKind::MustFollowSuit,
                        "holding a tractor of the led suit: must follow with it",
                    ))
                }
            }
        }
        _ => {}
    }

    Ok(())
}

/// Whether `play` competes against the lead, and its magnitude if so.
///
/// A contribution competes when its shape matches the lead's and its class is
/// the lead's own or all-trump. Wrong shapes lose by rule: they are discards.
fn cover_magnitude(
    play: &[Card],
    lead: &Combination,
    trump: &TrumpContext,
) -> Option<i32> {
    let class = combos::single_class(play, trump).ok()?;
    if class != lead.class && class != SuitClass::Trump {
        return None;
    }
    let shape_matches = match lead.shape {
        ComboShape::Throw => decomposition_sizes(play, trump) == decomposition_sizes(&lead.cards, trump),
        shape => classify_strict(play, trump).map(|c| c.shape) == Some(shape),
    };
    if !shape_matches {
        return None;
    }
    play.iter()
        .map(|&c| strength(c, lead.class, trump))
        .max()
}

/// Winner of a complete trick: the strongest shape-matching contribution,
/// earlier contributor winning ties.
pub fn trick_winner(plays: &[SeatPlay], trump: &TrumpContext) -> Result<Seat, DomainError> {
    let first = plays.first().ok_or_else(|| {
        DomainError::validation_other("cannot resolve an empty trick".to_string())
    })?;
    let lead = classify_lead(&first.cards, trump)?;
    let mut best_seat = first.seat;
    let mut best_magnitude = lead.magnitude(lead.class, trump);
    for play in &plays[1..] {
        if let Some(magnitude) = cover_magnitude(&play.cards, &lead, trump) {
            if magnitude > best_magnitude {
                best_magnitude = magnitude;
                best_seat = play.seat;
            }
        }
    }
    Ok(best_seat)
}

/// Play cards from a seat's hand into the current trick. Validates turn
/// order, lead/follow legality, adjudicates throws, tracks the friend
/// reveal, and closes the trick after the fifth contribution.
pub fn play_cards(
    table: &mut Table,
    seat: Seat,
    indices: &[usize],
) -> Result<PlayOutcome, DomainError> {
    if table.current_player != seat {
        return Err(DomainError::not_your_turn(format!(
            "seat {} to act",
            table.current_player
        )));
    }
    let trump = table.require_trump()?;

    let hand_len = table.seat_state(seat).hand.len();
    let selected = super::state::validate_hand_indices(indices, hand_len)?;
    let hand = &table.seat_state(seat).hand;
    let mut cards: Vec<Card> = selected.iter().map(|&i| hand[i]).collect();
    let mut play_indices = selected;

    let is_lead = table.current_trick.is_empty();
    let mut downgraded = false;
    let mut message = format!("played {} cards", cards.len());

    if is_lead {
        let combo = classify_lead(&cards, &trump)?;
        if combo.shape == ComboShape::Throw {
            match adjudicate_throw(table, seat, &combo, &trump) {
                ThrowVerdict::Stands => {}
                ThrowVerdict::Downgraded { group, beaten_by } => {
                    // Keep only the weakest sub-group; the rest never leaves
                    // the hand.
                    let hand = &table.seat_state(seat).hand;
                    play_indices = select_indices_for(&play_indices, hand, &group.cards)?;
                    cards = group.cards.clone();
                    downgraded = true;
                    message = format!(
                        "throw failed: seat {beaten_by} can beat a sub-group; playing the weakest group only"
                    );
                }
            }
        }
    } else {
        let lead = classify_lead(&table.current_trick[0].cards, &trump)?;
        validate_follow(&table.seat_state(seat).hand, &cards, &lead, &trump)?;
    }

    let friend_revealed_now = friend::note_played_cards(table, seat, &cards);

    // Remove in descending index order so positions stay valid.
    {
        let hand = &mut table.seat_state_mut(seat).hand;
        let mut order = play_indices.clone();
        order.sort_unstable_by(|a, b| b.cmp(a));
        for idx in order {
            hand.remove(idx);
        }
    }

    if is_lead {
        table.trick_leader = seat;
    }
    table.current_trick.push(SeatPlay {
        seat,
        cards: cards.clone(),
    });

    let mut outcome = PlayOutcome {
        played: cards,
        downgraded,
        message,
        trick_complete: false,
        trick_winner: None,
        points_collected: 0,
        round_over: false,
        friend_revealed_now,
    };

    if table.current_trick.len() == SEATS {
        let winner = trick_winner(&table.current_trick, &trump)?;
        let plays = std::mem::take(&mut table.current_trick);

        let mut points = 0u32;
        let mut scoring_cards = Vec::new();
        for play in &plays {
            for &card in &play.cards {
                let value = card_points(card);
                if value > 0 {
                    points += value;
                    scoring_cards.push(card);
                }
            }
        }
        table
            .seat_state_mut(winner)
            .collected
            .extend(scoring_cards);

        table.tricks_won.push(CompletedTrick { winner, plays });
        table.current_player = winner;
        table.trick_leader = winner;

        outcome.trick_complete = true;
        outcome.trick_winner = Some(winner);
        outcome.points_collected = points;
        outcome.round_over = table.seats.iter().all(|s| s.hand.is_empty());
    } else {
        table.current_player = next_seat(seat);
    }

    Ok(outcome)
}

/// From an already-validated selection, keep the indices whose cards realise
/// `wanted` (a sub-multiset of the selection).
fn select_indices_for(
    selection: &[usize],
    hand: &[Card],
    wanted: &[Card],
) -> Result<Vec<usize>, DomainError> {
    let mut remaining = wanted.to_vec();
    let mut kept = Vec::with_capacity(wanted.len());
    for &idx in selection {
        if let Some(pos) = remaining.iter().position(|&c| c == hand[idx]) {
            remaining.swap_remove(pos);
            kept.push(idx);
        }
    }
    if remaining.is_empty() {
        Ok(kept)
    } else {
        Err(DomainError::validation_other(
            "downgraded group not contained in the selection".to_string(),
        ))
    }
}

/// Build a legal follow for `seat` by construction: satisfy shape duties,
/// then as many lead-class cards as held (lowest first), then the lowest
/// discards. Used by automated seats.
pub fn default_follow(table: &Table, seat: Seat) -> Result<Vec<usize>, DomainError> {
    let trump = table.require_trump()?;
    let first = table.current_trick.first().ok_or_else(|| {
        DomainError::validation_other("no lead to follow".to_string())
    })?;
    let lead = classify_lead(&first.cards, &trump)?;
    let hand = &table.seat_state(seat).hand;
    let lead_len = lead.cards.len();

    // Whole-shape duties first.
    let duty_cards: Option<Vec<Card>> = match lead.shape {
        ComboShape::Pair => combos::find_group_in_class(hand, lead.class, 2, &trump)
            .map(|c| vec![c; 2]),
        ComboShape::Triple => combos::find_group_in_class(hand, lead.class, 3, &trump)
            .map(|c| vec![c; 3]),
        ComboShape::Tractor {
            group_size,
            group_count,
        } => combos::find_tractor_in_class(hand, lead.class, group_size, group_count, &trump),
        _ => None,
    };
    if let Some(cards) = duty_cards {
        return indices_of_cards(hand, &cards);
    }

    // Lead-class cards, weakest first.
    let mut class_indices: Vec<usize> = (0..hand.len())
        .filter(|&i| suit_class(hand[i], &trump) == lead.class)
        .collect();
    class_indices.sort_by_key(|&i| strength(hand[i], lead.class, &trump));
    let mut chosen: Vec<usize> = class_indices.into_iter().take(lead_len).collect();

    // Fill with the lowest off-class cards.
    if chosen.len() < lead_len {
        let mut rest: Vec<usize> = (0..hand.len()).filter(|i| !chosen.contains(i)).collect();
        rest.sort_by_key(|&i| strength(hand[i], SuitClass::Trump, &trump));
        chosen.extend(rest.into_iter().take(lead_len - chosen.len()));
    }
    Ok(chosen)
}

/// Map concrete cards back to hand indices, first unused occurrence wins.
pub fn indices_of_cards(hand: &[Card], cards: &[Card]) -> Result<Vec<usize>, DomainError> {
    let mut used = vec![false; hand.len()];
    let mut indices = Vec::with_capacity(cards.len());
    for &card in cards {
        let found = (0..hand.len()).find(|&i| hand[i] == card && !used[i]);
        match found {
            Some(i) => {
                used[i] = true;
                indices.push(i);
            }
            None => {
                return Err(DomainError::validation(
                    ValidationKind::CardNotInHand,
                    format!("card {card} not in hand"),
                ))
            }
        }
    }
    Ok(indices)
}
