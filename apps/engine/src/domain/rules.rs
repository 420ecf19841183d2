//! Fixed table parameters for the five-seat, three-deck game.

/// Seats at the table. Seat numbers are 1-based (1..=5).
pub const SEATS: usize = 5;

/// Cards dealt to each seat.
pub const CARDS_PER_SEAT: usize = 31;

/// Cards set aside as the bottom at deal time.
pub const BOTTOM_SIZE: usize = 7;

/// Three 54-card decks.
pub const DECK_SIZE: usize = 162;

/// Total points in the pack: 3 decks × 4 suits × (5 + 10 + 10).
pub const TOTAL_POINTS: u32 = 300;

/// Tricks in a full round (every seat plays out 31 cards).
pub const TRICKS_PER_ROUND: usize = CARDS_PER_SEAT;

/// A dealer bid reveals at most this many level cards.
pub const MAX_BID_CARDS: usize = 3;

/// Advisory bidding countdown, in seconds. The engine never runs a timer;
/// the boundary closes the window with the `bidding_closed` action.
pub const BID_COUNTDOWN_SECS: u32 = 10;

/// User-id prefix that marks a seat as automated.
pub const AI_ID_PREFIX: &str = "ai_";
