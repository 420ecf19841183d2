//! Decision trait for automated seats.
//!
//! The engine drives automated seats synchronously under the room lock: when
//! it is an `ai_`-prefixed seat's turn, it asks the configured [`AutoSeat`]
//! for a decision and applies it through the same validation path as a human
//! action.

use std::fmt;

use crate::domain::{Rank, Seat, Suit, Table};

/// Errors from automated decision-making.
#[derive(Debug)]
pub enum AiError {
    /// The implementation failed internally (should not happen for the
    /// built-in heuristic).
    Internal(String),
    /// The implementation produced a move the engine rejected.
    InvalidMove(String),
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiError::Internal(msg) => write!(f, "ai internal error: {msg}"),
            AiError::InvalidMove(msg) => write!(f, "ai invalid move: {msg}"),
        }
    }
}

impl std::error::Error for AiError {}

/// An automated seat. Implementations see the full table (the engine is the
/// server; nothing is hidden from it) and must return legal actions.
///
/// Implementations must be `Send + Sync`; decisions may be requested from any
/// thread holding the room lock. Never panic: return an error instead.
pub trait AutoSeat: Send + Sync {
    /// Choose the 7 hand indices the dealer buries.
    fn choose_discard(&self, table: &Table, seat: Seat) -> Result<Vec<usize>, AiError>;

    /// Choose the friend declaration (suit, rank, position).
    fn choose_friend(&self, table: &Table, seat: Seat) -> Result<(Suit, Rank, u8), AiError>;

    /// Choose the hand indices to play this turn.
    fn choose_play(&self, table: &Table, seat: Seat) -> Result<Vec<usize>, AiError>;
}
