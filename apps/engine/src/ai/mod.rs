//! Automated seats: the decision trait and the baseline heuristic.

pub mod heuristic;
pub mod trait_def;

pub use heuristic::GreedyHeuristic;
pub use trait_def::{AiError, AutoSeat};
