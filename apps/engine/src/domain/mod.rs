//! Domain layer: pure game logic types and helpers.

pub mod bidding;
pub mod cards_logic;
pub mod cards_parsing;
pub mod cards_serde;
pub mod cards_types;
pub mod combos;
pub mod dealing;
pub mod friend;
pub mod player_view;
pub mod rules;
pub mod scoring;
pub mod seed_derivation;
pub mod snapshot;
pub mod state;
pub mod tricks;

#[cfg(test)]
mod test_state_helpers;
#[cfg(test)]
mod tests_bidding;
#[cfg(test)]
mod tests_combos;
#[cfg(test)]
mod tests_friend;
#[cfg(test)]
mod tests_props_consistency;
#[cfg(test)]
mod tests_scoring;

// Re-exports for ergonomics
pub use cards_logic::{is_trump, ladder_index, strength, suit_class, SuitClass};
pub use cards_parsing::try_parse_cards;
pub use cards_types::{Card, JokerRank, Rank, Suit, TrumpContext};
pub use dealing::{deal, Deal};
pub use seed_derivation::derive_deal_seed;
pub use state::{next_seat, seat_index, ActionType, Phase, Seat, Table};
