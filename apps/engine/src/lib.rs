//! Server-side engine for a five-seat, three-deck find-the-friend
//! trick-taking game.
//!
//! The crate owns the in-memory table state machine and its card
//! combinatorics: dealer bidding, the bottom exchange, the friend call, 31
//! tricks of play, and the level-upgrade settlement. HTTP routing,
//! authentication, and SQL live outside; the boundary hands every action a
//! `(room_id, principal, payload)` triple and receives a typed result or a
//! typed error with an HTTP-compatible status.

pub mod ai;
pub mod domain;
pub mod error;
pub mod errors;
pub mod services;
pub mod store;
pub mod telemetry;
pub mod utils;

pub use error::EngineError;
pub use services::Engine;
