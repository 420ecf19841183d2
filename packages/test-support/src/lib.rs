//! Test support utilities for the engine workspace.
//!
//! Provides unique test data generation (ULID-suffixed) so tests can create
//! rooms and users without colliding, plus an idempotent logging init.

pub mod logging;

use ulid::Ulid;

/// Generate a unique string with the given prefix.
///
/// # Examples
/// ```
/// use test_support::unique_str;
///
/// let id1 = unique_str("user");
/// let id2 = unique_str("user");
/// assert_ne!(id1, id2);
/// assert!(id1.starts_with("user-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// Generate a unique room name for lobby tests.
pub fn unique_room_name(prefix: &str) -> String {
    format!("{}-table-{}", prefix, Ulid::new())
}
