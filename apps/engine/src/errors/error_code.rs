//! Error codes for the engine's boundary surface.
//!
//! This module defines all error codes surfaced to the boundary. Add new
//! codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings a
//! boundary would put in its responses.

use core::fmt;

/// Centralized error codes for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Identity
    /// Principal is not seated in the room
    NotSeated,
    /// Principal lacks the role for this operation (host/dealer only)
    NotAllowed,

    // Request validation
    /// Card token failed to parse
    ParseCard,
    /// Card index outside the hand
    InvalidCardIndex,
    /// Card not in hand
    CardNotInHand,
    /// Bid cards are not level cards
    NotLevelCards,
    /// Cards span more than one suit
    MixedSuits,
    /// Cards do not form a playable combination
    InvalidCombination,
    /// Must follow suit
    MustFollowSuit,
    /// Invalid bid
    InvalidBid,
    /// Invalid friend call
    InvalidFriendCall,
    /// Discard must be exactly seven distinct hand cards
    InvalidDiscard,
    /// Invalid seat number
    InvalidSeat,
    /// General validation error
    ValidationError,

    // Resource not found
    /// Room not found
    RoomNotFound,
    /// User not found
    UserNotFound,
    /// Replay not found
    ReplayNotFound,
    /// General not found error
    NotFound,

    // Business logic conflicts
    /// Room already has five seats taken
    RoomFull,
    /// Generated room id already exists
    DuplicateRoomId,
    /// Action not in the current phase's accept-set
    PhaseMismatch,
    /// Seat already taken
    SeatTaken,
    /// Out of turn
    OutOfTurn,
    /// General conflict error
    Conflict,

    // Internal
    /// Persistence failure during a mandatory pre-condition check
    StoreError,
    /// General internal error
    InternalError,
}

impl ErrorCode {
    /// Canonical string for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotSeated => "NOT_SEATED",
            ErrorCode::NotAllowed => "NOT_ALLOWED",
            ErrorCode::ParseCard => "PARSE_CARD",
            ErrorCode::InvalidCardIndex => "INVALID_CARD_INDEX",
            ErrorCode::CardNotInHand => "CARD_NOT_IN_HAND",
            ErrorCode::NotLevelCards => "NOT_LEVEL_CARDS",
            ErrorCode::MixedSuits => "MIXED_SUITS",
            ErrorCode::InvalidCombination => "INVALID_COMBINATION",
            ErrorCode::MustFollowSuit => "MUST_FOLLOW_SUIT",
            ErrorCode::InvalidBid => "INVALID_BID",
            ErrorCode::InvalidFriendCall => "INVALID_FRIEND_CALL",
            ErrorCode::InvalidDiscard => "INVALID_DISCARD",
            ErrorCode::InvalidSeat => "INVALID_SEAT",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::RoomNotFound => "ROOM_NOT_FOUND",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::ReplayNotFound => "REPLAY_NOT_FOUND",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::RoomFull => "ROOM_FULL",
            ErrorCode::DuplicateRoomId => "DUPLICATE_ROOM_ID",
            ErrorCode::PhaseMismatch => "PHASE_MISMATCH",
            ErrorCode::SeatTaken => "SEAT_TAKEN",
            ErrorCode::OutOfTurn => "OUT_OF_TURN",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::StoreError => "STORE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
