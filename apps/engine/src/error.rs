//! Boundary-facing error type.
//!
//! `EngineError` is what every action entry point returns. It carries a
//! canonical [`ErrorCode`] and a status value the boundary can map directly
//! onto HTTP codes (400/401/404/409/500) without inspecting details.

use thiserror::Error;

use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind, ValidationKind};
use crate::errors::ErrorCode;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation error: {detail}")]
    Validation { code: ErrorCode, detail: String },
    #[error("Unauthorized: {detail}")]
    Unauthorized { code: ErrorCode, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("Not your turn: {detail}")]
    NotYourTurn { detail: String },
    #[error("Internal error: {detail}")]
    Internal { code: ErrorCode, detail: String },
}

impl EngineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::Validation { code, .. } => *code,
            EngineError::Unauthorized { code, .. } => *code,
            EngineError::NotFound { code, .. } => *code,
            EngineError::Conflict { code, .. } => *code,
            EngineError::NotYourTurn { .. } => ErrorCode::OutOfTurn,
            EngineError::Internal { code, .. } => *code,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            EngineError::Validation { detail, .. }
            | EngineError::Unauthorized { detail, .. }
            | EngineError::NotFound { detail, .. }
            | EngineError::Conflict { detail, .. }
            | EngineError::NotYourTurn { detail }
            | EngineError::Internal { detail, .. } => detail,
        }
    }

    /// Status value for the boundary: HTTP-compatible.
    pub fn status(&self) -> u16 {
        match self {
            EngineError::Validation { .. } => 400,
            EngineError::Unauthorized { .. } => 401,
            EngineError::NotFound { .. } => 404,
            EngineError::Conflict { .. } => 409,
            EngineError::NotYourTurn { .. } => 409,
            EngineError::Internal { .. } => 500,
        }
    }

    pub fn validation(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Validation {
            code,
            detail: detail.into(),
        }
    }

    pub fn unauthorized(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Unauthorized {
            code,
            detail: detail.into(),
        }
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn conflict(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            detail: detail.into(),
        }
    }

    pub fn internal(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Internal {
            code,
            detail: detail.into(),
        }
    }
}

impl From<DomainError> for EngineError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(kind, detail) => EngineError::Validation {
                code: validation_code(&kind),
                detail,
            },
            DomainError::Conflict(kind, detail) => EngineError::Conflict {
                code: conflict_code(&kind),
                detail,
            },
            DomainError::NotFound(kind, detail) => EngineError::NotFound {
                code: not_found_code(&kind),
                detail,
            },
            DomainError::NotYourTurn(detail) => EngineError::NotYourTurn { detail },
            DomainError::Infra(_, detail) => EngineError::Internal {
                code: ErrorCode::StoreError,
                detail,
            },
        }
    }
}

fn validation_code(kind: &ValidationKind) -> ErrorCode {
    match kind {
        ValidationKind::ParseCard => ErrorCode::ParseCard,
        ValidationKind::InvalidCardIndex => ErrorCode::InvalidCardIndex,
        ValidationKind::CardNotInHand => ErrorCode::CardNotInHand,
        ValidationKind::NotLevelCards => ErrorCode::NotLevelCards,
        ValidationKind::MixedSuits => ErrorCode::MixedSuits,
        ValidationKind::InvalidCombination => ErrorCode::InvalidCombination,
        ValidationKind::MustFollowSuit => ErrorCode::MustFollowSuit,
        ValidationKind::InvalidBid => ErrorCode::InvalidBid,
        ValidationKind::InvalidFriendCall => ErrorCode::InvalidFriendCall,
        ValidationKind::InvalidDiscard => ErrorCode::InvalidDiscard,
        ValidationKind::InvalidSeat => ErrorCode::InvalidSeat,
        _ => ErrorCode::ValidationError,
    }
}

fn conflict_code(kind: &ConflictKind) -> ErrorCode {
    match kind {
        ConflictKind::RoomFull => ErrorCode::RoomFull,
        ConflictKind::DuplicateRoomId => ErrorCode::DuplicateRoomId,
        ConflictKind::PhaseMismatch => ErrorCode::PhaseMismatch,
        ConflictKind::SeatTaken => ErrorCode::SeatTaken,
        _ => ErrorCode::Conflict,
    }
}

fn not_found_code(kind: &NotFoundKind) -> ErrorCode {
    match kind {
        NotFoundKind::Room => ErrorCode::RoomNotFound,
        NotFoundKind::User => ErrorCode::UserNotFound,
        NotFoundKind::Replay => ErrorCode::ReplayNotFound,
        _ => ErrorCode::NotFound,
    }
}
