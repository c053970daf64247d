use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{InvalidStatus, MalformedEventId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthenticated,
    Validation,
    NotFound,
    NotAnAttendee,
    Forbidden,
    Storage,
    PartialSuccess,
}

#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("{code:?}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unauthenticated() -> Self {
        Self::new(ErrorCode::Unauthenticated, "not logged in")
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }
}

impl From<InvalidStatus> for ApiError {
    fn from(value: InvalidStatus) -> Self {
        Self::validation(value.to_string())
    }
}

impl From<MalformedEventId> for ApiError {
    fn from(_: MalformedEventId) -> Self {
        Self::validation("invalid event id")
    }
}
