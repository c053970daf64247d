use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

#[derive(Debug, Error)]
#[error("malformed event id: {0:?}")]
pub struct MalformedEventId(pub String);

impl FromStr for EventId {
    type Err = MalformedEventId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The hyphenated form is the only accepted spelling with this length.
        if s.len() != uuid::fmt::Hyphenated::LENGTH {
            return Err(MalformedEventId(s.to_string()));
        }
        Uuid::try_parse(s)
            .map(Self)
            .map_err(|_| MalformedEventId(s.to_string()))
    }
}

/// An authenticated caller. The email has already been verified by whatever
/// sits in front of the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal {
    email: String,
}

impl Principal {
    /// Returns `None` for blank input so a missing and an empty identity are
    /// treated the same.
    pub fn from_email(email: impl Into<String>) -> Option<Self> {
        let email = email.into();
        let trimmed = email.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            email: trimmed.to_string(),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendeeStatus {
    Organizer,
    Pending,
    Accepted,
    Declined,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid status: {0:?}")]
pub struct InvalidStatus(pub String);

impl AttendeeStatus {
    /// Maps a caller-supplied response onto a status. Matching is exact and
    /// case-sensitive; an empty string resets to pending.
    pub fn normalize(input: &str) -> Result<Self, InvalidStatus> {
        match input {
            "going" | "accepted" | "accept" => Ok(Self::Accepted),
            "not_going" | "declined" | "decline" => Ok(Self::Declined),
            "pending" | "" => Ok(Self::Pending),
            other => Err(InvalidStatus(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Organizer => "organizer",
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }
}

impl fmt::Display for AttendeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse of the canonical names, used when reading rows back.
impl FromStr for AttendeeStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "organizer" => Ok(Self::Organizer),
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub email: String,
    pub status: AttendeeStatus,
}

impl Attendee {
    pub fn organizer(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            status: AttendeeStatus::Organizer,
        }
    }
}

/// Caller-supplied event fields. Values are opaque and only need to be present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub title: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub description: String,
}
