use std::sync::Arc;

use serde::Deserialize;
use shared::{
    domain::{EventId, Principal},
    error::{ApiError, ErrorCode},
    protocol::EventSummary,
};
use storage::{EventStore, StoredEvent};
use tracing::error;

pub mod events;
pub mod views;
pub mod workflow;

pub use events::{create_event, delete_event, get_event};
pub use views::{list_accepted, list_invited_pending, list_organized, search_events};
pub use workflow::{display_name, invite, list_attendees, respond, RespondOutcome};

/// Who may add attendees to an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitePolicy {
    /// Any signed-in caller can invite anyone to any event.
    #[default]
    Open,
    OrganizerOnly,
}

#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<dyn EventStore>,
    pub invite_policy: InvitePolicy,
}

impl ApiContext {
    pub fn new(store: impl EventStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
            invite_policy: InvitePolicy::default(),
        }
    }

    pub fn with_invite_policy(mut self, invite_policy: InvitePolicy) -> Self {
        self.invite_policy = invite_policy;
        self
    }
}

fn require_caller(caller: Option<&Principal>) -> Result<&Principal, ApiError> {
    caller.ok_or_else(ApiError::unauthenticated)
}

fn parse_event_id(raw: &str) -> Result<EventId, ApiError> {
    Ok(raw.parse::<EventId>()?)
}

fn storage_failure(message: &'static str) -> impl FnOnce(anyhow::Error) -> ApiError {
    move |err| {
        error!(error = %format!("{err:#}"), "{message}");
        ApiError::new(ErrorCode::Storage, message)
    }
}

fn summarize(event: StoredEvent) -> EventSummary {
    EventSummary {
        id: event.id,
        title: event.details.title,
        date: event.details.date,
        time: event.details.time,
        location: event.details.location,
        description: event.details.description,
        organizer: event.organizer,
        attendees: event.attendees,
        created_at: event.created_at,
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
