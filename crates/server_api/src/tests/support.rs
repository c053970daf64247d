use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::domain::{AttendeeStatus, EventDetails, EventId, Principal};
use storage::{AddAttendeeOutcome, EventFilter, EventStore, Storage, StoredEvent};

use crate::ApiContext;

pub(crate) fn principal(email: &str) -> Principal {
    Principal::from_email(email).expect("principal")
}

pub(crate) fn details(title: &str) -> EventDetails {
    EventDetails {
        title: title.to_string(),
        date: "2026-11-01".to_string(),
        time: "18:00".to_string(),
        location: "Hall B".to_string(),
        description: format!("{title} description"),
    }
}

pub(crate) async fn memory_context() -> ApiContext {
    ApiContext::new(Storage::new("sqlite::memory:").await.expect("db"))
}

/// Delegates to SQLite but can be told to fail single-event reads, which is
/// how a refresh after a committed mutation goes wrong.
pub(crate) struct FlakyReads {
    inner: Storage,
    fail_reads: Arc<AtomicBool>,
}

#[async_trait]
impl EventStore for FlakyReads {
    async fn health_check(&self) -> Result<()> {
        self.inner.health_check().await
    }

    async fn insert_event(&self, organizer: &str, details: &EventDetails) -> Result<StoredEvent> {
        self.inner.insert_event(organizer, details).await
    }

    async fn find_event(&self, event_id: EventId) -> Result<Option<StoredEvent>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(anyhow!("connection reset"));
        }
        self.inner.find_event(event_id).await
    }

    async fn find_events(&self, filter: &EventFilter) -> Result<Vec<StoredEvent>> {
        self.inner.find_events(filter).await
    }

    async fn add_attendee_if_absent(
        &self,
        event_id: EventId,
        email: &str,
    ) -> Result<AddAttendeeOutcome> {
        self.inner.add_attendee_if_absent(event_id, email).await
    }

    async fn set_attendee_status(
        &self,
        event_id: EventId,
        email: &str,
        status: AttendeeStatus,
    ) -> Result<bool> {
        self.inner.set_attendee_status(event_id, email, status).await
    }

    async fn delete_event_if_organizer(&self, event_id: EventId, organizer: &str) -> Result<bool> {
        self.inner.delete_event_if_organizer(event_id, organizer).await
    }
}

pub(crate) async fn flaky_context() -> (ApiContext, Arc<AtomicBool>) {
    let fail_reads = Arc::new(AtomicBool::new(false));
    let store = FlakyReads {
        inner: Storage::new("sqlite::memory:").await.expect("db"),
        fail_reads: fail_reads.clone(),
    };
    (ApiContext::new(store), fail_reads)
}
