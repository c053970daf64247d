//! Read-only event views. Each view is a declarative [`EventFilter`]; the
//! store decides how to evaluate it.

use shared::{
    domain::{AttendeeStatus, Principal},
    error::ApiError,
    protocol::EventSummary,
};
use storage::EventFilter;

use crate::{require_caller, storage_failure, summarize, ApiContext};

pub fn organized_filter(email: &str) -> EventFilter {
    EventFilter::default().organized_by(email)
}

/// Events where the caller holds an entry with `status`, excluding events
/// they organize themselves.
pub fn attending_filter(email: &str, status: AttendeeStatus) -> EventFilter {
    EventFilter::default()
        .with_attendee(email, status)
        .not_organized_by(email)
}

pub fn search_filter(query: &str, date: Option<&str>, caller: Option<&Principal>) -> EventFilter {
    let mut filter = EventFilter::default().matching_text(query);
    if let Some(date) = date {
        filter = filter.on_date(date);
    }
    // Declining hides an event from the decliner only.
    if let Some(caller) = caller {
        filter = filter.without_attendee(caller.email(), AttendeeStatus::Declined);
    }
    filter
}

pub async fn list_organized(
    ctx: &ApiContext,
    caller: Option<&Principal>,
) -> Result<Vec<EventSummary>, ApiError> {
    let caller = require_caller(caller)?;
    run(ctx, &organized_filter(caller.email())).await
}

pub async fn list_invited_pending(
    ctx: &ApiContext,
    caller: Option<&Principal>,
) -> Result<Vec<EventSummary>, ApiError> {
    let caller = require_caller(caller)?;
    run(ctx, &attending_filter(caller.email(), AttendeeStatus::Pending)).await
}

pub async fn list_accepted(
    ctx: &ApiContext,
    caller: Option<&Principal>,
) -> Result<Vec<EventSummary>, ApiError> {
    let caller = require_caller(caller)?;
    run(ctx, &attending_filter(caller.email(), AttendeeStatus::Accepted)).await
}

/// Anonymous callers are allowed here.
pub async fn search_events(
    ctx: &ApiContext,
    caller: Option<&Principal>,
    query: &str,
    date: Option<&str>,
) -> Result<Vec<EventSummary>, ApiError> {
    run(ctx, &search_filter(query, date, caller)).await
}

async fn run(ctx: &ApiContext, filter: &EventFilter) -> Result<Vec<EventSummary>, ApiError> {
    let events = ctx
        .store
        .find_events(filter)
        .await
        .map_err(storage_failure("failed to query events"))?;
    Ok(events.into_iter().map(summarize).collect())
}

#[cfg(test)]
#[path = "tests/views_tests.rs"]
mod tests;
