use shared::{
    domain::{EventDetails, EventId, Principal},
    error::ApiError,
    protocol::EventSummary,
};
use tracing::info;

use crate::{parse_event_id, require_caller, storage_failure, summarize, ApiContext};

pub async fn create_event(
    ctx: &ApiContext,
    caller: Option<&Principal>,
    details: EventDetails,
) -> Result<EventSummary, ApiError> {
    let caller = require_caller(caller)?;
    let event = ctx
        .store
        .insert_event(caller.email(), &details)
        .await
        .map_err(storage_failure("failed to create event"))?;
    info!(event_id = %event.id, organizer = %caller, "event created");
    Ok(summarize(event))
}

pub async fn get_event(
    ctx: &ApiContext,
    caller: Option<&Principal>,
    event_id: &str,
) -> Result<EventSummary, ApiError> {
    let event_id = parse_event_id(event_id)?;
    require_caller(caller)?;
    find_summary(ctx, event_id).await
}

/// Deletes the event when the caller organizes it. A missing event, a
/// malformed id and a non-organizer caller all yield the same `Forbidden`.
pub async fn delete_event(
    ctx: &ApiContext,
    caller: Option<&Principal>,
    event_id: &str,
) -> Result<(), ApiError> {
    let caller = require_caller(caller)?;
    let Ok(event_id) = event_id.parse::<EventId>() else {
        return Err(not_allowed());
    };

    let deleted = ctx
        .store
        .delete_event_if_organizer(event_id, caller.email())
        .await
        .map_err(storage_failure("failed to delete event"))?;
    if !deleted {
        return Err(not_allowed());
    }
    info!(%event_id, organizer = %caller, "event deleted");
    Ok(())
}

pub(crate) async fn find_summary(
    ctx: &ApiContext,
    event_id: EventId,
) -> Result<EventSummary, ApiError> {
    ctx.store
        .find_event(event_id)
        .await
        .map_err(storage_failure("failed to load event"))?
        .map(summarize)
        .ok_or_else(|| ApiError::not_found("event not found"))
}

fn not_allowed() -> ApiError {
    ApiError::forbidden("not allowed")
}

#[cfg(test)]
#[path = "tests/events_tests.rs"]
mod tests;
