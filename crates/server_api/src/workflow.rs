use shared::{
    domain::{AttendeeStatus, Principal},
    error::{ApiError, ErrorCode},
    protocol::{AttendeeView, EventSummary},
};
use storage::AddAttendeeOutcome;
use tracing::{debug, info, warn};

use crate::{
    events::find_summary, parse_event_id, require_caller, storage_failure, summarize, ApiContext,
    InvitePolicy,
};

#[derive(Debug, Clone)]
pub struct RespondOutcome {
    pub status: AttendeeStatus,
    /// Refreshed event, absent when the read after the update failed.
    pub event: Option<EventSummary>,
}

/// Adds `target_email` as a pending attendee. Inviting someone already on
/// the list changes nothing and still returns the event.
pub async fn invite(
    ctx: &ApiContext,
    caller: Option<&Principal>,
    event_id: &str,
    target_email: &str,
) -> Result<EventSummary, ApiError> {
    let caller = require_caller(caller)?;
    let target_email = target_email.trim();
    if target_email.is_empty() {
        return Err(ApiError::validation("invalid input"));
    }
    let event_id = parse_event_id(event_id)?;

    if ctx.invite_policy == InvitePolicy::OrganizerOnly {
        let event = find_summary(ctx, event_id).await?;
        if event.organizer != caller.email() {
            return Err(ApiError::forbidden(
                "only the organizer can invite attendees",
            ));
        }
    }

    let outcome = ctx
        .store
        .add_attendee_if_absent(event_id, target_email)
        .await
        .map_err(storage_failure("failed to invite user"))?;
    match outcome {
        AddAttendeeOutcome::EventMissing => return Err(ApiError::not_found("event not found")),
        AddAttendeeOutcome::Added => {
            info!(%event_id, invited_by = %caller, invitee = target_email, "attendee invited")
        }
        AddAttendeeOutcome::AlreadyPresent => {
            debug!(%event_id, invitee = target_email, "attendee already invited")
        }
    }

    match ctx.store.find_event(event_id).await {
        Ok(Some(event)) => Ok(summarize(event)),
        Ok(None) => Err(invite_not_confirmed()),
        Err(err) => {
            warn!(%event_id, error = %format!("{err:#}"), "invite applied but refresh failed");
            Err(invite_not_confirmed())
        }
    }
}

/// Records the caller's own response. The caller must already hold a
/// non-organizer entry on the event.
pub async fn respond(
    ctx: &ApiContext,
    caller: Option<&Principal>,
    event_id: &str,
    status_input: &str,
) -> Result<RespondOutcome, ApiError> {
    let caller = require_caller(caller)?;
    let status = AttendeeStatus::normalize(status_input)?;
    let event_id = parse_event_id(event_id)?;

    let matched = ctx
        .store
        .set_attendee_status(event_id, caller.email(), status)
        .await
        .map_err(storage_failure("failed to update response"))?;
    if !matched {
        return Err(ApiError::new(
            ErrorCode::NotAnAttendee,
            "you are not an attendee of this event",
        ));
    }
    info!(%event_id, attendee = %caller, %status, "response recorded");

    let event = match ctx.store.find_event(event_id).await {
        Ok(event) => event.map(summarize),
        Err(err) => {
            warn!(%event_id, error = %format!("{err:#}"), "response recorded but refresh failed");
            None
        }
    };
    Ok(RespondOutcome { status, event })
}

/// Attendees who said yes, with a readable name derived from their email.
pub async fn list_attendees(
    ctx: &ApiContext,
    caller: Option<&Principal>,
    event_id: &str,
) -> Result<Vec<AttendeeView>, ApiError> {
    let event_id = parse_event_id(event_id)?;
    require_caller(caller)?;
    let event = find_summary(ctx, event_id).await?;

    Ok(event
        .attendees
        .into_iter()
        .filter(|attendee| attendee.status == AttendeeStatus::Accepted)
        .map(|attendee| AttendeeView {
            invite_id: attendee.email.clone(),
            name: display_name(&attendee.email),
            email: attendee.email,
            status: attendee.status,
        })
        .collect())
}

/// `jane.doe_smith@x.com` becomes `Jane Doe Smith`.
pub fn display_name(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    local
        .replace(['.', '_'], " ")
        .split_whitespace()
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn invite_not_confirmed() -> ApiError {
    ApiError::new(
        ErrorCode::PartialSuccess,
        "invite applied but failed to fetch event",
    )
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
