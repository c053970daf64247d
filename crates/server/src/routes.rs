use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use server_api::{
    create_event, delete_event, get_event, invite, list_accepted, list_attendees,
    list_invited_pending, list_organized, respond, search_events,
};
use shared::protocol::{
    AttendeeView, CreateEventRequest, CreateEventResponse, EventSummary, InviteRequest,
    InviteResponse, MessageResponse, RespondRequest, RespondResponse,
};
use tracing::error;

use crate::{app_state::AppState, caller::Caller, error::HttpError};

type HttpResult<T> = Result<Json<T>, HttpError>;

#[derive(Debug, Deserialize)]
pub(crate) struct SearchQuery {
    q: Option<String>,
    date: Option<String>,
}

pub(crate) fn event_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/events", post(http_create_event))
        .route("/events/organized", get(http_list_organized))
        .route("/events/invited", get(http_list_invited))
        .route("/events/accepted", get(http_list_accepted))
        .route("/events/search", get(http_search))
        .route("/events/invite", post(http_invite))
        .route("/events/respond", post(http_respond))
        .route("/events/:id", get(http_get_event).delete(http_delete_event))
        .route("/events/:id/attendees", get(http_list_attendees))
}

async fn healthz(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    match state.api.store.health_check().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(err) => {
            error!(error = %format!("{err:#}"), "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    }
}

async fn http_create_event(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    payload: Result<Json<CreateEventRequest>, JsonRejection>,
) -> HttpResult<CreateEventResponse> {
    let Json(details) = payload?;
    let event = create_event(&state.api, caller.principal(), details).await?;
    Ok(Json(CreateEventResponse {
        message: "Event created".into(),
        event_id: event.id,
    }))
}

async fn http_list_organized(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> HttpResult<Vec<EventSummary>> {
    Ok(Json(list_organized(&state.api, caller.principal()).await?))
}

async fn http_list_invited(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> HttpResult<Vec<EventSummary>> {
    Ok(Json(
        list_invited_pending(&state.api, caller.principal()).await?,
    ))
}

async fn http_list_accepted(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> HttpResult<Vec<EventSummary>> {
    Ok(Json(list_accepted(&state.api, caller.principal()).await?))
}

async fn http_search(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> HttpResult<Vec<EventSummary>> {
    let Query(q) = query?;
    let events = search_events(
        &state.api,
        caller.principal(),
        q.q.as_deref().unwrap_or_default(),
        q.date.as_deref(),
    )
    .await?;
    Ok(Json(events))
}

async fn http_get_event(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(event_id): Path<String>,
) -> HttpResult<EventSummary> {
    Ok(Json(
        get_event(&state.api, caller.principal(), &event_id).await?,
    ))
}

async fn http_delete_event(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(event_id): Path<String>,
) -> HttpResult<MessageResponse> {
    delete_event(&state.api, caller.principal(), &event_id).await?;
    Ok(Json(MessageResponse::new("Event deleted")))
}

async fn http_list_attendees(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(event_id): Path<String>,
) -> HttpResult<Vec<AttendeeView>> {
    Ok(Json(
        list_attendees(&state.api, caller.principal(), &event_id).await?,
    ))
}

async fn http_invite(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    payload: Result<Json<InviteRequest>, JsonRejection>,
) -> HttpResult<InviteResponse> {
    let Json(req) = payload?;
    let event = invite(&state.api, caller.principal(), &req.event_id, &req.email).await?;
    Ok(Json(InviteResponse {
        message: "User invited".into(),
        event,
    }))
}

async fn http_respond(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    payload: Result<Json<RespondRequest>, JsonRejection>,
) -> HttpResult<RespondResponse> {
    let Json(req) = payload?;
    let outcome = respond(&state.api, caller.principal(), &req.event_id, &req.status).await?;
    Ok(Json(RespondResponse {
        message: "Response recorded".into(),
        status: outcome.status,
        event: outcome.event,
    }))
}
