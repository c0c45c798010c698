pub mod models;

use crate::modules::store::Store;
use crate::modules::AppState;
use crate::routes::events::models::*;
use crate::routes::invitations::models::{InviteResult, InviteUser, PotentialInvitees};
use crate::routes::votes::models::VoteSummary;
use crate::utils::auth::models::Claims;
use crate::utils::events::errors::EventError;
use crate::utils::events::models::{Event, LocationOption, TimeOption};
use crate::utils::events::{self, get_event_detail, list_events};
use crate::utils::invitations::errors::InvitationError;
use crate::utils::invitations::models::InviteOutcome;
use crate::utils::invitations::{invite, potential_invitees};
use crate::utils::votes::errors::VoteError;
use crate::utils::votes::summary;
use crate::validation::JsonContent;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_events).post(create_event))
        .route(
            "/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/:id/time_options", post(create_time_option))
        .route("/:id/location_options", post(create_location_option))
        .route("/:id/invite", post(invite_user))
        .route("/:id/potential_invitees", get(get_potential_invitees))
        .route("/:id/votes", get(get_vote_summary))
}

/// Create event
#[utoipa::path(post, path = "/events", tag = "events", request_body = CreateEvent, responses((status = 201, body = Event, description = "Created event"), (status = 400, description = "Missing title or unknown status")))]
pub async fn create_event(
    claims: Claims,
    State(store): State<Arc<dyn Store>>,
    JsonContent(body): JsonContent<CreateEvent>,
) -> Result<(StatusCode, Json<Event>), EventError> {
    let event = events::create_event(store.as_ref(), &claims.actor(), body).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Events created or accepted by the caller
#[utoipa::path(get, path = "/events", tag = "events", responses((status = 200, body = [EventListItem], description = "Visible events, newest first")))]
pub async fn get_events(
    claims: Claims,
    State(store): State<Arc<dyn Store>>,
) -> Result<Json<Vec<EventListItem>>, EventError> {
    Ok(Json(list_events(store.as_ref(), &claims.actor()).await?))
}

/// Get event
#[utoipa::path(get, path = "/events/{id}", tag = "events", responses((status = 200, body = EventDetail), (status = 403, description = "Not invited"), (status = 404, description = "Event not found")))]
pub async fn get_event(
    claims: Claims,
    State(store): State<Arc<dyn Store>>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventDetail>, EventError> {
    let detail = get_event_detail(store.as_ref(), &claims.actor(), event_id).await?;
    Ok(Json(detail))
}

/// Update event
#[utoipa::path(put, path = "/events/{id}", tag = "events", request_body = UpdateEvent, responses((status = 200, body = Event, description = "Updated event"), (status = 403, description = "Not the creator")))]
pub async fn update_event(
    claims: Claims,
    State(store): State<Arc<dyn Store>>,
    Path(event_id): Path<Uuid>,
    JsonContent(body): JsonContent<UpdateEvent>,
) -> Result<Json<Event>, EventError> {
    let event = events::update_event(store.as_ref(), &claims.actor(), event_id, body).await?;
    Ok(Json(event))
}

/// Delete event with everything attached to it
#[utoipa::path(delete, path = "/events/{id}", tag = "events", responses((status = 204, description = "Deleted"), (status = 403, description = "Not the creator")))]
pub async fn delete_event(
    claims: Claims,
    State(store): State<Arc<dyn Store>>,
    Path(event_id): Path<Uuid>,
) -> Result<StatusCode, EventError> {
    events::delete_event(store.as_ref(), &claims.actor(), event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Propose a time
#[utoipa::path(post, path = "/events/{id}/time_options", tag = "events", request_body = CreateTimeOption, responses((status = 201, body = TimeOption, description = "Added time option"), (status = 400, description = "End is not after start")))]
pub async fn create_time_option(
    claims: Claims,
    State(store): State<Arc<dyn Store>>,
    Path(event_id): Path<Uuid>,
    JsonContent(body): JsonContent<CreateTimeOption>,
) -> Result<(StatusCode, Json<TimeOption>), EventError> {
    let option = events::add_time_option(store.as_ref(), &claims.actor(), event_id, body).await?;
    Ok((StatusCode::CREATED, Json(option)))
}

/// Propose a location
#[utoipa::path(post, path = "/events/{id}/location_options", tag = "events", request_body = CreateLocationOption, responses((status = 201, body = LocationOption, description = "Added location option"), (status = 400, description = "Missing name or address")))]
pub async fn create_location_option(
    claims: Claims,
    State(store): State<Arc<dyn Store>>,
    Path(event_id): Path<Uuid>,
    JsonContent(body): JsonContent<CreateLocationOption>,
) -> Result<(StatusCode, Json<LocationOption>), EventError> {
    let option =
        events::add_location_option(store.as_ref(), &claims.actor(), event_id, body).await?;
    Ok((StatusCode::CREATED, Json(option)))
}

/// Invite a user
#[utoipa::path(post, path = "/events/{id}/invite", tag = "invitations", request_body = InviteUser, responses((status = 201, body = InviteResult, description = "Invitation sent"), (status = 200, body = InviteResult, description = "User was already invited")))]
pub async fn invite_user(
    claims: Claims,
    State(store): State<Arc<dyn Store>>,
    Path(event_id): Path<Uuid>,
    JsonContent(body): JsonContent<InviteUser>,
) -> Result<(StatusCode, Json<InviteResult>), InvitationError> {
    let user_id = body.user_id.ok_or(InvitationError::MissingInvitee)?;
    let outcome = invite(store.as_ref(), &claims.actor(), event_id, user_id).await?;

    let (status_code, message) = match &outcome {
        InviteOutcome::Created(_) => (StatusCode::CREATED, "Invitation sent"),
        InviteOutcome::AlreadyPending(_) => (StatusCode::OK, "User is already invited"),
        InviteOutcome::AlreadyResponded(_) => {
            (StatusCode::OK, "User has already responded to the invitation")
        }
    };
    let invitation = outcome.invitation().clone();
    Ok((
        status_code,
        Json(InviteResult {
            message: message.to_string(),
            status_label: invitation.status.label().to_string(),
            invitation,
        }),
    ))
}

/// Users that can still be invited
#[utoipa::path(get, path = "/events/{id}/potential_invitees", tag = "invitations", responses((status = 200, body = PotentialInvitees), (status = 403, description = "Not the creator")))]
pub async fn get_potential_invitees(
    claims: Claims,
    State(store): State<Arc<dyn Store>>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<PotentialInvitees>, InvitationError> {
    let users = potential_invitees(store.as_ref(), &claims.actor(), event_id).await?;
    Ok(Json(PotentialInvitees { users }))
}

/// Every vote on the event
#[utoipa::path(get, path = "/events/{id}/votes", tag = "votes", responses((status = 200, body = VoteSummary), (status = 403, description = "Not the creator")))]
pub async fn get_vote_summary(
    claims: Claims,
    State(store): State<Arc<dyn Store>>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<VoteSummary>, VoteError> {
    Ok(Json(summary(store.as_ref(), &claims.actor(), event_id).await?))
}
