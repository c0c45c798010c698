pub mod models;

use crate::modules::store::Store;
use crate::modules::AppState;
use crate::routes::invitations::models::{MyInvitation, RespondInvitation, RespondResult};
use crate::utils::auth::models::Claims;
use crate::utils::invitations::errors::InvitationError;
use crate::utils::invitations::{list_for_user, respond};
use crate::validation::JsonContent;
use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_my_invitations))
        .route("/:id/respond", put(respond_invitation))
}

/// Invitations addressed to the caller
#[utoipa::path(get, path = "/invitations", tag = "invitations", responses((status = 200, body = [MyInvitation], description = "Invitations, newest first")))]
pub async fn get_my_invitations(
    claims: Claims,
    State(store): State<Arc<dyn Store>>,
) -> Result<Json<Vec<MyInvitation>>, InvitationError> {
    let invitations = list_for_user(store.as_ref(), &claims.actor()).await?;
    debug!("Fetched {} invitations", invitations.len());
    Ok(Json(invitations))
}

/// Accept, decline or tentatively accept an invitation
#[utoipa::path(put, path = "/invitations/{id}/respond", tag = "invitations", request_body = RespondInvitation, responses((status = 200, body = RespondResult), (status = 400, description = "Unknown status"), (status = 403, description = "Not your invitation")))]
pub async fn respond_invitation(
    claims: Claims,
    State(store): State<Arc<dyn Store>>,
    Path(invitation_id): Path<Uuid>,
    JsonContent(body): JsonContent<RespondInvitation>,
) -> Result<Json<RespondResult>, InvitationError> {
    let invitation = respond(store.as_ref(), &claims.actor(), invitation_id, &body.status).await?;
    Ok(Json(RespondResult {
        message: format!("Invitation {}", invitation.status),
        status_label: invitation.status.label().to_string(),
        invitation,
    }))
}
