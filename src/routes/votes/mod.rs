pub mod models;

use crate::modules::store::Store;
use crate::modules::AppState;
use crate::routes::votes::models::{CastVote, CastVoteResult};
use crate::utils::auth::models::Claims;
use crate::utils::votes::errors::VoteError;
use crate::utils::votes::models::{OptionKind, OptionTally};
use crate::utils::votes::{aggregate, cast_vote};
use crate::validation::JsonContent;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use uuid::Uuid;

pub fn time_router() -> Router<AppState> {
    Router::new()
        .route("/:id/vote", post(vote_time_option))
        .route("/:id/votes", get(get_time_option_votes))
}

pub fn location_router() -> Router<AppState> {
    Router::new()
        .route("/:id/vote", post(vote_location_option))
        .route("/:id/votes", get(get_location_option_votes))
}

async fn vote(
    store: &Arc<dyn Store>,
    claims: &Claims,
    kind: OptionKind,
    option_id: Uuid,
    body: CastVote,
) -> Result<(StatusCode, Json<CastVoteResult>), VoteError> {
    let stored = cast_vote(
        store.as_ref(),
        &claims.actor(),
        kind,
        option_id,
        &body.preference,
    )
    .await?;
    let created = stored.is_created();
    let status_code = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status_code,
        Json(CastVoteResult::new(kind, stored.into_inner(), created)),
    ))
}

/// Vote on a time option
#[utoipa::path(post, path = "/time_options/{id}/vote", tag = "votes", request_body = CastVote, responses((status = 201, body = CastVoteResult, description = "Vote recorded"), (status = 200, body = CastVoteResult, description = "Vote updated"), (status = 403, description = "Not eligible or voting closed")))]
pub async fn vote_time_option(
    claims: Claims,
    State(store): State<Arc<dyn Store>>,
    Path(option_id): Path<Uuid>,
    JsonContent(body): JsonContent<CastVote>,
) -> Result<(StatusCode, Json<CastVoteResult>), VoteError> {
    vote(&store, &claims, OptionKind::Time, option_id, body).await
}

/// Vote on a location option
#[utoipa::path(post, path = "/location_options/{id}/vote", tag = "votes", request_body = CastVote, responses((status = 201, body = CastVoteResult, description = "Vote recorded"), (status = 200, body = CastVoteResult, description = "Vote updated"), (status = 403, description = "Not eligible or voting closed")))]
pub async fn vote_location_option(
    claims: Claims,
    State(store): State<Arc<dyn Store>>,
    Path(option_id): Path<Uuid>,
    JsonContent(body): JsonContent<CastVote>,
) -> Result<(StatusCode, Json<CastVoteResult>), VoteError> {
    vote(&store, &claims, OptionKind::Location, option_id, body).await
}

/// Tally of a time option
#[utoipa::path(get, path = "/time_options/{id}/votes", tag = "votes", responses((status = 200, body = OptionTally)))]
pub async fn get_time_option_votes(
    claims: Claims,
    State(store): State<Arc<dyn Store>>,
    Path(option_id): Path<Uuid>,
) -> Result<Json<OptionTally>, VoteError> {
    let tally = aggregate(store.as_ref(), &claims.actor(), OptionKind::Time, option_id).await?;
    Ok(Json(tally))
}

/// Tally of a location option
#[utoipa::path(get, path = "/location_options/{id}/votes", tag = "votes", responses((status = 200, body = OptionTally)))]
pub async fn get_location_option_votes(
    claims: Claims,
    State(store): State<Arc<dyn Store>>,
    Path(option_id): Path<Uuid>,
) -> Result<Json<OptionTally>, VoteError> {
    let tally = aggregate(
        store.as_ref(),
        &claims.actor(),
        OptionKind::Location,
        option_id,
    )
    .await?;
    Ok(Json(tally))
}
