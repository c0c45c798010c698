pub mod models;

use crate::modules::store::Store;
use crate::modules::AppState;
use crate::routes::search::models::{EventSearchItem, SearchQuery};
use crate::utils::auth::models::{Claims, User};
use crate::utils::search::errors::SearchError;
use crate::utils::search;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(search_events))
        .route("/users", get(search_users))
}

/// Search events visible to the caller
#[utoipa::path(get, path = "/search/events", tag = "search", params(SearchQuery), responses((status = 200, body = [EventSearchItem], description = "At most 10 events")))]
pub async fn search_events(
    claims: Claims,
    State(store): State<Arc<dyn Store>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<EventSearchItem>>, SearchError> {
    let events = search::search_events(store.as_ref(), &claims.actor(), &query.q).await?;
    debug!("Found {} event(s) with event search", events.len());
    Ok(Json(events))
}

/// Search users
#[utoipa::path(get, path = "/search/users", tag = "search", params(SearchQuery), responses((status = 200, body = [User], description = "At most 10 users")))]
pub async fn search_users(
    claims: Claims,
    State(store): State<Arc<dyn Store>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<User>>, SearchError> {
    let users = search::search_users(store.as_ref(), &claims.actor(), &query.q).await?;
    if users.is_empty() {
        debug!("Found no users with user search");
    } else {
        debug!("Found {} user(s) with user search", users.len());
    }
    Ok(Json(users))
}
