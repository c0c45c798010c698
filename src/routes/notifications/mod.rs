use crate::modules::store::Store;
use crate::modules::AppState;
use crate::utils::auth::models::Claims;
use crate::utils::notifications::errors::NotificationError;
use crate::utils::notifications::models::Notification;
use crate::utils::notifications::{list_unread, mark_all_read, mark_read};
use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_unread_notifications))
        .route("/:id/read", put(put_notification_read))
        .route("/mark_all_read", post(post_mark_all_read))
}

/// Unread notifications of the caller
#[utoipa::path(get, path = "/notifications", tag = "notifications", responses((status = 200, body = [Notification], description = "Unread, newest first")))]
pub async fn get_unread_notifications(
    claims: Claims,
    State(store): State<Arc<dyn Store>>,
) -> Result<Json<Vec<Notification>>, NotificationError> {
    Ok(Json(list_unread(store.as_ref(), &claims.actor()).await?))
}

/// Mark one notification as read
#[utoipa::path(put, path = "/notifications/{id}/read", tag = "notifications", responses((status = 200, description = "Marked as read"), (status = 403, description = "Someone else's notification"), (status = 404, description = "Not found")))]
pub async fn put_notification_read(
    claims: Claims,
    State(store): State<Arc<dyn Store>>,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<Value>, NotificationError> {
    mark_read(store.as_ref(), &claims.actor(), notification_id).await?;
    Ok(Json(json!({ "message": "Notification marked as read" })))
}

/// Mark every notification of the caller as read
#[utoipa::path(post, path = "/notifications/mark_all_read", tag = "notifications", responses((status = 200, description = "Number of notifications marked")))]
pub async fn post_mark_all_read(
    claims: Claims,
    State(store): State<Arc<dyn Store>>,
) -> Result<Json<Value>, NotificationError> {
    let count = mark_all_read(store.as_ref(), &claims.actor()).await?;
    Ok(Json(json!({ "message": "All notifications marked as read", "count": count })))
}
