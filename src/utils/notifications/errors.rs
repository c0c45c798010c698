use crate::modules::store::StoreError;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Notification not found")]
    NotFound,
    #[error("This notification belongs to someone else")]
    NotRecipient,
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl IntoResponse for NotificationError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match &self {
            NotificationError::NotFound => StatusCode::NOT_FOUND,
            NotificationError::NotRecipient => StatusCode::FORBIDDEN,
            NotificationError::Unexpected(e) => {
                tracing::error!("Internal server error: {e:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let info = match self {
            NotificationError::Unexpected(_) => "Unexpected server error".to_string(),
            _ => self.to_string(),
        };

        (status_code, Json(json!({ "error_info": info }))).into_response()
    }
}

impl From<StoreError> for NotificationError {
    fn from(e: StoreError) -> Self {
        Self::Unexpected(anyhow::Error::from(e))
    }
}
