use crate::modules::store::StoreError;
use crate::validation::ValidateContentError;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventError {
    #[error("Event not found")]
    NotFound,
    #[error("Only the event creator can do that")]
    NotCreator,
    #[error("You are not invited to this event")]
    NotInvited,
    #[error(transparent)]
    Invalid(#[from] ValidateContentError),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl IntoResponse for EventError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match &self {
            EventError::NotFound => StatusCode::NOT_FOUND,
            EventError::NotCreator | EventError::NotInvited => StatusCode::FORBIDDEN,
            EventError::Invalid(e) => StatusCode::from(e),
            EventError::Unexpected(e) => {
                tracing::error!("Internal server error: {e:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let info = match self {
            EventError::Unexpected(_) => "Unexpected server error".to_string(),
            _ => self.to_string(),
        };

        (status_code, Json(json!({ "error_info": info }))).into_response()
    }
}

impl From<StoreError> for EventError {
    fn from(e: StoreError) -> Self {
        Self::Unexpected(anyhow::Error::from(e))
    }
}
