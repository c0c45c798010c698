use crate::modules::store::StoreError;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoteError {
    #[error("Option not found")]
    OptionNotFound,
    #[error("Event not found")]
    EventNotFound,
    #[error("You must be invited or the creator to vote on this event's options")]
    NotEligible,
    #[error("Voting is closed for this event")]
    VotingClosed,
    #[error("Only the event creator can see every vote")]
    NotCreator,
    #[error("{0}")]
    InvalidPreference(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl IntoResponse for VoteError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match &self {
            VoteError::OptionNotFound | VoteError::EventNotFound => StatusCode::NOT_FOUND,
            VoteError::NotEligible | VoteError::VotingClosed | VoteError::NotCreator => {
                StatusCode::FORBIDDEN
            }
            VoteError::InvalidPreference(_) => StatusCode::BAD_REQUEST,
            VoteError::Unexpected(e) => {
                tracing::error!("Internal server error: {e:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let info = match self {
            VoteError::Unexpected(_) => "Unexpected server error".to_string(),
            _ => self.to_string(),
        };

        (status_code, Json(json!({ "error_info": info }))).into_response()
    }
}

impl From<StoreError> for VoteError {
    fn from(e: StoreError) -> Self {
        Self::Unexpected(anyhow::Error::from(e))
    }
}
