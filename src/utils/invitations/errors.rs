use crate::modules::store::StoreError;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvitationError {
    #[error("Event not found")]
    EventNotFound,
    #[error("Invitation not found")]
    InvitationNotFound,
    #[error("User not found")]
    UserNotFound,
    #[error("Only the event creator can send invitations")]
    NotCreator,
    #[error("You can only respond to your own invitations")]
    NotInvitee,
    #[error("You cannot invite yourself")]
    SelfInvitation,
    #[error("User ID to invite is required")]
    MissingInvitee,
    #[error("Valid status (accepted, declined, tentative) is required")]
    InvalidResponse,
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl IntoResponse for InvitationError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match &self {
            InvitationError::EventNotFound
            | InvitationError::InvitationNotFound
            | InvitationError::UserNotFound => StatusCode::NOT_FOUND,
            InvitationError::NotCreator | InvitationError::NotInvitee => StatusCode::FORBIDDEN,
            InvitationError::SelfInvitation
            | InvitationError::MissingInvitee
            | InvitationError::InvalidResponse => StatusCode::BAD_REQUEST,
            InvitationError::Unexpected(e) => {
                tracing::error!("Internal server error: {e:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let info = match self {
            InvitationError::Unexpected(_) => "Unexpected server error".to_string(),
            _ => self.to_string(),
        };

        (status_code, Json(json!({ "error_info": info }))).into_response()
    }
}

impl From<StoreError> for InvitationError {
    fn from(e: StoreError) -> Self {
        Self::Unexpected(anyhow::Error::from(e))
    }
}
