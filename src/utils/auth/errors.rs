use crate::modules::store::StoreError;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Username, password and email are required")]
    MissingCredential,
    #[error("Username already taken")]
    UserAlreadyExists,
    #[error("Email already taken")]
    EmailAlreadyTaken,
    #[error("Password is too weak")]
    WeakPassword,
    #[error("Invalid credentials")]
    WrongCredentials,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Invalid username or email")]
    InvalidUserData(#[from] ValidationErrors),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match &self {
            AuthError::MissingCredential
            | AuthError::UserAlreadyExists
            | AuthError::EmailAlreadyTaken
            | AuthError::WeakPassword
            | AuthError::InvalidUserData(_) => StatusCode::BAD_REQUEST,
            AuthError::WrongCredentials | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::Unexpected(e) => {
                tracing::error!("Internal server error: {e:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let info = match self {
            AuthError::Unexpected(_) => "Unexpected server error".to_string(),
            _ => self.to_string(),
        };

        (status_code, Json(json!({ "error_info": info }))).into_response()
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        Self::Unexpected(e.into())
    }
}
