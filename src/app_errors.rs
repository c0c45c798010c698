use crate::utils::auth::errors::AuthError;
use crate::utils::events::errors::EventError;
use crate::utils::invitations::errors::InvitationError;
use crate::utils::notifications::errors::NotificationError;
use crate::utils::search::errors::SearchError;
use crate::utils::votes::errors::VoteError;
use axum::response::IntoResponse;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    AuthError(#[from] AuthError),
    #[error(transparent)]
    EventError(#[from] EventError),
    #[error(transparent)]
    InvitationError(#[from] InvitationError),
    #[error(transparent)]
    VoteError(#[from] VoteError),
    #[error(transparent)]
    NotificationError(#[from] NotificationError),
    #[error(transparent)]
    SearchError(#[from] SearchError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::AuthError(e) => e.into_response(),
            AppError::EventError(e) => e.into_response(),
            AppError::InvitationError(e) => e.into_response(),
            AppError::VoteError(e) => e.into_response(),
            AppError::NotificationError(e) => e.into_response(),
            AppError::SearchError(e) => e.into_response(),
        }
    }
}

/// Shorthand for wrapping a foreign error into `anyhow` with the default context.
pub trait DefaultContext<T> {
    fn dc(self) -> anyhow::Result<T>;
}

impl<T, E> DefaultContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn dc(self) -> anyhow::Result<T> {
        self.map_err(|e| anyhow::Error::new(e).context("Unexpected failure"))
    }
}
