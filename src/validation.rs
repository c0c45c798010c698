use axum::body::HttpBody;
use axum::extract::{FromRequest, Json};
use axum::response::IntoResponse;
use axum::{async_trait, BoxError};
use http::{Request, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::routes::events::models::{
    CreateEvent, CreateLocationOption, CreateTimeOption, UpdateEvent,
};
use crate::utils::events::models::EventStatus;

#[derive(Debug, Error)]
pub enum ValidateContentError {
    #[error("{0}")]
    Expected(String),
    #[error("Unexpected server error")]
    Unexpected(#[from] anyhow::Error),
}

impl ValidateContentError {
    pub fn new(content: impl ToString) -> Self {
        Self::Expected(content.to_string())
    }
}

impl From<&ValidateContentError> for StatusCode {
    fn from(value: &ValidateContentError) -> Self {
        match value {
            ValidateContentError::Expected(_) => StatusCode::BAD_REQUEST,
            ValidateContentError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ValidateContentError {
    fn into_response(self) -> axum::response::Response {
        let status_code = StatusCode::from(&self);
        let info = self.to_string();
        (status_code, Json(json!({ "error_info": info }))).into_response()
    }
}

/// `Json` body whose rejections (missing body, bad syntax, wrong field
/// types) answer with a 400 `ValidateContentError` instead of axum's 4xx text.
#[derive(Debug)]
pub struct JsonContent<T>(pub T);

#[async_trait]
impl<T, S, B> FromRequest<S, B> for JsonContent<T>
where
    T: DeserializeOwned,
    B: HttpBody + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
    S: Send + Sync,
{
    type Rejection = ValidateContentError;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            debug!("Rejected request body: {e}");
            ValidateContentError::new(e.body_text())
        })?;
        Ok(Self(value))
    }
}

pub trait ValidateContent {
    fn validate_content(&self) -> Result<(), ValidateContentError>;
}

fn require(field: &str, value: &str) -> Result<(), ValidateContentError> {
    if value.trim().is_empty() {
        Err(ValidateContentError::new(format!("{field} is required")))
    } else {
        Ok(())
    }
}

impl ValidateContent for CreateEvent {
    fn validate_content(&self) -> Result<(), ValidateContentError> {
        require("Title", &self.title)?;
        if let Some(status) = &self.status {
            EventStatus::try_from(status.as_str()).map_err(ValidateContentError::new)?;
        }
        Ok(())
    }
}

impl ValidateContent for UpdateEvent {
    fn validate_content(&self) -> Result<(), ValidateContentError> {
        match &self.title {
            Some(title) => require("Title", title),
            None => Ok(()),
        }
    }
}

impl ValidateContent for CreateTimeOption {
    fn validate_content(&self) -> Result<(), ValidateContentError> {
        if self.start_time >= self.end_time {
            Err(ValidateContentError::new(
                "Time option must start before it ends",
            ))
        } else {
            Ok(())
        }
    }
}

impl ValidateContent for CreateLocationOption {
    fn validate_content(&self) -> Result<(), ValidateContentError> {
        require("Name", &self.name)?;
        require("Address", &self.address)
    }
}
