use crate::utils::events::models::EventStatus;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Default, Serialize, Deserialize, ToSchema, IntoParams)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventSearchItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: EventStatus,
    pub status_label: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Start of the earliest proposed time, if any.
    #[serde(with = "time::serde::rfc3339::option")]
    pub earliest_time: Option<OffsetDateTime>,
}
