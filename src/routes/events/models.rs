use crate::utils::events::models::{Event, EventStatus, LocationOption, TimeOption};
use crate::utils::invitations::models::InvitationStatus;
use crate::utils::votes::models::OptionTally;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

// Send payloads
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateEvent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Defaults to `draft`.
    pub status: Option<String>,
}

/// Absent fields keep their stored value. A `status` that is not one of the
/// known labels, or not a string at all, is ignored.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>)]
    pub status: Option<Value>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateTimeOption {
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateLocationOption {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub details: String,
}

// Receive payloads
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct EventListItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: EventStatus,
    pub status_label: String,
    pub creator: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub time_options: Vec<TimeOption>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TimeOptionTally {
    pub option: TimeOption,
    pub votes: OptionTally,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LocationOptionTally {
    pub option: LocationOption,
    pub votes: OptionTally,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct EventInvitee {
    pub invitation_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub status: InvitationStatus,
    pub status_label: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct EventDetail {
    pub event: Event,
    pub status_label: String,
    pub creator: String,
    pub time_options: Vec<TimeOptionTally>,
    pub location_options: Vec<LocationOptionTally>,
    pub invitations: Vec<EventInvitee>,
}
