use crate::utils::auth::models::User;
use crate::utils::events::models::{EventStatus, LocationOption, TimeOption};
use crate::utils::invitations::models::{Invitation, InvitationStatus};
use crate::utils::votes::models::Preference;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

// Send payloads
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct InviteUser {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RespondInvitation {
    #[serde(default)]
    pub status: String,
}

// Receive payloads
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct InviteResult {
    pub message: String,
    pub invitation: Invitation,
    pub status_label: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RespondResult {
    pub message: String,
    pub invitation: Invitation,
    pub status_label: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TimeOptionChoice {
    pub option: TimeOption,
    #[schema(value_type = Option<u8>)]
    pub my_preference: Option<Preference>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LocationOptionChoice {
    pub option: LocationOption,
    #[schema(value_type = Option<u8>)]
    pub my_preference: Option<Preference>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct InvitedEvent {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub creator: String,
    pub status: EventStatus,
    pub status_label: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub time_options: Vec<TimeOptionChoice>,
    pub location_options: Vec<LocationOptionChoice>,
}

/// One of the caller's invitations with the event it points to.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct MyInvitation {
    pub id: Uuid,
    pub status: InvitationStatus,
    pub status_label: String,
    #[serde(with = "time::serde::rfc3339")]
    pub sent_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub responded_at: Option<OffsetDateTime>,
    pub event: InvitedEvent,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PotentialInvitees {
    pub users: Vec<User>,
}
