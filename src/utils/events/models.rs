use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[default]
    Draft,
    Planning,
    Confirmed,
    Cancelled,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Planning => "planning",
            EventStatus::Confirmed => "confirmed",
            EventStatus::Cancelled => "cancelled",
            EventStatus::Completed => "completed",
        }
    }

    /// Human readable name used in notification messages.
    pub fn label(&self) -> &'static str {
        match self {
            EventStatus::Draft => "Draft",
            EventStatus::Planning => "Planning",
            EventStatus::Confirmed => "Confirmed",
            EventStatus::Cancelled => "Cancelled",
            EventStatus::Completed => "Completed",
        }
    }

    /// Options can only be voted on while the event is still being planned.
    pub fn is_open_for_voting(&self) -> bool {
        matches!(self, EventStatus::Draft | EventStatus::Planning)
    }
}

impl TryFrom<&str> for EventStatus {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "draft" => Ok(Self::Draft),
            "planning" => Ok(Self::Planning),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            other => Err(format!("{other} is not a valid event status")),
        }
    }
}

impl Display for EventStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: EventStatus,
    pub creator_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Event {
    pub fn new(creator_id: Uuid, title: String, description: String, status: EventStatus) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            status,
            creator_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimeOption {
    pub id: Uuid,
    pub event_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
}

impl TimeOption {
    pub fn new(event_id: Uuid, start_time: OffsetDateTime, end_time: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            start_time,
            end_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LocationOption {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub address: String,
    pub details: String,
}

impl LocationOption {
    pub fn new(event_id: Uuid, name: String, address: String, details: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            name,
            address,
            details,
        }
    }
}

/// Fields to overwrite on an event; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<EventStatus>,
}

/// Result of an applied update together with the status the row held
/// right before it was locked for writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventUpdate {
    pub event: Event,
    pub previous_status: EventStatus,
}

impl EventUpdate {
    pub fn transition(&self) -> Option<EventStatus> {
        (self.event.status != self.previous_status).then_some(self.event.status)
    }
}
