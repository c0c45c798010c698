use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    Tentative,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Declined => "declined",
            InvitationStatus::Tentative => "tentative",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "Pending",
            InvitationStatus::Accepted => "Accepted",
            InvitationStatus::Declined => "Declined",
            InvitationStatus::Tentative => "Tentative",
        }
    }

    /// Invitees holding one of these statuses take part in voting.
    pub fn grants_vote(&self) -> bool {
        matches!(self, InvitationStatus::Accepted | InvitationStatus::Tentative)
    }
}

impl TryFrom<&str> for InvitationStatus {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            "tentative" => Ok(Self::Tentative),
            other => Err(format!("{other} is not a valid invitation status")),
        }
    }
}

impl Display for InvitationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Invitation {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: InvitationStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub sent_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub responded_at: Option<OffsetDateTime>,
}

impl Invitation {
    pub fn pending(event_id: Uuid, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            status: InvitationStatus::Pending,
            sent_at: OffsetDateTime::now_utc(),
            responded_at: None,
        }
    }
}

/// Invitation joined with the invitee's handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationEntry {
    pub invitation: Invitation,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteOutcome {
    Created(Invitation),
    AlreadyPending(Invitation),
    AlreadyResponded(Invitation),
}

impl InviteOutcome {
    pub fn invitation(&self) -> &Invitation {
        match self {
            InviteOutcome::Created(inv)
            | InviteOutcome::AlreadyPending(inv)
            | InviteOutcome::AlreadyResponded(inv) => inv,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, InviteOutcome::Created(_))
    }
}
