use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Invitation,
    Reminder,
    Update,
    Confirmation,
    Cancellation,
    VoteUpdate,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Invitation => "invitation",
            NotificationKind::Reminder => "reminder",
            NotificationKind::Update => "update",
            NotificationKind::Confirmation => "confirmation",
            NotificationKind::Cancellation => "cancellation",
            NotificationKind::VoteUpdate => "vote_update",
        }
    }
}

impl TryFrom<&str> for NotificationKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "invitation" => Ok(Self::Invitation),
            "reminder" => Ok(Self::Reminder),
            "update" => Ok(Self::Update),
            "confirmation" => Ok(Self::Confirmation),
            "cancellation" => Ok(Self::Cancellation),
            "vote_update" => Ok(Self::VoteUpdate),
            other => Err(format!("{other} is not a valid notification kind")),
        }
    }
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub read: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Notification {
    pub fn new(user_id: Uuid, event_id: Uuid, kind: NotificationKind, message: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            event_id,
            kind,
            message,
            read: false,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}
