use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::utils::auth::models::{Credentials, User};
use crate::utils::events::models::{Event, EventChanges, EventUpdate, LocationOption, TimeOption};
use crate::utils::invitations::models::{Invitation, InvitationEntry, InvitationStatus};
use crate::utils::notifications::models::Notification;
use crate::utils::votes::models::{OptionKind, Vote, VoterEntry};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unique constraint violated: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Outcome of an insert guarded by a unique key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inserted<T> {
    Created(T),
    Existing(T),
}

/// Outcome of an insert-or-update keyed on a unique pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert<T> {
    Created(T),
    Updated(T),
}

impl<T> Upsert<T> {
    pub fn is_created(&self) -> bool {
        matches!(self, Upsert::Created(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Upsert::Created(t) | Upsert::Updated(t) => t,
        }
    }
}

/// Relational store behind every core operation.
///
/// Implementations must enforce the unique keys on `(event_id, user_id)` for
/// invitations and `(user_id, option_id)` for votes atomically, and cascade
/// event deletion to options, invitations, votes and notifications.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, user: &User, password_hash: &str) -> Result<(), StoreError>;
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn get_credentials(&self, username: &str) -> Result<Option<Credentials>, StoreError>;
    /// Case-insensitive substring match on username or email.
    async fn search_users(
        &self,
        text: &str,
        exclude: Uuid,
        limit: usize,
    ) -> Result<Vec<User>, StoreError>;
    async fn list_uninvited_users(
        &self,
        event_id: Uuid,
        exclude: Uuid,
    ) -> Result<Vec<User>, StoreError>;

    async fn insert_event(&self, event: &Event) -> Result<(), StoreError>;
    async fn get_event(&self, event_id: Uuid) -> Result<Option<Event>, StoreError>;
    /// Applies `changes` under a row lock. Returns `None` when the event is gone.
    async fn update_event(
        &self,
        event_id: Uuid,
        changes: &EventChanges,
        at: OffsetDateTime,
    ) -> Result<Option<EventUpdate>, StoreError>;
    async fn delete_event(&self, event_id: Uuid) -> Result<bool, StoreError>;
    /// Events created by the user or with an accepted invitation, newest first.
    async fn list_visible_events(&self, user_id: Uuid) -> Result<Vec<Event>, StoreError>;
    /// Events created by the user or with an invitation in one of `statuses`,
    /// matching `text` in title or description, newest first.
    async fn search_events(
        &self,
        user_id: Uuid,
        text: &str,
        statuses: &[InvitationStatus],
        limit: usize,
    ) -> Result<Vec<Event>, StoreError>;

    async fn insert_time_option(&self, option: &TimeOption) -> Result<(), StoreError>;
    async fn insert_location_option(&self, option: &LocationOption) -> Result<(), StoreError>;
    async fn get_time_option(&self, option_id: Uuid) -> Result<Option<TimeOption>, StoreError>;
    async fn get_location_option(
        &self,
        option_id: Uuid,
    ) -> Result<Option<LocationOption>, StoreError>;
    /// Ordered by start time.
    async fn list_time_options(&self, event_id: Uuid) -> Result<Vec<TimeOption>, StoreError>;
    async fn list_location_options(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<LocationOption>, StoreError>;

    async fn insert_invitation(
        &self,
        invitation: &Invitation,
    ) -> Result<Inserted<Invitation>, StoreError>;
    async fn get_invitation(&self, invitation_id: Uuid) -> Result<Option<Invitation>, StoreError>;
    async fn find_invitation(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Invitation>, StoreError>;
    async fn respond_invitation(
        &self,
        invitation_id: Uuid,
        status: InvitationStatus,
        at: OffsetDateTime,
    ) -> Result<Option<Invitation>, StoreError>;
    async fn list_event_invitations(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<InvitationEntry>, StoreError>;
    /// Newest first.
    async fn list_user_invitations(&self, user_id: Uuid) -> Result<Vec<Invitation>, StoreError>;

    async fn upsert_vote(&self, kind: OptionKind, vote: &Vote) -> Result<Upsert<Vote>, StoreError>;
    async fn find_vote(
        &self,
        kind: OptionKind,
        user_id: Uuid,
        option_id: Uuid,
    ) -> Result<Option<Vote>, StoreError>;
    /// Latest votes first.
    async fn list_option_votes(
        &self,
        kind: OptionKind,
        option_id: Uuid,
    ) -> Result<Vec<VoterEntry>, StoreError>;

    async fn insert_notifications(&self, notifications: &[Notification]) -> Result<(), StoreError>;
    async fn get_notification(
        &self,
        notification_id: Uuid,
    ) -> Result<Option<Notification>, StoreError>;
    /// Unread only, newest first.
    async fn list_unread_notifications(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Notification>, StoreError>;
    /// Returns `false` when the notification was already read.
    async fn mark_notification_read(&self, notification_id: Uuid) -> Result<bool, StoreError>;
    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64, StoreError>;
}
