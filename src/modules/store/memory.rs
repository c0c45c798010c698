use anyhow::anyhow;
use async_trait::async_trait;
use std::cmp::Reverse;
use std::sync::{Mutex, MutexGuard};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{Inserted, Store, StoreError, Upsert};
use crate::utils::auth::models::{Credentials, User};
use crate::utils::events::models::{Event, EventChanges, EventUpdate, LocationOption, TimeOption};
use crate::utils::invitations::models::{Invitation, InvitationEntry, InvitationStatus};
use crate::utils::notifications::models::Notification;
use crate::utils::votes::models::{OptionKind, Vote, VoterEntry};

#[derive(Default)]
struct Tables {
    users: Vec<(User, String)>,
    events: Vec<Event>,
    time_options: Vec<TimeOption>,
    location_options: Vec<LocationOption>,
    invitations: Vec<Invitation>,
    time_votes: Vec<Vote>,
    location_votes: Vec<Vote>,
    notifications: Vec<Notification>,
}

impl Tables {
    fn username(&self, user_id: Uuid) -> String {
        self.users
            .iter()
            .find(|(user, _)| user.id == user_id)
            .map(|(user, _)| user.username.clone())
            .unwrap_or_default()
    }

    fn invitation_status(&self, event_id: Uuid, user_id: Uuid) -> Option<InvitationStatus> {
        self.invitations
            .iter()
            .find(|inv| inv.event_id == event_id && inv.user_id == user_id)
            .map(|inv| inv.status)
    }

    fn votes(&self, kind: OptionKind) -> &Vec<Vote> {
        match kind {
            OptionKind::Time => &self.time_votes,
            OptionKind::Location => &self.location_votes,
        }
    }

    fn votes_mut(&mut self, kind: OptionKind) -> &mut Vec<Vote> {
        match kind {
            OptionKind::Time => &mut self.time_votes,
            OptionKind::Location => &mut self.location_votes,
        }
    }
}

/// In-process store with the same uniqueness, cascade and ordering rules as
/// [`super::PgStore`]. Every call holds the lock for its whole duration, which
/// makes upserts and status transitions atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unexpected(anyhow!("memory store lock poisoned")))
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Newest first, later insertions win ties.
fn newest_first<T: Clone>(items: Vec<&T>, created_at: impl Fn(&T) -> OffsetDateTime) -> Vec<T> {
    let mut items: Vec<(usize, &T)> = items.into_iter().enumerate().collect();
    items.sort_by_key(|(position, item)| Reverse((created_at(item), *position)));
    items.into_iter().map(|(_, item)| item.clone()).collect()
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: &User, password_hash: &str) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        if tables.users.iter().any(|(u, _)| u.username == user.username) {
            return Err(StoreError::Conflict("users_username_key".into()));
        }
        if tables.users.iter().any(|(u, _)| u.email == user.email) {
            return Err(StoreError::Conflict("users_email_key".into()));
        }
        tables.users.push((user.clone(), password_hash.to_string()));
        Ok(())
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .users
            .iter()
            .find(|(user, _)| user.id == user_id)
            .map(|(user, _)| user.clone()))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .users
            .iter()
            .find(|(user, _)| user.username == username)
            .map(|(user, _)| user.clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .users
            .iter()
            .find(|(user, _)| user.email == email)
            .map(|(user, _)| user.clone()))
    }

    async fn get_credentials(&self, username: &str) -> Result<Option<Credentials>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .users
            .iter()
            .find(|(user, _)| user.username == username)
            .map(|(user, hash)| Credentials {
                user: user.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn search_users(
        &self,
        text: &str,
        exclude: Uuid,
        limit: usize,
    ) -> Result<Vec<User>, StoreError> {
        let tables = self.tables()?;
        let needle = text.to_lowercase();
        let mut users: Vec<User> = tables
            .users
            .iter()
            .map(|(user, _)| user)
            .filter(|user| user.id != exclude)
            .filter(|user| contains_ci(&user.username, &needle) || contains_ci(&user.email, &needle))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users.truncate(limit);
        Ok(users)
    }

    async fn list_uninvited_users(
        &self,
        event_id: Uuid,
        exclude: Uuid,
    ) -> Result<Vec<User>, StoreError> {
        let tables = self.tables()?;
        let mut users: Vec<User> = tables
            .users
            .iter()
            .map(|(user, _)| user)
            .filter(|user| user.id != exclude)
            .filter(|user| tables.invitation_status(event_id, user.id).is_none())
            .cloned()
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn insert_event(&self, event: &Event) -> Result<(), StoreError> {
        self.tables()?.events.push(event.clone());
        Ok(())
    }

    async fn get_event(&self, event_id: Uuid) -> Result<Option<Event>, StoreError> {
        let tables = self.tables()?;
        Ok(tables.events.iter().find(|e| e.id == event_id).cloned())
    }

    async fn update_event(
        &self,
        event_id: Uuid,
        changes: &EventChanges,
        at: OffsetDateTime,
    ) -> Result<Option<EventUpdate>, StoreError> {
        let mut tables = self.tables()?;
        let Some(event) = tables.events.iter_mut().find(|e| e.id == event_id) else {
            return Ok(None);
        };
        let previous_status = event.status;
        if let Some(title) = &changes.title {
            event.title = title.clone();
        }
        if let Some(description) = &changes.description {
            event.description = description.clone();
        }
        if let Some(status) = changes.status {
            event.status = status;
        }
        event.updated_at = at;
        Ok(Some(EventUpdate {
            event: event.clone(),
            previous_status,
        }))
    }

    async fn delete_event(&self, event_id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        let before = tables.events.len();
        tables.events.retain(|e| e.id != event_id);
        if tables.events.len() == before {
            return Ok(false);
        }
        tables.time_options.retain(|o| o.event_id != event_id);
        tables.location_options.retain(|o| o.event_id != event_id);
        tables.invitations.retain(|i| i.event_id != event_id);
        tables.time_votes.retain(|v| v.event_id != event_id);
        tables.location_votes.retain(|v| v.event_id != event_id);
        tables.notifications.retain(|n| n.event_id != event_id);
        Ok(true)
    }

    async fn list_visible_events(&self, user_id: Uuid) -> Result<Vec<Event>, StoreError> {
        let tables = self.tables()?;
        let visible: Vec<&Event> = tables
            .events
            .iter()
            .filter(|e| {
                e.creator_id == user_id
                    || tables.invitation_status(e.id, user_id) == Some(InvitationStatus::Accepted)
            })
            .collect();
        Ok(newest_first(visible, |e| e.created_at))
    }

    async fn search_events(
        &self,
        user_id: Uuid,
        text: &str,
        statuses: &[InvitationStatus],
        limit: usize,
    ) -> Result<Vec<Event>, StoreError> {
        let tables = self.tables()?;
        let needle = text.to_lowercase();
        let matching: Vec<&Event> = tables
            .events
            .iter()
            .filter(|e| {
                e.creator_id == user_id
                    || tables
                        .invitation_status(e.id, user_id)
                        .map_or(false, |status| statuses.contains(&status))
            })
            .filter(|e| contains_ci(&e.title, &needle) || contains_ci(&e.description, &needle))
            .collect();
        let mut events = newest_first(matching, |e| e.created_at);
        events.truncate(limit);
        Ok(events)
    }

    async fn insert_time_option(&self, option: &TimeOption) -> Result<(), StoreError> {
        self.tables()?.time_options.push(option.clone());
        Ok(())
    }

    async fn insert_location_option(&self, option: &LocationOption) -> Result<(), StoreError> {
        self.tables()?.location_options.push(option.clone());
        Ok(())
    }

    async fn get_time_option(&self, option_id: Uuid) -> Result<Option<TimeOption>, StoreError> {
        let tables = self.tables()?;
        Ok(tables.time_options.iter().find(|o| o.id == option_id).cloned())
    }

    async fn get_location_option(
        &self,
        option_id: Uuid,
    ) -> Result<Option<LocationOption>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .location_options
            .iter()
            .find(|o| o.id == option_id)
            .cloned())
    }

    async fn list_time_options(&self, event_id: Uuid) -> Result<Vec<TimeOption>, StoreError> {
        let tables = self.tables()?;
        let mut options: Vec<TimeOption> = tables
            .time_options
            .iter()
            .filter(|o| o.event_id == event_id)
            .cloned()
            .collect();
        options.sort_by_key(|o| o.start_time);
        Ok(options)
    }

    async fn list_location_options(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<LocationOption>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .location_options
            .iter()
            .filter(|o| o.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn insert_invitation(
        &self,
        invitation: &Invitation,
    ) -> Result<Inserted<Invitation>, StoreError> {
        let mut tables = self.tables()?;
        if let Some(existing) = tables
            .invitations
            .iter()
            .find(|i| i.event_id == invitation.event_id && i.user_id == invitation.user_id)
        {
            return Ok(Inserted::Existing(existing.clone()));
        }
        tables.invitations.push(invitation.clone());
        Ok(Inserted::Created(invitation.clone()))
    }

    async fn get_invitation(&self, invitation_id: Uuid) -> Result<Option<Invitation>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .invitations
            .iter()
            .find(|i| i.id == invitation_id)
            .cloned())
    }

    async fn find_invitation(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Invitation>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .invitations
            .iter()
            .find(|i| i.event_id == event_id && i.user_id == user_id)
            .cloned())
    }

    async fn respond_invitation(
        &self,
        invitation_id: Uuid,
        status: InvitationStatus,
        at: OffsetDateTime,
    ) -> Result<Option<Invitation>, StoreError> {
        let mut tables = self.tables()?;
        let Some(invitation) = tables.invitations.iter_mut().find(|i| i.id == invitation_id) else {
            return Ok(None);
        };
        invitation.status = status;
        invitation.responded_at = Some(at);
        Ok(Some(invitation.clone()))
    }

    async fn list_event_invitations(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<InvitationEntry>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .invitations
            .iter()
            .filter(|i| i.event_id == event_id)
            .map(|i| InvitationEntry {
                invitation: i.clone(),
                username: tables.username(i.user_id),
            })
            .collect())
    }

    async fn list_user_invitations(&self, user_id: Uuid) -> Result<Vec<Invitation>, StoreError> {
        let tables = self.tables()?;
        let own: Vec<&Invitation> = tables
            .invitations
            .iter()
            .filter(|i| i.user_id == user_id)
            .collect();
        Ok(newest_first(own, |i| i.sent_at))
    }

    async fn upsert_vote(&self, kind: OptionKind, vote: &Vote) -> Result<Upsert<Vote>, StoreError> {
        let mut tables = self.tables()?;
        let votes = tables.votes_mut(kind);
        if let Some(existing) = votes
            .iter_mut()
            .find(|v| v.user_id == vote.user_id && v.option_id == vote.option_id)
        {
            existing.preference = vote.preference;
            existing.voted_at = vote.voted_at;
            return Ok(Upsert::Updated(existing.clone()));
        }
        votes.push(vote.clone());
        Ok(Upsert::Created(vote.clone()))
    }

    async fn find_vote(
        &self,
        kind: OptionKind,
        user_id: Uuid,
        option_id: Uuid,
    ) -> Result<Option<Vote>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .votes(kind)
            .iter()
            .find(|v| v.user_id == user_id && v.option_id == option_id)
            .cloned())
    }

    async fn list_option_votes(
        &self,
        kind: OptionKind,
        option_id: Uuid,
    ) -> Result<Vec<VoterEntry>, StoreError> {
        let tables = self.tables()?;
        let votes: Vec<&Vote> = tables
            .votes(kind)
            .iter()
            .filter(|v| v.option_id == option_id)
            .collect();
        Ok(newest_first(votes, |v| v.voted_at)
            .into_iter()
            .map(|v| VoterEntry {
                username: tables.username(v.user_id),
                user_id: v.user_id,
                preference: v.preference,
                voted_at: v.voted_at,
            })
            .collect())
    }

    async fn insert_notifications(&self, notifications: &[Notification]) -> Result<(), StoreError> {
        self.tables()?
            .notifications
            .extend(notifications.iter().cloned());
        Ok(())
    }

    async fn get_notification(
        &self,
        notification_id: Uuid,
    ) -> Result<Option<Notification>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .notifications
            .iter()
            .find(|n| n.id == notification_id)
            .cloned())
    }

    async fn list_unread_notifications(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Notification>, StoreError> {
        let tables = self.tables()?;
        let unread: Vec<&Notification> = tables
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.read)
            .collect();
        Ok(newest_first(unread, |n| n.created_at))
    }

    async fn mark_notification_read(&self, notification_id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        match tables
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id && !n.read)
        {
            Some(notification) => {
                notification.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let mut tables = self.tables()?;
        let mut count = 0;
        for notification in tables
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.read)
        {
            notification.read = true;
            count += 1;
        }
        Ok(count)
    }
}
