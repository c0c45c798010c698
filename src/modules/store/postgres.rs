use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{FromRow, PgPool, Postgres};
use time::OffsetDateTime;
use tracing::trace;
use uuid::Uuid;

use super::{Inserted, Store, StoreError, Upsert};
use crate::modules::database::PgQuery;
use crate::utils::auth::models::{Credentials, User};
use crate::utils::events::models::{
    Event, EventChanges, EventStatus, EventUpdate, LocationOption, TimeOption,
};
use crate::utils::invitations::models::{Invitation, InvitationEntry, InvitationStatus};
use crate::utils::notifications::models::{Notification, NotificationKind};
use crate::utils::votes::models::{OptionKind, Preference, Vote, VoterEntry};

const UNIQUE_VIOLATION: &str = "23505";

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return Self::Conflict(db_err.message().to_string());
            }
        }
        Self::Unexpected(anyhow::Error::from(e))
    }
}

/// `%text%` for `ILIKE` with the pattern metacharacters escaped.
fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn parse_failure(e: String) -> StoreError {
    StoreError::Unexpected(anyhow!(e).context("Stored value is out of domain"))
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
}

#[derive(FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    description: String,
    status: String,
    creator_id: Uuid,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<EventRow> for Event {
    type Error = StoreError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            status: EventStatus::try_from(row.status.as_str()).map_err(parse_failure)?,
            creator_id: row.creator_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct EventUpdateRow {
    id: Uuid,
    title: String,
    description: String,
    status: String,
    creator_id: Uuid,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    previous_status: String,
}

impl TryFrom<EventUpdateRow> for EventUpdate {
    type Error = StoreError;

    fn try_from(row: EventUpdateRow) -> Result<Self, Self::Error> {
        Ok(Self {
            previous_status: EventStatus::try_from(row.previous_status.as_str())
                .map_err(parse_failure)?,
            event: Event::try_from(EventRow {
                id: row.id,
                title: row.title,
                description: row.description,
                status: row.status,
                creator_id: row.creator_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })?,
        })
    }
}

#[derive(FromRow)]
struct TimeOptionRow {
    id: Uuid,
    event_id: Uuid,
    start_time: OffsetDateTime,
    end_time: OffsetDateTime,
}

impl From<TimeOptionRow> for TimeOption {
    fn from(row: TimeOptionRow) -> Self {
        Self {
            id: row.id,
            event_id: row.event_id,
            start_time: row.start_time,
            end_time: row.end_time,
        }
    }
}

#[derive(FromRow)]
struct LocationOptionRow {
    id: Uuid,
    event_id: Uuid,
    name: String,
    address: String,
    details: String,
}

impl From<LocationOptionRow> for LocationOption {
    fn from(row: LocationOptionRow) -> Self {
        Self {
            id: row.id,
            event_id: row.event_id,
            name: row.name,
            address: row.address,
            details: row.details,
        }
    }
}

#[derive(FromRow)]
struct InvitationRow {
    id: Uuid,
    event_id: Uuid,
    user_id: Uuid,
    status: String,
    sent_at: OffsetDateTime,
    responded_at: Option<OffsetDateTime>,
}

impl TryFrom<InvitationRow> for Invitation {
    type Error = StoreError;

    fn try_from(row: InvitationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            event_id: row.event_id,
            user_id: row.user_id,
            status: InvitationStatus::try_from(row.status.as_str()).map_err(parse_failure)?,
            sent_at: row.sent_at,
            responded_at: row.responded_at,
        })
    }
}

#[derive(FromRow)]
struct InvitationEntryRow {
    id: Uuid,
    event_id: Uuid,
    user_id: Uuid,
    status: String,
    sent_at: OffsetDateTime,
    responded_at: Option<OffsetDateTime>,
    username: String,
}

impl TryFrom<InvitationEntryRow> for InvitationEntry {
    type Error = StoreError;

    fn try_from(row: InvitationEntryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            invitation: Invitation::try_from(InvitationRow {
                id: row.id,
                event_id: row.event_id,
                user_id: row.user_id,
                status: row.status,
                sent_at: row.sent_at,
                responded_at: row.responded_at,
            })?,
            username: row.username,
        })
    }
}

#[derive(FromRow)]
struct VoteRow {
    id: Uuid,
    user_id: Uuid,
    option_id: Uuid,
    event_id: Uuid,
    preference: i16,
    voted_at: OffsetDateTime,
}

impl TryFrom<VoteRow> for Vote {
    type Error = StoreError;

    fn try_from(row: VoteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            option_id: row.option_id,
            event_id: row.event_id,
            preference: Preference::try_from(i64::from(row.preference)).map_err(parse_failure)?,
            voted_at: row.voted_at,
        })
    }
}

#[derive(FromRow)]
struct UpsertedVoteRow {
    id: Uuid,
    user_id: Uuid,
    option_id: Uuid,
    event_id: Uuid,
    preference: i16,
    voted_at: OffsetDateTime,
    created: bool,
}

impl TryFrom<UpsertedVoteRow> for Upsert<Vote> {
    type Error = StoreError;

    fn try_from(row: UpsertedVoteRow) -> Result<Self, Self::Error> {
        let vote = Vote::try_from(VoteRow {
            id: row.id,
            user_id: row.user_id,
            option_id: row.option_id,
            event_id: row.event_id,
            preference: row.preference,
            voted_at: row.voted_at,
        })?;
        Ok(if row.created {
            Upsert::Created(vote)
        } else {
            Upsert::Updated(vote)
        })
    }
}

#[derive(FromRow)]
struct VoterRow {
    user_id: Uuid,
    username: String,
    preference: i16,
    voted_at: OffsetDateTime,
}

impl TryFrom<VoterRow> for VoterEntry {
    type Error = StoreError;

    fn try_from(row: VoterRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: row.user_id,
            username: row.username,
            preference: Preference::try_from(i64::from(row.preference)).map_err(parse_failure)?,
            voted_at: row.voted_at,
        })
    }
}

#[derive(FromRow)]
struct NotificationRow {
    id: Uuid,
    user_id: Uuid,
    event_id: Uuid,
    kind: String,
    message: String,
    read: bool,
    created_at: OffsetDateTime,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = StoreError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            event_id: row.event_id,
            kind: NotificationKind::try_from(row.kind.as_str()).map_err(parse_failure)?,
            message: row.message,
            read: row.read,
            created_at: row.created_at,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

pub struct UserTable;
pub struct EventTable;
pub struct OptionTable;
pub struct InvitationTable;
pub struct VoteTable(pub OptionKind);
pub struct NotificationTable;

const EVENT_COLUMNS: &str = "e.id, e.title, e.description, e.status, e.creator_id, e.created_at, e.updated_at";
const INVITATION_COLUMNS: &str = "id, event_id, user_id, status, sent_at, responded_at";
const VOTE_COLUMNS: &str = "id, user_id, option_id, event_id, preference, voted_at";
const NOTIFICATION_COLUMNS: &str = "id, user_id, event_id, kind, message, read, created_at";

impl<'c> PgQuery<'c, UserTable> {
    async fn create(&mut self, user: &User, password_hash: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash) VALUES ($1, $2, $3, $4)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(password_hash)
        .execute(&mut *self.conn)
        .await?;
        Ok(())
    }

    async fn find_by(&mut self, column: &str, value: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT id, username, email FROM users WHERE {column} = $1"
        ))
        .bind(value)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(row.map(User::from))
    }

    async fn get(&mut self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let row =
            sqlx::query_as::<_, UserRow>("SELECT id, username, email FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&mut *self.conn)
                .await?;
        Ok(row.map(User::from))
    }

    async fn credentials(&mut self, username: &str) -> Result<Option<Credentials>, StoreError> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            "SELECT id, username, email, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(row.map(|row| Credentials {
            user: User {
                id: row.id,
                username: row.username,
                email: row.email,
            },
            password_hash: row.password_hash,
        }))
    }

    async fn search(
        &mut self,
        text: &str,
        exclude: Uuid,
        limit: usize,
    ) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email FROM users
            WHERE id <> $1 AND (username ILIKE $2 OR email ILIKE $2)
            ORDER BY username
            LIMIT $3
            "#,
        )
        .bind(exclude)
        .bind(like_pattern(text))
        .bind(limit as i64)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn uninvited(&mut self, event_id: Uuid, exclude: Uuid) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.username, u.email FROM users u
            WHERE u.id <> $2
              AND NOT EXISTS (
                  SELECT 1 FROM invitations i WHERE i.event_id = $1 AND i.user_id = u.id
              )
            ORDER BY u.username
            "#,
        )
        .bind(event_id)
        .bind(exclude)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }
}

impl<'c> PgQuery<'c, EventTable> {
    async fn insert(&mut self, event: &Event) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO events (id, title, description, status, creator_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.status.as_str())
        .bind(event.creator_id)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&mut *self.conn)
        .await?;
        Ok(())
    }

    async fn get(&mut self, event_id: Uuid) -> Result<Option<Event>, StoreError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events e WHERE e.id = $1"
        ))
        .bind(event_id)
        .fetch_optional(&mut *self.conn)
        .await?;
        row.map(Event::try_from).transpose()
    }

    /// The CTE takes the row lock first, so concurrent updates serialize and
    /// each one sees the status its predecessor committed.
    async fn update(
        &mut self,
        event_id: Uuid,
        changes: &EventChanges,
        at: OffsetDateTime,
    ) -> Result<Option<EventUpdate>, StoreError> {
        let row = sqlx::query_as::<_, EventUpdateRow>(&format!(
            r#"
            WITH previous AS (
                SELECT id, status FROM events WHERE id = $1 FOR UPDATE
            )
            UPDATE events e
            SET title = COALESCE($2, e.title),
                description = COALESCE($3, e.description),
                status = COALESCE($4, e.status),
                updated_at = $5
            FROM previous
            WHERE e.id = previous.id
            RETURNING {EVENT_COLUMNS}, previous.status AS previous_status
            "#
        ))
        .bind(event_id)
        .bind(changes.title.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.status.map(|status| status.as_str()))
        .bind(at)
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(EventUpdate::try_from).transpose()
    }

    async fn delete(&mut self, event_id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(event_id)
            .execute(&mut *self.conn)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn visible(&mut self, user_id: Uuid) -> Result<Vec<Event>, StoreError> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM events e
            LEFT JOIN invitations i ON i.event_id = e.id AND i.user_id = $1
            WHERE e.creator_id = $1 OR i.status = 'accepted'
            ORDER BY e.created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&mut *self.conn)
        .await?;
        convert_all(rows)
    }

    async fn search(
        &mut self,
        user_id: Uuid,
        text: &str,
        statuses: &[InvitationStatus],
        limit: usize,
    ) -> Result<Vec<Event>, StoreError> {
        let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM events e
            LEFT JOIN invitations i ON i.event_id = e.id AND i.user_id = $1
            WHERE (e.creator_id = $1 OR i.status = ANY($2))
              AND (e.title ILIKE $3 OR e.description ILIKE $3)
            ORDER BY e.created_at DESC
            LIMIT $4
            "#
        ))
        .bind(user_id)
        .bind(statuses)
        .bind(like_pattern(text))
        .bind(limit as i64)
        .fetch_all(&mut *self.conn)
        .await?;
        convert_all(rows)
    }
}

impl<'c> PgQuery<'c, OptionTable> {
    async fn insert_time(&mut self, option: &TimeOption) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO time_options (id, event_id, start_time, end_time) VALUES ($1, $2, $3, $4)",
        )
        .bind(option.id)
        .bind(option.event_id)
        .bind(option.start_time)
        .bind(option.end_time)
        .execute(&mut *self.conn)
        .await?;
        Ok(())
    }

    async fn insert_location(&mut self, option: &LocationOption) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO location_options (id, event_id, name, address, details)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(option.id)
        .bind(option.event_id)
        .bind(&option.name)
        .bind(&option.address)
        .bind(&option.details)
        .execute(&mut *self.conn)
        .await?;
        Ok(())
    }

    async fn get_time(&mut self, option_id: Uuid) -> Result<Option<TimeOption>, StoreError> {
        let row = sqlx::query_as::<_, TimeOptionRow>(
            "SELECT id, event_id, start_time, end_time FROM time_options WHERE id = $1",
        )
        .bind(option_id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(row.map(TimeOption::from))
    }

    async fn get_location(
        &mut self,
        option_id: Uuid,
    ) -> Result<Option<LocationOption>, StoreError> {
        let row = sqlx::query_as::<_, LocationOptionRow>(
            "SELECT id, event_id, name, address, details FROM location_options WHERE id = $1",
        )
        .bind(option_id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(row.map(LocationOption::from))
    }

    async fn list_time(&mut self, event_id: Uuid) -> Result<Vec<TimeOption>, StoreError> {
        let rows = sqlx::query_as::<_, TimeOptionRow>(
            r#"
            SELECT id, event_id, start_time, end_time FROM time_options
            WHERE event_id = $1
            ORDER BY start_time
            "#,
        )
        .bind(event_id)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(rows.into_iter().map(TimeOption::from).collect())
    }

    async fn list_location(&mut self, event_id: Uuid) -> Result<Vec<LocationOption>, StoreError> {
        let rows = sqlx::query_as::<_, LocationOptionRow>(
            r#"
            SELECT id, event_id, name, address, details FROM location_options
            WHERE event_id = $1
            ORDER BY name
            "#,
        )
        .bind(event_id)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(rows.into_iter().map(LocationOption::from).collect())
    }
}

impl<'c> PgQuery<'c, InvitationTable> {
    /// Never raises on the `(event_id, user_id)` key; a lost race reads the
    /// winner's row back instead.
    async fn insert(&mut self, invitation: &Invitation) -> Result<Inserted<Invitation>, StoreError> {
        let created = sqlx::query_as::<_, InvitationRow>(&format!(
            r#"
            INSERT INTO invitations (id, event_id, user_id, status, sent_at, responded_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (event_id, user_id) DO NOTHING
            RETURNING {INVITATION_COLUMNS}
            "#
        ))
        .bind(invitation.id)
        .bind(invitation.event_id)
        .bind(invitation.user_id)
        .bind(invitation.status.as_str())
        .bind(invitation.sent_at)
        .bind(invitation.responded_at)
        .fetch_optional(&mut *self.conn)
        .await?;

        if let Some(row) = created {
            return Ok(Inserted::Created(row.try_into()?));
        }

        trace!(
            "Invitation for {} on {} already exists",
            invitation.user_id,
            invitation.event_id
        );
        let existing = self
            .find(invitation.event_id, invitation.user_id)
            .await?
            .ok_or_else(|| anyhow!("Conflicting invitation vanished"))?;
        Ok(Inserted::Existing(existing))
    }

    async fn get(&mut self, invitation_id: Uuid) -> Result<Option<Invitation>, StoreError> {
        let row = sqlx::query_as::<_, InvitationRow>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE id = $1"
        ))
        .bind(invitation_id)
        .fetch_optional(&mut *self.conn)
        .await?;
        row.map(Invitation::try_from).transpose()
    }

    async fn find(
        &mut self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Invitation>, StoreError> {
        let row = sqlx::query_as::<_, InvitationRow>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE event_id = $1 AND user_id = $2"
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&mut *self.conn)
        .await?;
        row.map(Invitation::try_from).transpose()
    }

    async fn respond(
        &mut self,
        invitation_id: Uuid,
        status: InvitationStatus,
        at: OffsetDateTime,
    ) -> Result<Option<Invitation>, StoreError> {
        let row = sqlx::query_as::<_, InvitationRow>(&format!(
            r#"
            UPDATE invitations SET status = $2, responded_at = $3
            WHERE id = $1
            RETURNING {INVITATION_COLUMNS}
            "#
        ))
        .bind(invitation_id)
        .bind(status.as_str())
        .bind(at)
        .fetch_optional(&mut *self.conn)
        .await?;
        row.map(Invitation::try_from).transpose()
    }

    async fn for_event(&mut self, event_id: Uuid) -> Result<Vec<InvitationEntry>, StoreError> {
        let rows = sqlx::query_as::<_, InvitationEntryRow>(
            r#"
            SELECT i.id, i.event_id, i.user_id, i.status, i.sent_at, i.responded_at, u.username
            FROM invitations i
            JOIN users u ON u.id = i.user_id
            WHERE i.event_id = $1
            ORDER BY i.sent_at
            "#,
        )
        .bind(event_id)
        .fetch_all(&mut *self.conn)
        .await?;
        convert_all(rows)
    }

    async fn for_user(&mut self, user_id: Uuid) -> Result<Vec<Invitation>, StoreError> {
        let rows = sqlx::query_as::<_, InvitationRow>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS} FROM invitations
            WHERE user_id = $1
            ORDER BY sent_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&mut *self.conn)
        .await?;
        convert_all(rows)
    }
}

impl<'c> PgQuery<'c, VoteTable> {
    /// `xmax = 0` only holds for a tuple this statement inserted.
    async fn upsert(&mut self, vote: &Vote) -> Result<Upsert<Vote>, StoreError> {
        let table = self.payload.0.votes_table();
        let row = sqlx::query_as::<_, UpsertedVoteRow>(&format!(
            r#"
            INSERT INTO {table} ({VOTE_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, option_id)
            DO UPDATE SET preference = EXCLUDED.preference, voted_at = EXCLUDED.voted_at
            RETURNING {VOTE_COLUMNS}, (xmax = 0) AS created
            "#
        ))
        .bind(vote.id)
        .bind(vote.user_id)
        .bind(vote.option_id)
        .bind(vote.event_id)
        .bind(i16::from(vote.preference.value()))
        .bind(vote.voted_at)
        .fetch_one(&mut *self.conn)
        .await?;

        Upsert::try_from(row)
    }

    async fn find(&mut self, user_id: Uuid, option_id: Uuid) -> Result<Option<Vote>, StoreError> {
        let table = self.payload.0.votes_table();
        let row = sqlx::query_as::<_, VoteRow>(&format!(
            "SELECT {VOTE_COLUMNS} FROM {table} WHERE user_id = $1 AND option_id = $2"
        ))
        .bind(user_id)
        .bind(option_id)
        .fetch_optional(&mut *self.conn)
        .await?;
        row.map(Vote::try_from).transpose()
    }

    async fn voters(&mut self, option_id: Uuid) -> Result<Vec<VoterEntry>, StoreError> {
        let table = self.payload.0.votes_table();
        let rows = sqlx::query_as::<_, VoterRow>(&format!(
            r#"
            SELECT v.user_id, u.username, v.preference, v.voted_at
            FROM {table} v
            JOIN users u ON u.id = v.user_id
            WHERE v.option_id = $1
            ORDER BY v.voted_at DESC
            "#
        ))
        .bind(option_id)
        .fetch_all(&mut *self.conn)
        .await?;
        convert_all(rows)
    }
}

impl<'c> PgQuery<'c, NotificationTable> {
    async fn insert(&mut self, notification: &Notification) -> Result<(), StoreError> {
        sqlx::query(&format!(
            "INSERT INTO notifications ({NOTIFICATION_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        ))
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(notification.event_id)
        .bind(notification.kind.as_str())
        .bind(&notification.message)
        .bind(notification.read)
        .bind(notification.created_at)
        .execute(&mut *self.conn)
        .await?;
        Ok(())
    }

    async fn get(&mut self, notification_id: Uuid) -> Result<Option<Notification>, StoreError> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = $1"
        ))
        .bind(notification_id)
        .fetch_optional(&mut *self.conn)
        .await?;
        row.map(Notification::try_from).transpose()
    }

    async fn unread(&mut self, user_id: Uuid) -> Result<Vec<Notification>, StoreError> {
        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS} FROM notifications
            WHERE user_id = $1 AND NOT read
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&mut *self.conn)
        .await?;
        convert_all(rows)
    }

    async fn mark_read(&mut self, notification_id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1 AND NOT read")
            .bind(notification_id)
            .execute(&mut *self.conn)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn mark_all_read(&mut self, user_id: Uuid) -> Result<u64, StoreError> {
        let res =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND NOT read")
                .bind(user_id)
                .execute(&mut *self.conn)
                .await?;
        Ok(res.rows_affected())
    }
}

/// Postgres backed [`Store`].
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<PoolConnection<Postgres>, StoreError> {
        Ok(self.pool.acquire().await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: &User, password_hash: &str) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(UserTable, &mut *conn)
            .create(user, password_hash)
            .await
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(UserTable, &mut *conn).get(user_id).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(UserTable, &mut *conn)
            .find_by("username", username)
            .await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(UserTable, &mut *conn)
            .find_by("email", email)
            .await
    }

    async fn get_credentials(&self, username: &str) -> Result<Option<Credentials>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(UserTable, &mut *conn)
            .credentials(username)
            .await
    }

    async fn search_users(
        &self,
        text: &str,
        exclude: Uuid,
        limit: usize,
    ) -> Result<Vec<User>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(UserTable, &mut *conn)
            .search(text, exclude, limit)
            .await
    }

    async fn list_uninvited_users(
        &self,
        event_id: Uuid,
        exclude: Uuid,
    ) -> Result<Vec<User>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(UserTable, &mut *conn)
            .uninvited(event_id, exclude)
            .await
    }

    async fn insert_event(&self, event: &Event) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(EventTable, &mut *conn).insert(event).await
    }

    async fn get_event(&self, event_id: Uuid) -> Result<Option<Event>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(EventTable, &mut *conn).get(event_id).await
    }

    async fn update_event(
        &self,
        event_id: Uuid,
        changes: &EventChanges,
        at: OffsetDateTime,
    ) -> Result<Option<EventUpdate>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(EventTable, &mut *conn)
            .update(event_id, changes, at)
            .await
    }

    async fn delete_event(&self, event_id: Uuid) -> Result<bool, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(EventTable, &mut *conn).delete(event_id).await
    }

    async fn list_visible_events(&self, user_id: Uuid) -> Result<Vec<Event>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(EventTable, &mut *conn).visible(user_id).await
    }

    async fn search_events(
        &self,
        user_id: Uuid,
        text: &str,
        statuses: &[InvitationStatus],
        limit: usize,
    ) -> Result<Vec<Event>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(EventTable, &mut *conn)
            .search(user_id, text, statuses, limit)
            .await
    }

    async fn insert_time_option(&self, option: &TimeOption) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(OptionTable, &mut *conn)
            .insert_time(option)
            .await
    }

    async fn insert_location_option(&self, option: &LocationOption) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(OptionTable, &mut *conn)
            .insert_location(option)
            .await
    }

    async fn get_time_option(&self, option_id: Uuid) -> Result<Option<TimeOption>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(OptionTable, &mut *conn)
            .get_time(option_id)
            .await
    }

    async fn get_location_option(
        &self,
        option_id: Uuid,
    ) -> Result<Option<LocationOption>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(OptionTable, &mut *conn)
            .get_location(option_id)
            .await
    }

    async fn list_time_options(&self, event_id: Uuid) -> Result<Vec<TimeOption>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(OptionTable, &mut *conn)
            .list_time(event_id)
            .await
    }

    async fn list_location_options(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<LocationOption>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(OptionTable, &mut *conn)
            .list_location(event_id)
            .await
    }

    async fn insert_invitation(
        &self,
        invitation: &Invitation,
    ) -> Result<Inserted<Invitation>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(InvitationTable, &mut *conn)
            .insert(invitation)
            .await
    }

    async fn get_invitation(&self, invitation_id: Uuid) -> Result<Option<Invitation>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(InvitationTable, &mut *conn)
            .get(invitation_id)
            .await
    }

    async fn find_invitation(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Invitation>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(InvitationTable, &mut *conn)
            .find(event_id, user_id)
            .await
    }

    async fn respond_invitation(
        &self,
        invitation_id: Uuid,
        status: InvitationStatus,
        at: OffsetDateTime,
    ) -> Result<Option<Invitation>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(InvitationTable, &mut *conn)
            .respond(invitation_id, status, at)
            .await
    }

    async fn list_event_invitations(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<InvitationEntry>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(InvitationTable, &mut *conn)
            .for_event(event_id)
            .await
    }

    async fn list_user_invitations(&self, user_id: Uuid) -> Result<Vec<Invitation>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(InvitationTable, &mut *conn)
            .for_user(user_id)
            .await
    }

    async fn upsert_vote(&self, kind: OptionKind, vote: &Vote) -> Result<Upsert<Vote>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(VoteTable(kind), &mut *conn).upsert(vote).await
    }

    async fn find_vote(
        &self,
        kind: OptionKind,
        user_id: Uuid,
        option_id: Uuid,
    ) -> Result<Option<Vote>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(VoteTable(kind), &mut *conn)
            .find(user_id, option_id)
            .await
    }

    async fn list_option_votes(
        &self,
        kind: OptionKind,
        option_id: Uuid,
    ) -> Result<Vec<VoterEntry>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(VoteTable(kind), &mut *conn)
            .voters(option_id)
            .await
    }

    async fn insert_notifications(&self, notifications: &[Notification]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut q = PgQuery::new(NotificationTable, &mut *tx);
        for notification in notifications {
            q.insert(notification).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn get_notification(
        &self,
        notification_id: Uuid,
    ) -> Result<Option<Notification>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(NotificationTable, &mut *conn)
            .get(notification_id)
            .await
    }

    async fn list_unread_notifications(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Notification>, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(NotificationTable, &mut *conn)
            .unread(user_id)
            .await
    }

    async fn mark_notification_read(&self, notification_id: Uuid) -> Result<bool, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(NotificationTable, &mut *conn)
            .mark_read(notification_id)
            .await
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let mut conn = self.conn().await?;
        PgQuery::new(NotificationTable, &mut *conn)
            .mark_all_read(user_id)
            .await
    }
}
