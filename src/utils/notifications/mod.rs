pub mod errors;
pub mod models;

use crate::modules::store::{Store, StoreError};
use crate::utils::auth::models::Actor;
use errors::NotificationError;
use models::{Notification, NotificationKind};
use tracing::{debug, trace};
use uuid::Uuid;

/// Appends one notification. No deduplication.
pub async fn notify(
    store: &dyn Store,
    user_id: Uuid,
    event_id: Uuid,
    kind: NotificationKind,
    message: String,
) -> Result<Notification, StoreError> {
    let notification = Notification::new(user_id, event_id, kind, message);
    store
        .insert_notifications(std::slice::from_ref(&notification))
        .await?;
    trace!("Notified {user_id} ({kind}) about {event_id}");
    Ok(notification)
}

/// Same message to every recipient, written in one batch.
pub async fn fan_out(
    store: &dyn Store,
    recipients: &[Uuid],
    event_id: Uuid,
    kind: NotificationKind,
    message: &str,
) -> Result<usize, StoreError> {
    if recipients.is_empty() {
        return Ok(0);
    }
    let batch: Vec<Notification> = recipients
        .iter()
        .map(|user_id| Notification::new(*user_id, event_id, kind, message.to_string()))
        .collect();
    store.insert_notifications(&batch).await?;
    debug!(
        "Fanned out {kind} about {event_id} to {} users",
        batch.len()
    );
    Ok(batch.len())
}

pub async fn list_unread(
    store: &dyn Store,
    actor: &Actor,
) -> Result<Vec<Notification>, NotificationError> {
    Ok(store.list_unread_notifications(actor.id).await?)
}

/// Marking an already read notification again is not an error.
pub async fn mark_read(
    store: &dyn Store,
    actor: &Actor,
    notification_id: Uuid,
) -> Result<(), NotificationError> {
    let notification = store
        .get_notification(notification_id)
        .await?
        .ok_or(NotificationError::NotFound)?;
    if notification.user_id != actor.id {
        return Err(NotificationError::NotRecipient);
    }

    if !store.mark_notification_read(notification_id).await? {
        trace!("Notification {notification_id} was already read");
    }
    Ok(())
}

pub async fn mark_all_read(store: &dyn Store, actor: &Actor) -> Result<u64, NotificationError> {
    let count = store.mark_all_notifications_read(actor.id).await?;
    debug!("Marked {count} notifications of {} as read", actor.username);
    Ok(count)
}
