pub mod errors;
pub mod models;

use crate::modules::store::Store;
use crate::routes::events::models::{
    CreateEvent, CreateLocationOption, CreateTimeOption, EventDetail, EventInvitee, EventListItem,
    LocationOptionTally, TimeOptionTally, UpdateEvent,
};
use crate::utils::auth::models::Actor;
use crate::utils::invitations::models::InvitationStatus;
use crate::utils::notifications::{fan_out, models::NotificationKind};
use crate::utils::policy;
use crate::utils::votes::{models::OptionKind, tally};
use crate::validation::{ValidateContent, ValidateContentError};
use errors::EventError;
use models::*;
use time::OffsetDateTime;
use tracing::{debug, trace};
use uuid::Uuid;

pub async fn load_event(store: &dyn Store, event_id: Uuid) -> Result<Event, EventError> {
    store
        .get_event(event_id)
        .await?
        .ok_or(EventError::NotFound)
}

async fn load_owned_event(
    store: &dyn Store,
    actor: &Actor,
    event_id: Uuid,
) -> Result<Event, EventError> {
    let event = load_event(store, event_id).await?;
    if !policy::can_modify_event(&event, actor) {
        return Err(EventError::NotCreator);
    }
    Ok(event)
}

async fn creator_name(store: &dyn Store, event: &Event) -> Result<String, EventError> {
    Ok(store
        .get_user(event.creator_id)
        .await?
        .map(|user| user.username)
        .unwrap_or_default())
}

/// Kind and message sent to accepted invitees when an event enters `status`.
pub fn status_notice(status: EventStatus, title: &str) -> Option<(NotificationKind, String)> {
    match status {
        EventStatus::Confirmed => Some((
            NotificationKind::Confirmation,
            format!("The event '{title}' has been confirmed."),
        )),
        EventStatus::Cancelled => Some((
            NotificationKind::Cancellation,
            format!("The event '{title}' has been cancelled."),
        )),
        EventStatus::Planning | EventStatus::Completed => Some((
            NotificationKind::Update,
            format!("The event '{title}' has been updated to {}.", status.label()),
        )),
        EventStatus::Draft => None,
    }
}

pub async fn create_event(
    store: &dyn Store,
    actor: &Actor,
    body: CreateEvent,
) -> Result<Event, EventError> {
    body.validate_content()?;
    let status = match body.status.as_deref() {
        Some(status) => EventStatus::try_from(status).map_err(ValidateContentError::new)?,
        None => EventStatus::default(),
    };

    let event = Event::new(actor.id, body.title, body.description, status);
    store.insert_event(&event).await?;
    debug!("{} created event {} ({})", actor.username, event.id, event.title);
    Ok(event)
}

/// Events the actor created or accepted, newest first.
pub async fn list_events(
    store: &dyn Store,
    actor: &Actor,
) -> Result<Vec<EventListItem>, EventError> {
    let mut items = Vec::new();
    for event in store.list_visible_events(actor.id).await? {
        items.push(EventListItem {
            creator: creator_name(store, &event).await?,
            time_options: store.list_time_options(event.id).await?,
            status_label: event.status.label().to_string(),
            id: event.id,
            title: event.title,
            description: event.description,
            status: event.status,
            created_at: event.created_at,
        });
    }
    Ok(items)
}

/// Event with its options, their tallies for this viewer, and the invitee list.
pub async fn get_event_detail(
    store: &dyn Store,
    actor: &Actor,
    event_id: Uuid,
) -> Result<EventDetail, EventError> {
    let event = load_event(store, event_id).await?;
    let invitation = store.find_invitation(event.id, actor.id).await?;
    if !policy::can_view_event(&event, actor, invitation.as_ref()) {
        return Err(EventError::NotInvited);
    }
    let breakdown = policy::can_view_all_votes(&event, actor);

    let mut time_options = Vec::new();
    for option in store.list_time_options(event.id).await? {
        let voters = store.list_option_votes(OptionKind::Time, option.id).await?;
        time_options.push(TimeOptionTally {
            votes: tally(option.id, voters, actor.id, breakdown),
            option,
        });
    }

    let mut location_options = Vec::new();
    for option in store.list_location_options(event.id).await? {
        let voters = store
            .list_option_votes(OptionKind::Location, option.id)
            .await?;
        location_options.push(LocationOptionTally {
            votes: tally(option.id, voters, actor.id, breakdown),
            option,
        });
    }

    let invitations = store
        .list_event_invitations(event.id)
        .await?
        .into_iter()
        .map(|entry| EventInvitee {
            invitation_id: entry.invitation.id,
            user_id: entry.invitation.user_id,
            username: entry.username,
            status: entry.invitation.status,
            status_label: entry.invitation.status.label().to_string(),
        })
        .collect();

    Ok(EventDetail {
        creator: creator_name(store, &event).await?,
        status_label: event.status.label().to_string(),
        event,
        time_options,
        location_options,
        invitations,
    })
}

/// Applies the present fields. A status equal to the current one or outside
/// the known set is dropped silently; a real transition notifies every
/// accepted invitee once.
pub async fn update_event(
    store: &dyn Store,
    actor: &Actor,
    event_id: Uuid,
    body: UpdateEvent,
) -> Result<Event, EventError> {
    load_owned_event(store, actor, event_id).await?;
    body.validate_content()?;

    let status = body.status.as_ref().and_then(|raw| match raw.as_str() {
        Some(label) => EventStatus::try_from(label)
            .map_err(|e| trace!("Ignoring status update: {e}"))
            .ok(),
        None => {
            trace!("Ignoring non-string status update: {raw}");
            None
        }
    });
    let changes = EventChanges {
        title: body.title,
        description: body.description,
        status,
    };

    let update = store
        .update_event(event_id, &changes, OffsetDateTime::now_utc())
        .await?
        .ok_or(EventError::NotFound)?;

    if let Some(new_status) = update.transition() {
        debug!(
            "Event {} moved from {} to {new_status}",
            event_id, update.previous_status
        );
        if let Some((kind, message)) = status_notice(new_status, &update.event.title) {
            let accepted: Vec<Uuid> = store
                .list_event_invitations(event_id)
                .await?
                .into_iter()
                .filter(|entry| entry.invitation.status == InvitationStatus::Accepted)
                .map(|entry| entry.invitation.user_id)
                .collect();
            fan_out(store, &accepted, event_id, kind, &message).await?;
        }
    }

    Ok(update.event)
}

/// Removes the event with its options, invitations, votes and notifications.
pub async fn delete_event(
    store: &dyn Store,
    actor: &Actor,
    event_id: Uuid,
) -> Result<(), EventError> {
    let event = load_owned_event(store, actor, event_id).await?;
    if !store.delete_event(event.id).await? {
        return Err(EventError::NotFound);
    }
    debug!("{} deleted event {} ({})", actor.username, event.id, event.title);
    Ok(())
}

pub async fn add_time_option(
    store: &dyn Store,
    actor: &Actor,
    event_id: Uuid,
    body: CreateTimeOption,
) -> Result<TimeOption, EventError> {
    let event = load_event(store, event_id).await?;
    if !policy::can_propose_option(&event, actor) {
        return Err(EventError::NotCreator);
    }
    body.validate_content()?;

    let option = TimeOption::new(event.id, body.start_time, body.end_time);
    store.insert_time_option(&option).await?;
    trace!("Time option {} added to {}", option.id, event.id);
    Ok(option)
}

pub async fn add_location_option(
    store: &dyn Store,
    actor: &Actor,
    event_id: Uuid,
    body: CreateLocationOption,
) -> Result<LocationOption, EventError> {
    let event = load_event(store, event_id).await?;
    if !policy::can_propose_option(&event, actor) {
        return Err(EventError::NotCreator);
    }
    body.validate_content()?;

    let option = LocationOption::new(
        event.id,
        body.name.trim().to_string(),
        body.address.trim().to_string(),
        body.details,
    );
    store.insert_location_option(&option).await?;
    trace!("Location option {} added to {}", option.id, event.id);
    Ok(option)
}
