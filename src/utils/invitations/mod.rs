pub mod errors;
pub mod models;

use crate::modules::store::{Inserted, Store, StoreError};
use crate::routes::invitations::models::{
    InvitedEvent, LocationOptionChoice, MyInvitation, TimeOptionChoice,
};
use crate::utils::auth::models::{Actor, User};
use crate::utils::events::models::Event;
use crate::utils::notifications::{models::NotificationKind, notify};
use crate::utils::policy;
use crate::utils::votes::models::OptionKind;
use errors::InvitationError;
use models::*;
use time::OffsetDateTime;
use tracing::{debug, trace};
use uuid::Uuid;

async fn load_event(store: &dyn Store, event_id: Uuid) -> Result<Event, InvitationError> {
    store
        .get_event(event_id)
        .await?
        .ok_or(InvitationError::EventNotFound)
}

fn classify(invitation: Invitation) -> InviteOutcome {
    if invitation.status == InvitationStatus::Pending {
        InviteOutcome::AlreadyPending(invitation)
    } else {
        InviteOutcome::AlreadyResponded(invitation)
    }
}

pub fn invitation_message(title: &str, inviter: &str) -> String {
    format!("You have been invited to the event: '{title}' by {inviter}.")
}

pub fn response_message(handle: &str, status: InvitationStatus, title: &str) -> String {
    format!(
        "{handle} has {} your invitation to '{title}'.",
        status.label().to_lowercase()
    )
}

/// Invites `user_id` once. Inviting again reports the invitation already on
/// record and sends nothing.
pub async fn invite(
    store: &dyn Store,
    actor: &Actor,
    event_id: Uuid,
    user_id: Uuid,
) -> Result<InviteOutcome, InvitationError> {
    let event = load_event(store, event_id).await?;
    if !policy::can_invite(&event, actor) {
        return Err(InvitationError::NotCreator);
    }
    if user_id == actor.id {
        return Err(InvitationError::SelfInvitation);
    }
    if store.get_user(user_id).await?.is_none() {
        return Err(InvitationError::UserNotFound);
    }

    let outcome = match store
        .insert_invitation(&Invitation::pending(event.id, user_id))
        .await
    {
        Ok(Inserted::Created(invitation)) => InviteOutcome::Created(invitation),
        Ok(Inserted::Existing(invitation)) => classify(invitation),
        Err(StoreError::Conflict(constraint)) => {
            trace!("Lost invitation race on {constraint}");
            let invitation = store
                .find_invitation(event.id, user_id)
                .await?
                .ok_or(InvitationError::InvitationNotFound)?;
            classify(invitation)
        }
        Err(e) => return Err(e.into()),
    };

    if outcome.is_created() {
        notify(
            store,
            user_id,
            event.id,
            NotificationKind::Invitation,
            invitation_message(&event.title, &actor.username),
        )
        .await?;
        debug!("{} invited {user_id} to {}", actor.username, event.id);
    } else {
        trace!("{user_id} was already invited to {}", event.id);
    }
    Ok(outcome)
}

/// Records the invitee's answer and tells the creator. Answering again
/// overwrites the previous answer.
pub async fn respond(
    store: &dyn Store,
    actor: &Actor,
    invitation_id: Uuid,
    status: &str,
) -> Result<Invitation, InvitationError> {
    let invitation = store
        .get_invitation(invitation_id)
        .await?
        .ok_or(InvitationError::InvitationNotFound)?;
    if !policy::can_respond_invitation(&invitation, actor) {
        return Err(InvitationError::NotInvitee);
    }

    let status = match InvitationStatus::try_from(status.trim()) {
        Ok(InvitationStatus::Pending) | Err(_) => return Err(InvitationError::InvalidResponse),
        Ok(status) => status,
    };
    let event = load_event(store, invitation.event_id).await?;

    let updated = store
        .respond_invitation(invitation.id, status, OffsetDateTime::now_utc())
        .await?
        .ok_or(InvitationError::InvitationNotFound)?;

    notify(
        store,
        event.creator_id,
        event.id,
        NotificationKind::Update,
        response_message(&actor.username, status, &event.title),
    )
    .await?;
    debug!("{} answered {} with {status}", actor.username, invitation.id);
    Ok(updated)
}

/// The actor's invitations, newest first, each with the event and the
/// actor's own preferences on its options.
pub async fn list_for_user(
    store: &dyn Store,
    actor: &Actor,
) -> Result<Vec<MyInvitation>, InvitationError> {
    let mut items = Vec::new();
    for invitation in store.list_user_invitations(actor.id).await? {
        let Some(event) = store.get_event(invitation.event_id).await? else {
            trace!("Skipping invitation {} to a missing event", invitation.id);
            continue;
        };
        let creator = store
            .get_user(event.creator_id)
            .await?
            .map(|user| user.username)
            .unwrap_or_default();

        let mut time_options = Vec::new();
        for option in store.list_time_options(event.id).await? {
            let my_preference = store
                .find_vote(OptionKind::Time, actor.id, option.id)
                .await?
                .map(|vote| vote.preference);
            time_options.push(TimeOptionChoice {
                option,
                my_preference,
            });
        }

        let mut location_options = Vec::new();
        for option in store.list_location_options(event.id).await? {
            let my_preference = store
                .find_vote(OptionKind::Location, actor.id, option.id)
                .await?
                .map(|vote| vote.preference);
            location_options.push(LocationOptionChoice {
                option,
                my_preference,
            });
        }

        items.push(MyInvitation {
            id: invitation.id,
            status: invitation.status,
            status_label: invitation.status.label().to_string(),
            sent_at: invitation.sent_at,
            responded_at: invitation.responded_at,
            event: InvitedEvent {
                id: event.id,
                status_label: event.status.label().to_string(),
                title: event.title,
                description: event.description,
                creator,
                status: event.status,
                created_at: event.created_at,
                time_options,
                location_options,
            },
        });
    }
    Ok(items)
}

/// Users the creator has not invited yet.
pub async fn potential_invitees(
    store: &dyn Store,
    actor: &Actor,
    event_id: Uuid,
) -> Result<Vec<User>, InvitationError> {
    let event = load_event(store, event_id).await?;
    if !policy::can_invite(&event, actor) {
        return Err(InvitationError::NotCreator);
    }
    Ok(store.list_uninvited_users(event.id, actor.id).await?)
}

#[cfg(test)]
mod invitations_tests {
    use super::*;

    #[test]
    fn response_message_uses_lowercase_label() {
        assert_eq!(
            response_message("bob", InvitationStatus::Tentative, "Retro"),
            "bob has tentative your invitation to 'Retro'."
        );
        assert_eq!(
            response_message("bob", InvitationStatus::Accepted, "Retro"),
            "bob has accepted your invitation to 'Retro'."
        );
    }

    #[test]
    fn invitation_message_names_inviter() {
        assert_eq!(
            invitation_message("Retro", "alice"),
            "You have been invited to the event: 'Retro' by alice."
        );
    }

    #[test]
    fn existing_invitation_is_classified_by_status() {
        let mut invitation = Invitation::pending(Uuid::new_v4(), Uuid::new_v4());
        assert!(matches!(
            classify(invitation.clone()),
            InviteOutcome::AlreadyPending(_)
        ));
        invitation.status = InvitationStatus::Declined;
        assert!(matches!(
            classify(invitation),
            InviteOutcome::AlreadyResponded(_)
        ));
    }
}
