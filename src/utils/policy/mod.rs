//! Authorization predicates. None of them touch the store: callers look up
//! whatever records a predicate needs and turn `false` into their own
//! forbidden error.

use crate::utils::auth::models::Actor;
use crate::utils::events::models::Event;
use crate::utils::invitations::models::Invitation;

pub fn is_creator(event: &Event, actor: &Actor) -> bool {
    event.creator_id == actor.id
}

pub fn can_modify_event(event: &Event, actor: &Actor) -> bool {
    is_creator(event, actor)
}

pub fn can_propose_option(event: &Event, actor: &Actor) -> bool {
    is_creator(event, actor)
}

pub fn can_invite(event: &Event, actor: &Actor) -> bool {
    is_creator(event, actor)
}

pub fn can_respond_invitation(invitation: &Invitation, actor: &Actor) -> bool {
    invitation.user_id == actor.id
}

/// `invitation` is the actor's own invitation to `event`, if any.
pub fn can_view_event(event: &Event, actor: &Actor, invitation: Option<&Invitation>) -> bool {
    is_creator(event, actor) || holds_invitation(event, actor, invitation)
}

/// Creator or an invitee who accepted or is tentative.
pub fn is_voter(event: &Event, actor: &Actor, invitation: Option<&Invitation>) -> bool {
    is_creator(event, actor)
        || (holds_invitation(event, actor, invitation)
            && invitation.map_or(false, |inv| inv.status.grants_vote()))
}

pub fn can_vote(event: &Event, actor: &Actor, invitation: Option<&Invitation>) -> bool {
    event.status.is_open_for_voting() && is_voter(event, actor, invitation)
}

pub fn can_view_all_votes(event: &Event, actor: &Actor) -> bool {
    is_creator(event, actor)
}

fn holds_invitation(event: &Event, actor: &Actor, invitation: Option<&Invitation>) -> bool {
    invitation.map_or(false, |inv| {
        inv.event_id == event.id && inv.user_id == actor.id
    })
}

#[cfg(test)]
mod policy_tests {
    use super::*;
    use crate::utils::events::models::EventStatus;
    use crate::utils::invitations::models::InvitationStatus;
    use uuid::Uuid;

    fn actor(name: &str) -> Actor {
        Actor {
            id: Uuid::new_v4(),
            username: name.to_string(),
        }
    }

    fn event_of(creator: &Actor, status: EventStatus) -> Event {
        Event::new(creator.id, "Offsite".to_string(), String::new(), status)
    }

    fn invitation(event: &Event, user: &Actor, status: InvitationStatus) -> Invitation {
        Invitation {
            status,
            ..Invitation::pending(event.id, user.id)
        }
    }

    #[test]
    fn only_creator_modifies() {
        let creator = actor("creator");
        let other = actor("other");
        let event = event_of(&creator, EventStatus::Draft);

        assert!(can_modify_event(&event, &creator));
        assert!(can_propose_option(&event, &creator));
        assert!(can_invite(&event, &creator));
        assert!(can_view_all_votes(&event, &creator));

        assert!(!can_modify_event(&event, &other));
        assert!(!can_propose_option(&event, &other));
        assert!(!can_invite(&event, &other));
        assert!(!can_view_all_votes(&event, &other));
    }

    #[test]
    fn only_invitee_responds() {
        let creator = actor("creator");
        let guest = actor("guest");
        let event = event_of(&creator, EventStatus::Draft);
        let inv = Invitation::pending(event.id, guest.id);

        assert!(can_respond_invitation(&inv, &guest));
        assert!(!can_respond_invitation(&inv, &creator));
    }

    #[test]
    fn vote_eligibility_by_invitation_status() {
        let creator = actor("creator");
        let guest = actor("guest");
        let event = event_of(&creator, EventStatus::Planning);

        for (status, expected) in [
            (InvitationStatus::Pending, false),
            (InvitationStatus::Accepted, true),
            (InvitationStatus::Declined, false),
            (InvitationStatus::Tentative, true),
        ] {
            let inv = invitation(&event, &guest, status);
            assert_eq!(can_vote(&event, &guest, Some(&inv)), expected, "{status}");
        }
        assert!(!can_vote(&event, &guest, None));
        assert!(can_vote(&event, &creator, None));
    }

    #[test]
    fn voting_closes_after_planning() {
        let creator = actor("creator");
        let guest = actor("guest");

        for status in [
            EventStatus::Confirmed,
            EventStatus::Cancelled,
            EventStatus::Completed,
        ] {
            let event = event_of(&creator, status);
            let inv = invitation(&event, &guest, InvitationStatus::Accepted);
            assert!(!can_vote(&event, &guest, Some(&inv)));
            assert!(!can_vote(&event, &creator, None));
            assert!(is_voter(&event, &guest, Some(&inv)));
        }
    }

    #[test]
    fn foreign_invitation_grants_nothing() {
        let creator = actor("creator");
        let guest = actor("guest");
        let intruder = actor("intruder");
        let event = event_of(&creator, EventStatus::Draft);
        let inv = invitation(&event, &guest, InvitationStatus::Accepted);

        assert!(!can_vote(&event, &intruder, Some(&inv)));
        assert!(!can_view_event(&event, &intruder, Some(&inv)));
        assert!(can_view_event(&event, &guest, Some(&inv)));
    }
}
