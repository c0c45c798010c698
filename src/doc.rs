use crate::routes::{
    auth, auth::models::*, events, events::models::*, invitations, invitations::models::*,
    notifications, search, search::models::*, votes, votes::models::*,
};
use crate::utils::auth::models::User;
use crate::utils::events::models::{Event, EventStatus, LocationOption, TimeOption};
use crate::utils::invitations::models::{Invitation, InvitationStatus};
use crate::utils::notifications::models::{Notification, NotificationKind};
use crate::utils::votes::models::{OptionKind, OptionTally, Vote, VoterEntry};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
info(title = "Rendezvous", description = "Group event planning", ),
paths(
auth::post_register_user,
auth::post_login_user,
auth::post_logout_user,
auth::get_session,
events::create_event,
events::get_events,
events::get_event,
events::update_event,
events::delete_event,
events::create_time_option,
events::create_location_option,
events::invite_user,
events::get_potential_invitees,
events::get_vote_summary,
invitations::get_my_invitations,
invitations::respond_invitation,
votes::vote_time_option,
votes::vote_location_option,
votes::get_time_option_votes,
votes::get_location_option_votes,
notifications::get_unread_notifications,
notifications::put_notification_read,
notifications::post_mark_all_read,
search::search_events,
search::search_users,
),
components(schemas(
User,
LoginCredentials,
RegisterCredentials,
Event,
EventStatus,
TimeOption,
LocationOption,
CreateEvent,
UpdateEvent,
CreateTimeOption,
CreateLocationOption,
EventListItem,
EventDetail,
EventInvitee,
TimeOptionTally,
LocationOptionTally,
Invitation,
InvitationStatus,
InviteUser,
InviteResult,
RespondInvitation,
RespondResult,
MyInvitation,
InvitedEvent,
TimeOptionChoice,
LocationOptionChoice,
PotentialInvitees,
Vote,
VoterEntry,
OptionKind,
OptionTally,
CastVote,
CastVoteResult,
VoteSummary,
Notification,
NotificationKind,
SearchQuery,
EventSearchItem
)),
tags((name = "auth"),(name = "events"),(name = "invitations"),(name = "votes"),(name = "notifications"),(name = "search"))
)]
pub struct ApiDoc;

#[cfg(test)]
mod doc_tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let json = ApiDoc::openapi().to_json().unwrap();
        for path in [
            "/auth/register",
            "/events/{id}/invite",
            "/time_options/{id}/vote",
            "/notifications/mark_all_read",
            "/search/users",
        ] {
            assert!(json.contains(path), "{path} is missing");
        }
    }
}
