pub mod errors;
pub mod models;

use crate::modules::store::{Store, Upsert};
use crate::routes::events::models::{LocationOptionTally, TimeOptionTally};
use crate::routes::votes::models::VoteSummary;
use crate::utils::auth::models::Actor;
use crate::utils::events::models::Event;
use crate::utils::policy;
use errors::VoteError;
use models::*;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

/// Accepts a JSON integer or an integer in a string.
pub fn parse_preference(value: &Value) -> Result<Preference, VoteError> {
    let invalid =
        || VoteError::InvalidPreference(format!("Preference (0-{MAX_PREFERENCE}) is required"));
    let raw = match value {
        Value::Number(n) => n.as_i64().ok_or_else(invalid)?,
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };
    Preference::try_from(raw).map_err(VoteError::InvalidPreference)
}

/// Count, the viewer's own preference and, when `breakdown` is set, every
/// voter. Zero preferences are listed but never counted.
pub fn tally(
    option_id: Uuid,
    voters: Vec<VoterEntry>,
    viewer_id: Uuid,
    breakdown: bool,
) -> OptionTally {
    OptionTally {
        option_id,
        vote_count: voters.iter().filter(|v| v.preference.counts()).count(),
        my_preference: voters
            .iter()
            .find(|v| v.user_id == viewer_id)
            .map(|v| v.preference),
        voters: breakdown.then_some(voters),
    }
}

pub async fn resolve_target(
    store: &dyn Store,
    kind: OptionKind,
    option_id: Uuid,
) -> Result<VoteTarget, VoteError> {
    let target = match kind {
        OptionKind::Time => store.get_time_option(option_id).await?.map(VoteTarget::Time),
        OptionKind::Location => store
            .get_location_option(option_id)
            .await?
            .map(VoteTarget::Location),
    };
    target.ok_or(VoteError::OptionNotFound)
}

async fn parent_event(store: &dyn Store, target: &VoteTarget) -> Result<Event, VoteError> {
    store
        .get_event(target.parent_event())
        .await?
        .ok_or(VoteError::EventNotFound)
}

/// Creates or overwrites the actor's single vote on the option. The raw
/// preference is only parsed once the option exists and the actor may vote.
pub async fn cast_vote(
    store: &dyn Store,
    actor: &Actor,
    kind: OptionKind,
    option_id: Uuid,
    preference: &Value,
) -> Result<Upsert<Vote>, VoteError> {
    let target = resolve_target(store, kind, option_id).await?;
    let event = parent_event(store, &target).await?;
    let invitation = store.find_invitation(event.id, actor.id).await?;

    if !policy::can_vote(&event, actor, invitation.as_ref()) {
        return Err(if policy::is_voter(&event, actor, invitation.as_ref()) {
            VoteError::VotingClosed
        } else {
            VoteError::NotEligible
        });
    }
    let preference = parse_preference(preference)?;

    let vote = Vote::new(actor.id, &target, preference);
    let stored = store.upsert_vote(target.kind(), &vote).await?;
    debug!(
        "{} {} {kind:?} vote {} on {option_id} with {}",
        actor.username,
        if stored.is_created() { "cast" } else { "updated" },
        vote.id,
        preference.value()
    );
    Ok(stored)
}

/// Tally of one option as seen by `actor`.
pub async fn aggregate(
    store: &dyn Store,
    actor: &Actor,
    kind: OptionKind,
    option_id: Uuid,
) -> Result<OptionTally, VoteError> {
    let target = resolve_target(store, kind, option_id).await?;
    let event = parent_event(store, &target).await?;
    let invitation = store.find_invitation(event.id, actor.id).await?;
    if !policy::can_view_event(&event, actor, invitation.as_ref()) {
        return Err(VoteError::NotEligible);
    }

    let voters = store.list_option_votes(kind, option_id).await?;
    Ok(tally(
        option_id,
        voters,
        actor.id,
        policy::can_view_all_votes(&event, actor),
    ))
}

/// Every voter on every option of the event. Creator only.
pub async fn summary(
    store: &dyn Store,
    actor: &Actor,
    event_id: Uuid,
) -> Result<VoteSummary, VoteError> {
    let event = store
        .get_event(event_id)
        .await?
        .ok_or(VoteError::EventNotFound)?;
    if !policy::can_view_all_votes(&event, actor) {
        return Err(VoteError::NotCreator);
    }

    let mut time_options = Vec::new();
    for option in store.list_time_options(event.id).await? {
        let voters = store.list_option_votes(OptionKind::Time, option.id).await?;
        time_options.push(TimeOptionTally {
            votes: tally(option.id, voters, actor.id, true),
            option,
        });
    }

    let mut location_options = Vec::new();
    for option in store.list_location_options(event.id).await? {
        let voters = store
            .list_option_votes(OptionKind::Location, option.id)
            .await?;
        location_options.push(LocationOptionTally {
            votes: tally(option.id, voters, actor.id, true),
            option,
        });
    }

    Ok(VoteSummary {
        event_id: event.id,
        time_options,
        location_options,
    })
}

#[cfg(test)]
mod votes_tests {
    use super::*;
    use serde_json::json;
    use time::OffsetDateTime;

    fn voter(name: &str, preference: i64) -> VoterEntry {
        VoterEntry {
            user_id: Uuid::new_v4(),
            username: name.to_string(),
            preference: Preference::try_from(preference).unwrap(),
            voted_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn preference_parsing() {
        assert_eq!(parse_preference(&json!(4)).unwrap().value(), 4);
        assert_eq!(parse_preference(&json!(0)).unwrap().value(), 0);
        assert_eq!(parse_preference(&json!(" 5 ")).unwrap().value(), 5);

        for bad in [json!(6), json!(-1), json!(2.5), json!(null), json!("high"), json!([3])] {
            assert!(
                matches!(parse_preference(&bad), Err(VoteError::InvalidPreference(_))),
                "{bad} must be rejected"
            );
        }
    }

    #[test]
    fn zero_preference_is_not_counted() {
        let option_id = Uuid::new_v4();
        let voters = vec![voter("a", 0), voter("b", 3), voter("c", 5)];
        let result = tally(option_id, voters, Uuid::new_v4(), true);

        assert_eq!(result.vote_count, 2);
        assert_eq!(result.voters.map(|v| v.len()), Some(3));
        assert_eq!(result.my_preference, None);
    }

    #[test]
    fn viewer_without_breakdown_sees_only_own_vote() {
        let option_id = Uuid::new_v4();
        let me = voter("me", 2);
        let my_id = me.user_id;
        let result = tally(option_id, vec![voter("other", 4), me], my_id, false);

        assert_eq!(result.vote_count, 2);
        assert_eq!(result.my_preference.map(|p| p.value()), Some(2));
        assert!(result.voters.is_none());
    }

    #[test]
    fn hidden_breakdown_is_not_serialized() {
        let result = tally(Uuid::new_v4(), vec![voter("other", 4)], Uuid::new_v4(), false);
        let body = serde_json::to_value(&result).unwrap();

        assert!(body.get("voters").is_none());
        assert!(!body.to_string().contains("other"));
    }
}
