//! Store tests against a live database. Run with `DATABASE_URL` set and
//! `cargo test -- --ignored`.

use rendezvous::modules::store::{Inserted, PgStore, Store};
use rendezvous::routes::events::models::CreateEvent;
use rendezvous::utils::auth::models::Actor;
use rendezvous::utils::events::create_event;
use rendezvous::utils::invitations::invite;
use rendezvous::utils::invitations::models::InviteOutcome;
use rendezvous::utils::notifications::list_unread;
use rendezvous::utils::events::models::{Event, EventChanges, EventStatus, TimeOption};
use rendezvous::utils::invitations::models::{Invitation, InvitationStatus};
use rendezvous::utils::notifications::models::{Notification, NotificationKind};
use rendezvous::utils::votes::cast_vote;
use rendezvous::utils::votes::models::{OptionKind, Preference, Vote, VoteTarget};
use serde_json::json;
use sqlx::PgPool;
use time::macros::datetime;
use time::OffsetDateTime;
use tracing_test::traced_test;

use crate::tools::seed_user;


async fn seeded_event(store: &PgStore) -> (Event, TimeOption) {
    let creator = seed_user(store, "alice").await;
    let event = Event::new(
        creator.id,
        "Offsite".to_string(),
        String::new(),
        EventStatus::Draft,
    );
    store.insert_event(&event).await.unwrap();
    let option = TimeOption::new(
        event.id,
        datetime!(2023-06-01 10:00 UTC),
        datetime!(2023-06-01 11:00 UTC),
    );
    store.insert_time_option(&option).await.unwrap();
    (event, option)
}

#[traced_test]
#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn invitation_insert_is_idempotent(pool: PgPool) {
    let store = PgStore::new(pool);
    let (event, _) = seeded_event(&store).await;
    let bob = seed_user(&store, "bob").await;

    let first = store
        .insert_invitation(&Invitation::pending(event.id, bob.id))
        .await
        .unwrap();
    let Inserted::Created(created) = first else {
        panic!("First invitation must be created: {first:?}");
    };

    let second = store
        .insert_invitation(&Invitation::pending(event.id, bob.id))
        .await
        .unwrap();
    assert_eq!(second, Inserted::Existing(created));
}

#[traced_test]
#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn vote_upsert_keeps_one_row(pool: PgPool) {
    let store = PgStore::new(pool);
    let (event, option) = seeded_event(&store).await;
    let target = VoteTarget::Time(option.clone());

    let first = store
        .upsert_vote(
            OptionKind::Time,
            &Vote::new(event.creator_id, &target, Preference::try_from(2_i64).unwrap()),
        )
        .await
        .unwrap();
    assert!(first.is_created());

    let second = store
        .upsert_vote(
            OptionKind::Time,
            &Vote::new(event.creator_id, &target, Preference::try_from(5_i64).unwrap()),
        )
        .await
        .unwrap();
    assert!(!second.is_created());

    let voters = store
        .list_option_votes(OptionKind::Time, option.id)
        .await
        .unwrap();
    assert_eq!(voters.len(), 1);
    assert_eq!(voters[0].preference.value(), 5);
}

#[traced_test]
#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn update_reports_previous_status_and_delete_cascades(pool: PgPool) {
    let store = PgStore::new(pool);
    let (event, option) = seeded_event(&store).await;
    let bob = seed_user(&store, "bob").await;
    let invitation = Invitation::pending(event.id, bob.id);
    store.insert_invitation(&invitation).await.unwrap();
    store
        .respond_invitation(invitation.id, InvitationStatus::Accepted, OffsetDateTime::now_utc())
        .await
        .unwrap();
    store
        .insert_notifications(&[Notification::new(
            bob.id,
            event.id,
            NotificationKind::Invitation,
            "invited".to_string(),
        )])
        .await
        .unwrap();

    let changes = EventChanges {
        status: Some(EventStatus::Confirmed),
        ..Default::default()
    };
    let update = store
        .update_event(event.id, &changes, OffsetDateTime::now_utc())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(update.previous_status, EventStatus::Draft);
    assert_eq!(update.transition(), Some(EventStatus::Confirmed));

    let again = store
        .update_event(event.id, &changes, OffsetDateTime::now_utc())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(again.transition(), None);

    assert!(store.delete_event(event.id).await.unwrap());
    assert_eq!(store.get_time_option(option.id).await.unwrap(), None);
    assert_eq!(store.get_invitation(invitation.id).await.unwrap(), None);
    assert!(store
        .list_unread_notifications(bob.id)
        .await
        .unwrap()
        .is_empty());
}

#[traced_test]
#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn concurrent_invites_keep_one_row(pool: PgPool) {
    let store = PgStore::new(pool);
    let alice = seed_user(&store, "alice").await;
    let bob = seed_user(&store, "bob").await;
    let event = create_event(
        &store,
        &alice,
        CreateEvent {
            title: "Offsite".to_string(),
            description: String::new(),
            status: None,
        },
    )
    .await
    .unwrap();

    let (first, second) = tokio::join!(
        invite(&store, &alice, event.id, bob.id),
        invite(&store, &alice, event.id, bob.id),
    );
    let (first, second) = (first.unwrap(), second.unwrap());
    let (created, repeated) = if first.is_created() {
        (first, second)
    } else {
        (second, first)
    };
    assert!(created.is_created());
    assert_eq!(
        repeated,
        InviteOutcome::AlreadyPending(created.invitation().clone())
    );

    assert_eq!(store.list_event_invitations(event.id).await.unwrap().len(), 1);
    let notifications = list_unread(&store, &bob).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::Invitation);
}

#[traced_test]
#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn concurrent_votes_keep_one_row(pool: PgPool) {
    let store = PgStore::new(pool);
    let (event, option) = seeded_event(&store).await;
    let creator = store.get_user(event.creator_id).await.unwrap().unwrap();
    let alice = Actor::from(&creator);

    let value_first = json!(2);
    let value_second = json!(4);
    let (first, second) = tokio::join!(
        cast_vote(&store, &alice, OptionKind::Time, option.id, &value_first),
        cast_vote(&store, &alice, OptionKind::Time, option.id, &value_second),
    );
    let (first, second) = (first.unwrap(), second.unwrap());
    assert!(
        first.is_created() != second.is_created(),
        "exactly one call creates the vote"
    );

    let voters = store
        .list_option_votes(OptionKind::Time, option.id)
        .await
        .unwrap();
    assert_eq!(voters.len(), 1);
    assert!([2, 4].contains(&voters[0].preference.value()));
}
