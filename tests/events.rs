use rendezvous::modules::store::{MemoryStore, Store};
use rendezvous::routes::events::models::{
    CreateEvent, CreateLocationOption, CreateTimeOption, UpdateEvent,
};
use rendezvous::utils::auth::models::Actor;
use rendezvous::utils::events::errors::EventError;
use rendezvous::utils::events::models::{Event, EventStatus};
use rendezvous::utils::events::{
    add_location_option, add_time_option, create_event, delete_event, get_event_detail,
    list_events, update_event,
};
use rendezvous::utils::invitations::{invite, respond};
use rendezvous::utils::notifications::list_unread;
use rendezvous::utils::notifications::models::{Notification, NotificationKind};
use rendezvous::utils::votes::cast_vote;
use rendezvous::utils::votes::models::OptionKind;
use reqwest::StatusCode;
use serde_json::{json, Value};
use time::macros::datetime;
use tracing_test::traced_test;
use uuid::Uuid;

use crate::tools::{id_of, seed_user, AppData};


fn new_event(title: &str) -> CreateEvent {
    CreateEvent {
        title: title.to_string(),
        description: "Quarterly planning".to_string(),
        status: None,
    }
}

fn status_update(status: &str) -> UpdateEvent {
    UpdateEvent {
        status: Some(json!(status)),
        ..Default::default()
    }
}

async fn invited_and_answered(
    store: &dyn Store,
    creator: &Actor,
    event: &Event,
    invitee: &Actor,
    answer: &str,
) {
    let outcome = invite(store, creator, event.id, invitee.id).await.unwrap();
    respond(store, invitee, outcome.invitation().id, answer)
        .await
        .unwrap();
}

#[traced_test]
#[tokio::test]
async fn create_event_defaults_to_draft() {
    let store = MemoryStore::default();
    let alice = seed_user(&store, "alice").await;

    let event = create_event(&store, &alice, new_event("Offsite")).await.unwrap();

    assert_eq!(event.status, EventStatus::Draft);
    assert_eq!(event.creator_id, alice.id);
    assert_eq!(event.created_at, event.updated_at);
    assert_eq!(store.get_event(event.id).await.unwrap(), Some(event));
}

#[traced_test]
#[tokio::test]
async fn create_event_rejects_bad_input() {
    let store = MemoryStore::default();
    let alice = seed_user(&store, "alice").await;

    let res = create_event(&store, &alice, new_event("  ")).await;
    assert!(matches!(res, Err(EventError::Invalid(_))), "{res:?}");

    let mut body = new_event("Offsite");
    body.status = Some("postponed".to_string());
    let res = create_event(&store, &alice, body).await;
    assert!(matches!(res, Err(EventError::Invalid(_))), "{res:?}");

    assert!(list_events(&store, &alice).await.unwrap().is_empty());
}

#[traced_test]
#[tokio::test]
async fn only_creator_updates_and_unknown_status_is_ignored() {
    let store = MemoryStore::default();
    let alice = seed_user(&store, "alice").await;
    let bob = seed_user(&store, "bob").await;
    let event = create_event(&store, &alice, new_event("Offsite")).await.unwrap();

    let res = update_event(&store, &bob, event.id, status_update("planning")).await;
    assert!(matches!(res, Err(EventError::NotCreator)), "{res:?}");

    let updated = update_event(
        &store,
        &alice,
        event.id,
        UpdateEvent {
            description: Some("Two days".to_string()),
            status: Some(json!("postponed")),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.status, EventStatus::Draft);
    assert_eq!(updated.description, "Two days");
    assert_eq!(updated.title, "Offsite");
    assert!(updated.updated_at >= event.updated_at);

    let res = update_event(
        &store,
        &alice,
        event.id,
        UpdateEvent {
            title: Some(String::new()),
            description: Some("Never stored".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(res, Err(EventError::Invalid(_))), "{res:?}");
    let stored = store.get_event(event.id).await.unwrap().unwrap();
    assert_eq!(stored.description, "Two days");

    let res = update_event(&store, &alice, Uuid::new_v4(), status_update("planning")).await;
    assert!(matches!(res, Err(EventError::NotFound)), "{res:?}");
}

#[traced_test]
#[tokio::test]
async fn status_transition_notifies_accepted_invitees_once() {
    let store = MemoryStore::default();
    let alice = seed_user(&store, "alice").await;
    let bob = seed_user(&store, "bob").await;
    let carol = seed_user(&store, "carol").await;
    let dave = seed_user(&store, "dave").await;
    let event = create_event(&store, &alice, new_event("Offsite")).await.unwrap();

    invited_and_answered(&store, &alice, &event, &bob, "accepted").await;
    invited_and_answered(&store, &alice, &event, &carol, "tentative").await;
    invite(&store, &alice, event.id, dave.id).await.unwrap();

    update_event(&store, &alice, event.id, status_update("confirmed"))
        .await
        .unwrap();
    update_event(&store, &alice, event.id, status_update("confirmed"))
        .await
        .unwrap();

    let confirmations = |notifications: Vec<Notification>| {
        notifications
            .into_iter()
            .filter(|n| n.kind == NotificationKind::Confirmation)
            .collect::<Vec<_>>()
    };

    let bob_confirmations = confirmations(list_unread(&store, &bob).await.unwrap());
    assert_eq!(bob_confirmations.len(), 1);
    assert_eq!(
        bob_confirmations[0].message,
        "The event 'Offsite' has been confirmed."
    );
    assert!(confirmations(list_unread(&store, &carol).await.unwrap()).is_empty());
    assert!(confirmations(list_unread(&store, &dave).await.unwrap()).is_empty());
    assert!(confirmations(list_unread(&store, &alice).await.unwrap()).is_empty());
}

#[traced_test]
#[tokio::test]
async fn cancellation_and_planning_messages() {
    let store = MemoryStore::default();
    let alice = seed_user(&store, "alice").await;
    let bob = seed_user(&store, "bob").await;
    let event = create_event(&store, &alice, new_event("Offsite")).await.unwrap();
    invited_and_answered(&store, &alice, &event, &bob, "accepted").await;

    update_event(&store, &alice, event.id, status_update("planning"))
        .await
        .unwrap();
    update_event(&store, &alice, event.id, status_update("cancelled"))
        .await
        .unwrap();

    let messages: Vec<(NotificationKind, String)> = list_unread(&store, &bob)
        .await
        .unwrap()
        .into_iter()
        .map(|n| (n.kind, n.message))
        .collect();
    assert!(messages.contains(&(
        NotificationKind::Update,
        "The event 'Offsite' has been updated to Planning.".to_string()
    )));
    assert!(messages.contains(&(
        NotificationKind::Cancellation,
        "The event 'Offsite' has been cancelled.".to_string()
    )));
}

#[traced_test]
#[tokio::test]
async fn options_are_creator_only_and_validated() {
    let store = MemoryStore::default();
    let alice = seed_user(&store, "alice").await;
    let bob = seed_user(&store, "bob").await;
    let event = create_event(&store, &alice, new_event("Offsite")).await.unwrap();

    let later = CreateTimeOption {
        start_time: datetime!(2023-06-02 10:00 UTC),
        end_time: datetime!(2023-06-02 12:00 UTC),
    };
    let earlier = CreateTimeOption {
        start_time: datetime!(2023-06-01 10:00 UTC),
        end_time: datetime!(2023-06-01 12:00 UTC),
    };
    let backwards = CreateTimeOption {
        start_time: datetime!(2023-06-01 12:00 UTC),
        end_time: datetime!(2023-06-01 12:00 UTC),
    };

    add_time_option(&store, &alice, event.id, later).await.unwrap();
    add_time_option(&store, &alice, event.id, earlier).await.unwrap();
    let res = add_time_option(&store, &alice, event.id, backwards).await;
    assert!(matches!(res, Err(EventError::Invalid(_))), "{res:?}");

    let res = add_location_option(
        &store,
        &bob,
        event.id,
        CreateLocationOption {
            name: "Cabin".to_string(),
            address: "Lake road 1".to_string(),
            details: String::new(),
        },
    )
    .await;
    assert!(matches!(res, Err(EventError::NotCreator)), "{res:?}");

    let res = add_location_option(
        &store,
        &alice,
        event.id,
        CreateLocationOption {
            name: "Cabin".to_string(),
            address: " ".to_string(),
            details: String::new(),
        },
    )
    .await;
    assert!(matches!(res, Err(EventError::Invalid(_))), "{res:?}");

    let options = store.list_time_options(event.id).await.unwrap();
    assert_eq!(options.len(), 2);
    assert_eq!(options[0].start_time, datetime!(2023-06-01 10:00 UTC));
}

#[traced_test]
#[tokio::test]
async fn delete_cascades_to_everything_attached() {
    let store = MemoryStore::default();
    let alice = seed_user(&store, "alice").await;
    let bob = seed_user(&store, "bob").await;
    let event = create_event(&store, &alice, new_event("Offsite")).await.unwrap();
    let option = add_time_option(
        &store,
        &alice,
        event.id,
        CreateTimeOption {
            start_time: datetime!(2023-06-01 10:00 UTC),
            end_time: datetime!(2023-06-01 12:00 UTC),
        },
    )
    .await
    .unwrap();
    invited_and_answered(&store, &alice, &event, &bob, "accepted").await;
    cast_vote(
        &store,
        &bob,
        OptionKind::Time,
        option.id,
        &json!(4),
    )
    .await
    .unwrap();

    let res = delete_event(&store, &bob, event.id).await;
    assert!(matches!(res, Err(EventError::NotCreator)), "{res:?}");

    delete_event(&store, &alice, event.id).await.unwrap();

    assert_eq!(store.get_event(event.id).await.unwrap(), None);
    assert!(store.list_time_options(event.id).await.unwrap().is_empty());
    assert_eq!(store.find_invitation(event.id, bob.id).await.unwrap(), None);
    assert!(store
        .list_option_votes(OptionKind::Time, option.id)
        .await
        .unwrap()
        .is_empty());
    assert!(list_unread(&store, &bob).await.unwrap().is_empty());
    assert!(list_unread(&store, &alice).await.unwrap().is_empty());

    let res = delete_event(&store, &alice, event.id).await;
    assert!(matches!(res, Err(EventError::NotFound)), "{res:?}");
}

#[traced_test]
#[tokio::test]
async fn list_contains_created_and_accepted_events_only() {
    let store = MemoryStore::default();
    let alice = seed_user(&store, "alice").await;
    let bob = seed_user(&store, "bob").await;

    let own = create_event(&store, &bob, new_event("Bob's party")).await.unwrap();
    let accepted = create_event(&store, &alice, new_event("Offsite")).await.unwrap();
    let pending = create_event(&store, &alice, new_event("Retro")).await.unwrap();
    invited_and_answered(&store, &alice, &accepted, &bob, "accepted").await;
    invite(&store, &alice, pending.id, bob.id).await.unwrap();

    let ids: Vec<Uuid> = list_events(&store, &bob)
        .await
        .unwrap()
        .into_iter()
        .map(|item| item.id)
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&own.id));
    assert!(ids.contains(&accepted.id));

    let res = get_event_detail(&store, &bob, pending.id).await;
    assert!(res.is_ok(), "pending invitees may look at the event");

    let carol = seed_user(&store, "carol").await;
    let res = get_event_detail(&store, &carol, pending.id).await;
    assert!(matches!(res, Err(EventError::NotInvited)), "{res:?}");
}

#[traced_test]
#[tokio::test]
async fn event_routes() {
    let app = AppData::new().await;
    let (alice, _) = app.user("alice").await;
    let (bob, _) = app.user("bob").await;

    let event = app.create_event(&alice, "Offsite").await;
    assert_eq!(event["status"], "draft");
    let event_id = id_of(&event);

    let res = alice
        .post(app.api(&format!("/events/{event_id}/time_options")))
        .json(&json!({
            "start_time": "2023-06-01T10:00:00Z",
            "end_time": "2023-06-01T12:00:00Z",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = alice
        .post(app.api(&format!("/events/{event_id}/location_options")))
        .json(&json!({ "name": "Cabin", "address": "Lake road 1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let location: Value = res.json().await.unwrap();
    assert_eq!(location["details"], "");

    let res = alice
        .get(app.api(&format!("/events/{event_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let detail: Value = res.json().await.unwrap();
    assert_eq!(detail["creator"], "alice");
    assert_eq!(detail["status_label"], "Draft");
    assert_eq!(detail["time_options"].as_array().unwrap().len(), 1);
    assert_eq!(detail["location_options"].as_array().unwrap().len(), 1);

    let res = bob
        .get(app.api(&format!("/events/{event_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = bob
        .put(app.api(&format!("/events/{event_id}")))
        .json(&json!({ "title": "Mine now" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = alice
        .put(app.api(&format!("/events/{event_id}")))
        .json(&json!({ "status": "planning" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["status"], "planning");

    let res = alice
        .get(app.api(&format!("/events/{}", Uuid::new_v4())))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error_info"], "Event not found");

    let res = alice
        .delete(app.api(&format!("/events/{event_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = alice.get(app.api("/events")).send().await.unwrap();
    let events: Value = res.json().await.unwrap();
    assert!(events.as_array().unwrap().is_empty());
}

#[traced_test]
#[tokio::test]
async fn create_route_validates() {
    let app = AppData::new().await;
    let (alice, _) = app.user("alice").await;

    let res = alice
        .post(app.api("/events"))
        .json(&json!({ "title": "", "description": "no title" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error_info"], "Title is required");

    let res = alice
        .post(app.api("/events"))
        .json(&json!({ "description": "no title" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error_info"], "Title is required");

    let res = alice
        .post(app.api("/events"))
        .json(&json!({ "title": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["error_info"].is_string());

    let event_id = id_of(&app.create_event(&alice, "Retro").await);
    let res = alice
        .post(app.api(&format!("/events/{event_id}/time_options")))
        .json(&json!({ "start_time": "tomorrow" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[traced_test]
#[tokio::test]
async fn update_route_ignores_non_string_status() {
    let app = AppData::new().await;
    let (alice, _) = app.user("alice").await;
    let event_id = id_of(&app.create_event(&alice, "Retro").await);

    let res = alice
        .put(app.api(&format!("/events/{event_id}")))
        .json(&json!({ "title": "Retro 2", "status": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["title"], "Retro 2");
    assert_eq!(updated["status"], "draft");

    let res = alice
        .put(app.api(&format!("/events/{event_id}")))
        .json(&json!({ "status": "postponed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["status"], "draft");
}
