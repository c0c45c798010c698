use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing_test::traced_test;

use crate::tools::{id_of, AppData};


async fn unread(app: &AppData, client: &reqwest::Client) -> Vec<Value> {
    let res = client.get(app.api("/notifications")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

#[traced_test]
#[tokio::test]
async fn plan_an_event_from_draft_to_confirmed() {
    let app = AppData::new().await;
    let (creator, _) = app.user("carla").await;
    let (guest, guest_user) = app.user("ulrich").await;

    let event = app.create_event(&creator, "Board games").await;
    assert_eq!(event["status"], "draft");
    let event_id = id_of(&event);

    let res = creator
        .post(app.api(&format!("/events/{event_id}/time_options")))
        .json(&json!({
            "start_time": "2023-06-01T10:00:00Z",
            "end_time": "2023-06-01T11:00:00Z",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let option_id = id_of(&res.json::<Value>().await.unwrap());

    let res = creator
        .post(app.api(&format!("/events/{event_id}/invite")))
        .json(&json!({ "user_id": guest_user.id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let invite: Value = res.json().await.unwrap();
    assert_eq!(invite["invitation"]["status"], "pending");
    let invitation_id = invite["invitation"]["id"].as_str().unwrap().to_string();

    let res = guest
        .put(app.api(&format!("/invitations/{invitation_id}/respond")))
        .json(&json!({ "status": "accepted" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let creator_inbox = unread(&app, &creator).await;
    assert_eq!(creator_inbox.len(), 1);
    assert_eq!(creator_inbox[0]["kind"], "update");
    assert_eq!(
        creator_inbox[0]["message"],
        "ulrich has accepted your invitation to 'Board games'."
    );

    let res = guest
        .post(app.api(&format!("/time_options/{option_id}/vote")))
        .json(&json!({ "preference": 4 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = guest
        .get(app.api(&format!("/time_options/{option_id}/votes")))
        .send()
        .await
        .unwrap();
    let tally: Value = res.json().await.unwrap();
    assert_eq!(tally["vote_count"], 1);

    let res = creator
        .put(app.api(&format!("/events/{event_id}")))
        .json(&json!({ "status": "confirmed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let confirmations: Vec<Value> = unread(&app, &guest)
        .await
        .into_iter()
        .filter(|n| n["kind"] == "confirmation")
        .collect();
    assert_eq!(confirmations.len(), 1);
    assert_eq!(
        confirmations[0]["message"],
        "The event 'Board games' has been confirmed."
    );

    let res = creator
        .get(app.api(&format!("/events/{event_id}/votes")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let summary: Value = res.json().await.unwrap();
    let voters = summary["time_options"][0]["votes"]["voters"]
        .as_array()
        .unwrap();
    assert_eq!(voters.len(), 1);
    assert_eq!(voters[0]["username"], "ulrich");
    assert_eq!(voters[0]["preference"], 4);

    for _ in 0..2 {
        let res = guest
            .post(app.api("/notifications/mark_all_read"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(unread(&app, &guest).await.is_empty());
    }
}
