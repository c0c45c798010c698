use reqwest::StatusCode;
use rendezvous::modules::store::{MemoryStore, Store};
use rendezvous::utils::auth::{errors::AuthError, try_register_user, verify_user_credentials};
use secrecy::SecretString;
use serde_json::{json, Value};
use tracing_test::traced_test;

use crate::tools::{AppData, STRONG_PASSWORD};


fn pass(password: &str) -> SecretString {
    SecretString::new(password.to_string())
}

#[traced_test]
#[tokio::test]
async fn registration_health_check() {
    let store = MemoryStore::default();
    let user = try_register_user(&store, "alice", "alice@example.com", pass(STRONG_PASSWORD))
        .await
        .unwrap();

    assert_eq!(user.username, "alice");
    assert_eq!(
        store.find_user_by_email("alice@example.com").await.unwrap(),
        Some(user)
    );
}

#[traced_test]
#[tokio::test]
async fn registration_missing_credential() {
    let store = MemoryStore::default();
    for (username, email, password) in [
        ("", "alice@example.com", STRONG_PASSWORD),
        ("   ", "alice@example.com", STRONG_PASSWORD),
        ("alice", "", STRONG_PASSWORD),
        ("alice", "alice@example.com", "  "),
    ] {
        let res = try_register_user(&store, username, email, pass(password)).await;
        match res {
            Err(AuthError::MissingCredential) => (),
            _ => panic!("Test gives the result {:?}", res),
        }
    }
}

#[traced_test]
#[tokio::test]
async fn registration_rejects_taken_credentials() {
    let store = MemoryStore::default();
    try_register_user(&store, "alice", "alice@example.com", pass(STRONG_PASSWORD))
        .await
        .unwrap();

    let res = try_register_user(&store, "alice", "other@example.com", pass(STRONG_PASSWORD)).await;
    match res {
        Err(AuthError::UserAlreadyExists) => (),
        _ => panic!("Test gives the result {:?}", res),
    }

    let res = try_register_user(&store, "alicja", "alice@example.com", pass(STRONG_PASSWORD)).await;
    match res {
        Err(AuthError::EmailAlreadyTaken) => (),
        _ => panic!("Test gives the result {:?}", res),
    }
}

#[traced_test]
#[tokio::test]
async fn registration_rejects_weak_password_and_bad_email() {
    let store = MemoryStore::default();

    let res = try_register_user(&store, "alice", "alice@example.com", pass("alice123")).await;
    match res {
        Err(AuthError::WeakPassword) => (),
        _ => panic!("Test gives the result {:?}", res),
    }

    let res = try_register_user(&store, "alice", "alice-at-example", pass(STRONG_PASSWORD)).await;
    match res {
        Err(AuthError::InvalidUserData(_)) => (),
        _ => panic!("Test gives the result {:?}", res),
    }
}

#[traced_test]
#[tokio::test]
async fn login_checks_password() {
    let store = MemoryStore::default();
    try_register_user(&store, "alice", "alice@example.com", pass(STRONG_PASSWORD))
        .await
        .unwrap();

    assert!(verify_user_credentials(&store, "alice", pass(STRONG_PASSWORD))
        .await
        .is_ok());

    let res = verify_user_credentials(&store, "alice", pass("wrong password")).await;
    match res {
        Err(AuthError::WrongCredentials) => (),
        _ => panic!("Test gives the result {:?}", res),
    }

    let res = verify_user_credentials(&store, "nobody", pass(STRONG_PASSWORD)).await;
    match res {
        Err(AuthError::WrongCredentials) => (),
        _ => panic!("Test gives the result {:?}", res),
    }
}

#[traced_test]
#[tokio::test]
async fn session_lifecycle_over_http() {
    let app = AppData::new().await;
    let (client, user) = app.user("alice").await;

    let res = client.get(app.api("/auth/session")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["username"], "alice");
    assert_eq!(body["id"], user.id.to_string());

    let res = client.post(app.api("/auth/logout")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(app.api("/auth/session")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(app.api("/auth/login"))
        .json(&json!({ "username": "alice", "password": STRONG_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(app.api("/auth/session")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[traced_test]
#[tokio::test]
async fn protected_routes_need_a_session() {
    let app = AppData::new().await;
    let client = app.client();

    for uri in ["/events", "/invitations", "/notifications", "/search/users?q=al"] {
        let res = client.get(app.api(uri)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{uri}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error_info"], "Invalid token");
    }
}

#[traced_test]
#[tokio::test]
async fn bad_login_is_unauthorized() {
    let app = AppData::new().await;
    app.user("alice").await;

    let res = app
        .client()
        .post(app.api("/auth/login"))
        .json(&json!({ "username": "alice", "password": "nope nope nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error_info"], "Invalid credentials");
}
