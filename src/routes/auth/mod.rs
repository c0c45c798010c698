pub mod models;

use crate::app_errors::AppError;
use crate::config::environment::Environment;
use crate::config::tokens::JwtSettings;
use crate::modules::store::Store;
use crate::routes::auth::models::{LoginCredentials, RegisterCredentials};
use crate::utils::auth::errors::AuthError;
use crate::utils::auth::models::{Claims, User};
use crate::utils::auth::*;
use crate::validation::JsonContent;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{debug_handler, http::StatusCode, Json, Router};
use axum_extra::extract::CookieJar;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::modules::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(post_register_user))
        .route("/login", post(post_login_user))
        .route("/logout", post(post_logout_user))
        .route("/session", get(get_session))
}

/// Register and start a session
#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = RegisterCredentials, responses((status = 201, body = User, description = "Registered"), (status = 400, description = "Missing, invalid or taken credentials")))]
#[debug_handler(state = AppState)]
pub async fn post_register_user(
    State(store): State<Arc<dyn Store>>,
    State(jwt): State<JwtSettings>,
    State(environment): State<Environment>,
    jar: CookieJar,
    JsonContent(credentials): JsonContent<RegisterCredentials>,
) -> Result<(StatusCode, CookieJar, Json<User>), AppError> {
    let user = try_register_user(
        store.as_ref(),
        credentials.username.trim(),
        credentials.email.trim(),
        SecretString::new(credentials.password),
    )
    .await?;

    let jar = generate_token_cookie(&user, &jwt, !environment.is_dev(), jar)?;

    debug!("User {} ({}) registered successfully", user.id, user.username);

    Ok((StatusCode::CREATED, jar, Json(user)))
}

/// Log in
#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = LoginCredentials, responses((status = 200, body = User, description = "Logged in"), (status = 401, description = "Invalid credentials")))]
pub async fn post_login_user(
    State(store): State<Arc<dyn Store>>,
    State(jwt): State<JwtSettings>,
    State(environment): State<Environment>,
    jar: CookieJar,
    JsonContent(credentials): JsonContent<LoginCredentials>,
) -> Result<(CookieJar, Json<User>), AppError> {
    let user = verify_user_credentials(
        store.as_ref(),
        credentials.username.trim(),
        SecretString::new(credentials.password),
    )
    .await?;

    let jar = generate_token_cookie(&user, &jwt, !environment.is_dev(), jar)?;

    debug!("User {} ({}) logged in successfully", user.id, user.username);

    Ok((jar, Json(user)))
}

/// Log out
#[utoipa::path(post, path = "/auth/logout", tag = "auth", responses((status = 200, description = "Session cookie cleared")))]
pub async fn post_logout_user(jar: CookieJar) -> (CookieJar, Json<Value>) {
    debug!("User logged out successfully");
    (
        remove_token_cookie(jar),
        Json(json!({ "message": "Logged out" })),
    )
}

/// Current session
#[utoipa::path(get, path = "/auth/session", tag = "auth", responses((status = 200, body = User, description = "Logged in user"), (status = 401, description = "No valid session")))]
pub async fn get_session(
    claims: Claims,
    State(store): State<Arc<dyn Store>>,
) -> Result<Json<User>, AuthError> {
    let user = store
        .get_user(claims.user_id)
        .await?
        .ok_or(AuthError::InvalidToken)?;
    Ok(Json(user))
}
