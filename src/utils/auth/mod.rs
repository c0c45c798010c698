pub mod additions;
pub mod errors;
pub mod models;

use self::additions::{hash_pass, pass_is_strong, validate_user_data, verify_pass};
use crate::config::tokens::JwtSettings;
use crate::modules::store::{Store, StoreError};
use axum_extra::extract::{cookie::Cookie, CookieJar};
use errors::*;
use models::*;
use secrecy::{ExposeSecret, SecretString};
use time::Duration;
use tracing::{debug, trace};

pub async fn try_register_user(
    store: &dyn Store,
    username: &str,
    email: &str,
    password: SecretString,
) -> Result<User, AuthError> {
    if username.trim().is_empty()
        || email.trim().is_empty()
        || password.expose_secret().trim().is_empty()
    {
        return Err(AuthError::MissingCredential);
    }

    validate_user_data(username, email)?;

    if store.find_user_by_username(username).await?.is_some() {
        return Err(AuthError::UserAlreadyExists);
    }
    if store.find_user_by_email(email).await?.is_some() {
        return Err(AuthError::EmailAlreadyTaken);
    }

    if !pass_is_strong(password.expose_secret(), &[username, email]) {
        return Err(AuthError::WeakPassword);
    }

    let hashed_pass = hash_pass(password.expose_secret())?;

    let user = User::new(username, email);
    match store.create_user(&user, &hashed_pass).await {
        Err(StoreError::Conflict(constraint)) => {
            trace!("Lost registration race on {constraint}");
            return Err(AuthError::UserAlreadyExists);
        }
        res => res?,
    }

    debug!("Registered user {} ({})", user.id, user.username);
    Ok(user)
}

pub async fn verify_user_credentials(
    store: &dyn Store,
    username: &str,
    password: SecretString,
) -> Result<User, AuthError> {
    if username.trim().is_empty() || password.expose_secret().trim().is_empty() {
        return Err(AuthError::MissingCredential);
    }

    let Some(credentials) = store.get_credentials(username).await? else {
        trace!("No user with username {username}");
        return Err(AuthError::WrongCredentials);
    };

    if !verify_pass(password.expose_secret(), &credentials.password_hash)? {
        trace!("Wrong password for {username}");
        return Err(AuthError::WrongCredentials);
    }

    Ok(credentials.user)
}

pub fn generate_token_cookie(
    user: &User,
    jwt: &JwtSettings,
    secure: bool,
    jar: CookieJar,
) -> Result<CookieJar, AuthError> {
    let token = Claims::new(user, jwt.access.0.expiration).generate_jwt(&jwt.access.0.token)?;
    Ok(jar.add(Claims::generate_cookie(token, secure)))
}

pub fn remove_token_cookie(jar: CookieJar) -> CookieJar {
    jar.remove(
        Cookie::build(ACCESS_COOKIE, "")
            .path("/")
            .max_age(Duration::seconds(0))
            .finish(),
    )
}
