use crate::config::tokens::JwtSettings;
use crate::utils::auth::additions::is_ascii_or_latin_extended;
use crate::utils::auth::errors::AuthError;
use anyhow::Context;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    RequestPartsExt,
};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use http::request::Parts;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use time::Duration;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub const ACCESS_COOKIE: &str = "jwt";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl User {
    pub fn new(username: &str, email: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: User,
    pub password_hash: String,
}

/// The user on whose behalf a core operation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub username: String,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

#[derive(Validate)]
pub struct ValidatedUserData {
    #[validate(length(min = 3, max = 32), custom = "is_ascii_or_latin_extended")]
    pub username: String,
    #[validate(email)]
    pub email: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub jti: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub exp: u64,
}

impl Claims {
    pub fn new(user: &User, duration: Duration) -> Self {
        Self {
            jti: Uuid::new_v4(),
            user_id: user.id,
            username: user.username.clone(),
            exp: jsonwebtoken::get_current_timestamp() + duration.whole_seconds().unsigned_abs(),
        }
    }

    pub fn actor(&self) -> Actor {
        Actor {
            id: self.user_id,
            username: self.username.clone(),
        }
    }

    pub fn generate_jwt(&self, key: &Secret<String>) -> Result<String, AuthError> {
        Ok(encode(
            &Header::default(),
            &self,
            &EncodingKey::from_secret(key.expose_secret().as_bytes()),
        )
        .context("Failed to encrypt token")?)
    }

    pub fn decode_jwt(token: &str, key: &Secret<String>) -> Result<Self, AuthError> {
        let mut validation = Validation::default();
        validation.leeway = 5;

        let data = decode::<Self>(
            token,
            &DecodingKey::from_secret(key.expose_secret().as_bytes()),
            &validation,
        )
        .map_err(|_e| AuthError::InvalidToken)?;

        Ok(data.claims)
    }

    pub fn generate_cookie(token: String, secure: bool) -> Cookie<'static> {
        Cookie::build(ACCESS_COOKIE, token)
            .http_only(true)
            .secure(secure)
            .same_site(SameSite::Strict)
            .path("/")
            .finish()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Claims
where
    JwtSettings: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jwt = JwtSettings::from_ref(state);

        let jar = parts
            .extract::<CookieJar>()
            .await
            .context("Failed to fetch cookie jar")?;

        let cookie = jar.get(ACCESS_COOKIE).ok_or(AuthError::InvalidToken)?;

        Self::decode_jwt(cookie.value(), &jwt.access.0.token)
    }
}
