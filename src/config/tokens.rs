use crate::config::get_secret_env;
use secrecy::Secret;
use serde::Deserialize;
use time::Duration;
use tracing::warn;

pub const NAME_ACCESS_SECRET: &str = "JWT_ACCESS_SECRET";

const ACCESS_SECRET: &str = "ACCESS_SECRET";
const ACCESS_EXPIRATION: Duration = Duration::hours(12);

#[derive(Deserialize)]
pub struct JwtSettingsModel {
    pub access: Option<TokenDataModel>,
}

#[derive(Deserialize)]
pub struct TokenDataModel {
    pub token: Option<String>,
    /// Seconds.
    pub expiration: Option<i64>,
}

impl TokenDataModel {
    fn to_access(self) -> AccessTokenData {
        let expiration = self.expiration.map_or(ACCESS_EXPIRATION, |seconds| {
            warn!("Using custom access token expiration of {seconds}s");
            Duration::seconds(seconds)
        });
        AccessTokenData(TokenData::new(
            &self.token.unwrap_or_else(|| ACCESS_SECRET.to_string()),
            expiration,
        ))
    }
}

#[derive(Clone)]
pub struct JwtSettings {
    pub access: AccessTokenData,
}

impl JwtSettings {
    pub fn new(access: &str) -> Self {
        Self {
            access: AccessTokenData(TokenData::new(access, ACCESS_EXPIRATION)),
        }
    }

    pub fn from_env() -> Self {
        Self {
            access: AccessTokenData(TokenData {
                token: get_secret_env(NAME_ACCESS_SECRET),
                expiration: ACCESS_EXPIRATION,
            }),
        }
    }
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self::new(ACCESS_SECRET)
    }
}

#[derive(Clone)]
pub struct TokenData {
    pub token: Secret<String>,
    pub expiration: Duration,
}

impl TokenData {
    fn new(token: &str, expiration: Duration) -> Self {
        Self {
            token: Secret::new(token.to_owned()),
            expiration,
        }
    }
}

#[derive(Clone)]
pub struct AccessTokenData(pub TokenData);

impl JwtSettingsModel {
    pub fn to_settings(self) -> JwtSettings {
        let access = self.access.map_or_else(
            || {
                warn!("Using default access token");
                AccessTokenData(TokenData::new(ACCESS_SECRET, ACCESS_EXPIRATION))
            },
            |t| t.to_access(),
        );

        JwtSettings { access }
    }
}
