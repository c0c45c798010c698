use crate::config::{get_secret_env, try_get_env};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use tracing::info;

pub const NAME_POSTGRES: &str = "DATABASE_URL";

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Deserialize, Clone)]
pub struct DatabaseFieldsModel {
    username: Option<String>,
    password: Option<String>,
    port: Option<u16>,
    host: Option<String>,
    database_name: Option<String>,
}

impl DatabaseFieldsModel {
    fn compose(&self, scheme: &str) -> String {
        format!(
            "{scheme}://{}:{}@{}:{}/{}",
            self.username.as_deref().unwrap_or("postgres"),
            self.password.as_deref().unwrap_or(""),
            self.host.as_deref().unwrap_or("localhost"),
            self.port.unwrap_or(5432),
            self.database_name.as_deref().unwrap_or("postgres"),
        )
    }
}

#[derive(Deserialize, Clone)]
pub struct PostgresSettingsModel {
    database_url: Option<String>,
    fields: Option<DatabaseFieldsModel>,
    is_migrating: Option<bool>,
    max_connections: Option<u32>,
}

impl PostgresSettingsModel {
    /// Composed fields win over an explicit url, which wins over `DATABASE_URL`.
    fn connection_string(&self) -> Option<String> {
        if let Some(fields) = &self.fields {
            info!("Using composed url for postgresql");
            return Some(fields.compose("postgresql"));
        }
        if let Some(url) = &self.database_url {
            info!("Using field url for postgresql");
            return Some(url.clone());
        }
        let url = try_get_env(NAME_POSTGRES)?;
        info!("Using env url for postgresql");
        Some(url)
    }

    pub fn to_settings(self) -> PostgresSettings {
        let database_url = self
            .connection_string()
            .unwrap_or_else(|| panic!("No connection info provided, set {NAME_POSTGRES}"));
        PostgresSettings {
            database_url: Secret::new(database_url),
            is_migrating: self.is_migrating.unwrap_or(false),
            max_connections: self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS),
        }
    }
}

#[derive(Clone)]
pub struct PostgresSettings {
    pub database_url: Secret<String>,
    pub is_migrating: bool,
    pub max_connections: u32,
}

impl PostgresSettings {
    pub fn from_env() -> Self {
        Self {
            database_url: get_secret_env(NAME_POSTGRES),
            is_migrating: true,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    pub fn try_from_env() -> Option<Self> {
        Some(Self {
            database_url: Secret::new(try_get_env(NAME_POSTGRES)?),
            is_migrating: false,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        })
    }

    pub fn connection_string(&self) -> &str {
        self.database_url.expose_secret()
    }
}
