use crate::config::app::{ApplicationSettings, ApplicationSettingsModel, NAME_ORIGIN, NAME_PORT};
use crate::config::database::{PostgresSettings, PostgresSettingsModel, NAME_POSTGRES};
use crate::config::environment::Environment;
use crate::config::tokens::{JwtSettings, JwtSettingsModel, NAME_ACCESS_SECRET};
use config::{Config, ConfigError};
use core::fmt::Display;
use secrecy::Secret;
use serde::Deserialize;
use std::env;
use tracing::{error, warn};

pub mod app;
pub mod database;
pub mod environment;
pub mod tokens;

const CONFIG_DIR: &str = "configuration";
const CONFIG_FILE_NAME: &str = "settings.toml";
const ENV_PREFIX: &str = "APP";

#[derive(Deserialize)]
pub struct SettingsModel {
    pub app: Option<ApplicationSettingsModel>,
    pub jwt: Option<JwtSettingsModel>,
    pub postgres: Option<PostgresSettingsModel>,
}

impl SettingsModel {
    fn parse() -> Result<Self, ConfigError> {
        let base_path = env::current_dir()
            .map_err(|e| ConfigError::Message(format!("No working directory: {e}")))?;
        let config_dir = base_path.join(CONFIG_DIR);
        let settings = Config::builder()
            .add_source(config::File::from(config_dir.join(CONFIG_FILE_NAME)).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );
        settings.build()?.try_deserialize()
    }
}

/// Where events, invitations, votes and notifications are kept.
#[derive(Clone)]
pub enum StorageSettings {
    Postgres(PostgresSettings),
    Memory,
}

impl Display for StorageSettings {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StorageSettings::Postgres(_) => write!(f, "postgres"),
            StorageSettings::Memory => write!(f, "in-memory"),
        }
    }
}

#[derive(Clone)]
pub struct Settings {
    pub app: ApplicationSettings,
    pub jwt: JwtSettings,
    pub storage: StorageSettings,
    pub environment: Environment,
}

impl Settings {
    fn dev(model: SettingsModel) -> Self {
        let app = model.app.map_or_else(
            || {
                warn!("Using default `app` settings!");
                ApplicationSettings::default()
            },
            |x| x.to_settings(),
        );

        let jwt = model.jwt.map_or_else(
            || {
                warn!("Using default `jwt` settings!");
                JwtSettings::default()
            },
            |x| x.to_settings(),
        );

        let storage = match model.postgres {
            Some(postgres) => StorageSettings::Postgres(postgres.to_settings()),
            None => Self::dev_storage(),
        };

        Self {
            app,
            jwt,
            storage,
            environment: Environment::Development,
        }
    }

    fn dev_storage() -> StorageSettings {
        match PostgresSettings::try_from_env() {
            Some(settings) => {
                warn!("Using default `postgres` settings (env url)!");
                StorageSettings::Postgres(settings)
            }
            None => {
                warn!("No postgres configured, data is kept in memory only!");
                StorageSettings::Memory
            }
        }
    }

    fn prod() -> Self {
        Self {
            app: ApplicationSettings::from_env(),
            jwt: JwtSettings::from_env(),
            storage: StorageSettings::Postgres(PostgresSettings::from_env()),
            environment: Environment::Production,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: ApplicationSettings::default(),
            jwt: JwtSettings::default(),
            storage: Self::dev_storage(),
            environment: Environment::default(),
        }
    }
}

pub fn get_config() -> Result<Settings, anyhow::Error> {
    let environment: Environment = match env::var("APP_ENVIRONMENT") {
        Ok(value) => value.try_into().map_err(anyhow::Error::msg)?,
        Err(_) => Environment::Development,
    };

    match environment {
        Environment::Development => match SettingsModel::parse() {
            Ok(model) => Ok(Settings::dev(model)),
            Err(e) => {
                error!("{e}\n - check {CONFIG_DIR}/{CONFIG_FILE_NAME}");
                warn!("Using default configuration!");
                Ok(Settings::default())
            }
        },
        Environment::Production => {
            let missing = missing_env();
            if !missing.is_empty() {
                anyhow::bail!("Provide missing environment variables {missing:?}");
            }
            Ok(Settings::prod())
        }
    }
}

pub fn try_get_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

pub fn get_env(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("Missing {name}"))
}

pub fn get_secret_env(name: &str) -> Secret<String> {
    Secret::new(get_env(name))
}

fn missing_env() -> Vec<&'static str> {
    [NAME_ORIGIN, NAME_PORT, NAME_POSTGRES, NAME_ACCESS_SECRET]
        .into_iter()
        .filter(|name| try_get_env(name).is_none())
        .collect()
}
