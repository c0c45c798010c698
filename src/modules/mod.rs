use self::database::get_postgres_pool;
use self::store::{MemoryStore, PgStore, Store};
use crate::config::app::ApplicationSettings;
use crate::config::environment::Environment;
use crate::config::tokens::JwtSettings;
use crate::config::{get_config, StorageSettings};
use axum::extract::FromRef;
use core::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

pub mod database;
pub mod store;

pub struct Modules {
    pub app: ApplicationSettings,
    store: Arc<dyn Store>,
    jwt: JwtSettings,
    environment: Environment,
}

impl Modules {
    pub async fn load_from_settings() -> anyhow::Result<Self> {
        let settings = get_config()?;
        info!("Settings loaded");
        info!("Loading modules with {} storage", settings.storage);
        let store: Arc<dyn Store> = match settings.storage {
            StorageSettings::Postgres(postgres) => {
                Arc::new(PgStore::new(get_postgres_pool(postgres).await?))
            }
            StorageSettings::Memory => Arc::new(MemoryStore::default()),
        };
        info!("Modules loaded");
        Ok(Self {
            store,
            app: settings.app,
            jwt: settings.jwt,
            environment: settings.environment,
        })
    }

    pub fn use_custom(
        store: Arc<dyn Store>,
        addr: SocketAddr,
        origin: String,
        access: &str,
        environment: Environment,
    ) -> Self {
        Self {
            store,
            app: ApplicationSettings::new(addr, origin),
            jwt: JwtSettings::new(access),
            environment,
        }
    }

    pub fn state(&self) -> AppState {
        AppState::new(self)
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }
}

#[derive(Clone, FromRef)]
pub struct AppState {
    pub environment: Environment,
    pub store: Arc<dyn Store>,
    pub jwt: JwtSettings,
}

impl AppState {
    fn new(modules: &Modules) -> Self {
        Self {
            environment: modules.environment.clone(),
            store: modules.store.clone(),
            jwt: modules.jwt.clone(),
        }
    }
}

impl Display for AppState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} environment, store, token secrets", self.environment)
    }
}
