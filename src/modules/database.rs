use crate::config::database::PostgresSettings;
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::{migrate, PgConnection, PgPool};
use tracing::info;

/// Query context bound to one connection (or transaction).
///
/// Per-table operations are written as `impl PgQuery<'_, SomeTable>` blocks so
/// they can share a transaction opened by the caller.
pub struct PgQuery<'c, T> {
    pub payload: T,
    pub conn: &'c mut PgConnection,
}

impl<'c, T> PgQuery<'c, T> {
    pub fn new(payload: T, conn: &'c mut PgConnection) -> Self {
        Self { payload, conn }
    }
}

pub async fn get_postgres_pool(config: PostgresSettings) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(config.connection_string())
        .await
        .context("Cannot establish postgres connection")?;
    if config.is_migrating {
        info!("Running migrations");
        migrate!("./migrations")
            .run(&pool)
            .await
            .context("Auto migration failed")?;
    }
    Ok(pool)
}
