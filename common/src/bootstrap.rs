// Bootstrap utilities for binary initialization

use crate::config::Settings;
use crate::db::{DbPool, InMemoryStore, JuryStore, PgJuryStore};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Initialize database pool
///
/// # Errors
/// Returns error if database pool initialization or migration fails
#[tracing::instrument(skip(settings))]
pub async fn init_database_pool(settings: &Settings) -> Result<DbPool> {
    info!("Initializing database pool");

    let db_pool = DbPool::new(&settings.database)
        .await
        .context("Failed to initialize database pool")?;

    if settings.database.run_migrations {
        db_pool
            .migrate()
            .await
            .context("Failed to run database migrations")?;
    }

    info!("Database pool initialized");
    Ok(db_pool)
}

/// Initialize the store the numbering operations run against
///
/// Falls back to an in-memory store when no database URL is configured.
/// The pool is returned as well so callers can health-check and close it.
#[tracing::instrument(skip(settings))]
pub async fn init_store(settings: &Settings) -> Result<(Arc<dyn JuryStore>, Option<DbPool>)> {
    if settings.database.is_in_memory() {
        warn!("No database URL configured, using in-memory store");
        let store = Arc::new(InMemoryStore::default()) as Arc<dyn JuryStore>;
        return Ok((store, None));
    }

    let db_pool = init_database_pool(settings).await?;
    let store = Arc::new(PgJuryStore::new(db_pool.clone())) as Arc<dyn JuryStore>;
    Ok((store, Some(db_pool)))
}
