//! Database migration command.
//!
//! Applies `crates/storefront/migrations/` and then creates the session
//! table used by `tower-sessions`. Both steps are idempotent.

use tower_sessions_sqlx_store::PostgresStore;

use super::{CommandError, database_url};

/// Run all storefront migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to storefront database...");
    let pool = suds_storefront::db::create_pool(&database_url).await?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Creating session store table...");
    PostgresStore::new(pool)
        .migrate()
        .await
        .map_err(|e| CommandError::SessionStore(e.to_string()))?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
