use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

/// Opens the on-device SQLite store and brings its schema up to date.
///
/// The pool holds exactly one connection, so all reads and writes are
/// serialized through a single writer. This also keeps `sqlite::memory:`
/// databases alive for the lifetime of the pool.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    info!("Opening SQLite store at {database_url}");

    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid DATABASE_URL '{database_url}'"))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .context("Failed to open the record store")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate the record store")?;

    info!("Record store ready");
    Ok(pool)
}

/// `ORDER BY` clause for a whitelisted column. Ties keep insertion order.
pub fn order_by(column: &'static str, ascending: bool) -> String {
    let direction = if ascending { "ASC" } else { "DESC" };
    format!("ORDER BY {column} {direction}, created_at ASC")
}

#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    create_pool("sqlite::memory:")
        .await
        .unwrap_or_else(|e| panic!("in-memory store should open: {e:?}"))
}
