use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use super::error::{Error, HttpError, QueryError};
use crate::constants::{DB_POOL_MAX_CONNECTIONS, DB_WAIT_MAX_ATTEMPTS, DB_WAIT_RETRY_SECONDS};

pub async fn create_pool(url: &str) -> Result<Pool<Postgres>, Error> {
    let pool = PgPoolOptions::new()
        .max_connections(DB_POOL_MAX_CONNECTIONS)
        .connect(url)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(pool)
}

/// Polls the database until it accepts connections. Containerized Postgres
/// accepts TCP connections before it is ready to serve queries, so a plain
/// connect is not enough; a trivial query has to succeed.
pub async fn wait_for_database(url: &str) -> Result<Pool<Postgres>, Error> {
    log::info!("Waiting for database...");

    for _ in 0..DB_WAIT_MAX_ATTEMPTS {
        match try_connect(url).await {
            Ok(pool) => {
                log::info!("Database available");
                return Ok(pool);
            }
            Err(_) => {
                log::warn!(
                    "Database unavailable, waiting {} sec...",
                    DB_WAIT_RETRY_SECONDS
                );
                tokio::time::sleep(Duration::from_secs(DB_WAIT_RETRY_SECONDS)).await;
            }
        }
    }

    Err(HttpError::InternalServerError.new("Database did not become available"))
}

async fn try_connect(url: &str) -> Result<Pool<Postgres>, Error> {
    let pool = create_pool(url).await?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(pool)
}
