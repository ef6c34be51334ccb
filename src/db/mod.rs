use sqlx::postgres::{PgPool, PgPoolOptions};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::Config;

pub mod models;
pub mod queries;

const MAX_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(50);

pub async fn create_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
}

/// Retries an operation on transient store failures (connection loss, pool
/// exhaustion) with exponential backoff. Anything else passes straight through.
pub async fn with_retries<T, F, Fut>(mut op: F) -> Result<T, sqlx::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(e) if attempt + 1 < MAX_ATTEMPTS && is_transient(&e) => {
                attempt += 1;
                tracing::warn!("transient database error (attempt {}): {}", attempt, e);
                sleep(RETRY_BASE_DELAY * (1u32 << attempt)).await;
            }
            other => return other,
        }
    }
}

fn is_transient(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut)
}
