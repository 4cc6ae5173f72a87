use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, warn};

use crate::db::errors::{DatabaseError, Result};

/// Create the ledger connection pool
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Creating database connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(3))
        .idle_timeout(Duration::from_secs(10))
        .max_lifetime(Duration::from_secs(300))
        .connect(database_url)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("Failed to create pool: {}", e)))?;

    info!("Database connection pool created successfully");
    Ok(pool)
}

/// Apply the ledger schema from ./migrations
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Ledger migrations applied");
    Ok(())
}

/// Health check for the database connection
pub async fn health_check(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(DatabaseError::QueryError)?;

    Ok(())
}

/// Execute a read with retry logic for transient errors
pub async fn with_retry<F, Fut, T>(max_retries: u8, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let max_retries = max_retries.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) if attempt < max_retries => {
                warn!(
                    attempt = attempt,
                    max_retries = max_retries,
                    error = %e,
                    "Retryable error occurred, retrying..."
                );

                // Exponential backoff with jitter
                let delay_ms = (50 * 2_u64.pow(attempt as u32 - 1))
                    .min(1000) // Cap at 1 second
                    + jitter::millis(50);

                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            Err(e) => {
                warn!(attempts = max_retries, error = %e, "Retry limit exceeded");
                return Err(DatabaseError::RetryLimitExceeded {
                    attempts: max_retries,
                    last_error: e.to_string(),
                });
            }
        }
    }
}

mod jitter {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hash, Hasher};

    /// 0..bound milliseconds, seeded from a per-call RandomState
    pub fn millis(bound: u64) -> u64 {
        let mut hasher = RandomState::new().build_hasher();
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default()
            .hash(&mut hasher);
        hasher.finish() % bound.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_retry_logic() {
        let mut call_count = 0;

        let result = with_retry(3, || {
            call_count += 1;
            let current = call_count;
            async move {
                if current < 3 {
                    Err(DatabaseError::ConnectionError("test error".to_string()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(call_count, 3);
    }

    #[tokio::test]
    async fn test_retry_limit_exceeded() {
        let mut call_count = 0;

        let result: Result<()> = with_retry(2, || {
            call_count += 1;
            let current = call_count;
            async move {
                Err(DatabaseError::ConnectionError(format!("reset on attempt {}", current)))
            }
        })
        .await;

        let err = result.unwrap_err();
        match &err {
            DatabaseError::RetryLimitExceeded { attempts, last_error } => {
                assert_eq!(*attempts, 2);
                assert!(last_error.contains("reset on attempt 2"), "{}", last_error);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("reset on attempt 2"));
    }

    #[tokio::test]
    async fn test_non_retryable_error_is_returned_immediately() {
        let mut call_count = 0;

        let result: Result<()> = with_retry(5, || {
            call_count += 1;
            async { Err(DatabaseError::QueryError(sqlx::Error::RowNotFound)) }
        })
        .await;

        assert!(matches!(
            result.unwrap_err(),
            DatabaseError::QueryError(sqlx::Error::RowNotFound)
        ));
        assert_eq!(call_count, 1);
    }
}
