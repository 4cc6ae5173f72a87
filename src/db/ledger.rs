use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::debug;

use crate::db::connection::with_retry;
use crate::db::errors::{DatabaseError, Result};
use crate::domain::{LedgerReader, Window};
use crate::models::{SubmissionStatus, UserId};

/// Ledger reader over the `point_grants` and `submissions` tables
#[derive(Debug, Clone)]
pub struct PgLedger {
    pool: PgPool,
    max_retries: u8,
}

impl PgLedger {
    pub fn new(pool: PgPool, max_retries: u8) -> Self {
        Self { pool, max_retries }
    }
}

#[async_trait]
impl LedgerReader for PgLedger {
    #[tracing::instrument(skip(self), fields(start = %window.start, end = %window.end))]
    async fn sum_points_by_user(&self, window: &Window) -> Result<HashMap<UserId, i64>> {
        let pool = &self.pool;
        let rows = with_retry(self.max_retries, || async move {
            sqlx::query_as::<_, (UserId, i64)>(
                r#"
                SELECT
                    user_id,
                    SUM(points)::BIGINT AS score
                FROM point_grants
                WHERE granted_at >= $1
                    AND granted_at < $2
                GROUP BY user_id
                "#,
            )
            .bind(window.start)
            .bind(window.end)
            .fetch_all(pool)
            .await
            .map_err(DatabaseError::QueryError)
        })
        .await?;

        debug!("Loaded point totals for {} users", rows.len());
        Ok(rows.into_iter().collect())
    }

    #[tracing::instrument(skip(self), fields(start = %window.start, end = %window.end))]
    async fn count_distinct_solved_by_user(&self, window: &Window) -> Result<HashMap<UserId, i64>> {
        let pool = &self.pool;
        let rows = with_retry(self.max_retries, || async move {
            sqlx::query_as::<_, (UserId, i64)>(
                r#"
                SELECT
                    user_id,
                    COUNT(DISTINCT question_id) AS score
                FROM submissions
                WHERE status = $1
                    AND submitted_at >= $2
                    AND submitted_at < $3
                GROUP BY user_id
                "#,
            )
            .bind(SubmissionStatus::Success.as_str())
            .bind(window.start)
            .bind(window.end)
            .fetch_all(pool)
            .await
            .map_err(DatabaseError::QueryError)
        })
        .await?;

        debug!("Loaded solved counts for {} users", rows.len());
        Ok(rows.into_iter().collect())
    }
}
