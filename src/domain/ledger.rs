use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::aggregate::{count_distinct_solved, sum_points};
use super::window::Window;
use crate::db::DatabaseError;
use crate::models::{PointGrant, Submission, UserId};

/// Read capabilities the ranking engine needs from the event ledgers.
///
/// Both maps only contain users with at least one qualifying event in the
/// window.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Signed sum of points granted per user inside the window
    async fn sum_points_by_user(
        &self,
        window: &Window,
    ) -> Result<HashMap<UserId, i64>, DatabaseError>;

    /// Number of distinct questions with a successful submission per user
    async fn count_distinct_solved_by_user(
        &self,
        window: &Window,
    ) -> Result<HashMap<UserId, i64>, DatabaseError>;
}

/// In-process ledger holding raw records
#[derive(Debug, Default)]
pub struct MemoryLedger {
    grants: RwLock<Vec<PointGrant>>,
    submissions: RwLock<Vec<Submission>>,
}

impl MemoryLedger {
    pub fn with_records(grants: Vec<PointGrant>, submissions: Vec<Submission>) -> Self {
        Self {
            grants: RwLock::new(grants),
            submissions: RwLock::new(submissions),
        }
    }

    pub async fn append_grant(&self, grant: PointGrant) {
        self.grants.write().await.push(grant);
    }
}

#[async_trait]
impl LedgerReader for MemoryLedger {
    async fn sum_points_by_user(
        &self,
        window: &Window,
    ) -> Result<HashMap<UserId, i64>, DatabaseError> {
        Ok(sum_points(&self.grants.read().await, window))
    }

    async fn count_distinct_solved_by_user(
        &self,
        window: &Window,
    ) -> Result<HashMap<UserId, i64>, DatabaseError> {
        Ok(count_distinct_solved(&self.submissions.read().await, window))
    }
}
