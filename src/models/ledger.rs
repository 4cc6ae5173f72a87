use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform user identifier; `user_id BIGINT` in both ledgers
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// point_grants row. Append-only, written by the points-granting service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointGrant {
    pub id: i64,
    pub user_id: UserId,
    pub points: i32, // may be negative
    pub granted_at: DateTime<Utc>,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Success,
    Failed,
}

impl SubmissionStatus {
    /// Database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

/// submissions row. Status is set once by the grading service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub user_id: UserId,
    pub question_id: i64,
    pub status: SubmissionStatus,
    pub submitted_at: DateTime<Utc>,
}
