use serde::{Deserialize, Serialize};

use super::ledger::UserId;

/// Scoring metric; selects the aggregation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Metric {
    Points,
    CompletedQuestions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Period {
    Daily,
    Weekly,
}

/// The `filter` argument of a ranking query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingFilter {
    pub by: Metric,
    pub order: Direction,
    pub period: Period,
}

/// Sort key of a ranked entry. Cursors encode exactly this pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RankKey {
    pub score: i64,
    pub user_id: UserId,
}

/// Per-query aggregate for one user. Never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredUser {
    pub user_id: UserId,
    pub score: i64,
}

impl ScoredUser {
    pub fn new(user_id: UserId, score: i64) -> Self {
        Self { user_id, score }
    }

    pub fn key(&self) -> RankKey {
        RankKey {
            score: self.score,
            user_id: self.user_id,
        }
    }
}

/// Connection node returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedUser {
    pub user_id: UserId,
    pub score: i64,
}

impl From<&ScoredUser> for RankedUser {
    fn from(user: &ScoredUser) -> Self {
        Self {
            user_id: user.user_id,
            score: user.score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge<T> {
    pub node: T,
    pub cursor: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

/// Relay-style connection envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
    pub total_count: usize,
}

impl<T> Connection<T> {
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.iter().map(|edge| &edge.node)
    }
}
