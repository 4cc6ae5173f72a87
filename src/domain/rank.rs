use std::cmp::Ordering;

use crate::models::{Direction, RankKey, ScoredUser};

impl Direction {
    /// Total order over rank keys: score in this direction, then user id
    /// ascending regardless of direction
    pub fn compare(self, a: &RankKey, b: &RankKey) -> Ordering {
        let by_score = match self {
            Direction::Asc => a.score.cmp(&b.score),
            Direction::Desc => b.score.cmp(&a.score),
        };
        by_score.then_with(|| a.user_id.cmp(&b.user_id))
    }
}

/// Order aggregated users for display. User ids are unique, so no two entries
/// compare equal
pub fn rank(mut users: Vec<ScoredUser>, order: Direction) -> Vec<ScoredUser> {
    users.sort_unstable_by(|a, b| order.compare(&a.key(), &b.key()));
    users
}
