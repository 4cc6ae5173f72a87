use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::ledger::LedgerReader;
use super::window::Window;
use crate::db::DatabaseError;
use crate::models::{Metric, PointGrant, ScoredUser, Submission, SubmissionStatus, UserId};

/// One scoring strategy: reduces ledger events in a window to a score per user
#[async_trait]
pub trait Aggregator: Send + Sync {
    fn metric(&self) -> Metric;

    async fn aggregate(
        &self,
        ledger: &dyn LedgerReader,
        window: &Window,
    ) -> Result<Vec<ScoredUser>, DatabaseError>;
}

/// POINTS: signed sum of grants. Presence depends on having a grant, not on
/// the sign of the total
#[derive(Debug, Clone, Copy, Default)]
pub struct PointsAggregator;

/// COMPLETED_QUESTIONS: distinct questions with a successful submission
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletedQuestionsAggregator;

static POINTS: PointsAggregator = PointsAggregator;
static COMPLETED_QUESTIONS: CompletedQuestionsAggregator = CompletedQuestionsAggregator;

impl Metric {
    pub fn aggregator(self) -> &'static dyn Aggregator {
        match self {
            Metric::Points => &POINTS,
            Metric::CompletedQuestions => &COMPLETED_QUESTIONS,
        }
    }
}

#[async_trait]
impl Aggregator for PointsAggregator {
    fn metric(&self) -> Metric {
        Metric::Points
    }

    async fn aggregate(
        &self,
        ledger: &dyn LedgerReader,
        window: &Window,
    ) -> Result<Vec<ScoredUser>, DatabaseError> {
        let totals = ledger.sum_points_by_user(window).await?;
        debug!(users = totals.len(), "Aggregated point grants");
        Ok(into_scored(totals))
    }
}

#[async_trait]
impl Aggregator for CompletedQuestionsAggregator {
    fn metric(&self) -> Metric {
        Metric::CompletedQuestions
    }

    async fn aggregate(
        &self,
        ledger: &dyn LedgerReader,
        window: &Window,
    ) -> Result<Vec<ScoredUser>, DatabaseError> {
        let solved = ledger.count_distinct_solved_by_user(window).await?;
        debug!(users = solved.len(), "Aggregated solved questions");
        Ok(into_scored(solved))
    }
}

fn into_scored(scores: HashMap<UserId, i64>) -> Vec<ScoredUser> {
    scores
        .into_iter()
        .map(|(user_id, score)| ScoredUser::new(user_id, score))
        .collect()
}

/// Sum grant points per user over grants inside the window
pub fn sum_points(grants: &[PointGrant], window: &Window) -> HashMap<UserId, i64> {
    let mut totals = HashMap::new();
    for grant in grants.iter().filter(|g| window.contains(g.granted_at)) {
        *totals.entry(grant.user_id).or_insert(0) += i64::from(grant.points);
    }
    totals
}

/// Count distinct solved questions per user over successes inside the window
pub fn count_distinct_solved(submissions: &[Submission], window: &Window) -> HashMap<UserId, i64> {
    let mut solved: HashMap<UserId, HashSet<i64>> = HashMap::new();
    for submission in submissions
        .iter()
        .filter(|s| s.status == SubmissionStatus::Success && window.contains(s.submitted_at))
    {
        solved
            .entry(submission.user_id)
            .or_default()
            .insert(submission.question_id);
    }

    solved
        .into_iter()
        .map(|(user_id, questions)| (user_id, questions.len() as i64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::MemoryLedger;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn window() -> Window {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap();
        Window {
            start,
            end: start + Duration::days(1),
        }
    }

    fn grant(user: i64, points: i32, granted_at: DateTime<Utc>) -> PointGrant {
        PointGrant {
            id: 0,
            user_id: UserId(user),
            points,
            granted_at,
            description: "test".to_string(),
        }
    }

    fn submission(user: i64, question: i64, status: SubmissionStatus, at: DateTime<Utc>) -> Submission {
        Submission {
            id: 0,
            user_id: UserId(user),
            question_id: question,
            status,
            submitted_at: at,
        }
    }

    fn sorted(mut users: Vec<ScoredUser>) -> Vec<(i64, i64)> {
        users.sort_by_key(|u| u.user_id);
        users.into_iter().map(|u| (u.user_id.0, u.score)).collect()
    }

    #[test]
    fn test_sum_points_keeps_negative_and_zero_totals() {
        let w = window();
        let noon = w.start + Duration::hours(12);
        let grants = vec![
            grant(1, 100, noon),
            grant(1, -30, noon),
            grant(2, -10, noon),
            grant(3, 20, noon),
            grant(3, -20, noon),
        ];

        let totals = sum_points(&grants, &w);
        assert_eq!(totals.len(), 3);
        assert_eq!(totals[&UserId(1)], 70);
        assert_eq!(totals[&UserId(2)], -10);
        assert_eq!(totals[&UserId(3)], 0);
    }

    #[test]
    fn test_sum_points_respects_half_open_window() {
        let w = window();
        let grants = vec![
            grant(1, 500, w.start - Duration::seconds(1)),
            grant(2, 100, w.start),
            grant(3, 100, w.end),
        ];

        let totals = sum_points(&grants, &w);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[&UserId(2)], 100);
    }

    #[test]
    fn test_count_distinct_solved() {
        let w = window();
        let t = w.start + Duration::hours(1);
        let submissions = vec![
            // three successes on the same question count once
            submission(1, 7, SubmissionStatus::Success, t),
            submission(1, 7, SubmissionStatus::Success, t),
            submission(1, 7, SubmissionStatus::Success, t),
            // failures and pending never count
            submission(2, 1, SubmissionStatus::Failed, t),
            submission(2, 2, SubmissionStatus::Pending, t),
            submission(3, 1, SubmissionStatus::Success, t),
            submission(3, 2, SubmissionStatus::Success, t),
            submission(3, 3, SubmissionStatus::Success, w.end),
        ];

        let solved = count_distinct_solved(&submissions, &w);
        assert_eq!(solved.len(), 2);
        assert_eq!(solved[&UserId(1)], 1);
        assert_eq!(solved[&UserId(3)], 2);
        assert!(!solved.contains_key(&UserId(2)));
    }

    #[tokio::test]
    async fn test_aggregators_dispatch_by_metric() {
        let w = window();
        let t = w.start + Duration::minutes(5);
        let ledger = MemoryLedger::with_records(
            vec![grant(1, 10, t), grant(2, 40, t)],
            vec![
                submission(1, 1, SubmissionStatus::Success, t),
                submission(1, 2, SubmissionStatus::Success, t),
            ],
        );

        let points = Metric::Points.aggregator();
        assert_eq!(points.metric(), Metric::Points);
        assert_eq!(
            sorted(points.aggregate(&ledger, &w).await.unwrap()),
            vec![(1, 10), (2, 40)]
        );

        let completed = Metric::CompletedQuestions.aggregator();
        assert_eq!(completed.metric(), Metric::CompletedQuestions);
        assert_eq!(
            sorted(completed.aggregate(&ledger, &w).await.unwrap()),
            vec![(1, 2)]
        );
    }
}
