use std::sync::Arc;
use tracing::info;

use super::ledger::LedgerReader;
use super::paginate::{paginate, PageArgs, PageLimits, PageRequest};
use super::rank::rank;
use super::window::Clock;
use super::RankingError;
use crate::models::{Connection, RankedUser, RankingFilter};

/// Computes leaderboards from the ledgers on every call; nothing is cached
pub struct RankingEngine {
    ledger: Arc<dyn LedgerReader>,
    clock: Arc<dyn Clock>,
    limits: PageLimits,
}

impl RankingEngine {
    pub fn new(ledger: Arc<dyn LedgerReader>, clock: Arc<dyn Clock>, limits: PageLimits) -> Self {
        Self {
            ledger,
            clock,
            limits,
        }
    }

    /// Aggregate, rank and paginate in one pass.
    ///
    /// Pagination arguments are validated first; a ledger failure aborts the
    /// whole call with no partial page.
    #[tracing::instrument(
        skip(self, args),
        fields(
            metric = ?filter.by,
            order = ?filter.order,
            period = ?filter.period
        )
    )]
    pub async fn ranking(
        &self,
        filter: RankingFilter,
        args: PageArgs,
    ) -> Result<Connection<RankedUser>, RankingError> {
        let request = PageRequest::parse(args, filter.order, &self.limits)?;
        let window = self.clock.window(filter.period);

        let scored = filter
            .by
            .aggregator()
            .aggregate(self.ledger.as_ref(), &window)
            .await?;
        let ranked = rank(scored, filter.order);
        let connection = paginate(&ranked, &request);

        info!(
            window_start = %window.start,
            total_count = connection.total_count,
            page_len = connection.edges.len(),
            "Ranking computed"
        );

        Ok(connection)
    }
}
