// Domain layer - the ranking pipeline with no HTTP concerns:
// window -> aggregate -> rank -> paginate

pub mod aggregate;
pub mod cursor;
pub mod engine;
pub mod ledger;
pub mod paginate;
pub mod rank;
pub mod window;

use crate::db::DatabaseError;

// Domain error type - no HTTP concerns
#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Ledger read failed: {0}")]
    Upstream(#[from] DatabaseError),
}

pub use aggregate::{Aggregator, CompletedQuestionsAggregator, PointsAggregator};
pub use cursor::{decode_cursor, encode_cursor};
pub use engine::RankingEngine;
pub use ledger::{LedgerReader, MemoryLedger};
pub use paginate::{paginate, PageArgs, PageLimits, PageRequest};
pub use rank::rank;
pub use window::{Clock, FixedClock, SystemClock, Window, Zone};
