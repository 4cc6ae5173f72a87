pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod models;

// Re-export commonly used types
pub use models::{
    Connection, Direction, Edge, Metric, PageInfo, Period, PointGrant, RankKey, RankedUser,
    RankingFilter, ScoredUser, Submission, SubmissionStatus, UserId,
};

pub use db::{create_pool, health_check, run_migrations, with_retry, DatabaseError, PgLedger};

pub use domain::{
    Clock, FixedClock, LedgerReader, MemoryLedger, PageArgs, PageLimits, RankingEngine,
    RankingError, SystemClock, Window, Zone,
};

pub use config::{ConfigError, RankingConfig, ServerConfig};
