use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Query execution error: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Retry limit exceeded after {attempts} attempts: {last_error}")]
    RetryLimitExceeded { attempts: u8, last_error: String },
}

impl DatabaseError {
    /// Check if this error is transient and the ledger read may be retried
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::QueryError(e) => {
                if let Some(db_error) = e.as_database_error() {
                    matches!(db_error.code().as_deref(),
                        Some("40001") | // serialization_failure
                        Some("40P01")   // deadlock_detected
                    )
                } else {
                    matches!(e, sqlx::Error::PoolTimedOut | sqlx::Error::Io(_))
                }
            }
            Self::ConnectionError(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
