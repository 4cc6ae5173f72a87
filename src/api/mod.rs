pub mod error;
pub mod handlers;
pub mod server;

use std::sync::Arc;

use crate::auth::JwtVerifier;
use crate::domain::RankingEngine;

/// Shared router state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RankingEngine>,
    pub jwt: Arc<JwtVerifier>,
}

impl AppState {
    pub fn new(engine: RankingEngine, jwt: JwtVerifier) -> Self {
        Self {
            engine: Arc::new(engine),
            jwt: Arc::new(jwt),
        }
    }
}
