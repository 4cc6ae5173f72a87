use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::AppState;
use crate::auth::{allow, extract_jwt_from_header, RANKING_SCOPE};
use crate::domain::PageArgs;
use crate::models::{Connection, Direction, Metric, Period, RankedUser, RankingFilter};

/// `GET /v1/ranking` query string
#[derive(Debug, Deserialize)]
pub struct RankingQueryParams {
    pub by: Metric,
    pub order: Direction,
    pub period: Period,
    pub first: Option<i64>,
    pub after: Option<String>,
    pub last: Option<i64>,
    pub before: Option<String>,
}

impl RankingQueryParams {
    fn into_parts(self) -> (RankingFilter, PageArgs) {
        let filter = RankingFilter {
            by: self.by,
            order: self.order,
            period: self.period,
        };
        let args = PageArgs {
            first: self.first,
            after: self.after,
            last: self.last,
            before: self.before,
        };
        (filter, args)
    }
}

/// Leaderboard handler - JWT authentication and `ranking:read` scope
#[tracing::instrument(skip(state, headers, params))]
pub async fn ranking_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<RankingQueryParams>, QueryRejection>,
) -> ApiResult<Json<Connection<RankedUser>>> {
    // 1. Authentication
    let auth_header = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok());
    let token = extract_jwt_from_header(auth_header)?;
    let principal = state.jwt.verify(token)?;

    // 2. Authorization
    if !allow(RANKING_SCOPE, &principal.scopes) {
        return Err(ApiError::Forbidden(format!(
            "Missing required scope '{}'",
            RANKING_SCOPE
        )));
    }

    // 3. Input
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let (filter, args) = params.into_parts();

    info!(subject = %principal.subject, ?filter, "Processing ranking request");

    // 4. Domain
    Ok(Json(state.engine.ranking(filter, args).await?))
}
