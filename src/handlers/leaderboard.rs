use crate::error::AppResult;
use crate::response::ApiResponse;
use crate::services::cache::CacheService;
use crate::services::leaderboard::{LeaderboardEntry, LeaderboardService};
use axum::{extract::Query, response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LeaderboardQuery {
    /// How many entries to return (default 10, max 100)
    pub limit: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/leaderboard",
    params(("limit" = Option<u64>, Query, description = "Number of entries (max 100)")),
    responses(
        (status = 200, description = "Top reporters by points", body = Vec<LeaderboardEntry>),
    ),
    tag = "leaderboard"
)]
pub async fn leaderboard(
    Extension(db): Extension<DatabaseConnection>,
    cache: Option<Extension<CacheService>>,
    Query(query): Query<LeaderboardQuery>,
) -> AppResult<impl IntoResponse> {
    let limit = query.limit.unwrap_or(10);

    let service = match cache {
        Some(Extension(cache)) => LeaderboardService::new(db).with_cache(cache),
        None => LeaderboardService::new(db),
    };
    let entries = service.top(limit).await?;

    Ok(ApiResponse::ok(entries))
}
