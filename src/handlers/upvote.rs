use crate::error::AppResult;
use crate::middleware::auth::parse_user_id;
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::services::cache::CacheService;
use crate::services::points::{PointsService, POINTS_UPVOTE_RECEIVED};
use crate::services::upvote::UpvoteService;
use axum::{extract::Path, response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct UpvoteResponse {
    pub report_id: i32,
    /// true after adding, false after removing
    pub upvoted: bool,
    pub upvote_count: i32,
}

#[utoipa::path(
    post,
    path = "/api/v1/reports/{id}/upvote",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Upvote toggled", body = UpvoteResponse),
        (status = 401, description = "Unauthorized", body = crate::error::AppError),
        (status = 404, description = "Report not found", body = crate::error::AppError),
    ),
    tag = "upvotes"
)]
pub async fn toggle_upvote(
    Extension(db): Extension<DatabaseConnection>,
    cache: Option<Extension<CacheService>>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&auth_user)?;

    let service = UpvoteService::new(db.clone());
    let change = service.toggle(user_id, id).await?;

    // Author gains or loses a point with the toggle; self-upvotes earn
    // none, and a toggle that lost a race moved nothing.
    if change.changed {
        let delta = if change.upvoted {
            POINTS_UPVOTE_RECEIVED
        } else {
            -POINTS_UPVOTE_RECEIVED
        };
        let points = match cache {
            Some(Extension(cache)) => PointsService::new(db).with_cache(cache),
            None => PointsService::new(db),
        };
        if let Err(e) = points
            .apply_upvote_points(user_id, change.author_user_id, id, delta)
            .await
        {
            tracing::warn!("Failed to apply upvote points: {e}");
        }
    }

    Ok(ApiResponse::ok(UpvoteResponse {
        report_id: id,
        upvoted: change.upvoted,
        upvote_count: change.upvote_count,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/me/upvotes",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Report ids the caller has upvoted", body = Vec<i32>),
        (status = 401, description = "Unauthorized", body = crate::error::AppError),
    ),
    tag = "upvotes"
)]
pub async fn my_upvotes(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&auth_user)?;

    let service = UpvoteService::new(db);
    let ids = service.upvoted_report_ids(user_id).await?;

    Ok(ApiResponse::ok(ids))
}
