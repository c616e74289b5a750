use crate::error::{AppError, AppResult};
use crate::middleware::auth::{require_admin, require_authority};
use crate::middleware::AuthUser;
use crate::response::{ApiResponse, PaginatedResponse};
use crate::services::cache::CacheService;
use crate::services::dashboard::{DashboardService, DashboardStats};
use crate::services::email::EmailService;
use crate::services::feed::{FeedItem, FeedService};
use crate::services::points::{PointsService, POINTS_REPORT_CLEANED};
use crate::services::report::{ReportService, STATUS_CLEANED};
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use utoipa::ToSchema;

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/stats",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Aggregate counts for the authority dashboard", body = DashboardStats),
        (status = 403, description = "Authority only", body = AppError),
    ),
    tag = "dashboard"
)]
pub async fn get_stats(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    require_authority(&db, &auth_user).await?;

    let service = DashboardService::new(db);
    let stats = service.get_stats().await?;
    Ok(ApiResponse::ok(stats))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DashboardFeedQuery {
    pub category: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/reports",
    security(("jwt_token" = [])),
    params(
        ("category" = Option<String>, Query, description = "Category name or 'all'"),
        ("status" = Option<String>, Query, description = "reported / in_progress / cleaned / all"),
        ("sort" = Option<String>, Query, description = "recent / upvotes / cleaned"),
        ("page" = Option<u64>, Query, description = "Page number (1-based)"),
        ("per_page" = Option<u64>, Query, description = "Items per page (max 100)"),
    ),
    responses(
        (status = 200, description = "Work queue for authorities", body = PaginatedResponse<FeedItem>),
        (status = 403, description = "Authority only", body = AppError),
    ),
    tag = "dashboard"
)]
pub async fn list_dashboard_reports(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(query): Query<DashboardFeedQuery>,
) -> AppResult<impl IntoResponse> {
    require_authority(&db, &auth_user).await?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let category = query.category.as_deref().unwrap_or("all");
    let status = query.status.as_deref().unwrap_or("all");
    let sort = query.sort.as_deref().unwrap_or("recent");

    let service = FeedService::new(db);
    let (items, total) = service.feed(category, status, sort, page, per_page).await?;

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// New status: in_progress or cleaned
    pub status: String,
    /// Optional photo of the cleaned site
    pub after_photo_url: Option<String>,
}

#[utoipa::path(
    put,
    path = "/api/v1/dashboard/reports/{id}/status",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Report ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = FeedItem),
        (status = 403, description = "Authority only", body = AppError),
        (status = 404, description = "Report not found", body = AppError),
        (status = 409, description = "Transition not allowed", body = AppError),
    ),
    tag = "dashboard"
)]
pub async fn update_report_status(
    Extension(db): Extension<DatabaseConnection>,
    Extension(email_service): Extension<EmailService>,
    cache: Option<Extension<CacheService>>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let authority_id = require_authority(&db, &auth_user).await?;

    let service = ReportService::new(db.clone());
    let report = service
        .update_status(id, &payload.status, payload.after_photo_url)
        .await?;

    if report.status == STATUS_CLEANED {
        // Cleanup bonus goes to the original reporter.
        let points = match cache {
            Some(Extension(cache)) => PointsService::new(db.clone()).with_cache(cache),
            None => PointsService::new(db.clone()),
        };
        if let Err(e) = points
            .grant(
                report.user_id,
                POINTS_REPORT_CLEANED,
                "report_cleaned",
                "report",
                report.id,
                authority_id,
            )
            .await
        {
            tracing::warn!("Failed to grant cleanup points: {e}");
        }
    }

    // Non-fatal: the reporter gets a heads-up when we know their address.
    let auth_service = crate::services::auth::AuthService::new(db.clone());
    if let Ok(author) = auth_service.get_user_by_id(report.user_id).await {
        if let Err(e) = email_service
            .send_status_update_email(&author.email, report.id, &report.status)
            .await
        {
            tracing::warn!("Failed to send status update email: {e}");
        }
    }

    let feed = FeedService::new(db);
    let item = feed.get(report.id).await?;
    Ok(ApiResponse::ok(item))
}

#[utoipa::path(
    post,
    path = "/api/v1/dashboard/users/{id}/grant-authority",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User promoted to authority", body = crate::handlers::auth::UserResponse),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "dashboard"
)]
pub async fn grant_authority(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    let service = DashboardService::new(db);
    let user = service.grant_authority(id).await?;
    Ok(ApiResponse::ok(crate::handlers::auth::UserResponse::from(
        user,
    )))
}
