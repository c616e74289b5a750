use crate::error::{AppError, AppResult};
use crate::middleware::auth::parse_user_id;
use crate::middleware::AuthUser;
use crate::response::{ApiResponse, PaginatedResponse};
use crate::services::cache::CacheService;
use crate::services::feed::{apply_filters, FeedItem, FeedService};
use crate::services::points::{PointsService, POINTS_REPORT_SUBMITTED};
use crate::services::report::{NewReport, ReportService};
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema)]
pub struct FeedQuery {
    /// Category name, or "all"
    pub category: Option<String>,
    /// Status filter: reported / in_progress / cleaned / all
    pub status: Option<String>,
    /// Sort order: recent (default) / upvotes / cleaned
    pub sort: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReportRequest {
    /// Category the litter belongs to
    pub category_id: i32,
    /// What was found (1-2000 characters)
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
    /// Street address or place description
    #[validate(length(min = 1, max = 255))]
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Photo URL returned by the upload endpoint
    #[validate(length(min = 1, max = 500))]
    pub photo_url: String,
    /// Free-form tags (at most 10)
    #[serde(default)]
    pub tags: Vec<String>,
    /// Hide the reporter's identity in the feed
    #[serde(default)]
    pub is_anonymous: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/reports",
    params(
        ("category" = Option<String>, Query, description = "Category name or 'all'"),
        ("status" = Option<String>, Query, description = "reported / in_progress / cleaned / all"),
        ("sort" = Option<String>, Query, description = "recent / upvotes / cleaned"),
        ("page" = Option<u64>, Query, description = "Page number (1-based)"),
        ("per_page" = Option<u64>, Query, description = "Items per page (max 100)"),
    ),
    responses(
        (status = 200, description = "Report feed", body = PaginatedResponse<FeedItem>),
    ),
    tag = "reports"
)]
pub async fn list_reports(
    Extension(db): Extension<DatabaseConnection>,
    Query(query): Query<FeedQuery>,
) -> AppResult<impl IntoResponse> {
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

#[utoipa::path(
    get,
    path = "/api/v1/reports/{id}",
    params(("id" = i32, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report detail", body = FeedItem),
        (status = 404, description = "Report not found", body = AppError),
    ),
    tag = "reports"
)]
pub async fn get_report(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = FeedService::new(db);
    let item = service.get(id).await?;
    Ok(ApiResponse::ok(item))
}

#[utoipa::path(
    post,
    path = "/api/v1/reports",
    security(("jwt_token" = [])),
    request_body = CreateReportRequest,
    responses(
        (status = 200, description = "Report created", body = FeedItem),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "reports"
)]
pub async fn create_report(
    Extension(db): Extension<DatabaseConnection>,
    cache: Option<Extension<CacheService>>,
    auth_user: AuthUser,
    Json(payload): Json<CreateReportRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    if payload.tags.len() > 10 {
        return Err(AppError::Validation("At most 10 tags allowed".to_string()));
    }

    let user_id = parse_user_id(&auth_user)?;

    let service = ReportService::new(db.clone());
    let report = service
        .create(
            user_id,
            NewReport {
                category_id: payload.category_id,
                description: payload.description,
                location: payload.location,
                latitude: payload.latitude,
                longitude: payload.longitude,
                photo_url: payload.photo_url,
                tags: payload.tags,
                is_anonymous: payload.is_anonymous,
            },
        )
        .await?;

    // Submitting a report earns points even when it is anonymous.
    let points = match cache {
        Some(Extension(cache)) => PointsService::new(db.clone()).with_cache(cache),
        None => PointsService::new(db.clone()),
    };
    if let Err(e) = points
        .grant(
            user_id,
            POINTS_REPORT_SUBMITTED,
            "report_submitted",
            "report",
            report.id,
            user_id,
        )
        .await
    {
        tracing::warn!("Failed to grant submission points: {e}");
    }

    let feed = FeedService::new(db);
    let item = feed.get(report.id).await?;

    Ok(ApiResponse::with_message(
        item,
        format!("Report submitted. +{POINTS_REPORT_SUBMITTED} points!"),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/reports/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report deleted", body = String),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Report not found", body = AppError),
    ),
    tag = "reports"
)]
pub async fn delete_report(
    Extension(db): Extension<DatabaseConnection>,
    cache: Option<Extension<CacheService>>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&auth_user)?;

    let auth_service = crate::services::auth::AuthService::new(db.clone());
    let user = auth_service.get_user_by_id(user_id).await?;
    let is_admin = user.role == "admin";

    let service = ReportService::new(db.clone());
    service.delete(id, user_id, is_admin).await?;

    let points = match cache {
        Some(Extension(cache)) => PointsService::new(db).with_cache(cache),
        None => PointsService::new(db),
    };
    if let Err(e) = points.rollback_by_ref("report", id).await {
        tracing::warn!("Failed to roll back points for deleted report {id}: {e}");
    }

    Ok(ApiResponse::ok("Report deleted"))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MapPoint {
    pub id: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub category: String,
    pub status: String,
    pub upvote_count: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MapQuery {
    pub category: Option<String>,
    pub status: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/map/points",
    params(
        ("category" = Option<String>, Query, description = "Category name or 'all'"),
        ("status" = Option<String>, Query, description = "reported / in_progress / cleaned / all"),
    ),
    responses(
        (status = 200, description = "Geotagged reports for the map", body = Vec<MapPoint>),
    ),
    tag = "reports"
)]
pub async fn map_points(
    Extension(db): Extension<DatabaseConnection>,
    Query(query): Query<MapQuery>,
) -> AppResult<impl IntoResponse> {
    let category = query.category.as_deref().unwrap_or("all");
    let status = query.status.as_deref().unwrap_or("all");

    let service = FeedService::new(db);
    let items = service.fetch_all().await?;
    let filtered = apply_filters(items, category, status);

    let points: Vec<MapPoint> = filtered
        .into_iter()
        .filter_map(|item| match (item.latitude, item.longitude) {
            (Some(latitude), Some(longitude)) => Some(MapPoint {
                id: item.id,
                latitude,
                longitude,
                category: item.category,
                status: item.status,
                upvote_count: item.upvote_count,
            }),
            _ => None,
        })
        .collect();

    Ok(ApiResponse::ok(points))
}
