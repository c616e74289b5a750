use crate::error::{AppError, AppResult};
use crate::middleware::auth::parse_user_id;
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::services::feed::{FeedItem, FeedService};
use crate::services::user::{UserProfile, UserService};
use axum::{extract::Path, response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;

#[utoipa::path(
    get,
    path = "/api/v1/users/{username}",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "Public reporter profile", body = UserProfile),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "users"
)]
pub async fn get_user_profile(
    Extension(db): Extension<DatabaseConnection>,
    Path(username): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = UserService::new(db);
    let profile = service.get_profile(&username).await?;
    Ok(ApiResponse::ok(profile))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{username}/reports",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "Reports the user filed under their own name", body = Vec<FeedItem>),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "users"
)]
pub async fn list_user_reports(
    Extension(db): Extension<DatabaseConnection>,
    Path(username): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = UserService::new(db.clone());
    let user = service.get_by_username(&username).await?;

    // Anonymous reports never show up on someone else's profile.
    let feed = FeedService::new(db);
    let items = feed.by_author(user.id, false).await?;
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    get,
    path = "/api/v1/me/reports",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "All of the caller's reports, anonymous ones included", body = Vec<FeedItem>),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "users"
)]
pub async fn my_reports(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&auth_user)?;

    let feed = FeedService::new(db);
    let items = feed.by_author(user_id, true).await?;
    Ok(ApiResponse::ok(items))
}
