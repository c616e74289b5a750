use crate::error::{AppError, AppResult};
use crate::middleware::auth::parse_user_id;
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::services::upload::{UploadConfig, UploadService};
use crate::services::user::UserService;
use axum::{extract::Multipart, response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub url: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/upload/photo",
    security(("jwt_token" = [])),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Photo uploaded", body = UploadResponse),
        (status = 400, description = "Invalid file", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 413, description = "File too large", body = AppError),
    ),
    tag = "uploads"
)]
pub async fn upload_photo(
    Extension(config): Extension<UploadConfig>,
    auth_user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&auth_user)?;

    let (content_type, data) = read_single_file(&mut multipart).await?;
    let url = UploadService::save_photo(&config, user_id, &data, &content_type, "reports").await?;

    Ok(ApiResponse::ok(UploadResponse { url }))
}

#[utoipa::path(
    post,
    path = "/api/v1/upload/avatar",
    security(("jwt_token" = [])),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Avatar uploaded and profile updated", body = UploadResponse),
        (status = 400, description = "Invalid file", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 413, description = "File too large", body = AppError),
    ),
    tag = "uploads"
)]
pub async fn upload_avatar(
    Extension(db): Extension<DatabaseConnection>,
    Extension(config): Extension<UploadConfig>,
    auth_user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&auth_user)?;

    let (content_type, data) = read_single_file(&mut multipart).await?;
    let url = UploadService::save_photo(&config, user_id, &data, &content_type, "avatars").await?;

    let service = UserService::new(db);
    service.update_avatar_url(user_id, &url).await?;

    Ok(ApiResponse::ok(UploadResponse { url }))
}

async fn read_single_file(multipart: &mut Multipart) -> AppResult<(String, axum::body::Bytes)> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?
        .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read file data: {}", e)))?;

    Ok((content_type, data))
}
