use crate::error::{AppError, AppResult};
use crate::middleware::auth::parse_user_id;
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::services::comment::{CommentService, CommentView};
use axum::{extract::Path, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCommentRequest {
    /// Comment text (1-2000 characters)
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/{id}/comments",
    params(("id" = i32, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Comments on the report, oldest first", body = Vec<CommentView>),
        (status = 404, description = "Report not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn list_comments(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = CommentService::new(db);
    let comments = service.list_by_report(id).await?;
    Ok(ApiResponse::ok(comments))
}

#[utoipa::path(
    post,
    path = "/api/v1/reports/{id}/comments",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Report ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 200, description = "Comment created", body = crate::models::CommentModel),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 404, description = "Report not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn create_comment(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<CreateCommentRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let user_id = parse_user_id(&auth_user)?;

    let service = CommentService::new(db);
    let comment = service.create(id, user_id, &payload.content).await?;

    Ok(ApiResponse::ok(comment))
}
