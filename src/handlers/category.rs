use crate::error::{AppError, AppResult};
use crate::middleware::auth::require_admin;
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::services::cache::CacheService;
use crate::services::category::CategoryService;
use axum::{response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

fn make_category_service(db: DatabaseConnection, cache: Option<CacheService>) -> CategoryService {
    let service = CategoryService::new(db);
    match cache {
        Some(cache) => service.with_cache(cache),
        None => service,
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "All litter categories", body = Vec<crate::models::CategoryModel>),
    ),
    tag = "categories"
)]
pub async fn list_categories(
    Extension(db): Extension<DatabaseConnection>,
    cache: Option<Extension<CacheService>>,
) -> AppResult<impl IntoResponse> {
    let service = make_category_service(db, cache.map(|Extension(c)| c));
    let categories = service.list().await?;
    Ok(ApiResponse::ok(categories))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    /// Category name (1-100 characters)
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/categories",
    security(("jwt_token" = [])),
    request_body = CreateCategoryRequest,
    responses(
        (status = 200, description = "Category created", body = crate::models::CategoryModel),
        (status = 403, description = "Admin only", body = AppError),
        (status = 409, description = "Category already exists", body = AppError),
    ),
    tag = "categories"
)]
pub async fn create_category(
    Extension(db): Extension<DatabaseConnection>,
    cache: Option<Extension<CacheService>>,
    auth_user: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    require_admin(&db, &auth_user).await?;

    let service = make_category_service(db, cache.map(|Extension(c)| c));
    let category = service.create(&payload.name).await?;
    Ok(ApiResponse::ok(category))
}
