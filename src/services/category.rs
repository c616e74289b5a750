use crate::{
    error::{AppError, AppResult},
    models::{category, Category, CategoryModel},
    services::cache::CacheService,
    utils::sanitize_text,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

const CACHE_KEY_CATEGORIES_LIST: &str = "categories:list";
const CACHE_TTL_CATEGORIES: u64 = 300; // 5 minutes

pub struct CategoryService {
    db: DatabaseConnection,
    cache: Option<CacheService>,
}

impl CategoryService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, cache: None }
    }

    pub fn with_cache(mut self, cache: CacheService) -> Self {
        self.cache = Some(cache);
        self
    }

    pub async fn list(&self) -> AppResult<Vec<CategoryModel>> {
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get::<Vec<CategoryModel>>(CACHE_KEY_CATEGORIES_LIST).await {
                return Ok(cached);
            }
        }

        let categories = Category::find()
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await?;

        if let Some(cache) = &self.cache {
            cache
                .set(CACHE_KEY_CATEGORIES_LIST, &categories, CACHE_TTL_CATEGORIES)
                .await;
        }

        Ok(categories)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<CategoryModel> {
        Category::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(&self, name: &str) -> AppResult<CategoryModel> {
        let name = sanitize_text(name.trim());
        if name.is_empty() || name.len() > 100 {
            return Err(AppError::Validation(
                "Category name must be 1-100 characters".to_string(),
            ));
        }

        let exists = Category::find()
            .filter(category::Column::Name.eq(name.clone()))
            .count(&self.db)
            .await?;
        if exists > 0 {
            return Err(AppError::Conflict("Category already exists".to_string()));
        }

        let new_category = category::ActiveModel {
            name: sea_orm::ActiveValue::Set(name),
            created_at: sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        };

        let created = new_category.insert(&self.db).await?;
        self.invalidate_list_cache().await;
        Ok(created)
    }

    async fn invalidate_list_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate(CACHE_KEY_CATEGORIES_LIST).await;
        }
    }
}
