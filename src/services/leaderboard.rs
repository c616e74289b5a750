use crate::error::AppResult;
use crate::services::cache::CacheService;
use sea_orm::{DatabaseConnection, FromQueryResult, Statement};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const CACHE_TTL_LEADERBOARD: u64 = 60; // 1 minute

/// Every cached ranking lives under this prefix so point mutations can
/// drop them all at once.
pub const CACHE_PATTERN_LEADERBOARD: &str = "leaderboard:*";

fn cache_key(limit: u64) -> String {
    format!("leaderboard:top:{limit}")
}

#[derive(Debug, Clone, FromQueryResult)]
struct LeaderboardRow {
    id: i32,
    username: String,
    avatar_url: Option<String>,
    points: i32,
    report_count: i64,
    cleaned_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: i32,
    pub username: String,
    pub avatar_url: Option<String>,
    pub points: i32,
    pub report_count: i64,
    pub cleaned_count: i64,
}

pub struct LeaderboardService {
    db: DatabaseConnection,
    cache: Option<CacheService>,
}

impl LeaderboardService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, cache: None }
    }

    pub fn with_cache(mut self, cache: CacheService) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Top reporters by points. Ties share the same ordering the database
    /// returns (points desc, then account age); rank is positional.
    pub async fn top(&self, limit: u64) -> AppResult<Vec<LeaderboardEntry>> {
        let limit = limit.clamp(1, 100);

        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get::<Vec<LeaderboardEntry>>(&cache_key(limit)).await {
                return Ok(cached);
            }
        }

        let rows = LeaderboardRow::find_by_statement(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT u.id, u.username, u.avatar_url, u.points, \
                COUNT(r.id) FILTER (WHERE r.is_anonymous = FALSE) AS report_count, \
                COUNT(r.id) FILTER (WHERE r.is_anonymous = FALSE AND r.status = 'cleaned') AS cleaned_count \
                FROM users u \
                LEFT JOIN reports r ON r.user_id = u.id \
                WHERE u.role != 'banned' \
                GROUP BY u.id \
                ORDER BY u.points DESC, u.created_at ASC \
                LIMIT $1",
            vec![(limit as i64).into()],
        ))
        .all(&self.db)
        .await?;

        let entries: Vec<LeaderboardEntry> = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| LeaderboardEntry {
                rank: (i + 1) as u32,
                user_id: row.id,
                username: row.username,
                avatar_url: row.avatar_url,
                points: row.points,
                report_count: row.report_count,
                cleaned_count: row.cleaned_count,
            })
            .collect();

        if let Some(cache) = &self.cache {
            cache
                .set(&cache_key(limit), &entries, CACHE_TTL_LEADERBOARD)
                .await;
        }

        Ok(entries)
    }
}
