use crate::error::{AppError, AppResult};
use sea_orm::{DatabaseConnection, FromQueryResult, Statement};
use serde::Serialize;
use utoipa::ToSchema;

pub const PLACEHOLDER_AVATAR: &str = "/placeholder-user.jpg";
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// One joined row straight from the database: report columns plus the
/// author and category names the feed needs.
#[derive(Debug, Clone, FromQueryResult)]
pub struct FeedRow {
    pub id: i32,
    pub user_id: i32,
    pub is_anonymous: bool,
    pub author_username: String,
    pub author_avatar_url: Option<String>,
    pub category_name: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photo_url: String,
    pub after_photo_url: Option<String>,
    pub description: String,
    pub tags: serde_json::Value,
    pub upvote_count: i32,
    pub comment_count: i64,
    pub status: String,
    pub created_at: chrono::NaiveDateTime,
}

/// Author block as shown to clients. Anonymous reports carry the
/// placeholder identity and no user id.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeedAuthor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub username: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeedItem {
    pub id: i32,
    pub author: FeedAuthor,
    pub category: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub photo_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_photo_url: Option<String>,
    pub description: String,
    pub tags: Vec<String>,
    pub upvote_count: i32,
    pub comment_count: i64,
    pub status: String,
    pub created_at: chrono::NaiveDateTime,
}

/// Turn a raw joined row into the client-facing shape.
///
/// For anonymous reports the author id is withheld entirely; the stored
/// identity never leaves the server.
pub fn normalize(row: FeedRow) -> FeedItem {
    let author = if row.is_anonymous {
        FeedAuthor {
            id: None,
            username: ANONYMOUS_NAME.to_string(),
            avatar_url: PLACEHOLDER_AVATAR.to_string(),
        }
    } else {
        FeedAuthor {
            id: Some(row.user_id),
            username: row.author_username,
            avatar_url: row
                .author_avatar_url
                .unwrap_or_else(|| PLACEHOLDER_AVATAR.to_string()),
        }
    };

    let tags = match row.tags {
        serde_json::Value::Array(values) => values
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };

    FeedItem {
        id: row.id,
        author,
        category: row.category_name,
        location: row.location,
        latitude: row.latitude,
        longitude: row.longitude,
        photo_url: row.photo_url,
        after_photo_url: row.after_photo_url,
        description: row.description,
        tags,
        upvote_count: row.upvote_count,
        comment_count: row.comment_count,
        status: row.status,
        created_at: row.created_at,
    }
}

/// "all" (or empty) means no filtering on that axis.
fn matches_filter(value: &str, filter: &str) -> bool {
    filter.is_empty() || filter == "all" || value == filter
}

pub fn apply_filters(items: Vec<FeedItem>, category: &str, status: &str) -> Vec<FeedItem> {
    items
        .into_iter()
        .filter(|item| {
            matches_filter(&item.category, category) && matches_filter(&item.status, status)
        })
        .collect()
}

/// Reorder the feed in place. Input arrives newest-first; every sort is
/// stable so rows that compare equal keep that order.
pub fn sort_items(items: &mut [FeedItem], sort: &str) {
    match sort {
        "upvotes" => {
            items.sort_by(|a, b| b.upvote_count.cmp(&a.upvote_count));
        }
        "cleaned" => {
            // Cleaned reports first, each half ranked by upvotes.
            items.sort_by(|a, b| {
                let a_cleaned = a.status == "cleaned";
                let b_cleaned = b.status == "cleaned";
                b_cleaned
                    .cmp(&a_cleaned)
                    .then_with(|| b.upvote_count.cmp(&a.upvote_count))
            });
        }
        _ => {
            // "recent" (default)
            items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
    }
}

pub fn paginate(items: Vec<FeedItem>, page: u64, per_page: u64) -> Vec<FeedItem> {
    // page and per_page come straight from the query string; the product
    // must not overflow for absurd page numbers.
    let start = page.saturating_sub(1).saturating_mul(per_page);
    let start = usize::try_from(start).unwrap_or(usize::MAX);
    items.into_iter().skip(start).take(per_page as usize).collect()
}

const FEED_SELECT: &str = "SELECT r.id, r.user_id, r.is_anonymous, \
        u.username AS author_username, u.avatar_url AS author_avatar_url, \
        c.name AS category_name, \
        r.location, r.latitude, r.longitude, r.photo_url, r.after_photo_url, \
        r.description, r.tags, r.upvote_count, \
        (SELECT COUNT(*) FROM comments cm WHERE cm.report_id = r.id) AS comment_count, \
        r.status, r.created_at \
        FROM reports r \
        JOIN users u ON u.id = r.user_id \
        JOIN categories c ON c.id = r.category_id";

pub struct FeedService {
    db: DatabaseConnection,
}

impl FeedService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All reports joined with author and category, newest first.
    pub async fn fetch_all(&self) -> AppResult<Vec<FeedItem>> {
        let sql = format!("{FEED_SELECT} ORDER BY r.created_at DESC");
        let rows = FeedRow::find_by_statement(Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            sql,
        ))
        .all(&self.db)
        .await?;

        Ok(rows.into_iter().map(normalize).collect())
    }

    /// Filtered, sorted, paginated feed. Returns the page plus the total
    /// count after filtering.
    pub async fn feed(
        &self,
        category: &str,
        status: &str,
        sort: &str,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<FeedItem>, u64)> {
        let items = self.fetch_all().await?;
        let mut filtered = apply_filters(items, category, status);
        sort_items(&mut filtered, sort);
        let total = filtered.len() as u64;
        Ok((paginate(filtered, page, per_page), total))
    }

    pub async fn get(&self, report_id: i32) -> AppResult<FeedItem> {
        let sql = format!("{FEED_SELECT} WHERE r.id = $1");
        let row = FeedRow::find_by_statement(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            &sql,
            vec![report_id.into()],
        ))
        .one(&self.db)
        .await?
        .ok_or(AppError::NotFound)?;

        Ok(normalize(row))
    }

    /// Reports by one author, newest first. Anonymous reports are included
    /// only when the author is looking at their own page.
    pub async fn by_author(&self, author_id: i32, include_anonymous: bool) -> AppResult<Vec<FeedItem>> {
        let sql = if include_anonymous {
            format!("{FEED_SELECT} WHERE r.user_id = $1 ORDER BY r.created_at DESC")
        } else {
            format!(
                "{FEED_SELECT} WHERE r.user_id = $1 AND r.is_anonymous = FALSE ORDER BY r.created_at DESC"
            )
        };
        let rows = FeedRow::find_by_statement(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            &sql,
            vec![author_id.into()],
        ))
        .all(&self.db)
        .await?;

        Ok(rows.into_iter().map(normalize).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i32, category: &str, status: &str, upvotes: i32, minute: u32) -> FeedItem {
        let created_at = chrono::NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, minute, 0)
            .unwrap();
        FeedItem {
            id,
            author: FeedAuthor {
                id: Some(1),
                username: "alice".to_string(),
                avatar_url: PLACEHOLDER_AVATAR.to_string(),
            },
            category: category.to_string(),
            location: "Main St".to_string(),
            latitude: None,
            longitude: None,
            photo_url: "/uploads/reports/a.jpg".to_string(),
            after_photo_url: None,
            description: "trash".to_string(),
            tags: vec![],
            upvote_count: upvotes,
            comment_count: 0,
            status: status.to_string(),
            created_at,
        }
    }

    fn row(is_anonymous: bool, avatar: Option<&str>) -> FeedRow {
        FeedRow {
            id: 7,
            user_id: 3,
            is_anonymous,
            author_username: "bob".to_string(),
            author_avatar_url: avatar.map(str::to_string),
            category_name: "Plastic Waste".to_string(),
            location: "Riverside".to_string(),
            latitude: Some(52.1),
            longitude: Some(4.3),
            photo_url: "/uploads/reports/b.jpg".to_string(),
            after_photo_url: None,
            description: "bottles".to_string(),
            tags: serde_json::json!(["plastic", "river"]),
            upvote_count: 2,
            comment_count: 1,
            status: "reported".to_string(),
            created_at: chrono::NaiveDate::from_ymd_opt(2025, 6, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn anonymous_report_hides_identity() {
        let normalized = normalize(row(true, Some("/avatars/bob.png")));
        assert_eq!(normalized.author.id, None);
        assert_eq!(normalized.author.username, ANONYMOUS_NAME);
        assert_eq!(normalized.author.avatar_url, PLACEHOLDER_AVATAR);
    }

    #[test]
    fn named_report_keeps_identity() {
        let normalized = normalize(row(false, Some("/avatars/bob.png")));
        assert_eq!(normalized.author.id, Some(3));
        assert_eq!(normalized.author.username, "bob");
        assert_eq!(normalized.author.avatar_url, "/avatars/bob.png");
    }

    #[test]
    fn missing_avatar_falls_back_to_placeholder() {
        let normalized = normalize(row(false, None));
        assert_eq!(normalized.author.avatar_url, PLACEHOLDER_AVATAR);
    }

    #[test]
    fn tags_json_becomes_string_list() {
        let normalized = normalize(row(false, None));
        assert_eq!(normalized.tags, vec!["plastic", "river"]);
    }

    #[test]
    fn non_array_tags_become_empty() {
        let mut r = row(false, None);
        r.tags = serde_json::json!(null);
        assert!(normalize(r).tags.is_empty());
    }

    #[test]
    fn all_sentinel_filters_nothing() {
        let items = vec![
            item(1, "Plastic Waste", "reported", 0, 0),
            item(2, "Organic Waste", "cleaned", 0, 1),
        ];
        let filtered = apply_filters(items, "all", "all");
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn category_and_status_filters_compose() {
        let items = vec![
            item(1, "Plastic Waste", "reported", 0, 0),
            item(2, "Plastic Waste", "cleaned", 0, 1),
            item(3, "Organic Waste", "cleaned", 0, 2),
        ];
        let filtered = apply_filters(items, "Plastic Waste", "cleaned");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 2);
    }

    #[test]
    fn upvote_sort_is_stable_for_ties() {
        // [10, 50, 10] must come out [50, 10, 10] with the two 10s keeping
        // their relative order.
        let mut items = vec![
            item(1, "Other", "reported", 10, 2),
            item(2, "Other", "reported", 50, 1),
            item(3, "Other", "reported", 10, 0),
        ];
        sort_items(&mut items, "upvotes");
        let ids: Vec<i32> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn cleaned_sort_partitions_before_ranking() {
        let mut items = vec![
            item(1, "Other", "reported", 99, 3),
            item(2, "Other", "cleaned", 1, 2),
            item(3, "Other", "cleaned", 5, 1),
            item(4, "Other", "in_progress", 7, 0),
        ];
        sort_items(&mut items, "cleaned");
        let ids: Vec<i32> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 2, 1, 4]);
    }

    #[test]
    fn recent_sort_is_newest_first() {
        let mut items = vec![
            item(1, "Other", "reported", 0, 0),
            item(2, "Other", "reported", 0, 5),
            item(3, "Other", "reported", 0, 3),
        ];
        sort_items(&mut items, "recent");
        let ids: Vec<i32> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn unknown_sort_falls_back_to_recent() {
        let mut items = vec![
            item(1, "Other", "reported", 0, 0),
            item(2, "Other", "reported", 0, 5),
        ];
        sort_items(&mut items, "definitely-not-a-sort");
        assert_eq!(items[0].id, 2);
    }

    #[test]
    fn paginate_clamps_to_available_items() {
        let items = vec![
            item(1, "Other", "reported", 0, 0),
            item(2, "Other", "reported", 0, 1),
            item(3, "Other", "reported", 0, 2),
        ];
        let page = paginate(items, 2, 2);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, 3);
    }

    #[test]
    fn paginate_out_of_range_is_empty() {
        let items = vec![item(1, "Other", "reported", 0, 0)];
        assert!(paginate(items, 5, 10).is_empty());
    }

    #[test]
    fn paginate_survives_huge_page_numbers() {
        let items = vec![
            item(1, "Other", "reported", 0, 0),
            item(2, "Other", "reported", 0, 1),
        ];
        assert!(paginate(items, u64::MAX, 100).is_empty());
    }
}
