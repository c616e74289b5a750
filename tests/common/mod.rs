#![allow(dead_code)]

use reqwest::Client;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Once,
};

static INIT: Once = Once::new();
static MIGRATIONS_RAN: AtomicBool = AtomicBool::new(false);

fn init_env() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        std::env::set_var(
            "JWT_SECRET",
            "integration_test_secret_that_is_at_least_32_characters_long",
        );
        let config = ecosnap::config::jwt::JwtConfig::from_env().unwrap();
        let _ = ecosnap::utils::jwt::init_jwt_config(config);
    });
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.addr, path)
    }
}

pub async fn spawn_app() -> TestApp {
    init_env();

    let database_url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"));

    let db = sea_orm::Database::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    // Run migrations only once globally (using atomic bool for thread safety)
    if !MIGRATIONS_RAN.swap(true, Ordering::SeqCst) {
        ecosnap::migration::Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
    }

    // Clean data tables (reverse dependency order). Categories stay:
    // the migration seeds them and reports reference them by id.
    cleanup_tables(&db).await;

    let upload_config = ecosnap::services::upload::UploadConfig {
        upload_dir: "./test_uploads".to_string(),
    };
    let email_service = ecosnap::services::email::EmailService::from_env();

    let app = axum::Router::new()
        .route("/", axum::routing::get(|| async { "ok" }))
        .merge(ecosnap::routes::create_routes())
        .layer(axum::middleware::from_fn(
            ecosnap::middleware::security::security_headers_middleware,
        ))
        .layer(axum::extract::Extension(db.clone()))
        .layer(axum::extract::Extension(upload_config))
        .layer(axum::extract::Extension(email_service));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    let addr_str = format!("http://{}", addr);
    let client = Client::new();

    TestApp {
        addr: addr_str,
        db,
        client,
    }
}

async fn cleanup_tables(db: &DatabaseConnection) {
    let tables = [
        "refresh_tokens",
        "points_ledger",
        "upvotes",
        "comments",
        "reports",
        "users",
    ];

    for table in tables {
        let sql = format!("TRUNCATE TABLE {} CASCADE", table);
        let _ = db
            .execute(Statement::from_string(
                sea_orm::DatabaseBackend::Postgres,
                sql,
            ))
            .await;
    }
}

/// Register a user and return (user_id, token).
pub async fn create_test_user(app: &TestApp, username_prefix: &str) -> (i32, String) {
    use std::sync::atomic::{AtomicUsize, Ordering};

    static USER_COUNTER: AtomicUsize = AtomicUsize::new(0);
    let counter = USER_COUNTER.fetch_add(1, Ordering::SeqCst);
    let unique_username = format!("{}_{}", username_prefix, counter);

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "username": unique_username,
            "email": format!("{}@test.com", unique_username),
            "password": "test_password_123"
        }))
        .send()
        .await
        .expect("Failed to register user");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.unwrap_or_else(|e| {
        panic!(
            "Failed to parse register response for user '{}': status={}, error={}",
            unique_username, status, e
        );
    });

    if !body["success"].as_bool().unwrap_or(false) {
        panic!(
            "Failed to register user '{}': status={}, body={}",
            unique_username, status, body
        );
    }

    let user_id = body["data"]["user_id"].as_i64().expect(&format!(
        "Response missing user_id for user '{}': {:?}",
        unique_username, body
    )) as i32;
    let token = body["data"]["token"]
        .as_str()
        .expect(&format!(
            "Response missing token for user '{}': {:?}",
            unique_username, body
        ))
        .to_string();
    (user_id, token)
}

/// Make a user admin by directly updating the database.
pub async fn make_admin(db: &DatabaseConnection, user_id: i32) {
    db.execute(Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        "UPDATE users SET role = 'admin' WHERE id = $1",
        vec![user_id.into()],
    ))
    .await
    .expect("Failed to make user admin");
}

/// Make a user a municipal authority by directly updating the database.
pub async fn make_authority(db: &DatabaseConnection, user_id: i32) {
    db.execute(Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        "UPDATE users SET role = 'authority', is_verified_authority = TRUE WHERE id = $1",
        vec![user_id.into()],
    ))
    .await
    .expect("Failed to make user authority");
}

/// Look up a seeded category id by name.
pub async fn category_id(app: &TestApp, name: &str) -> i32 {
    let resp = app
        .client
        .get(app.url("/categories"))
        .send()
        .await
        .expect("Failed to list categories");

    let body: serde_json::Value = resp.json().await.expect("Failed to parse categories");
    body["data"]
        .as_array()
        .expect("Categories response missing data array")
        .iter()
        .find(|c| c["name"] == name)
        .and_then(|c| c["id"].as_i64())
        .unwrap_or_else(|| panic!("Category '{}' not found", name)) as i32
}

/// Create a report and return its id.
pub async fn create_test_report(
    app: &TestApp,
    token: &str,
    category_id: i32,
    description: &str,
) -> i32 {
    create_report_with(
        app,
        token,
        serde_json::json!({
            "category_id": category_id,
            "description": description,
            "location": "Riverside Park, north entrance",
            "latitude": 52.52,
            "longitude": 13.405,
            "photo_url": "/uploads/reports/test.jpg",
            "tags": ["test"],
            "is_anonymous": false
        }),
    )
    .await
}

/// Create a report from a full JSON payload and return its id.
pub async fn create_report_with(app: &TestApp, token: &str, payload: serde_json::Value) -> i32 {
    let resp = app
        .client
        .post(app.url("/reports"))
        .bearer_auth(token)
        .json(&payload)
        .send()
        .await
        .expect("Failed to create report");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("Failed to parse report response");

    if !body["success"].as_bool().unwrap_or(false) {
        panic!("Failed to create report: status={}, body={}", status, body);
    }

    body["data"]["id"].as_i64().expect("Report missing id") as i32
}

/// Current points for a user, read through /auth/me.
pub async fn user_points(app: &TestApp, token: &str) -> i64 {
    let resp = app
        .client
        .get(app.url("/auth/me"))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to get current user");

    let body: serde_json::Value = resp.json().await.expect("Failed to parse /auth/me");
    body["data"]["points"]
        .as_i64()
        .expect("Response missing points")
}
