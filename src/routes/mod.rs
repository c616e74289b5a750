use crate::config::rate_limit::{RateLimitConfig, RateLimitRule};
use crate::handlers;
use crate::middleware::auth::auth_middleware;
use axum::extract::DefaultBodyLimit;
use axum::{middleware, routing, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

// Axum's default body limit is 2 MB; uploads need headroom so the
// service's own 5 MB file cap is what callers actually hit.
const MAX_UPLOAD_BODY: usize = 10 * 1024 * 1024;

pub fn create_routes() -> Router {
    Router::new().nest("/api/v1", api_routes())
}

fn api_routes() -> Router {
    let rate_limit_config = RateLimitConfig::from_env();

    let auth = auth_routes(&rate_limit_config);
    let public_read = public_read_routes(&rate_limit_config);
    let protected =
        protected_routes(&rate_limit_config).layer(middleware::from_fn(auth_middleware));

    auth.merge(public_read).merge(protected)
}

/// Auth routes: register, login, refresh, verify-email.
fn auth_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/auth/register", routing::post(handlers::register))
        .route("/auth/login", routing::post(handlers::login))
        .route(
            "/auth/refresh",
            routing::post(handlers::auth::refresh_token),
        )
        .route("/auth/verify-email", routing::post(handlers::verify_email));

    with_optional_rate_limit(router, config.enabled, config.auth)
}

/// Public read routes: the feed, the map, profiles, leaderboard.
fn public_read_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        // Feed
        .route("/reports", routing::get(handlers::report::list_reports))
        .route("/reports/{id}", routing::get(handlers::report::get_report))
        // Map
        .route("/map/points", routing::get(handlers::report::map_points))
        // Comments
        .route(
            "/reports/{id}/comments",
            routing::get(handlers::comment::list_comments),
        )
        // Categories
        .route(
            "/categories",
            routing::get(handlers::category::list_categories),
        )
        // Leaderboard
        .route(
            "/leaderboard",
            routing::get(handlers::leaderboard::leaderboard),
        )
        // Users
        .route(
            "/users/{username}",
            routing::get(handlers::user::get_user_profile),
        )
        .route(
            "/users/{username}/reports",
            routing::get(handlers::user::list_user_reports),
        );

    with_optional_rate_limit(router, config.enabled, config.public_read)
}

/// Protected routes: all authenticated writes plus the caller's own data.
fn protected_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        // Auth
        .route("/auth/me", routing::get(handlers::get_current_user))
        .route("/auth/logout", routing::post(handlers::auth::logout))
        .route(
            "/auth/resend-verification",
            routing::post(handlers::resend_verification),
        )
        // Reports
        .route("/reports", routing::post(handlers::report::create_report))
        .route(
            "/reports/{id}",
            routing::delete(handlers::report::delete_report),
        )
        // Upvotes
        .route(
            "/reports/{id}/upvote",
            routing::post(handlers::upvote::toggle_upvote),
        )
        .route("/me/upvotes", routing::get(handlers::upvote::my_upvotes))
        .route("/me/reports", routing::get(handlers::user::my_reports))
        // Comments
        .route(
            "/reports/{id}/comments",
            routing::post(handlers::comment::create_comment),
        )
        // Categories (admin only - checked in handler)
        .route(
            "/categories",
            routing::post(handlers::category::create_category),
        )
        // Upload
        .merge(upload_routes())
        // Authority dashboard (role checked in handler)
        .route(
            "/dashboard/stats",
            routing::get(handlers::dashboard::get_stats),
        )
        .route(
            "/dashboard/reports",
            routing::get(handlers::dashboard::list_dashboard_reports),
        )
        .route(
            "/dashboard/reports/{id}/status",
            routing::put(handlers::dashboard::update_report_status),
        )
        .route(
            "/dashboard/users/{id}/grant-authority",
            routing::post(handlers::dashboard::grant_authority),
        );

    with_optional_rate_limit(router, config.enabled, config.protected)
}

fn upload_routes() -> Router {
    Router::new()
        .route(
            "/upload/photo",
            routing::post(handlers::upload::upload_photo),
        )
        .route(
            "/upload/avatar",
            routing::post(handlers::upload::upload_avatar),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY))
}

fn with_optional_rate_limit(router: Router, enabled: bool, rule: RateLimitRule) -> Router {
    if !enabled {
        return router;
    }

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(rule.per_second)
        .burst_size(rule.burst_size)
        .finish()
        .expect("Invalid rate limit configuration");

    router.layer(GovernorLayer::new(governor_conf))
}
