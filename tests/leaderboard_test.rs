mod common;

use serde_json::Value;

#[tokio::test]
async fn leaderboard_orders_by_points() {
    let app = common::spawn_app().await;
    let (_busy_id, busy_token) = common::create_test_user(&app, "lb_busy").await;
    let (_quiet_id, quiet_token) = common::create_test_user(&app, "lb_quiet").await;
    let category = common::category_id(&app, "Plastic Waste").await;

    // Two reports (20 points) vs one (10 points)
    common::create_test_report(&app, &busy_token, category, "First find").await;
    common::create_test_report(&app, &busy_token, category, "Second find").await;
    common::create_test_report(&app, &quiet_token, category, "Only find").await;

    let resp = app.client.get(app.url("/leaderboard")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["rank"], 1);
    assert_eq!(entries[0]["points"], 20);
    assert_eq!(entries[0]["report_count"], 2);
    assert_eq!(entries[1]["rank"], 2);
    assert_eq!(entries[1]["points"], 10);
}

#[tokio::test]
async fn leaderboard_respects_limit() {
    let app = common::spawn_app().await;
    let category = common::category_id(&app, "Other").await;

    for i in 0..3 {
        let (_id, token) = common::create_test_user(&app, &format!("lb_limit{}", i)).await;
        common::create_test_report(&app, &token, category, "A find").await;
    }

    let resp = app
        .client
        .get(app.url("/leaderboard?limit=2"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn leaderboard_counts_exclude_anonymous_reports() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "lb_anon").await;
    let category = common::category_id(&app, "Cigarette Butts").await;

    common::create_test_report(&app, &token, category, "Public find").await;
    common::create_report_with(
        &app,
        &token,
        serde_json::json!({
            "category_id": category,
            "description": "Secret find",
            "location": "Undisclosed",
            "photo_url": "/uploads/reports/secret.jpg",
            "is_anonymous": true
        }),
    )
    .await;

    let resp = app.client.get(app.url("/leaderboard")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    // Points still include the anonymous submission, the public count does not
    assert_eq!(entries[0]["points"], 20);
    assert_eq!(entries[0]["report_count"], 1);
}
