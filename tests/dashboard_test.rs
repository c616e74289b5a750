mod common;

use serde_json::Value;

#[tokio::test]
async fn dashboard_rejects_regular_users() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "db_regular").await;

    let resp = app
        .client
        .get(app.url("/dashboard/stats"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = app
        .client
        .put(app.url("/dashboard/reports/1/status"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "status": "cleaned" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn authority_sees_stats() {
    let app = common::spawn_app().await;
    let (authority_id, authority_token) = common::create_test_user(&app, "db_authority").await;
    common::make_authority(&app.db, authority_id).await;
    let (_user_id, user_token) = common::create_test_user(&app, "db_citizen").await;
    let category = common::category_id(&app, "Plastic Waste").await;

    common::create_test_report(&app, &user_token, category, "Stats fodder").await;

    let resp = app
        .client
        .get(app.url("/dashboard/stats"))
        .bearer_auth(&authority_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total_reports"], 1);
    assert_eq!(body["data"]["reported"], 1);
    assert_eq!(body["data"]["cleaned"], 0);
    assert_eq!(body["data"]["total_users"], 2);
    assert_eq!(body["data"]["reports_today"], 1);
}

#[tokio::test]
async fn status_moves_through_the_lifecycle() {
    let app = common::spawn_app().await;
    let (authority_id, authority_token) = common::create_test_user(&app, "lc_authority").await;
    common::make_authority(&app.db, authority_id).await;
    let (_user_id, user_token) = common::create_test_user(&app, "lc_citizen").await;
    let category = common::category_id(&app, "Electronic Waste").await;

    let report_id = common::create_test_report(&app, &user_token, category, "Old TV dumped").await;

    // reported -> in_progress
    let resp = app
        .client
        .put(app.url(&format!("/dashboard/reports/{}/status", report_id)))
        .bearer_auth(&authority_token)
        .json(&serde_json::json!({ "status": "in_progress" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "in_progress");

    // in_progress -> cleaned, with an after photo
    let resp = app
        .client
        .put(app.url(&format!("/dashboard/reports/{}/status", report_id)))
        .bearer_auth(&authority_token)
        .json(&serde_json::json!({
            "status": "cleaned",
            "after_photo_url": "/uploads/reports/after.jpg"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "cleaned");
    assert_eq!(body["data"]["after_photo_url"], "/uploads/reports/after.jpg");

    // Cleanup bonus landed on the reporter: 10 for the report, 25 for the cleanup
    assert_eq!(common::user_points(&app, &user_token).await, 35);
}

#[tokio::test]
async fn cleaned_reports_cannot_move_backwards() {
    let app = common::spawn_app().await;
    let (authority_id, authority_token) = common::create_test_user(&app, "bk_authority").await;
    common::make_authority(&app.db, authority_id).await;
    let (_user_id, user_token) = common::create_test_user(&app, "bk_citizen").await;
    let category = common::category_id(&app, "Other").await;

    let report_id = common::create_test_report(&app, &user_token, category, "Quick cleanup").await;

    // reported -> cleaned directly is allowed
    let resp = app
        .client
        .put(app.url(&format!("/dashboard/reports/{}/status", report_id)))
        .bearer_auth(&authority_token)
        .json(&serde_json::json!({ "status": "cleaned" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // cleaned -> in_progress is not
    let resp = app
        .client
        .put(app.url(&format!("/dashboard/reports/{}/status", report_id)))
        .bearer_auth(&authority_token)
        .json(&serde_json::json!({ "status": "in_progress" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);

    // Neither is re-cleaning
    let resp = app
        .client
        .put(app.url(&format!("/dashboard/reports/{}/status", report_id)))
        .bearer_auth(&authority_token)
        .json(&serde_json::json!({ "status": "cleaned" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
}

#[tokio::test]
async fn unknown_status_value_rejected() {
    let app = common::spawn_app().await;
    let (authority_id, authority_token) = common::create_test_user(&app, "uk_authority").await;
    common::make_authority(&app.db, authority_id).await;
    let (_user_id, user_token) = common::create_test_user(&app, "uk_citizen").await;
    let category = common::category_id(&app, "Other").await;

    let report_id = common::create_test_report(&app, &user_token, category, "Bad status").await;

    let resp = app
        .client
        .put(app.url(&format!("/dashboard/reports/{}/status", report_id)))
        .bearer_auth(&authority_token)
        .json(&serde_json::json!({ "status": "solved" }))
        .send()
        .await
        .unwrap();
    assert!(resp.status() == 400 || resp.status() == 409);
}

#[tokio::test]
async fn update_status_on_missing_report_returns_404() {
    let app = common::spawn_app().await;
    let (authority_id, authority_token) = common::create_test_user(&app, "ms_authority").await;
    common::make_authority(&app.db, authority_id).await;

    let resp = app
        .client
        .put(app.url("/dashboard/reports/999999/status"))
        .bearer_auth(&authority_token)
        .json(&serde_json::json!({ "status": "cleaned" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn admin_can_grant_authority() {
    let app = common::spawn_app().await;
    let (admin_id, admin_token) = common::create_test_user(&app, "ga_admin").await;
    common::make_admin(&app.db, admin_id).await;
    let (user_id, user_token) = common::create_test_user(&app, "ga_user").await;

    // Regular users cannot promote
    let resp = app
        .client
        .post(app.url(&format!("/dashboard/users/{}/grant-authority", admin_id)))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = app
        .client
        .post(app.url(&format!("/dashboard/users/{}/grant-authority", user_id)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["role"], "authority");
    assert_eq!(body["data"]["is_verified_authority"], true);

    // The promoted user can now read the dashboard
    let resp = app
        .client
        .get(app.url("/dashboard/stats"))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}
