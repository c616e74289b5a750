mod common;

use serde_json::Value;

#[tokio::test]
async fn create_report_appears_in_feed_and_grants_points() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app, "reporter").await;
    let category = common::category_id(&app, "Plastic Waste").await;

    let report_id = common::create_test_report(&app, &token, category, "Bottles by the bench").await;

    // +10 for submitting
    assert_eq!(common::user_points(&app, &token).await, 10);

    let resp = app
        .client
        .get(app.url("/reports"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], report_id);
    assert_eq!(items[0]["category"], "Plastic Waste");
    assert_eq!(items[0]["status"], "reported");
    assert_eq!(items[0]["upvote_count"], 0);
    assert_eq!(items[0]["comment_count"], 0);
    assert_eq!(items[0]["author"]["id"], user_id);
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn create_report_with_unknown_category_fails() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "badcat").await;

    let resp = app
        .client
        .post(app.url("/reports"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "category_id": 999999,
            "description": "Something",
            "location": "Somewhere",
            "photo_url": "/uploads/reports/x.jpg"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn create_report_rejects_too_many_tags() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "tagspam").await;
    let category = common::category_id(&app, "Other").await;

    let tags: Vec<String> = (0..11).map(|i| format!("tag{}", i)).collect();
    let resp = app
        .client
        .post(app.url("/reports"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "category_id": category,
            "description": "Tag overload",
            "location": "Anywhere",
            "photo_url": "/uploads/reports/x.jpg",
            "tags": tags
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn feed_filters_by_category_and_status() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "filterer").await;
    let plastic = common::category_id(&app, "Plastic Waste").await;
    let glass = common::category_id(&app, "Glass & Metal").await;

    common::create_test_report(&app, &token, plastic, "Plastic pile").await;
    common::create_test_report(&app, &token, glass, "Broken bottles").await;

    let resp = app
        .client
        .get(app.url("/reports?category=Plastic%20Waste"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["category"], "Plastic Waste");

    // "all" passes everything through
    let resp = app
        .client
        .get(app.url("/reports?category=all&status=all"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);

    // Nothing is cleaned yet
    let resp = app
        .client
        .get(app.url("/reports?status=cleaned"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn feed_sorts_by_upvotes() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "sorter").await;
    let (_voter_id, voter_token) = common::create_test_user(&app, "sorter_voter").await;
    let category = common::category_id(&app, "Organic Waste").await;

    let first = common::create_test_report(&app, &token, category, "First").await;
    let second = common::create_test_report(&app, &token, category, "Second").await;

    // Upvote only the first report
    let resp = app
        .client
        .post(app.url(&format!("/reports/{}/upvote", first)))
        .bearer_auth(&voter_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .get(app.url("/reports?sort=upvotes"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items[0]["id"], first);
    assert_eq!(items[1]["id"], second);

    // Default sort is newest first
    let resp = app.client.get(app.url("/reports")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items[0]["id"], second);
}

#[tokio::test]
async fn feed_pagination() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "paginator").await;
    let category = common::category_id(&app, "Other").await;

    for i in 0..5 {
        common::create_test_report(&app, &token, category, &format!("Report {}", i)).await;
    }

    let resp = app
        .client
        .get(app.url("/reports?page=2&per_page=2"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["total"], 5);
    assert_eq!(body["data"]["page"], 2);
    assert_eq!(body["data"]["total_pages"], 3);

    // Past the end
    let resp = app
        .client
        .get(app.url("/reports?page=4&per_page=2"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["data"]["total"], 5);
}

#[tokio::test]
async fn anonymous_report_hides_author_identity() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "shy_reporter").await;
    let category = common::category_id(&app, "Hazardous Waste").await;

    common::create_report_with(
        &app,
        &token,
        serde_json::json!({
            "category_id": category,
            "description": "Paint cans in the creek",
            "location": "Creek under the bridge",
            "photo_url": "/uploads/reports/paint.jpg",
            "is_anonymous": true
        }),
    )
    .await;

    let resp = app.client.get(app.url("/reports")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    let item = &body["data"]["items"][0];
    assert_eq!(item["author"]["username"], "Anonymous");
    assert_eq!(item["author"]["avatar_url"], "/placeholder-user.jpg");
    assert!(item["author"]["id"].is_null());
}

#[tokio::test]
async fn anonymous_reports_only_visible_to_their_author() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "mixed_reporter").await;
    let category = common::category_id(&app, "Cigarette Butts").await;

    common::create_test_report(&app, &token, category, "Butts at the bus stop").await;
    common::create_report_with(
        &app,
        &token,
        serde_json::json!({
            "category_id": category,
            "description": "More butts",
            "location": "Same bus stop",
            "photo_url": "/uploads/reports/butts.jpg",
            "is_anonymous": true
        }),
    )
    .await;

    let resp = app
        .client
        .get(app.url("/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let username = body["data"]["username"].as_str().unwrap().to_string();

    // Public profile page shows only the named report
    let resp = app
        .client
        .get(app.url(&format!("/users/{}/reports", username)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // The author's own view has both
    let resp = app
        .client
        .get(app.url("/me/reports"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn map_points_skip_reports_without_coordinates() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "mapper").await;
    let category = common::category_id(&app, "Construction Waste").await;

    common::create_test_report(&app, &token, category, "Rubble with coords").await;
    common::create_report_with(
        &app,
        &token,
        serde_json::json!({
            "category_id": category,
            "description": "Rubble, no coords",
            "location": "Vague alley",
            "photo_url": "/uploads/reports/rubble.jpg"
        }),
    )
    .await;

    let resp = app.client.get(app.url("/map/points")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let points = body["data"].as_array().unwrap();
    assert_eq!(points.len(), 1);
    assert!(points[0]["latitude"].as_f64().is_some());
    assert!(points[0]["longitude"].as_f64().is_some());
}

#[tokio::test]
async fn get_missing_report_returns_404() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .get(app.url("/reports/999999"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn only_author_or_admin_can_delete_report() {
    let app = common::spawn_app().await;
    let (_author_id, author_token) = common::create_test_user(&app, "del_author").await;
    let (_other_id, other_token) = common::create_test_user(&app, "del_other").await;
    let (admin_id, admin_token) = common::create_test_user(&app, "del_admin").await;
    common::make_admin(&app.db, admin_id).await;
    let category = common::category_id(&app, "Other").await;

    let first = common::create_test_report(&app, &author_token, category, "Mine").await;
    let second = common::create_test_report(&app, &author_token, category, "Also mine").await;

    // Stranger cannot delete
    let resp = app
        .client
        .delete(app.url(&format!("/reports/{}", first)))
        .bearer_auth(&other_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    // Author can
    let resp = app
        .client
        .delete(app.url(&format!("/reports/{}", first)))
        .bearer_auth(&author_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Admin can
    let resp = app
        .client
        .delete(app.url(&format!("/reports/{}", second)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app.client.get(app.url("/reports")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn deleting_a_report_takes_its_points_back() {
    let app = common::spawn_app().await;
    let (_author_id, author_token) = common::create_test_user(&app, "del_pts").await;
    let (_voter_id, voter_token) = common::create_test_user(&app, "del_pts_voter").await;
    let category = common::category_id(&app, "Other").await;

    let report_id = common::create_test_report(&app, &author_token, category, "Short-lived").await;

    // Submission bonus plus one received upvote
    app.client
        .post(app.url(&format!("/reports/{}/upvote", report_id)))
        .bearer_auth(&voter_token)
        .send()
        .await
        .unwrap();
    assert_eq!(common::user_points(&app, &author_token).await, 11);

    let resp = app
        .client
        .delete(app.url(&format!("/reports/{}", report_id)))
        .bearer_auth(&author_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Every ledger entry tied to the report is rolled back
    assert_eq!(common::user_points(&app, &author_token).await, 0);
}
