mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::util::ServiceExt;

async fn spawn_requests(app: &common::TestApp, method: &'static str, uris: Vec<String>) -> Vec<StatusCode> {
    let mut handles = Vec::new();
    for uri in uris {
        let router = app.router.clone();
        handles.push(tokio::spawn(async move {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .expect("build request");
            router.oneshot(request).await.expect("execute request").status()
        }));
    }

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.expect("join"));
    }
    statuses
}

#[tokio::test]
async fn concurrent_withdrawals_never_overdraw() {
    let app = common::setup_test_app().await.expect("setup failed");
    common::wallet_with_money(&app, "shared", 50.0).await;

    let uris = (0..10)
        .map(|_| "/wallet/shared/substract_money/10".to_string())
        .collect();
    let statuses = spawn_requests(&app, "POST", uris).await;

    let ok = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    let rejected = statuses
        .iter()
        .filter(|s| **s == StatusCode::BAD_REQUEST)
        .count();
    assert_eq!(ok, 5, "exactly the covered withdrawals succeed: {statuses:?}");
    assert_eq!(rejected, 5);

    let (_, wallet) = common::get(&app, "/wallet/shared").await;
    assert_eq!(wallet["money_balance"], 0.0);
}

#[tokio::test]
async fn concurrent_project_creation_keeps_ids_unique() {
    let app = common::setup_test_app().await.expect("setup failed");

    let mut handles = Vec::new();
    for i in 0..8 {
        let router = app.router.clone();
        handles.push(tokio::spawn(async move {
            let payload = serde_json::json!({
                "title": format!("Lamp {i}"),
                "category": "Safety",
                "cost": 10.0,
                "user_id": "u1"
            });
            let request = Request::builder()
                .method("POST")
                .uri("/add_project")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .expect("build request");
            router.oneshot(request).await.expect("execute request").status()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.expect("join"), StatusCode::CREATED);
    }

    let (_, body) = common::get(&app, "/get_projects").await;
    let mut ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["project_id"].as_i64().unwrap())
        .collect();
    ids.sort();
    assert_eq!(ids, (1..=8).collect::<Vec<i64>>());
}

#[tokio::test]
async fn concurrent_views_are_all_counted() {
    let app = common::setup_test_app().await.expect("setup failed");
    let id = common::create_project(&app, "Arena", "Sports", 10.0, "owner").await;

    let uris = (0..12)
        .map(|_| format!("/get_project/{id}?user_id=fan"))
        .collect();
    let statuses = spawn_requests(&app, "GET", uris).await;
    assert!(statuses.iter().all(|s| *s == StatusCode::OK));

    let (_, body) = common::get(&app, "/get_history/fan").await;
    assert_eq!(body["views"]["Sports"], 12);
}
