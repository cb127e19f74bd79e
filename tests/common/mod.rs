#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use civic_budget_server::{AppState, config::DatabaseLocation, database, routes::build_router};
use serde_json::{Value, json};
use tower::util::ServiceExt;

#[derive(Clone)]
pub struct TestConfig {
    pub temp_dir_path: String,
}

impl TestConfig {
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let temp_dir_path = temp_dir.path().to_string_lossy().to_string();
        std::mem::forget(temp_dir);
        Ok(Self { temp_dir_path })
    }

    pub fn data_path(&self) -> String {
        self.temp_dir_path.clone()
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub async fn setup_test_app() -> anyhow::Result<TestApp> {
    let test_config = TestConfig::new()?;

    let db = database::init_db(&DatabaseLocation::Local {
        data_path: test_config.data_path(),
    })
    .await
    .map_err(|e| anyhow::anyhow!("Failed to initialize database: {}", e))?;

    let state = AppState { db };
    let router = build_router(state.clone());

    Ok(TestApp { router, state })
}

fn parse_body_as_json_or_string(bytes: &[u8]) -> Value {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => value,
        Err(_) => Value::String(String::from_utf8(bytes.to_vec()).expect("utf8 body")),
    }
}

/// Send a request and return the status plus the body as JSON (or a JSON
/// string when the body is plain text).
pub async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    payload: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match payload {
        Some(payload) => builder
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("build request");

    let response = app
        .router
        .clone()
        .oneshot(request)
        .await
        .expect("execute request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, parse_body_as_json_or_string(&bytes))
}

pub async fn get(app: &TestApp, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

pub async fn post(app: &TestApp, uri: &str) -> (StatusCode, Value) {
    send(app, "POST", uri, None).await
}

pub async fn patch(app: &TestApp, uri: &str) -> (StatusCode, Value) {
    send(app, "PATCH", uri, None).await
}

/// Create a project through the API and return its sequential `project_id`.
pub async fn create_project(
    app: &TestApp,
    title: &str,
    category: &str,
    cost: f64,
    user_id: &str,
) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/add_project",
        Some(json!({
            "title": title,
            "photo_url": "https://example.org/photo.jpg",
            "category": category,
            "abstract": "Short pitch",
            "description": "Longer description",
            "location": "Main square",
            "coordinates": { "latitude": 52.23, "longitude": 21.01 },
            "cost": cost,
            "user_id": user_id,
            "user_name": "Resident"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create project: {body}");
    body["project_id"].as_i64().expect("project_id integer")
}

pub async fn create_user(app: &TestApp, name: &str, role: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/users",
        Some(json!({ "name": name, "role": role })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create user: {body}");
    body["id"].as_str().expect("user id string").to_string()
}

pub async fn create_wallet(app: &TestApp, user_id: &str) {
    let (status, body) = post(app, &format!("/wallet/{user_id}")).await;
    assert_eq!(status, StatusCode::CREATED, "create wallet: {body}");
}

pub async fn wallet_with_money(app: &TestApp, user_id: &str, amount: f64) {
    create_wallet(app, user_id).await;
    let (status, body) = post(app, &format!("/wallet/{user_id}/add_money/{amount}")).await;
    assert_eq!(status, StatusCode::OK, "deposit: {body}");
}
