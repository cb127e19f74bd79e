mod common;

use std::time::Duration;

use axum::http::StatusCode;
use civic_budget_server::{ApiError, with_transaction};

async fn user_count(app: &common::TestApp, name: &str) -> i64 {
    let conn = app.state.db.read().await;
    let mut rows = conn
        .query("SELECT COUNT(*) FROM users WHERE name = ?", [name])
        .await
        .expect("count users");
    let row = rows.next().await.expect("next row").expect("count row");
    row.get(0).expect("count")
}

#[tokio::test]
async fn cancelled_transaction_is_rolled_back() {
    let app = common::setup_test_app().await.expect("setup failed");

    let pending = with_transaction(&app.state.db, |conn| {
        Box::pin(async move {
            conn.execute(
                "INSERT INTO users (id, name, role) VALUES ('ghost', 'Ghost', 'Resident')",
                (),
            )
            .await
            .map_err(ApiError::db("failed to insert user"))?;
            std::future::pending::<()>().await;
            Ok::<(), ApiError>(())
        })
    });
    let timed_out = tokio::time::timeout(Duration::from_millis(50), pending).await;
    assert!(timed_out.is_err(), "transaction future should still be pending");

    let id = common::create_project(&app, "After cancel", "Health", 10.0, "owner").await;
    assert_eq!(id, 1);
    assert_eq!(user_count(&app, "Ghost").await, 0);

    let (status, _) = common::post(&app, "/wallet/after/add_money/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn panicking_transaction_is_rolled_back() {
    let app = common::setup_test_app().await.expect("setup failed");

    let db = app.state.db.clone();
    let task = tokio::spawn(async move {
        with_transaction(&db, |conn| {
            Box::pin(async move {
                conn.execute(
                    "INSERT INTO users (id, name, role) VALUES ('boom', 'Boom', 'Resident')",
                    (),
                )
                .await
                .map_err(ApiError::db("failed to insert user"))?;
                let broken = true;
                if broken {
                    panic!("handler bug");
                }
                Ok::<(), ApiError>(())
            })
        })
        .await
    });
    assert!(task.await.is_err(), "task should have panicked");

    common::create_wallet(&app, "survivor").await;
    let (status, body) = common::post(&app, "/wallet/survivor/add_money/3").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(user_count(&app, "Boom").await, 0);
}
