mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn payment_below_cost_keeps_project_pending() {
    let app = common::setup_test_app().await.expect("setup failed");
    let id = common::create_project(&app, "Bike racks", "Infrastructure", 100.0, "owner").await;
    common::wallet_with_money(&app, "payer", 200.0).await;

    let (status, body) = common::patch(
        &app,
        &format!("/pay_to_project?project_id={id}&payment_amount=40&user_id=payer"),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["gathered_money"], 40.0);
    assert_eq!(body["status"], "pending");

    let (_, wallet) = common::get(&app, "/wallet/payer").await;
    assert_eq!(wallet["money_balance"], 160.0);
    let last = wallet["transaction_history"]
        .as_array()
        .unwrap()
        .last()
        .cloned()
        .unwrap();
    assert_eq!(last["type"], "money_payment");
    assert_eq!(last["reference"], id.to_string());
}

#[tokio::test]
async fn reaching_cost_completes_project() {
    let app = common::setup_test_app().await.expect("setup failed");
    let id = common::create_project(&app, "Benches", "Social", 100.0, "owner").await;
    common::wallet_with_money(&app, "payer", 200.0).await;

    let pay = |amount: f64| format!("/pay_to_project?project_id={id}&payment_amount={amount}&user_id=payer");

    let (status, body) = common::patch(&app, &pay(60.0)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");

    let (status, body) = common::patch(&app, &pay(40.0)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gathered_money"], 100.0);
    assert_eq!(body["status"], "completed");

    // Further payments are still accepted and status never reverts.
    let (status, body) = common::patch(&app, &pay(10.0)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gathered_money"], 110.0);
    assert_eq!(body["status"], "completed");
}

#[tokio::test]
async fn failed_payment_changes_nothing() {
    let app = common::setup_test_app().await.expect("setup failed");
    let id = common::create_project(&app, "Mural", "Culture", 500.0, "owner").await;
    common::wallet_with_money(&app, "payer", 30.0).await;

    let (status, _) = common::patch(
        &app,
        &format!("/pay_to_project?project_id={id}&payment_amount=31&user_id=payer"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, project) = common::get(&app, &format!("/get_project/{id}")).await;
    assert_eq!(project["gathered_money"], 0.0);
    let (_, wallet) = common::get(&app, "/wallet/payer").await;
    assert_eq!(wallet["money_balance"], 30.0);
    assert_eq!(wallet["transaction_history"].as_array().unwrap().len(), 1);

    let (status, _) = common::patch(
        &app,
        &format!("/pay_to_project?project_id={id}&payment_amount=5&user_id=stranger"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = common::patch(
        &app,
        "/pay_to_project?project_id=999&payment_amount=5&user_id=payer",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = common::patch(
        &app,
        &format!("/pay_to_project?project_id={id}&payment_amount=-5&user_id=payer"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, wallet) = common::get(&app, "/wallet/payer").await;
    assert_eq!(wallet["money_balance"], 30.0);
}

#[tokio::test]
async fn disabled_project_rejects_payments() {
    let app = common::setup_test_app().await.expect("setup failed");
    let admin = common::create_user(&app, "Ada", "Admin").await;
    let id = common::create_project(&app, "Fence", "Safety", 50.0, "owner").await;
    common::wallet_with_money(&app, "payer", 50.0).await;

    let (status, _) = common::patch(&app, &format!("/disable_project/{id}?admin_id={admin}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = common::patch(
        &app,
        &format!("/pay_to_project?project_id={id}&payment_amount=10&user_id=payer"),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, wallet) = common::get(&app, "/wallet/payer").await;
    assert_eq!(wallet["money_balance"], 50.0);
}

#[tokio::test]
async fn sponsor_funding_is_independent_of_wallets_and_status() {
    let app = common::setup_test_app().await.expect("setup failed");
    let id = common::create_project(&app, "Garden", "Ecology", 100.0, "owner").await;

    let (status, body) = common::patch(&app, &format!("/fund_project?project_id={id}&payment_amount=150")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["funded_money"], 150.0);
    assert_eq!(body["gathered_money"], 0.0);
    assert_eq!(body["status"], "pending");

    let (status, _) = common::patch(&app, "/fund_project?project_id=999&payment_amount=1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = common::patch(&app, &format!("/fund_project?project_id={id}&payment_amount=-1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = common::get(&app, "/get_projects/descending_by?field=funded_money").await;
    assert_eq!(body[0]["project_id"], id);
}

#[tokio::test]
async fn sponsor_funding_past_maximum_is_rejected() {
    let app = common::setup_test_app().await.expect("setup failed");
    let id = common::create_project(&app, "Stadium", "Sports", 100.0, "owner").await;

    let fund = format!("/fund_project?project_id={id}&payment_amount=1e308");
    let (status, _) = common::patch(&app, &fund).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = common::patch(&app, &fund).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, project) = common::get(&app, &format!("/get_project/{id}")).await;
    assert_eq!(project["funded_money"], 1e308);
}

#[tokio::test]
async fn payment_past_maximum_gathered_is_rejected() {
    let app = common::setup_test_app().await.expect("setup failed");
    let id = common::create_project(&app, "Tower", "Culture", 100.0, "owner").await;
    common::wallet_with_money(&app, "first", 1e308).await;
    common::wallet_with_money(&app, "second", 1e308).await;

    let pay = |user: &str| format!("/pay_to_project?project_id={id}&payment_amount=1e308&user_id={user}");

    let (status, _) = common::patch(&app, &pay("first")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = common::patch(&app, &pay("second")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, project) = common::get(&app, &format!("/get_project/{id}")).await;
    assert_eq!(project["gathered_money"], 1e308);
    let (_, wallet) = common::get(&app, "/wallet/second").await;
    assert_eq!(wallet["money_balance"], 1e308);
    assert_eq!(wallet["transaction_history"].as_array().unwrap().len(), 1);
}
