use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::{AppState, funding, history, projects, users, votes, wallets};

/// Every endpoint of the service, without CORS or tracing layers.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/get_projects", get(projects::get_projects))
        .route("/get_projects/{selector}", get(projects::get_projects_selected))
        .route("/get_project/{project_id}", get(projects::get_project))
        .route(
            "/get_projects_by_user/{user_id}",
            get(projects::get_projects_by_user),
        )
        .route(
            "/get_projects_by_category/{category}",
            get(projects::get_projects_by_category),
        )
        .route("/add_project", post(projects::create_project))
        .route("/verify_project/{project_id}", patch(projects::verify_project))
        .route("/neglect_project/{project_id}", patch(projects::neglect_project))
        .route("/disable_project/{project_id}", patch(projects::disable_project))
        .route("/pay_to_project", patch(funding::pay_to_project))
        .route("/fund_project", patch(funding::fund_project))
        .route(
            "/get_favourite_categories/{user_id}",
            get(history::get_favourite_categories),
        )
        .route("/get_history/{user_id}", get(history::get_history))
        .route("/vote/{entity_id}/{user_id}/{value}", post(votes::cast_vote))
        .route("/vote/{entity_id}", get(votes::get_votes))
        .route(
            "/wallet/{user_id}",
            post(wallets::create_wallet).get(wallets::get_wallet),
        )
        .route("/wallet/{user_id}/add_money/{amount}", post(wallets::add_money))
        .route(
            "/wallet/{user_id}/substract_money/{amount}",
            post(wallets::substract_money),
        )
        .route("/wallet/{user_id}/add_token/{amount}", post(wallets::add_token))
        .route(
            "/wallet/{user_id}/substract_token/{amount}",
            post(wallets::substract_token),
        )
        .route("/users", post(users::create_user))
        .route("/users/{user_id}", get(users::get_user))
        .with_state(app_state)
}

async fn root() -> &'static str {
    "Civic Budget Server API"
}
