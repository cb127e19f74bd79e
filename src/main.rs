use anyhow::Context;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use civic_budget_server::{
    AppState, config::Config, constants::DEFAULT_LOG_FILTER, database, routes::build_router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::from_env().context("Configuration error")?;

    let db = database::init_db(&config.database)
        .await
        .context("Failed to initialize database")?;

    let app_state = AppState { db };

    // Configure CORS to allow frontend requests
    let frontend_origin_header = config
        .frontend_origin
        .parse::<axum::http::HeaderValue>()
        .with_context(|| format!("Invalid FRONTEND_ORIGIN '{}'", config.frontend_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(frontend_origin_header)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PATCH,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ]);

    let app = build_router(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_address))?;

    tracing::info!("Server running on http://{}", bind_address);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
