use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::collections::BTreeMap;

use crate::constants::*;
use crate::models::{
    Category, CategoryViews, FavoriteCategoriesResponse, FavoritesQuery, HistoryResponse,
};
use crate::utils::{db_error, db_error_with_context, db_failure, validate_limit_within};
use crate::{AppState, Db};

/// Bump the user's view counter for `category`, creating the row on first view.
pub async fn record_view(
    db: &Db,
    user_id: &str,
    category: Category,
) -> Result<(), (StatusCode, String)> {
    let conn = db.write().await;
    conn.execute(
        "INSERT INTO category_views (user_id, category, views) VALUES (?, ?, 1) \
         ON CONFLICT(user_id, category) DO UPDATE SET views = views + 1",
        (user_id, category.as_str()),
    )
    .await
    .map_err(db_failure("failed to record project view"))?;

    tracing::debug!(user_id, category = category.as_str(), "project view recorded");
    Ok(())
}

fn extract_category_views_from_row(row: libsql::Row) -> Result<CategoryViews, (StatusCode, String)> {
    let category: String = row
        .get(0)
        .map_err(|_| db_error_with_context("invalid history data"))?;
    let views: i64 = row
        .get(1)
        .map_err(|_| db_error_with_context("invalid history data"))?;
    let category = category
        .parse::<Category>()
        .map_err(|_| db_error_with_context("invalid history category"))?;

    Ok(CategoryViews { category, views })
}

/// Top `limit` categories by view count. Ties keep the order in which the
/// categories were first viewed.
pub async fn top_categories(
    db: &Db,
    user_id: &str,
    limit: u32,
) -> Result<Vec<CategoryViews>, (StatusCode, String)> {
    let conn = db.read().await;
    let mut rows = conn
        .query(
            "SELECT category, views FROM category_views WHERE user_id = ? \
             ORDER BY views DESC, seq ASC LIMIT ?",
            (user_id, limit),
        )
        .await
        .map_err(db_failure("failed to query favourite categories"))?;

    let mut categories = Vec::new();
    while let Some(row) = rows.next().await.map_err(|_| db_error())? {
        categories.push(extract_category_views_from_row(row)?);
    }
    Ok(categories)
}

pub async fn get_favourite_categories(
    State(app_state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<FavoritesQuery>,
) -> Result<(StatusCode, Json<FavoriteCategoriesResponse>), (StatusCode, String)> {
    let limit = validate_limit_within(
        query.limit,
        DEFAULT_FAVORITES_LIMIT,
        Category::ALL.len() as u32,
    )?;

    let categories = top_categories(&app_state.db, &user_id, limit).await?;

    Ok((
        StatusCode::OK,
        Json(FavoriteCategoriesResponse {
            user_id,
            categories,
        }),
    ))
}

pub async fn get_history(
    State(app_state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<(StatusCode, Json<HistoryResponse>), (StatusCode, String)> {
    let conn = app_state.db.read().await;
    let mut rows = conn
        .query(
            "SELECT category, views FROM category_views WHERE user_id = ?",
            [user_id.as_str()],
        )
        .await
        .map_err(db_failure("failed to query history"))?;

    let mut views = BTreeMap::new();
    while let Some(row) = rows.next().await.map_err(|_| db_error())? {
        let entry = extract_category_views_from_row(row)?;
        views.insert(entry.category, entry.views);
    }

    Ok((StatusCode::OK, Json(HistoryResponse { user_id, views })))
}
