use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::constants::*;
use crate::models::{CreateUserPayload, Role, User};
use crate::utils::{db_error, db_error_with_context, db_failure, validate_string_length};
use crate::{AppState, Db};

pub fn extract_user_from_row(row: libsql::Row) -> Result<User, (StatusCode, String)> {
    let id: String = row
        .get(0)
        .map_err(|_| db_error_with_context("invalid user data"))?;
    let name: String = row
        .get(1)
        .map_err(|_| db_error_with_context("invalid user data"))?;
    let role: String = row
        .get(2)
        .map_err(|_| db_error_with_context("invalid user data"))?;
    let role = role
        .parse::<Role>()
        .map_err(|_| db_error_with_context("invalid user role"))?;

    Ok(User { id, name, role })
}

pub async fn find_user(db: &Db, user_id: &str) -> Result<Option<User>, (StatusCode, String)> {
    let conn = db.read().await;
    let mut rows = conn
        .query("SELECT id, name, role FROM users WHERE id = ?", [user_id])
        .await
        .map_err(db_failure("failed to query user"))?;

    match rows.next().await.map_err(|_| db_error())? {
        Some(row) => Ok(Some(extract_user_from_row(row)?)),
        None => Ok(None),
    }
}

/// Moderation endpoints are only open to users whose role is `Admin`.
pub async fn require_admin(db: &Db, admin_id: &str) -> Result<User, (StatusCode, String)> {
    match find_user(db, admin_id).await? {
        Some(user) if user.role == Role::Admin => Ok(user),
        _ => {
            tracing::warn!(admin_id, "moderation request without admin role");
            Err((StatusCode::FORBIDDEN, ERR_NOT_ADMIN.to_string()))
        }
    }
}

pub async fn create_user(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<(StatusCode, Json<User>), (StatusCode, String)> {
    validate_string_length(&payload.name, "User name", MAX_USER_NAME_LENGTH)?;

    let user = User {
        id: Uuid::new_v4().to_string(),
        name: payload.name.trim().to_string(),
        role: payload.role,
    };

    let conn = app_state.db.write().await;
    conn.execute(
        "INSERT INTO users (id, name, role) VALUES (?, ?, ?)",
        (user.id.as_str(), user.name.as_str(), user.role.as_str()),
    )
    .await
    .map_err(db_failure("user creation failed"))?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(app_state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<(StatusCode, Json<User>), (StatusCode, String)> {
    let user = find_user(&app_state.db, &user_id)
        .await?
        .ok_or((StatusCode::NOT_FOUND, ERR_USER_NOT_FOUND.to_string()))?;

    Ok((StatusCode::OK, Json(user)))
}
