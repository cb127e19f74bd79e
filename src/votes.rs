use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::constants::*;
use crate::models::{VoteOutcome, VoteTally};
use crate::utils::{db_error, db_failure, validate_string_length};
use crate::{ApiError, AppState, with_transaction};

/// Vote values are a single up or down preference.
pub fn validate_vote_value(value: i64) -> Result<(), (StatusCode, String)> {
    if value != 1 && value != -1 {
        return Err((
            StatusCode::BAD_REQUEST,
            "Vote value must be 1 or -1".to_string(),
        ));
    }
    Ok(())
}

/// Insert, toggle off, or flip the caller's vote on an entity.
pub async fn cast_vote(
    State(app_state): State<AppState>,
    Path((entity_id, user_id, value)): Path<(String, String, i64)>,
) -> Result<(StatusCode, Json<VoteOutcome>), (StatusCode, String)> {
    validate_string_length(&entity_id, "Entity ID", MAX_ID_LENGTH)?;
    validate_string_length(&user_id, "User ID", MAX_ID_LENGTH)?;
    validate_vote_value(value)?;

    let status = with_transaction(&app_state.db, |conn| {
        let entity_id = entity_id.clone();
        let user_id = user_id.clone();
        Box::pin(async move {
            let existing: Option<i64> = {
                let mut rows = conn
                    .query(
                        "SELECT value FROM votes WHERE entity_id = ? AND user_id = ?",
                        (entity_id.as_str(), user_id.as_str()),
                    )
                    .await
                    .map_err(ApiError::db("failed to query existing vote"))?;
                match rows
                    .next()
                    .await
                    .map_err(ApiError::db("failed to read existing vote"))?
                {
                    Some(row) => Some(
                        row.get(0)
                            .map_err(|_| ApiError::Db("invalid vote data"))?,
                    ),
                    None => None,
                }
            };

            let (sql, status) = match existing {
                None => (
                    "INSERT INTO votes (value, entity_id, user_id) VALUES (?, ?, ?)",
                    VOTE_CREATED,
                ),
                Some(current) if current == value => (
                    "DELETE FROM votes WHERE value = ? AND entity_id = ? AND user_id = ?",
                    VOTE_REMOVED,
                ),
                Some(_) => (
                    "UPDATE votes SET value = ? WHERE entity_id = ? AND user_id = ?",
                    VOTE_UPDATED,
                ),
            };

            conn.execute(sql, (value, entity_id.as_str(), user_id.as_str()))
                .await
                .map_err(ApiError::db("failed to write vote"))?;

            Ok(status)
        })
    })
    .await
    .map_err(|e: ApiError| -> (StatusCode, String) { e.into() })?;

    tracing::info!(entity_id = %entity_id, user_id = %user_id, value, status, "vote cast");

    let code = if status == VOTE_CREATED {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        code,
        Json(VoteOutcome {
            entity_id,
            user_id,
            value,
            status: status.to_string(),
        }),
    ))
}

/// Count up and down votes for an entity by scanning its vote rows.
pub async fn get_votes(
    State(app_state): State<AppState>,
    Path(entity_id): Path<String>,
) -> Result<(StatusCode, Json<VoteTally>), (StatusCode, String)> {
    let conn = app_state.db.read().await;
    let mut rows = conn
        .query(
            "SELECT \
                COALESCE(SUM(CASE WHEN value = 1 THEN 1 ELSE 0 END), 0), \
                COALESCE(SUM(CASE WHEN value = -1 THEN 1 ELSE 0 END), 0) \
             FROM votes WHERE entity_id = ?",
            [entity_id.as_str()],
        )
        .await
        .map_err(db_failure("failed to tally votes"))?;

    let (upvotes, downvotes) = match rows.next().await.map_err(|_| db_error())? {
        Some(row) => (
            row.get::<i64>(0).map_err(|_| db_error())?,
            row.get::<i64>(1).map_err(|_| db_error())?,
        ),
        None => (0, 0),
    };

    Ok((
        StatusCode::OK,
        Json(VoteTally {
            entity_id,
            upvotes,
            downvotes,
        }),
    ))
}
