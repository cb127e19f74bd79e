use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use libsql::Value;

use crate::constants::*;
use crate::models::{FundProjectQuery, PayToProjectQuery, Project, TransactionKind};
use crate::projects::fetch_project;
use crate::utils::{db_failure, now_rfc3339, validate_amount};
use crate::wallets::{Asset, append_transaction, debit_balance};
use crate::{ApiError, AppState, with_transaction};

/// Move `payment_amount` from the user's wallet into the project's gathered money.
///
/// The wallet debit, the project credit and the ledger entry commit together;
/// if any step fails none of them is kept. Status flips to `completed` once
/// gathered money reaches the cost and never flips back.
pub async fn pay_to_project(
    State(app_state): State<AppState>,
    Query(query): Query<PayToProjectQuery>,
) -> Result<(StatusCode, Json<Project>), (StatusCode, String)> {
    validate_amount(query.payment_amount, "Payment amount")?;
    let timestamp = now_rfc3339()?;
    let PayToProjectQuery {
        project_id,
        payment_amount,
        user_id,
    } = query;

    let result = with_transaction(&app_state.db, |conn| {
        let user_id = user_id.clone();
        Box::pin(async move {
            let project = fetch_project(conn, project_id)
                .await?
                .ok_or(ApiError::NotFound(ERR_PROJECT_NOT_FOUND))?;
            if project.is_disabled {
                return Err(ApiError::Conflict("Project is disabled".to_string()));
            }

            debit_balance(conn, &user_id, Asset::Money, Value::Real(payment_amount)).await?;

            let affected_rows = conn
                .execute(
                    "UPDATE projects SET gathered_money = gathered_money + ?1, \
                     status = CASE WHEN gathered_money + ?1 >= cost THEN ?2 ELSE status END \
                     WHERE project_id = ?3 AND gathered_money <= ?4 - ?1",
                    libsql::params![
                        payment_amount,
                        PROJECT_STATUS_COMPLETED,
                        project_id,
                        MAX_MONEY_TOTAL
                    ],
                )
                .await
                .map_err(ApiError::db("failed to credit project"))?;
            // The project row was read in this transaction, so only the ceiling can block it.
            if affected_rows == 0 {
                return Err(ApiError::BadRequest(ERR_AMOUNT_TOO_LARGE.to_string()));
            }

            let reference = project_id.to_string();
            append_transaction(
                conn,
                &user_id,
                TransactionKind::MoneyPayment,
                payment_amount,
                &timestamp,
                Some(&reference),
            )
            .await?;

            fetch_project(conn, project_id)
                .await?
                .ok_or(ApiError::NotFound(ERR_PROJECT_NOT_FOUND))
        })
    })
    .await;

    match result {
        Ok(project) => {
            tracing::info!(
                project_id,
                user_id = %user_id,
                amount = payment_amount,
                status = project.status.as_str(),
                "payment to project recorded"
            );
            Ok((StatusCode::OK, Json(project)))
        }
        Err(e) => {
            tracing::warn!(project_id, user_id = %user_id, error = %e, "payment to project rejected");
            Err(e.into())
        }
    }
}

/// Add a sponsor contribution. This counter is independent of wallets and of
/// the completion status.
pub async fn fund_project(
    State(app_state): State<AppState>,
    Query(query): Query<FundProjectQuery>,
) -> Result<(StatusCode, Json<Project>), (StatusCode, String)> {
    validate_amount(query.payment_amount, "Payment amount")?;

    let conn = app_state.db.write().await;
    let affected_rows = conn
        .execute(
            "UPDATE projects SET funded_money = funded_money + ?1 \
             WHERE project_id = ?2 AND funded_money <= ?3 - ?1",
            (query.payment_amount, query.project_id, MAX_MONEY_TOTAL),
        )
        .await
        .map_err(db_failure("failed to fund project"))?;

    let project = fetch_project(&conn, query.project_id)
        .await?
        .ok_or((StatusCode::NOT_FOUND, ERR_PROJECT_NOT_FOUND.to_string()))?;

    if affected_rows == 0 {
        tracing::warn!(
            project_id = query.project_id,
            amount = query.payment_amount,
            "sponsor funding rejected: total too large"
        );
        return Err((StatusCode::BAD_REQUEST, ERR_AMOUNT_TOO_LARGE.to_string()));
    }

    tracing::info!(
        project_id = query.project_id,
        amount = query.payment_amount,
        "project funded"
    );
    Ok((StatusCode::OK, Json(project)))
}
