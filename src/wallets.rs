use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use libsql::{Connection, Value};
use uuid::Uuid;

use crate::constants::*;
use crate::models::{CreateWalletQuery, TransactionKind, Wallet, WalletTransaction};
use crate::utils::{db_failure, now_rfc3339, validate_amount, validate_max_length};
use crate::{ApiError, AppState, with_transaction};

/// Which balance of the wallet an operation touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asset {
    Money,
    Token,
}

impl Asset {
    fn column(&self) -> &'static str {
        match self {
            Asset::Money => "money_balance",
            Asset::Token => "token_balance",
        }
    }

    fn deposit_kind(&self) -> TransactionKind {
        match self {
            Asset::Money => TransactionKind::MoneyDeposit,
            Asset::Token => TransactionKind::TokenDeposit,
        }
    }

    fn payment_kind(&self) -> TransactionKind {
        match self {
            Asset::Money => TransactionKind::MoneyPayment,
            Asset::Token => TransactionKind::TokenPayment,
        }
    }

    /// Largest balance a credit may produce.
    fn ceiling(&self) -> Value {
        match self {
            Asset::Money => Value::Real(MAX_MONEY_TOTAL),
            Asset::Token => Value::Integer(MAX_TOKEN_TOTAL),
        }
    }

    /// How far below the amount a balance may be and still cover a debit.
    fn debit_tolerance(&self) -> Value {
        match self {
            Asset::Money => Value::Real(MONEY_DEBIT_TOLERANCE),
            Asset::Token => Value::Integer(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceChange {
    Deposit,
    Withdraw,
}

fn invalid_wallet_data() -> ApiError {
    ApiError::Db("invalid wallet data")
}

fn extract_transaction_from_row(row: libsql::Row) -> Result<WalletTransaction, ApiError> {
    let kind: String = row.get(1).map_err(|_| invalid_wallet_data())?;
    let reference = match row.get_value(4).map_err(|_| invalid_wallet_data())? {
        Value::Text(reference) => Some(reference),
        _ => None,
    };

    Ok(WalletTransaction {
        id: row.get(0).map_err(|_| invalid_wallet_data())?,
        kind: kind
            .parse::<TransactionKind>()
            .map_err(|_| invalid_wallet_data())?,
        amount: row.get(2).map_err(|_| invalid_wallet_data())?,
        timestamp: row.get(3).map_err(|_| invalid_wallet_data())?,
        reference,
    })
}

/// Load a wallet with its full transaction history in append order.
pub async fn fetch_wallet(conn: &Connection, user_id: &str) -> Result<Option<Wallet>, ApiError> {
    let mut rows = conn
        .query(
            "SELECT user_id, money_balance, token_balance, bank_number FROM wallets WHERE user_id = ?",
            [user_id],
        )
        .await
        .map_err(ApiError::db("failed to query wallet"))?;

    let Some(row) = rows
        .next()
        .await
        .map_err(ApiError::db("failed to read wallet"))?
    else {
        return Ok(None);
    };

    let bank_number = match row.get_value(3).map_err(|_| invalid_wallet_data())? {
        Value::Text(number) => Some(number),
        _ => None,
    };
    let money_balance = match row.get_value(1).map_err(|_| invalid_wallet_data())? {
        Value::Real(balance) => balance,
        Value::Integer(balance) => balance as f64,
        _ => return Err(invalid_wallet_data()),
    };
    let token_balance = match row.get_value(2).map_err(|_| invalid_wallet_data())? {
        Value::Integer(balance) => balance,
        _ => return Err(invalid_wallet_data()),
    };
    let mut wallet = Wallet {
        user_id: row.get(0).map_err(|_| invalid_wallet_data())?,
        money_balance,
        token_balance,
        bank_number,
        transaction_history: Vec::new(),
    };
    drop(rows);

    let mut rows = conn
        .query(
            "SELECT id, kind, amount, timestamp, reference FROM wallet_transactions \
             WHERE user_id = ? ORDER BY seq ASC",
            [user_id],
        )
        .await
        .map_err(ApiError::db("failed to query wallet transactions"))?;

    while let Some(row) = rows
        .next()
        .await
        .map_err(ApiError::db("failed to read wallet transactions"))?
    {
        wallet
            .transaction_history
            .push(extract_transaction_from_row(row)?);
    }

    Ok(Some(wallet))
}

async fn wallet_exists(conn: &Connection, user_id: &str) -> Result<bool, ApiError> {
    let mut rows = conn
        .query("SELECT 1 FROM wallets WHERE user_id = ?", [user_id])
        .await
        .map_err(ApiError::db("failed to check wallet existence"))?;
    Ok(rows
        .next()
        .await
        .map_err(ApiError::db("failed to check wallet existence"))?
        .is_some())
}

/// Append a ledger entry. Entries are never updated or removed.
pub async fn append_transaction(
    conn: &Connection,
    user_id: &str,
    kind: TransactionKind,
    amount: f64,
    timestamp: &str,
    reference: Option<&str>,
) -> Result<String, ApiError> {
    let id = Uuid::new_v4().to_string();
    let reference = match reference {
        Some(reference) => Value::Text(reference.to_string()),
        None => Value::Null,
    };

    conn.execute(
        "INSERT INTO wallet_transactions (id, user_id, kind, amount, timestamp, reference) \
         VALUES (?, ?, ?, ?, ?, ?)",
        libsql::params![id.as_str(), user_id, kind.as_str(), amount, timestamp, reference],
    )
    .await
    .map_err(ApiError::db("failed to append wallet transaction"))?;

    Ok(id)
}

/// Debit `amount` from a balance only if it is covered.
///
/// Money balances may fall short of the amount by float residue; such a debit
/// empties the balance instead of leaving it slightly negative.
///
/// Returns `NotFound` for a missing wallet and `BadRequest` when the balance is
/// too low; in both cases nothing is written.
pub async fn debit_balance(
    conn: &Connection,
    user_id: &str,
    asset: Asset,
    amount: Value,
) -> Result<(), ApiError> {
    let column = asset.column();
    let affected_rows = conn
        .execute(
            &format!(
                "UPDATE wallets SET {column} = MAX({column} - ?1, 0) \
                 WHERE user_id = ?2 AND {column} >= ?1 - ?3"
            ),
            libsql::params![amount, user_id, asset.debit_tolerance()],
        )
        .await
        .map_err(ApiError::db("failed to debit wallet"))?;

    if affected_rows == 0 {
        if wallet_exists(conn, user_id).await? {
            return Err(ApiError::BadRequest(ERR_INSUFFICIENT_FUNDS.to_string()));
        }
        return Err(ApiError::NotFound(ERR_WALLET_NOT_FOUND));
    }
    Ok(())
}

/// Credit `amount` unless the balance would pass the asset's ceiling.
async fn credit_balance(
    conn: &Connection,
    user_id: &str,
    asset: Asset,
    amount: Value,
) -> Result<(), ApiError> {
    let column = asset.column();
    let affected_rows = conn
        .execute(
            &format!(
                "UPDATE wallets SET {column} = {column} + ?1 \
                 WHERE user_id = ?2 AND {column} <= ?3 - ?1"
            ),
            libsql::params![amount, user_id, asset.ceiling()],
        )
        .await
        .map_err(ApiError::db("failed to credit wallet"))?;

    if affected_rows == 0 {
        if wallet_exists(conn, user_id).await? {
            return Err(ApiError::BadRequest(ERR_AMOUNT_TOO_LARGE.to_string()));
        }
        return Err(ApiError::NotFound(ERR_WALLET_NOT_FOUND));
    }
    Ok(())
}

async fn change_balance(
    app_state: AppState,
    user_id: String,
    asset: Asset,
    change: BalanceChange,
    amount: Value,
    ledger_amount: f64,
) -> Result<(StatusCode, Json<Wallet>), (StatusCode, String)> {
    validate_amount(ledger_amount, "Amount")?;
    let timestamp = now_rfc3339()?;

    let result = with_transaction(&app_state.db, |conn| {
        let user_id = user_id.clone();
        Box::pin(async move {
            let kind = match change {
                BalanceChange::Deposit => {
                    credit_balance(conn, &user_id, asset, amount).await?;
                    asset.deposit_kind()
                }
                BalanceChange::Withdraw => {
                    debit_balance(conn, &user_id, asset, amount).await?;
                    asset.payment_kind()
                }
            };
            append_transaction(conn, &user_id, kind, ledger_amount, &timestamp, None).await?;

            fetch_wallet(conn, &user_id)
                .await?
                .ok_or(ApiError::NotFound(ERR_WALLET_NOT_FOUND))
        })
    })
    .await;

    match result {
        Ok(wallet) => {
            tracing::info!(
                user_id = %user_id,
                asset = ?asset,
                change = ?change,
                amount = ledger_amount,
                "wallet balance changed"
            );
            Ok((StatusCode::OK, Json(wallet)))
        }
        Err(e) => {
            if matches!(e, ApiError::BadRequest(_)) {
                tracing::warn!(user_id = %user_id, asset = ?asset, change = ?change, amount = ledger_amount, error = %e, "balance change rejected");
            }
            Err(e.into())
        }
    }
}

pub async fn create_wallet(
    State(app_state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<CreateWalletQuery>,
) -> Result<(StatusCode, Json<Wallet>), (StatusCode, String)> {
    let bank_number = query
        .bank_number
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string);
    if let Some(ref bank_number) = bank_number {
        validate_max_length(bank_number, "Bank number", MAX_BANK_NUMBER_LENGTH)?;
    }
    let bank_value = match bank_number.clone() {
        Some(number) => Value::Text(number),
        None => Value::Null,
    };

    let conn = app_state.db.write().await;
    let affected_rows = conn
        .execute(
            "INSERT INTO wallets (user_id, money_balance, token_balance, bank_number) \
             VALUES (?, 0, 0, ?) ON CONFLICT(user_id) DO NOTHING",
            libsql::params![user_id.as_str(), bank_value],
        )
        .await
        .map_err(db_failure("wallet creation failed"))?;

    if affected_rows == 0 {
        return Err((
            StatusCode::CONFLICT,
            "Wallet already exists for this user".to_string(),
        ));
    }

    tracing::info!(user_id = %user_id, "wallet created");
    Ok((
        StatusCode::CREATED,
        Json(Wallet {
            user_id,
            money_balance: 0.0,
            token_balance: 0,
            bank_number,
            transaction_history: Vec::new(),
        }),
    ))
}

pub async fn get_wallet(
    State(app_state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<(StatusCode, Json<Wallet>), (StatusCode, String)> {
    let conn = app_state.db.read().await;
    let wallet = fetch_wallet(&conn, &user_id)
        .await?
        .ok_or((StatusCode::NOT_FOUND, ERR_WALLET_NOT_FOUND.to_string()))?;

    Ok((StatusCode::OK, Json(wallet)))
}

pub async fn add_money(
    State(app_state): State<AppState>,
    Path((user_id, amount)): Path<(String, f64)>,
) -> Result<(StatusCode, Json<Wallet>), (StatusCode, String)> {
    change_balance(
        app_state,
        user_id,
        Asset::Money,
        BalanceChange::Deposit,
        Value::Real(amount),
        amount,
    )
    .await
}

pub async fn substract_money(
    State(app_state): State<AppState>,
    Path((user_id, amount)): Path<(String, f64)>,
) -> Result<(StatusCode, Json<Wallet>), (StatusCode, String)> {
    change_balance(
        app_state,
        user_id,
        Asset::Money,
        BalanceChange::Withdraw,
        Value::Real(amount),
        amount,
    )
    .await
}

pub async fn add_token(
    State(app_state): State<AppState>,
    Path((user_id, amount)): Path<(String, i64)>,
) -> Result<(StatusCode, Json<Wallet>), (StatusCode, String)> {
    change_balance(
        app_state,
        user_id,
        Asset::Token,
        BalanceChange::Deposit,
        Value::Integer(amount),
        amount as f64,
    )
    .await
}

pub async fn substract_token(
    State(app_state): State<AppState>,
    Path((user_id, amount)): Path<(String, i64)>,
) -> Result<(StatusCode, Json<Wallet>), (StatusCode, String)> {
    change_balance(
        app_state,
        user_id,
        Asset::Token,
        BalanceChange::Withdraw,
        Value::Integer(amount),
        amount as f64,
    )
    .await
}
