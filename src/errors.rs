use axum::http::StatusCode;
use thiserror::Error;

use crate::constants::ERR_DATABASE_OPERATION;
use crate::transaction::TransactionError;

/// Failures raised from inside multi-statement store work.
///
/// Handlers keep returning `(StatusCode, String)`; this type only exists so
/// transaction closures have a single error type to roll back on.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error("Database error: {0}")]
    Db(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),
}

impl ApiError {
    /// Adapter for `map_err` on store calls inside a transaction.
    pub fn db(context: &'static str) -> impl FnOnce(libsql::Error) -> ApiError {
        move |e| {
            tracing::error!(error = %e, context, "database error");
            ApiError::Db(context)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Transaction(_) | ApiError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl From<ApiError> for (StatusCode, String) {
    fn from(e: ApiError) -> Self {
        let status = e.status();
        let message = match e {
            ApiError::Transaction(TransactionError::Begin) => {
                format!("{}: failed to begin transaction", ERR_DATABASE_OPERATION)
            }
            ApiError::Transaction(TransactionError::Commit) => {
                format!("{}: failed to commit transaction", ERR_DATABASE_OPERATION)
            }
            other => other.to_string(),
        };
        (status, message)
    }
}
