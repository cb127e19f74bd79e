use axum::http::StatusCode;

use crate::constants::*;

pub fn db_error() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ERR_DATABASE_OPERATION.to_string(),
    )
}

pub fn db_error_with_context(context: &str) -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Database error: {}", context),
    )
}

/// Adapter for `map_err` on store calls: logs the driver error and hides it
/// from the client.
pub fn db_failure(context: &'static str) -> impl FnOnce(libsql::Error) -> (StatusCode, String) {
    move |e| {
        tracing::error!(error = %e, context, "database error");
        db_error_with_context(context)
    }
}

pub fn validate_string_length(
    value: &str,
    field_name: &str,
    max_length: usize,
) -> Result<(), (StatusCode, String)> {
    if value.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("{} cannot be empty", field_name),
        ));
    }
    if value.len() > max_length {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("{} must be less than {} characters", field_name, max_length),
        ));
    }
    Ok(())
}

/// Optional free-text fields may be empty but are still bounded.
pub fn validate_max_length(
    value: &str,
    field_name: &str,
    max_length: usize,
) -> Result<(), (StatusCode, String)> {
    if value.len() > max_length {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("{} must be less than {} characters", field_name, max_length),
        ));
    }
    Ok(())
}

/// Money and token amounts must be finite and not negative.
pub fn validate_amount(amount: f64, field_name: &str) -> Result<(), (StatusCode, String)> {
    if !amount.is_finite() {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("{} must be a valid finite number", field_name),
        ));
    }
    if amount < 0.0 {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("{} cannot be negative", field_name),
        ));
    }
    Ok(())
}

pub fn validate_date(value: &str) -> Result<(), (StatusCode, String)> {
    if value.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Date cannot be empty".to_string()));
    }

    let format = time::format_description::parse("[year]-[month]-[day]")
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid date format".to_string()))?;

    time::Date::parse(value.trim(), &format)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid date format".to_string()))?;

    Ok(())
}

pub fn validate_limit(limit: Option<u32>, default: u32) -> Result<u32, (StatusCode, String)> {
    validate_limit_within(limit, default, MAX_LIMIT)
}

pub fn validate_limit_within(
    limit: Option<u32>,
    default: u32,
    max: u32,
) -> Result<u32, (StatusCode, String)> {
    match limit {
        Some(l) => {
            if l == 0 {
                Err((
                    StatusCode::BAD_REQUEST,
                    "Limit must be greater than 0".to_string(),
                ))
            } else if l > max {
                Err((
                    StatusCode::BAD_REQUEST,
                    format!("Limit cannot exceed {}", max),
                ))
            } else {
                Ok(l)
            }
        }
        None => Ok(default),
    }
}

pub fn now_rfc3339() -> Result<String, (StatusCode, String)> {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}
