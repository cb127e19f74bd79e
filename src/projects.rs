use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use libsql::{Connection, Value, params::IntoParams};
use std::str::FromStr;
use uuid::Uuid;

use crate::constants::*;
use crate::history::record_view;
use crate::models::{
    AdminQuery, Category, Coordinates, CreateProjectPayload, CreateProjectResponse,
    GetProjectQuery, Project, ProjectStatus, SortQuery,
};
use crate::users::require_admin;
use crate::utils::{
    db_failure, now_rfc3339, validate_amount, validate_date, validate_limit,
    validate_max_length, validate_string_length,
};
use crate::{ApiError, AppState, with_transaction};

const PROJECT_COLUMNS: &str = "id, project_id, title, photo_url, category, abstract, \
    description, location, latitude, longitude, is_verified, is_disabled, status, \
    date_added, date_ended, cost, user_id, user_name, gathered_money, funded_money";

/// Numeric project fields a listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    FundedMoney,
    Cost,
    GatheredMoney,
}

impl SortField {
    fn column(&self) -> &'static str {
        match self {
            SortField::FundedMoney => "funded_money",
            SortField::Cost => "cost",
            SortField::GatheredMoney => "gathered_money",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "funded_money" => Ok(SortField::FundedMoney),
            "cost" => Ok(SortField::Cost),
            "gathered_money" => Ok(SortField::GatheredMoney),
            other => Err(format!("Invalid sort field: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// What `/get_projects/{selector}` asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectSelector {
    Limit(u32),
    Sorted(SortField, SortDirection),
}

impl ProjectSelector {
    pub fn parse(selector: &str, field: Option<&str>) -> Result<Self, (StatusCode, String)> {
        if let Ok(limit) = selector.parse::<u32>() {
            return Ok(ProjectSelector::Limit(validate_limit(Some(limit), MAX_LIMIT)?));
        }

        let direction = match selector {
            SORT_ASCENDING => SortDirection::Ascending,
            SORT_DESCENDING => SortDirection::Descending,
            other => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    format!("Invalid sort order: {}", other),
                ));
            }
        };

        let field = field
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .ok_or((
                StatusCode::BAD_REQUEST,
                "Sort field is required".to_string(),
            ))?
            .parse::<SortField>()
            .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

        Ok(ProjectSelector::Sorted(field, direction))
    }
}

fn invalid_project_data() -> ApiError {
    ApiError::Db("invalid project data")
}

pub fn extract_project_from_row(row: libsql::Row) -> Result<Project, ApiError> {
    let category: String = row.get(4).map_err(|_| invalid_project_data())?;
    let status: String = row.get(12).map_err(|_| invalid_project_data())?;
    let date_ended = match row.get_value(14).map_err(|_| invalid_project_data())? {
        Value::Text(date) => Some(date),
        _ => None,
    };

    Ok(Project {
        id: row.get(0).map_err(|_| invalid_project_data())?,
        project_id: row.get(1).map_err(|_| invalid_project_data())?,
        title: row.get(2).map_err(|_| invalid_project_data())?,
        photo_url: row.get(3).map_err(|_| invalid_project_data())?,
        category: category
            .parse::<Category>()
            .map_err(|_| invalid_project_data())?,
        summary: row.get(5).map_err(|_| invalid_project_data())?,
        description: row.get(6).map_err(|_| invalid_project_data())?,
        location: row.get(7).map_err(|_| invalid_project_data())?,
        coordinates: Coordinates {
            latitude: row.get(8).map_err(|_| invalid_project_data())?,
            longitude: row.get(9).map_err(|_| invalid_project_data())?,
        },
        is_verified: row.get(10).map_err(|_| invalid_project_data())?,
        is_disabled: row.get(11).map_err(|_| invalid_project_data())?,
        status: status
            .parse::<ProjectStatus>()
            .map_err(|_| invalid_project_data())?,
        date_added: row.get(13).map_err(|_| invalid_project_data())?,
        date_ended,
        cost: row.get(15).map_err(|_| invalid_project_data())?,
        user_id: row.get(16).map_err(|_| invalid_project_data())?,
        user_name: row.get(17).map_err(|_| invalid_project_data())?,
        gathered_money: row.get(18).map_err(|_| invalid_project_data())?,
        funded_money: row.get(19).map_err(|_| invalid_project_data())?,
    })
}

/// Run `SELECT <all project columns> FROM projects <tail>`.
pub async fn query_projects(
    conn: &Connection,
    tail: &str,
    params: impl IntoParams,
) -> Result<Vec<Project>, ApiError> {
    let sql = format!("SELECT {} FROM projects {}", PROJECT_COLUMNS, tail);
    let mut rows = conn
        .query(&sql, params)
        .await
        .map_err(ApiError::db("failed to query projects"))?;

    let mut projects = Vec::new();
    while let Some(row) = rows
        .next()
        .await
        .map_err(ApiError::db("failed to read projects"))?
    {
        projects.push(extract_project_from_row(row)?);
    }
    Ok(projects)
}

pub async fn fetch_project(conn: &Connection, project_id: i64) -> Result<Option<Project>, ApiError> {
    let mut projects = query_projects(conn, "WHERE project_id = ?", [project_id]).await?;
    Ok(projects.pop())
}

pub fn validate_create_project(payload: &CreateProjectPayload) -> Result<(), (StatusCode, String)> {
    validate_string_length(&payload.title, "Title", MAX_TITLE_LENGTH)?;
    validate_string_length(&payload.user_id, "User ID", MAX_ID_LENGTH)?;
    validate_max_length(&payload.user_name, "User name", MAX_USER_NAME_LENGTH)?;
    validate_max_length(&payload.photo_url, "Photo URL", MAX_TEXT_LENGTH)?;
    validate_max_length(&payload.summary, "Abstract", MAX_TEXT_LENGTH)?;
    validate_max_length(&payload.description, "Description", MAX_TEXT_LENGTH)?;
    validate_max_length(&payload.location, "Location", MAX_TITLE_LENGTH)?;
    validate_amount(payload.cost, "Cost")?;
    if !payload.coordinates.latitude.is_finite() || !payload.coordinates.longitude.is_finite() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Coordinates must be finite numbers".to_string(),
        ));
    }
    if let Some(ref date_ended) = payload.date_ended {
        validate_date(date_ended)?;
    }
    Ok(())
}

pub async fn create_project(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateProjectPayload>,
) -> Result<(StatusCode, Json<CreateProjectResponse>), (StatusCode, String)> {
    validate_create_project(&payload)?;
    let date_added = now_rfc3339()?;
    let id = Uuid::new_v4().to_string();

    let response = with_transaction(&app_state.db, |conn| {
        Box::pin(async move {
            let project_id: i64 = {
                let mut rows = conn
                    .query(
                        "UPDATE counters SET sequence_value = sequence_value + 1 \
                         WHERE name = ? RETURNING sequence_value",
                        [PROJECT_ID_COUNTER],
                    )
                    .await
                    .map_err(ApiError::db("failed to advance project counter"))?;
                let row = rows
                    .next()
                    .await
                    .map_err(ApiError::db("failed to read project counter"))?
                    .ok_or(ApiError::Db("project counter missing"))?;
                row.get(0)
                    .map_err(|_| ApiError::Db("invalid project counter"))?
            };

            let date_ended = match payload.date_ended {
                Some(date) => Value::Text(date.trim().to_string()),
                None => Value::Null,
            };

            conn.execute(
                &format!(
                    "INSERT INTO projects ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    PROJECT_COLUMNS
                ),
                libsql::params![
                    id.as_str(),
                    project_id,
                    payload.title.trim(),
                    payload.photo_url.trim(),
                    payload.category.as_str(),
                    payload.summary.as_str(),
                    payload.description.as_str(),
                    payload.location.trim(),
                    payload.coordinates.latitude,
                    payload.coordinates.longitude,
                    false,
                    false,
                    ProjectStatus::Pending.as_str(),
                    date_added.as_str(),
                    date_ended,
                    payload.cost,
                    payload.user_id.trim(),
                    payload.user_name.trim(),
                    0.0,
                    0.0,
                ],
            )
            .await
            .map_err(ApiError::db("project creation failed"))?;

            Ok(CreateProjectResponse { id, project_id })
        })
    })
    .await
    .map_err(|e: ApiError| -> (StatusCode, String) { e.into() })?;

    tracing::info!(
        project_id = response.project_id,
        id = %response.id,
        "project created"
    );
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_projects(
    State(app_state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<Project>>), (StatusCode, String)> {
    let conn = app_state.db.read().await;
    let projects = query_projects(&conn, "ORDER BY project_id ASC", ()).await?;
    Ok((StatusCode::OK, Json(projects)))
}

/// `/get_projects/{limit}` and `/get_projects/{ascending_by|descending_by}?field=`.
pub async fn get_projects_selected(
    State(app_state): State<AppState>,
    Path(selector): Path<String>,
    Query(query): Query<SortQuery>,
) -> Result<(StatusCode, Json<Vec<Project>>), (StatusCode, String)> {
    let selector = ProjectSelector::parse(&selector, query.field.as_deref())?;
    let conn = app_state.db.read().await;

    let projects = match selector {
        ProjectSelector::Limit(limit) => {
            query_projects(&conn, "ORDER BY project_id ASC LIMIT ?", [limit]).await?
        }
        ProjectSelector::Sorted(field, direction) => {
            // Column and keyword come from closed enums, never from user input.
            let tail = format!(
                "ORDER BY {column} {dir}, project_id {dir}",
                column = field.column(),
                dir = direction.keyword()
            );
            query_projects(&conn, &tail, ()).await?
        }
    };

    Ok((StatusCode::OK, Json(projects)))
}

pub async fn get_project(
    State(app_state): State<AppState>,
    Path(project_id): Path<i64>,
    Query(query): Query<GetProjectQuery>,
) -> Result<(StatusCode, Json<Project>), (StatusCode, String)> {
    let project = {
        let conn = app_state.db.read().await;
        fetch_project(&conn, project_id)
            .await?
            .ok_or((StatusCode::NOT_FOUND, ERR_PROJECT_NOT_FOUND.to_string()))?
    };

    if let Some(user_id) = query.user_id.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        record_view(&app_state.db, user_id, project.category).await?;
    }

    Ok((StatusCode::OK, Json(project)))
}

pub async fn get_projects_by_user(
    State(app_state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<(StatusCode, Json<Vec<Project>>), (StatusCode, String)> {
    let conn = app_state.db.read().await;
    let projects = query_projects(
        &conn,
        "WHERE user_id = ? ORDER BY project_id ASC",
        [user_id.as_str()],
    )
    .await?;
    Ok((StatusCode::OK, Json(projects)))
}

pub async fn get_projects_by_category(
    State(app_state): State<AppState>,
    Path(category): Path<String>,
) -> Result<(StatusCode, Json<Vec<Project>>), (StatusCode, String)> {
    let category = category
        .parse::<Category>()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let conn = app_state.db.read().await;
    let projects = query_projects(
        &conn,
        "WHERE category = ? ORDER BY project_id ASC",
        [category.as_str()],
    )
    .await?;
    Ok((StatusCode::OK, Json(projects)))
}

/// Moderation change applied by an admin.
#[derive(Debug, Clone, Copy)]
enum Moderation {
    Verify,
    Neglect,
    Disable,
}

impl Moderation {
    fn name(&self) -> &'static str {
        match self {
            Moderation::Verify => "verify",
            Moderation::Neglect => "neglect",
            Moderation::Disable => "disable",
        }
    }
}

async fn moderate_project(
    app_state: AppState,
    project_id: i64,
    admin_id: &str,
    moderation: Moderation,
) -> Result<(StatusCode, Json<Project>), (StatusCode, String)> {
    require_admin(&app_state.db, admin_id).await?;

    let conn = app_state.db.write().await;
    let affected_rows = match moderation {
        Moderation::Verify | Moderation::Neglect => conn
            .execute(
                "UPDATE projects SET is_verified = ? WHERE project_id = ?",
                (matches!(moderation, Moderation::Verify), project_id),
            )
            .await,
        Moderation::Disable => conn
            .execute(
                "UPDATE projects SET is_disabled = ?, is_verified = ? WHERE project_id = ?",
                (true, false, project_id),
            )
            .await,
    }
    .map_err(db_failure("failed to update project"))?;

    if affected_rows == 0 {
        return Err((StatusCode::NOT_FOUND, ERR_PROJECT_NOT_FOUND.to_string()));
    }

    let project = fetch_project(&conn, project_id)
        .await?
        .ok_or((StatusCode::NOT_FOUND, ERR_PROJECT_NOT_FOUND.to_string()))?;

    tracing::info!(project_id, admin_id, action = moderation.name(), "project moderated");
    Ok((StatusCode::OK, Json(project)))
}

pub async fn verify_project(
    State(app_state): State<AppState>,
    Path(project_id): Path<i64>,
    Query(query): Query<AdminQuery>,
) -> Result<(StatusCode, Json<Project>), (StatusCode, String)> {
    moderate_project(app_state, project_id, &query.admin_id, Moderation::Verify).await
}

pub async fn neglect_project(
    State(app_state): State<AppState>,
    Path(project_id): Path<i64>,
    Query(query): Query<AdminQuery>,
) -> Result<(StatusCode, Json<Project>), (StatusCode, String)> {
    moderate_project(app_state, project_id, &query.admin_id, Moderation::Neglect).await
}

pub async fn disable_project(
    State(app_state): State<AppState>,
    Path(project_id): Path<i64>,
    Query(query): Query<AdminQuery>,
) -> Result<(StatusCode, Json<Project>), (StatusCode, String)> {
    moderate_project(app_state, project_id, &query.admin_id, Moderation::Disable).await
}
