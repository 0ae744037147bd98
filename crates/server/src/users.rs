use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use models::user::User;
use service::errors::UserError;
use service::storage::table::UserTable;
use service::users;

use crate::errors::ApiError;

/// Shared dispatch state: the backing table handle plus the status-mapping
/// mode. The table is injected here rather than held as process globals.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<dyn UserTable>,
    pub legacy_status_codes: bool,
}

impl AppState {
    fn fail(&self, err: UserError) -> ApiError {
        ApiError::new(err, self.legacy_status_codes)
    }
}

pub async fn fetch_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let all = users::fetch_users(state.table.as_ref())
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(all))
}

pub async fn fetch_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<User>, ApiError> {
    let found = users::fetch_user(state.table.as_ref(), &email)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(found))
}

pub async fn create_user(
    State(state): State<AppState>,
    body: String,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let created = users::create_user(state.table.as_ref(), &body)
        .await
        .map_err(|e| state.fail(e))?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_user(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<User>, ApiError> {
    let updated = users::update_user(state.table.as_ref(), &body)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(Json(updated))
}

pub async fn delete_user(State(state): State<AppState>, body: String) -> Result<StatusCode, ApiError> {
    users::delete_user(state.table.as_ref(), &body)
        .await
        .map_err(|e| state.fail(e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fixed response for any method outside the CRUD contract.
pub async fn method_not_allowed() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({"error": "Method not allowed"})),
    )
}
