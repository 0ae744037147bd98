use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use models::errors::ModelError;
use service::errors::UserError;

/// A domain failure leaving the dispatch boundary as a status-coded JSON
/// response with an `{"error": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    err: UserError,
    legacy_status_codes: bool,
}

impl ApiError {
    pub fn new(err: UserError, legacy_status_codes: bool) -> Self {
        Self { err, legacy_status_codes }
    }

    fn status(&self) -> StatusCode {
        // Legacy mode keeps the pre-redesign contract: every domain failure
        // collapses to 500.
        if self.legacy_status_codes {
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
        match &self.err {
            UserError::Model(ModelError::InvalidUserData(_))
            | UserError::Model(ModelError::InvalidEmail) => StatusCode::BAD_REQUEST,
            UserError::NotFound => StatusCode::NOT_FOUND,
            UserError::AlreadyExists => StatusCode::CONFLICT,
            UserError::Model(_)
            | UserError::Fetch(_)
            | UserError::Write(_)
            | UserError::Delete(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = self.err.to_string();
        if status.is_server_error() {
            error!(error = %msg, "user operation failed");
        }
        (status, Json(serde_json::json!({"error": msg}))).into_response()
    }
}
