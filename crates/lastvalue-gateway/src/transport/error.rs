use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use lastvalue_core::error::LastValueError;

/// HTTP rendering of [`LastValueError`].
#[derive(Debug)]
pub struct ApiError(pub LastValueError);

impl From<LastValueError> for ApiError {
    fn from(e: LastValueError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            LastValueError::BadRequest(_) | LastValueError::UnsupportedVersion => {
                StatusCode::BAD_REQUEST
            }
            LastValueError::InvalidSample { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            LastValueError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            LastValueError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({
            "error": self.0.client_code().as_str(),
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}

pub fn not_found(what: &str) -> Response {
    let body = Json(json!({ "error": "NOT_FOUND", "message": what }));
    (StatusCode::NOT_FOUND, body).into_response()
}
