//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use roomrunner_domain::error::EngineError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`EngineError`] to an HTTP response with appropriate status code.
pub struct ApiError(EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            EngineError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            EngineError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            EngineError::Configuration(err) => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            EngineError::Execution(err) => {
                tracing::error!(error = %err, "execution error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            EngineError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
