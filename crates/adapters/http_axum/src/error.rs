//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use stratum_domain::error::{ErrorChain, MapperError, StratumError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`StratumError`] to an HTTP response with appropriate status code.
pub struct ApiError(StratumError);

impl From<StratumError> for ApiError {
    fn from(err: StratumError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            StratumError::Validation(err @ ValidationError::Duplicate(_)) => {
                (StatusCode::CONFLICT, err.to_string())
            }
            StratumError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            StratumError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            StratumError::Mapper(err @ MapperError::MissingPrimaryKey) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            StratumError::Mapper(err @ MapperError::TooManyResults) => {
                (StatusCode::CONFLICT, err.to_string())
            }
            // Every rejection reason shares one body.
            StratumError::Authentication(_) => {
                (StatusCode::UNAUTHORIZED, "invalid credentials".to_string())
            }
            StratumError::Unsupported(err) => (StatusCode::NOT_IMPLEMENTED, err.to_string()),
            // Already logged by the service that raised it.
            StratumError::Storage(_) => {
                tracing::debug!(error = %ErrorChain(&self.0), "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            StratumError::Credential(_) => {
                tracing::error!(error = %ErrorChain(&self.0), "secret hashing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
