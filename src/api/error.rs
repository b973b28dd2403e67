use crate::service::registration::RegistrationError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed body, query or path.
    #[error("{0}")]
    InvalidRequest(String),

    #[error("employee RUT {0} is not registered; only registered users may report incidents")]
    UnregisteredEmployee(String),

    #[error("employee RUT {0} is inactive and cannot report incidents")]
    InactiveEmployee(String),

    #[error("missing or unknown bearer token")]
    Unauthorized,

    #[error("admin capability required")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("storage fault: {0}")]
    Storage(#[from] sqlx::Error),

    /// A background task died before answering.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::UnregisteredEmployee(_)
            | Self::InactiveEmployee(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::UnregisteredEmployee(rut) => Self::UnregisteredEmployee(rut),
            RegistrationError::InactiveEmployee(rut) => Self::InactiveEmployee(rut),
            RegistrationError::Storage(e) => Self::Storage(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match &self {
            // Driver messages stay in the log.
            Self::Storage(e) => {
                error!("Storage fault: {}", e);
                "internal storage error".to_string()
            }
            Self::Internal(e) => {
                error!("Internal error: {}", e);
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ApiError::InvalidRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Storage(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Internal("task panicked".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_registration_errors_map_to_client_faults() {
        let err: ApiError = RegistrationError::UnregisteredEmployee("XY-999".into()).into();
        assert!(matches!(err, ApiError::UnregisteredEmployee(ref rut) if rut == "XY-999"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("XY-999"));

        let err: ApiError = RegistrationError::InactiveEmployee("CD-456".into()).into();
        assert!(matches!(err, ApiError::InactiveEmployee(ref rut) if rut == "CD-456"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("inactive"));

        let err: ApiError = RegistrationError::Storage(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
