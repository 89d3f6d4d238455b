use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use std::fmt;

use super::ApiResponse;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    ValidationError(String),

    Conflict(String),

    ServiceUnavailable(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service is temporarily unavailable".to_string(),
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

/// Store errors surface uninterpreted from the repositories; the mapping
/// to HTTP semantics happens here.
impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => {
                ApiError::Conflict(format!("Already exists: {msg}"))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
                ApiError::Conflict(format!("Referenced entity is invalid: {msg}"))
            }
            _ => match err {
                DbErr::RecordNotUpdated => {
                    ApiError::NotFound("Entity no longer exists".to_string())
                }
                other if other.to_string().contains("CHECK constraint failed") => {
                    ApiError::ValidationError(other.to_string())
                }
                // Everything else is a storage failure the caller can only
                // retry: connection loss, pool exhaustion, failed writes.
                other => ApiError::ServiceUnavailable(other.to_string()),
            },
        }
    }
}

impl From<crate::db::OrderError> for ApiError {
    fn from(err: crate::db::OrderError) -> Self {
        match err {
            crate::db::OrderError::ProductUnavailable(id) => {
                ApiError::NotFound(format!("Product {id} does not exist or is inactive"))
            }
            crate::db::OrderError::Database(db) => db.into(),
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        ApiError::NotFound(format!("{} {} not found", resource, id))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnAcquireErr, RuntimeErr};

    #[test]
    fn test_connection_failures_map_to_service_unavailable() {
        let err: ApiError = DbErr::ConnectionAcquire(ConnAcquireErr::Timeout).into();
        assert!(matches!(err, ApiError::ServiceUnavailable(_)));
        assert_eq!(
            err.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        let err: ApiError = DbErr::Conn(RuntimeErr::Internal("connection lost".to_string())).into();
        assert!(matches!(err, ApiError::ServiceUnavailable(_)));

        let err: ApiError = DbErr::Exec(RuntimeErr::Internal("disk I/O error".to_string())).into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_missing_row_update_maps_to_not_found() {
        let err: ApiError = DbErr::RecordNotUpdated.into();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_check_violation_maps_to_bad_request() {
        let err: ApiError = DbErr::Exec(RuntimeErr::Internal(
            "CHECK constraint failed: quantity > 0".to_string(),
        ))
        .into();
        assert!(matches!(err, ApiError::ValidationError(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
