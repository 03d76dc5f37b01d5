use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;

use crate::repository::StoreError;
use crate::services::RestaurantError;

#[derive(Debug)]
pub enum AppError {
    DatabaseError(StoreError),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    ValidationError(String),
    Internal(String),
}

impl AppError {
    pub fn db(err: StoreError) -> Self {
        AppError::DatabaseError(err)
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Integrity violations come from bad input (unknown category and the like).
            AppError::DatabaseError(StoreError::Constraint(msg)) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::DatabaseError(err) => {
                tracing::error!(error = %err, "Storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::DatabaseError(err)
    }
}

impl From<RestaurantError> for AppError {
    fn from(err: RestaurantError) -> Self {
        match err {
            RestaurantError::NotFound(_) => AppError::NotFound("Restaurant not found".to_string()),
            RestaurantError::Storage(e) => AppError::db(e),
            RestaurantError::Validation(msg) => AppError::ValidationError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn restaurant_errors_map_to_status_codes() {
        assert_eq!(
            status_of(RestaurantError::NotFound(1).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(RestaurantError::Validation("bad".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(RestaurantError::Storage(StoreError::Constraint("fk".into())).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(RestaurantError::Storage(StoreError::Database(sqlx::Error::PoolTimedOut)).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn auth_errors_map_to_status_codes() {
        assert_eq!(status_of(AppError::unauthorized("no token")), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AppError::forbidden("not yours")), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AppError::internal("boom")), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
