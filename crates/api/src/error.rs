//! API error types
//!
//! One taxonomy for the whole surface. Handlers and services return
//! typed errors; the `IntoResponse` impl is the only place status codes
//! are decided, and it never forwards internal detail to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed input: bad email shape, weak password, empty record text
    #[error("validation failed: {0}")]
    Validation(String),

    /// Registration with an email that is already taken
    #[error("email already registered")]
    DuplicateEmail,

    /// Login failure. Unknown email and wrong password are deliberately
    /// indistinguishable to the client.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, forged, or revoked token
    #[error("authentication required")]
    Unauthenticated,

    /// Resource absent, or owned by a different user. One outcome for
    /// both so existence is not leaked.
    #[error("not found")]
    NotFound,

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(message) => error_body(StatusCode::BAD_REQUEST, &message),
            ApiError::DuplicateEmail => {
                error_body(StatusCode::BAD_REQUEST, "email already registered")
            }
            ApiError::InvalidCredentials => {
                error_body(StatusCode::BAD_REQUEST, "invalid credentials")
            }
            // Empty bodies: the client learns the status and nothing else.
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED.into_response(),
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::Database(e) => {
                tracing::error!(error = ?e, "Database query failed");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
            ApiError::Internal(message) => {
                tracing::error!(message = %message, "Internal error");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        }
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    let body = Json(json!({
        "error": message,
        "code": status.as_u16()
    }));

    (status, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let response = ApiError::Validation("email is not valid".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn credentials_and_duplicate_email_map_to_400() {
        assert_eq!(
            ApiError::InvalidCredentials.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::DuplicateEmail.into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn unauthenticated_is_401_with_empty_body() {
        let response = ApiError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response
            .headers()
            .get(axum::http::header::CONTENT_LENGTH)
            .is_none_or(|len| len == "0"));
    }

    #[test]
    fn not_found_is_404() {
        assert_eq!(
            ApiError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
