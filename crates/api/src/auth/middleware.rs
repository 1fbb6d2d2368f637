//! Authentication middleware for Axum
//!
//! Runs ahead of every protected handler. No token means an immediate
//! 401 without touching the identity service; an invalid, foreign, or
//! revoked token produces the same 401 with nothing to distinguish the
//! cases. On success the resolved user and the raw token ride along in
//! request extensions, so a logout handler can revoke exactly the token
//! that authenticated the request.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::auth::identity::{IdentityService, User};
use crate::error::ApiError;

/// Authenticated caller, inserted into request extensions by
/// [`require_auth`]
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    /// The exact token that authenticated this request
    pub token: String,
}

impl AuthUser {
    fn new(user: &User, token: String) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            token,
        }
    }
}

/// State needed for authentication
#[derive(Clone)]
pub struct AuthState {
    pub identity: IdentityService,
}

/// Extract the bearer token from the Authorization header
pub(crate) fn extract_bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(String::from)
}

/// Middleware that requires authentication
pub async fn require_auth(
    State(auth_state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    let Some(token) = extract_bearer_token(&request) else {
        tracing::debug!(path = %path, "require_auth: no bearer token");
        return ApiError::Unauthenticated.into_response();
    };

    match auth_state.identity.authenticate(&token).await {
        Ok(user) => {
            tracing::debug!(path = %path, user_id = %user.id, "require_auth: authenticated");
            request.extensions_mut().insert(AuthUser::new(&user, token));
            next.run(request).await
        }
        Err(err) => {
            tracing::warn!(path = %path, error = ?err, "require_auth: authentication failed");
            err.into_response()
        }
    }
}
