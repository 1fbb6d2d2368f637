//! User account routes
//!
//! Register and login answer with the public user in the body and the
//! session token in a response header; the token never appears in a
//! body. The protected routes get their caller from the guard's
//! request extension.

use axum::{
    extract::{Extension, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{AuthUser, User},
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Response header carrying the session token after register and login
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public projection of a user. The password hash and the session list
/// have no serialized form at all; this struct is the only user shape
/// that leaves the server.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

fn token_header(token: &str) -> ApiResult<[(HeaderName, HeaderValue); 1]> {
    let value = HeaderValue::from_str(token)
        .map_err(|_| ApiError::Internal("token is not a valid header value".to_string()))?;

    Ok([(HeaderName::from_static(AUTH_TOKEN_HEADER), value)])
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /users
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let (user, token) = state.identity().register(&body.email, &body.password).await?;

    Ok((token_header(&token)?, Json(PublicUser::from(&user))))
}

/// POST /users/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let (user, token) = state.identity().login(&body.email, &body.password).await?;

    Ok((token_header(&token)?, Json(PublicUser::from(&user))))
}

/// GET /users/me
pub async fn me(Extension(auth_user): Extension<AuthUser>) -> Json<PublicUser> {
    Json(PublicUser {
        id: auth_user.user_id,
        email: auth_user.email,
    })
}

/// PATCH /users/me
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> ApiResult<Json<PublicUser>> {
    let user = state
        .identity()
        .update_profile(
            auth_user.user_id,
            body.email.as_deref(),
            body.password.as_deref(),
        )
        .await?;

    Ok(Json(PublicUser::from(&user)))
}

/// DELETE /users/me/token: log out the presented session
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<StatusCode> {
    state
        .identity()
        .logout(auth_user.user_id, &auth_user.token)
        .await?;

    Ok(StatusCode::OK)
}
