//! User session storage for token revocation
//!
//! One row per active login, owned by the user record (deleting the
//! user cascades to its sessions). A signed token authenticates only
//! while its row exists, so revocation is a plain delete.
//!
//! Every operation here is a single SQL statement. Concurrent logins
//! for the same user both append and both survive; a login racing a
//! logout cannot lose either write.

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::jwt::AUTH_INTENT;
use crate::error::ApiResult;

/// Append a session for a freshly issued token
///
/// Called immediately after signing; the token is not valid for
/// authentication until this insert lands.
pub async fn save_session(pool: &PgPool, user_id: Uuid, token: &str) -> ApiResult<()> {
    sqlx::query(
        r#"
        INSERT INTO user_sessions (user_id, access, token)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(user_id)
    .bind(AUTH_INTENT)
    .bind(token)
    .execute(pool)
    .await?;

    Ok(())
}

/// Check whether a token is an active session for the expected user
///
/// Scoped to the user id so a structurally valid token can never
/// authenticate as anyone but the user it was issued to, and a revoked
/// token fails even though its signature still checks out.
pub async fn is_session_valid(
    pool: &PgPool,
    token: &str,
    expected_user_id: Uuid,
) -> ApiResult<bool> {
    let result: Option<(bool,)> = sqlx::query_as(
        r#"
        SELECT TRUE
        FROM user_sessions
        WHERE token = $1
          AND user_id = $2
        "#,
    )
    .bind(token)
    .bind(expected_user_id)
    .fetch_optional(pool)
    .await?;

    Ok(result.is_some())
}

/// Revoke a single session by token value
///
/// Removes exactly the presented token; the user's other sessions are
/// untouched. Returns true if a session was found and removed.
pub async fn revoke_session(pool: &PgPool, user_id: Uuid, token: &str) -> ApiResult<bool> {
    let rows_affected = sqlx::query(
        r#"
        DELETE FROM user_sessions
        WHERE user_id = $1
          AND token = $2
        "#,
    )
    .bind(user_id)
    .bind(token)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows_affected > 0)
}

/// Revoke every session for a user
///
/// Called when the user changes their password; every outstanding login
/// is forced out at once.
pub async fn revoke_all_sessions(pool: &PgPool, user_id: Uuid) -> ApiResult<u64> {
    let rows_affected = sqlx::query(
        r#"
        DELETE FROM user_sessions
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?
    .rows_affected();

    if rows_affected > 0 {
        tracing::info!(user_id = %user_id, count = rows_affected, "Revoked all sessions");
    }

    Ok(rows_affected)
}
