//! Identity service: registration, login, token authentication, logout
//!
//! Owns the hash → issue → store pipeline. Constructed from application
//! state with its dependencies passed in explicitly; nothing here reads
//! ambient globals, and no behavior hangs off the user row itself.

use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::ValidateEmail;

use crate::auth::jwt::{JwtManager, AUTH_INTENT};
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, DUMMY_PASSWORD_HASH,
};
use crate::auth::sessions;
use crate::error::{ApiError, ApiResult};

/// A user row. `password_hash` stays inside this crate; responses are
/// built from the public fields only.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const USER_COLUMNS: &str = "id, email, password_hash, created_at, updated_at";

#[derive(Clone)]
pub struct IdentityService {
    pool: PgPool,
    jwt: JwtManager,
}

impl IdentityService {
    pub fn new(pool: PgPool, jwt: JwtManager) -> Self {
        Self { pool, jwt }
    }

    /// Create an account and log it in
    ///
    /// Validates email shape and password strength, hashes the password
    /// once, inserts the user, then issues and stores a first session
    /// token. A concurrent registration with the same email loses at the
    /// unique index and surfaces as `DuplicateEmail`.
    pub async fn register(&self, email: &str, password: &str) -> ApiResult<(User, String)> {
        validate_email(email)?;
        validate_password_strength(password).map_err(|m| ApiError::Validation(m.to_string()))?;

        let password_hash = hash_password(password)
            .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;

        let user: User = sqlx::query_as(&format!(
            r#"
            INSERT INTO users (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_duplicate_email)?;

        let token = self.issue_session(user.id).await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok((user, token))
    }

    /// Authenticate by credentials and open a new session
    ///
    /// Unknown email and wrong password return the same error. When the
    /// email is unknown, a dummy verification runs anyway so both
    /// failures cost one argon2 pass.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<(User, String)> {
        let user: Option<User> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(user) = user else {
            verify_password(password, DUMMY_PASSWORD_HASH);
            tracing::warn!(email = %email, "Login failed");
            return Err(ApiError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash) {
            tracing::warn!(email = %email, "Login failed");
            return Err(ApiError::InvalidCredentials);
        }

        let token = self.issue_session(user.id).await?;

        tracing::info!(user_id = %user.id, "Login succeeded");
        Ok((user, token))
    }

    /// Resolve a presented token to its user
    ///
    /// Signature check, then intent check, then user load, then
    /// session membership; every failure collapses into
    /// `Unauthenticated`. A token that verifies but was revoked, or was
    /// issued to a user that no longer exists, fails here.
    pub async fn authenticate(&self, token: &str) -> ApiResult<User> {
        let claims = self
            .jwt
            .verify(token)
            .map_err(|_| ApiError::Unauthenticated)?;

        if claims.intent != AUTH_INTENT {
            return Err(ApiError::Unauthenticated);
        }

        let user: Option<User> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(claims.sub)
        .fetch_optional(&self.pool)
        .await?;

        let Some(user) = user else {
            return Err(ApiError::Unauthenticated);
        };

        if !sessions::is_session_valid(&self.pool, token, user.id).await? {
            tracing::debug!(user_id = %user.id, "Token not in session store");
            return Err(ApiError::Unauthenticated);
        }

        Ok(user)
    }

    /// Revoke exactly the presented token
    pub async fn logout(&self, user_id: Uuid, token: &str) -> ApiResult<()> {
        let removed = sessions::revoke_session(&self.pool, user_id, token).await?;
        if !removed {
            // Raced with another logout for the same token; nothing left to do
            tracing::debug!(user_id = %user_id, "Logout for an already-revoked token");
        }

        Ok(())
    }

    /// Update email and/or password
    ///
    /// Only the supplied fields are touched: an email-only update runs
    /// an UPDATE that never mentions `password_hash`, so the hash is
    /// recomputed exactly when a new plaintext arrives. A password
    /// change revokes every session, forcing all logins out.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        email: Option<&str>,
        password: Option<&str>,
    ) -> ApiResult<User> {
        if let Some(email) = email {
            validate_email(email)?;
        }

        let new_hash = match password {
            Some(password) => {
                validate_password_strength(password)
                    .map_err(|m| ApiError::Validation(m.to_string()))?;
                Some(
                    hash_password(password)
                        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?,
                )
            }
            None => None,
        };

        let user: Option<User> = match (email, &new_hash) {
            (Some(email), Some(hash)) => {
                sqlx::query_as(&format!(
                    r#"
                    UPDATE users
                    SET email = $2, password_hash = $3, updated_at = NOW()
                    WHERE id = $1
                    RETURNING {USER_COLUMNS}
                    "#,
                ))
                .bind(user_id)
                .bind(email)
                .bind(hash)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_duplicate_email)?
            }
            (Some(email), None) => {
                sqlx::query_as(&format!(
                    r#"
                    UPDATE users
                    SET email = $2, updated_at = NOW()
                    WHERE id = $1
                    RETURNING {USER_COLUMNS}
                    "#,
                ))
                .bind(user_id)
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_duplicate_email)?
            }
            (None, Some(hash)) => {
                sqlx::query_as(&format!(
                    r#"
                    UPDATE users
                    SET password_hash = $2, updated_at = NOW()
                    WHERE id = $1
                    RETURNING {USER_COLUMNS}
                    "#,
                ))
                .bind(user_id)
                .bind(hash)
                .fetch_optional(&self.pool)
                .await?
            }
            (None, None) => {
                return Err(ApiError::Validation("no fields to update".to_string()));
            }
        };

        let Some(user) = user else {
            // Account deleted between authentication and this update
            return Err(ApiError::Unauthenticated);
        };

        if new_hash.is_some() {
            sessions::revoke_all_sessions(&self.pool, user_id).await?;
            tracing::info!(user_id = %user_id, "Password changed");
        }

        Ok(user)
    }

    /// Delete the account; sessions and records go with it in the same
    /// statement via cascade
    pub async fn delete_account(&self, user_id: Uuid) -> ApiResult<()> {
        let rows_affected = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(ApiError::NotFound);
        }

        tracing::info!(user_id = %user_id, "Account deleted");
        Ok(())
    }

    /// Sign a token for the user and append it to the session store
    async fn issue_session(&self, user_id: Uuid) -> ApiResult<String> {
        let token = self
            .jwt
            .issue(user_id, AUTH_INTENT)
            .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))?;

        sessions::save_session(&self.pool, user_id, &token).await?;
        Ok(token)
    }
}

fn validate_email(email: &str) -> ApiResult<()> {
    if !email.validate_email() {
        return Err(ApiError::Validation("email is not valid".to_string()));
    }
    Ok(())
}

fn map_duplicate_email(e: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(ref db) = e {
        if db.constraint() == Some("users_email_key") {
            return ApiError::DuplicateEmail;
        }
    }
    ApiError::Database(e)
}
