//! Record routes
//!
//! Every query is filtered by the authenticated user's id. A record
//! that does not exist and a record owned by someone else produce the
//! same 404; handlers never reveal which it was.

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

const RECORD_COLUMNS: &str = "id, creator_id, text, completed, completed_at, created_at, updated_at";

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Serialize, FromRow)]
pub struct Record {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub text: String,
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRecordRequest {
    pub text: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct RecordListResponse {
    pub records: Vec<Record>,
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub record: Record,
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /records
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateRecordRequest>,
) -> ApiResult<Json<Record>> {
    let text = body.text.trim();
    if text.is_empty() {
        return Err(ApiError::Validation("text must not be empty".to_string()));
    }

    let record: Record = sqlx::query_as(&format!(
        r#"
        INSERT INTO records (id, creator_id, text)
        VALUES ($1, $2, $3)
        RETURNING {RECORD_COLUMNS}
        "#,
    ))
    .bind(Uuid::new_v4())
    .bind(auth_user.user_id)
    .bind(text)
    .fetch_one(&state.pool)
    .await?;

    tracing::debug!(record_id = %record.id, user_id = %auth_user.user_id, "Record created");
    Ok(Json(record))
}

/// GET /records
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Json<RecordListResponse>> {
    let records: Vec<Record> = sqlx::query_as(&format!(
        r#"
        SELECT {RECORD_COLUMNS}
        FROM records
        WHERE creator_id = $1
        ORDER BY created_at ASC
        "#,
    ))
    .bind(auth_user.user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(RecordListResponse { records }))
}

/// GET /records/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RecordResponse>> {
    let record: Option<Record> = sqlx::query_as(&format!(
        "SELECT {RECORD_COLUMNS} FROM records WHERE id = $1 AND creator_id = $2"
    ))
    .bind(id)
    .bind(auth_user.user_id)
    .fetch_optional(&state.pool)
    .await?;

    record
        .map(|record| Json(RecordResponse { record }))
        .ok_or(ApiError::NotFound)
}

/// PATCH /records/{id}
///
/// Setting `completed` to true stamps the completion time; any other
/// update clears both completion fields.
pub async fn update(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateRecordRequest>,
) -> ApiResult<Json<RecordResponse>> {
    let (completed, completed_at) = match body.completed {
        Some(true) => (true, Some(OffsetDateTime::now_utc())),
        _ => (false, None),
    };

    let record: Option<Record> = match body.text.as_deref().map(str::trim) {
        Some("") => {
            return Err(ApiError::Validation("text must not be empty".to_string()));
        }
        Some(text) => {
            sqlx::query_as(&format!(
                r#"
                UPDATE records
                SET text = $3, completed = $4, completed_at = $5, updated_at = NOW()
                WHERE id = $1 AND creator_id = $2
                RETURNING {RECORD_COLUMNS}
                "#,
            ))
            .bind(id)
            .bind(auth_user.user_id)
            .bind(text)
            .bind(completed)
            .bind(completed_at)
            .fetch_optional(&state.pool)
            .await?
        }
        None => {
            sqlx::query_as(&format!(
                r#"
                UPDATE records
                SET completed = $3, completed_at = $4, updated_at = NOW()
                WHERE id = $1 AND creator_id = $2
                RETURNING {RECORD_COLUMNS}
                "#,
            ))
            .bind(id)
            .bind(auth_user.user_id)
            .bind(completed)
            .bind(completed_at)
            .fetch_optional(&state.pool)
            .await?
        }
    };

    record
        .map(|record| Json(RecordResponse { record }))
        .ok_or(ApiError::NotFound)
}

/// DELETE /records/{id}
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RecordResponse>> {
    let record: Option<Record> = sqlx::query_as(&format!(
        r#"
        DELETE FROM records
        WHERE id = $1 AND creator_id = $2
        RETURNING {RECORD_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(auth_user.user_id)
    .fetch_optional(&state.pool)
    .await?;

    record
        .map(|record| Json(RecordResponse { record }))
        .ok_or(ApiError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serializes_timestamps_as_rfc3339() {
        let record = Record {
            id: Uuid::new_v4(),
            creator_id: Uuid::new_v4(),
            text: "buy milk".to_string(),
            completed: false,
            completed_at: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["text"], "buy milk");
        assert_eq!(value["completed"], false);
        assert_eq!(value["completed_at"], serde_json::Value::Null);
        assert_eq!(value["created_at"], "1970-01-01T00:00:00Z");
    }

    #[test]
    fn update_request_accepts_partial_bodies() {
        let body: UpdateRecordRequest = serde_json::from_str(r#"{"completed":true}"#).unwrap();
        assert!(body.text.is_none());
        assert_eq!(body.completed, Some(true));

        let body: UpdateRecordRequest = serde_json::from_str(r#"{"text":"updated"}"#).unwrap();
        assert_eq!(body.text.as_deref(), Some("updated"));
        assert!(body.completed.is_none());
    }
}
