use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::state::AppState;
use crate::db::{MessageRepository, SessionRepository};
use crate::error::AppError;
use crate::prompt::truncate_chars;

pub const DEFAULT_TITLE: &str = "New Chat";

/// Derived titles keep the first 30 characters of the message, marking
/// truncation with an ellipsis.
const TITLE_PREFIX_LEN: usize = 30;

#[derive(Debug, Deserialize)]
pub struct ListSessionsQuery {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub user_id: i64,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameSessionRequest {
    pub title: String,
}

pub(crate) fn derive_title(message: &str) -> String {
    if message.chars().count() > TITLE_PREFIX_LEN {
        format!("{}...", truncate_chars(message, TITLE_PREFIX_LEN))
    } else {
        message.to_string()
    }
}

/// GET /api/sessions?user_id=
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<ListSessionsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let sessions = SessionRepository::list_for_user(&state.db, query.user_id).await?;

    let sessions: Vec<_> = sessions
        .into_iter()
        .map(|s| json!({"id": s.id, "title": s.title, "created_at": s.created_at}))
        .collect();

    Ok(Json(json!({ "sessions": sessions })))
}

/// POST /api/sessions
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let title = req.title.unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let session_id = SessionRepository::create(&state.db, req.user_id, &title).await?;

    tracing::debug!(session_id, user_id = req.user_id, "Created chat session");

    Ok(Json(json!({ "session_id": session_id, "title": title })))
}

/// DELETE /api/sessions/{id} — cascades to the session's messages.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    SessionRepository::delete_with_messages(&state.db, session_id).await?;

    tracing::debug!(session_id, "Deleted chat session");

    Ok(Json(json!({ "success": true })))
}

/// PUT /api/sessions/{id} — unconditional rename; absent ids update zero rows.
pub async fn rename_session(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
    Json(req): Json<RenameSessionRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    SessionRepository::rename(&state.db, session_id, &req.title).await?;

    Ok(Json(json!({ "success": true })))
}

/// POST /api/sessions/{id}/update-title — derives the title from the earliest
/// message turn.
pub async fn update_title(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let derived = MessageRepository::first_in_session(&state.db, session_id)
        .await?
        .map(|turn| derive_title(&turn.message))
        .ok_or(AppError::NoMessages);

    match derived {
        Ok(title) => {
            SessionRepository::rename(&state.db, session_id, &title).await?;
            Ok(Json(json!({ "success": true, "title": title })))
        }
        Err(_) => Ok(Json(json!({ "success": false }))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_titles_pass_through_unmodified() {
        assert_eq!(derive_title("hello"), "hello");
        let exactly_thirty = "a".repeat(30);
        assert_eq!(derive_title(&exactly_thirty), exactly_thirty);
    }

    #[test]
    fn long_titles_truncate_to_thirty_chars_with_ellipsis() {
        let thirty_five = "b".repeat(35);
        let derived = derive_title(&thirty_five);
        assert_eq!(derived, format!("{}...", "b".repeat(30)));
        assert_eq!(derived.chars().count(), 33);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let message = "é".repeat(31);
        assert_eq!(derive_title(&message), format!("{}...", "é".repeat(30)));
    }
}
