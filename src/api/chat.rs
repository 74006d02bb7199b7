use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::state::AppState;
use crate::db::MessageRepository;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub user_id: i64,
    pub session_id: i64,
    #[serde(default)]
    pub file_context: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct MessageEntry {
    pub text: String,
    pub sender: &'static str,
    pub timestamp: String,
}

/// POST /api/chat
///
/// The wire contract is a 200 envelope carrying either the reply or an
/// error-describing string; typed failures from the service are rendered here.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    match crate::chat::respond(
        &state.db,
        state.llm.as_ref(),
        req.user_id,
        req.session_id,
        &req.message,
        &req.file_context,
    )
    .await
    {
        Ok(response) => Json(ChatResponse { response }),
        Err(e) => {
            tracing::error!(error = %e, session_id = req.session_id, "Chat turn failed");
            Json(ChatResponse {
                response: format!("Error: {}", e),
            })
        }
    }
}

/// GET /api/messages/{session_id}
///
/// Each stored turn expands into a user entry followed by a bot entry, both
/// carrying the turn's timestamp.
pub async fn list_messages(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let turns = MessageRepository::list_for_session(&state.db, session_id).await?;

    let mut messages = Vec::with_capacity(turns.len() * 2);
    for turn in turns {
        messages.push(MessageEntry {
            text: turn.message,
            sender: "user",
            timestamp: turn.timestamp.clone(),
        });
        messages.push(MessageEntry {
            text: turn.response,
            sender: "bot",
            timestamp: turn.timestamp,
        });
    }

    Ok(Json(json!({ "messages": messages })))
}

/// POST /api/upload — multipart field "file".
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Internal(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read upload: {}", e)))?;
        upload = Some((filename, data.to_vec()));
        break;
    }

    let Some((filename, data)) = upload else {
        return Ok(Json(json!({ "error": "No file uploaded" })));
    };
    if filename.is_empty() {
        return Ok(Json(json!({ "error": "No file selected" })));
    }

    match crate::chat::analyze_upload(state.llm.as_ref(), &filename, &data).await {
        Ok(result) => Ok(Json(json!({
            "analysis": result.analysis,
            "content": result.content,
        }))),
        Err(e) => {
            tracing::error!(error = %e, filename, "Upload analysis failed");
            Ok(Json(json!({
                "analysis": format!("Analysis failed: {}", e),
                "content": "",
            })))
        }
    }
}
