//! Conversation service: loads the recent history window, composes the
//! completion request, calls the backend, and persists the turn. Failures are
//! typed; the HTTP layer decides how to render them.

use sqlx::{Pool, Sqlite};

use crate::db::MessageRepository;
use crate::error::AppError;
use crate::extract;
use crate::llm::CompletionBackend;
use crate::prompt::{
    self, DOCUMENT_CONTEXT_LIMIT, EMPTY_FILE_NOTICE, EMPTY_MESSAGE_NOTICE, FALLBACK_REPLY,
    NO_ANALYSIS_NOTICE,
};

/// How many prior turns are threaded into the prompt.
pub const HISTORY_WINDOW: i64 = 3;

#[derive(Debug)]
pub struct UploadAnalysis {
    pub analysis: String,
    /// Extracted text, capped, for the caller to reuse as later document
    /// context.
    pub content: String,
}

/// Handles one chat turn and returns the reply text.
///
/// An empty or whitespace-only message short-circuits with a fixed notice:
/// no backend call, no persisted turn. A backend reply with no usable text is
/// replaced by a fixed apology, and that turn is persisted like any other.
pub async fn respond(
    pool: &Pool<Sqlite>,
    backend: &dyn CompletionBackend,
    user_id: i64,
    session_id: i64,
    message: &str,
    file_context: &str,
) -> Result<String, AppError> {
    if message.trim().is_empty() {
        return Ok(EMPTY_MESSAGE_NOTICE.to_string());
    }

    let mut history = MessageRepository::recent(pool, session_id, HISTORY_WINDOW).await?;
    history.reverse(); // newest-first fetch, chronological for the prompt

    let request = prompt::compose_chat_prompt(message, &history, file_context);

    tracing::debug!(session_id, prompt_len = request.len(), "Calling completion backend");
    let generated = backend.generate(&request).await?;

    let reply = if generated.trim().is_empty() {
        FALLBACK_REPLY.to_string()
    } else {
        generated
    };

    let stored_context = prompt::truncate_chars(file_context, DOCUMENT_CONTEXT_LIMIT);
    MessageRepository::create(pool, session_id, user_id, message, &reply, stored_context)
        .await?;

    Ok(reply)
}

/// Extracts text from an uploaded file and asks the backend for a structured
/// summary. The capped extracted text is always returned alongside the
/// analysis so the caller can thread it into later chat turns.
pub async fn analyze_upload(
    backend: &dyn CompletionBackend,
    filename: &str,
    data: &[u8],
) -> Result<UploadAnalysis, AppError> {
    let content = extract::extract_text(filename, data)?;

    if content.trim().is_empty() {
        return Ok(UploadAnalysis {
            analysis: EMPTY_FILE_NOTICE.to_string(),
            content: String::new(),
        });
    }

    let capped = prompt::truncate_chars(&content, DOCUMENT_CONTEXT_LIMIT);
    let request = prompt::compose_analysis_prompt(filename, capped);

    tracing::debug!(filename, content_len = capped.len(), "Analyzing uploaded document");
    let generated = backend.generate(&request).await?;

    let analysis = if generated.trim().is_empty() {
        NO_ANALYSIS_NOTICE.to_string()
    } else {
        generated
    };

    Ok(UploadAnalysis {
        analysis,
        content: capped.to_string(),
    })
}
