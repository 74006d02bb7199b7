use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String, // hex SHA-256 digest
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub created_at: String, // RFC 3339
}

/// One conversational turn: the user message and the model reply are a single
/// immutable record, written together.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MessageTurn {
    pub id: i64,
    pub session_id: i64,
    pub user_id: i64,
    pub message: String,
    pub response: String,
    pub timestamp: String, // RFC 3339
    pub file_content: String,
}
