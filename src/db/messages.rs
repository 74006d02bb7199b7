use sqlx::{Pool, Sqlite};

use crate::db::models::MessageTurn;
use crate::error::AppError;

pub struct MessageRepository;

impl MessageRepository {
    pub async fn create(
        pool: &Pool<Sqlite>,
        session_id: i64,
        user_id: i64,
        message: &str,
        response: &str,
        file_content: &str,
    ) -> Result<i64, AppError> {
        let timestamp = chrono::Utc::now().to_rfc3339();

        let done = sqlx::query(
            r#"
INSERT INTO messages (session_id, user_id, message, response, timestamp, file_content)
VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .bind(message)
        .bind(response)
        .bind(timestamp)
        .bind(file_content)
        .execute(pool)
        .await?;

        Ok(done.last_insert_rowid())
    }

    /// Full history of a session in chronological order.
    pub async fn list_for_session(
        pool: &Pool<Sqlite>,
        session_id: i64,
    ) -> Result<Vec<MessageTurn>, AppError> {
        let turns = sqlx::query_as::<_, MessageTurn>(
            r#"
SELECT id, session_id, user_id, message, response, timestamp, file_content
FROM messages
WHERE session_id = ?
ORDER BY timestamp ASC, id ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(pool)
        .await?;

        Ok(turns)
    }

    /// The `limit` most recent turns, newest first. Callers wanting
    /// chronological order reverse the result.
    pub async fn recent(
        pool: &Pool<Sqlite>,
        session_id: i64,
        limit: i64,
    ) -> Result<Vec<MessageTurn>, AppError> {
        let turns = sqlx::query_as::<_, MessageTurn>(
            r#"
SELECT id, session_id, user_id, message, response, timestamp, file_content
FROM messages
WHERE session_id = ?
ORDER BY timestamp DESC, id DESC
LIMIT ?
            "#,
        )
        .bind(session_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(turns)
    }

    pub async fn first_in_session(
        pool: &Pool<Sqlite>,
        session_id: i64,
    ) -> Result<Option<MessageTurn>, AppError> {
        let turn = sqlx::query_as::<_, MessageTurn>(
            r#"
SELECT id, session_id, user_id, message, response, timestamp, file_content
FROM messages
WHERE session_id = ?
ORDER BY timestamp ASC, id ASC
LIMIT 1
            "#,
        )
        .bind(session_id)
        .fetch_optional(pool)
        .await?;

        Ok(turn)
    }
}
