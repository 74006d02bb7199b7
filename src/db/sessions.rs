use sqlx::{Pool, Sqlite};

use crate::db::models::ChatSession;
use crate::error::AppError;

pub struct SessionRepository;

impl SessionRepository {
    pub async fn create(
        pool: &Pool<Sqlite>,
        user_id: i64,
        title: &str,
    ) -> Result<i64, AppError> {
        let created_at = chrono::Utc::now().to_rfc3339();

        let done = sqlx::query(
            "INSERT INTO chat_sessions (user_id, title, created_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(title)
        .bind(created_at)
        .execute(pool)
        .await?;

        Ok(done.last_insert_rowid())
    }

    pub async fn list_for_user(
        pool: &Pool<Sqlite>,
        user_id: i64,
    ) -> Result<Vec<ChatSession>, AppError> {
        let sessions = sqlx::query_as::<_, ChatSession>(
            r#"
SELECT id, user_id, title, created_at
FROM chat_sessions
WHERE user_id = ?
ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(sessions)
    }

    /// Unconditional title overwrite; an absent session id updates zero rows.
    pub async fn rename(
        pool: &Pool<Sqlite>,
        session_id: i64,
        title: &str,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE chat_sessions SET title = ? WHERE id = ?")
            .bind(title)
            .bind(session_id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Deletes the session and every turn it owns inside one transaction, so
    /// a failure between the two deletes cannot leave a partial cascade.
    pub async fn delete_with_messages(
        pool: &Pool<Sqlite>,
        session_id: i64,
    ) -> Result<(), AppError> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM messages WHERE session_id = ?")
            .bind(session_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM chat_sessions WHERE id = ?")
            .bind(session_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
