use sqlx::{Pool, Sqlite};

use crate::db::models::User;
use crate::error::AppError;

pub struct UserRepository;

impl UserRepository {
    /// Inserts a new user. A UNIQUE violation on the email column surfaces as
    /// `DuplicateEmail`; the failed insert leaves no partial state behind.
    pub async fn create(
        pool: &Pool<Sqlite>,
        email: &str,
        password_digest: &str,
    ) -> Result<i64, AppError> {
        let result = sqlx::query("INSERT INTO users (email, password) VALUES (?, ?)")
            .bind(email)
            .bind(password_digest)
            .execute(pool)
            .await;

        match result {
            Ok(done) => Ok(done.last_insert_rowid()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AppError::DuplicateEmail)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_credentials(
        pool: &Pool<Sqlite>,
        email: &str,
        password_digest: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password FROM users WHERE email = ? AND password = ?",
        )
        .bind(email)
        .bind(password_digest)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}
