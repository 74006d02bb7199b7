use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Email already exists")]
    DuplicateEmail,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Session has no messages")]
    NoMessages,

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Completion backend error: {0}")]
    Backend(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Backend(err.to_string())
    }
}

// Axum IntoResponse implementation for HTTP errors. Business failures that the
// API contract wraps in a 200 envelope are rendered by the handlers instead of
// reaching this point; anything arriving here is an infrastructure failure.
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::DuplicateEmail | AppError::InvalidCredentials | AppError::NoMessages => {
                (axum::http::StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::Extraction(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
            AppError::Backend(msg) => (axum::http::StatusCode::BAD_GATEWAY, msg),
            AppError::Database(err) => (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", err),
            ),
            AppError::Config(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Internal(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
