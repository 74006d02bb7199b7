pub mod gemini;
pub mod mock;

pub use gemini::GeminiBackend;
pub use mock::MockBackend;

use async_trait::async_trait;

use crate::error::AppError;

/// The external generative-text service, reduced to its one operation.
///
/// `generate` returns the model's text, which may be empty when the model
/// declines to answer; transport and parse failures are `AppError::Backend`.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AppError>;
}
