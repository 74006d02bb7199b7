use std::sync::Arc;

use sqlx::{Pool, Sqlite};

use crate::config::Config;
use crate::llm::CompletionBackend;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Sqlite>,
    pub llm: Arc<dyn CompletionBackend>,
    pub config: Arc<Config>,
}
