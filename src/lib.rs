pub mod api;
pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod llm;
pub mod prompt;
