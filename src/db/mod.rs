pub mod messages;
pub mod models;
pub mod sessions;
pub mod users;

pub use messages::MessageRepository;
pub use models::{ChatSession, MessageTurn, User};
pub use sessions::SessionRepository;
pub use users::UserRepository;
