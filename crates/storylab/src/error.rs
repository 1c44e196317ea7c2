use thiserror::Error;
use uuid::Uuid;

use crate::model::UserId;

#[derive(Error, Debug)]
pub enum StoryError {
    #[error("Book not found: {0}")]
    BookNotFound(Uuid),

    #[error("{kind} not found: {id}")]
    EntityNotFound { kind: &'static str, id: Uuid },

    #[error("User {user} is not allowed to modify book {book}")]
    Unauthorized { user: UserId, book: Uuid },

    #[error("Invalid template at `{path}`: {reason}")]
    InvalidTemplate { path: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl StoryError {
    pub(crate) fn invalid_template(path: impl Into<String>, reason: impl Into<String>) -> Self {
        StoryError::InvalidTemplate {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoryError>;
