//! The authenticated caller.
//!
//! Authentication itself happens outside the library; whoever builds an
//! [`Identity`] vouches for it. Commands only ask two questions of it: may the
//! caller read a book, and may the caller change it.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoryError};
use crate::model::{Book, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Author,
    /// May read every book (exports, support). Writes still require ownership.
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

impl Identity {
    pub fn author(user_id: impl Into<String>) -> Self {
        Self {
            user_id: UserId::new(user_id),
            role: Role::Author,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: UserId::new(user_id),
            role: Role::Admin,
        }
    }

    pub fn owns(&self, book: &Book) -> bool {
        book.owner == self.user_id
    }

    pub fn can_read(&self, book: &Book) -> bool {
        self.owns(book) || self.role == Role::Admin
    }

    pub fn ensure_owner(&self, book: &Book) -> Result<()> {
        if self.owns(book) {
            Ok(())
        } else {
            Err(StoryError::Unauthorized {
                user: self.user_id.clone(),
                book: book.id,
            })
        }
    }

    pub fn ensure_reader(&self, book: &Book) -> Result<()> {
        if self.can_read(book) {
            Ok(())
        } else {
            Err(StoryError::Unauthorized {
                user: self.user_id.clone(),
                book: book.id,
            })
        }
    }
}
