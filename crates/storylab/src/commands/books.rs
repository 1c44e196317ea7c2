use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::helpers::owned_book;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, StoryError};
use crate::identity::Identity;
use crate::model::{Book, NumberingMode};
use crate::store::DataStore;

/// Changes to a book's own fields. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct BookUpdate {
    pub title: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub numbering_mode: Option<NumberingMode>,
}

impl BookUpdate {
    fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.numbering_mode.is_none()
    }
}

pub fn create<S: DataStore>(
    store: &mut S,
    identity: &Identity,
    title: &str,
    description: Option<String>,
    numbering_mode: Option<NumberingMode>,
) -> Result<CmdResult> {
    let title = non_empty_title(title)?;
    let mut book = Book::new(identity.user_id.clone(), title);
    book.description = description;
    book.numbering_mode = numbering_mode.unwrap_or_default();
    store.create_book(&book)?;
    info!(book_id = %book.id, owner = %book.owner, "created book");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Created book {} ({})",
        book.title, book.id
    )));
    Ok(result.with_books(vec![book]))
}

/// The caller's books, ordered by title.
pub fn list<S: DataStore>(store: &S, identity: &Identity) -> Result<CmdResult> {
    let books = store.list_books(&identity.user_id)?;
    let mut result = CmdResult::default();
    if books.is_empty() {
        result.add_message(CmdMessage::info("No books yet."));
    }
    Ok(result.with_books(books))
}

pub fn show<S: DataStore>(store: &S, identity: &Identity, book_id: &Uuid) -> Result<CmdResult> {
    let snapshot = store.snapshot(book_id)?;
    identity.ensure_reader(&snapshot.book)?;

    let mut result = CmdResult {
        counts: Some(snapshot.tables.counts()),
        ..Default::default()
    };
    result.books.push(snapshot.book);
    Ok(result)
}

pub fn update<S: DataStore>(
    store: &mut S,
    identity: &Identity,
    book_id: &Uuid,
    update: BookUpdate,
) -> Result<CmdResult> {
    let mut book = owned_book(store, identity, book_id)?;
    let mut result = CmdResult::default();
    if update.is_empty() {
        result.add_message(CmdMessage::info("Nothing to update."));
        return Ok(result.with_books(vec![book]));
    }

    if let Some(title) = update.title {
        book.title = non_empty_title(&title)?;
    }
    if let Some(description) = update.description {
        book.description = description;
    }
    if let Some(mode) = update.numbering_mode {
        book.numbering_mode = mode;
    }
    book.updated_at = Utc::now();
    store.save_book(&book)?;

    result.add_message(CmdMessage::success(format!("Updated book {}", book.title)));
    Ok(result.with_books(vec![book]))
}

/// Deletes a book and everything in it.
pub fn delete<S: DataStore>(store: &mut S, identity: &Identity, book_id: &Uuid) -> Result<CmdResult> {
    let book = owned_book(store, identity, book_id)?;
    store.delete_book(book_id)?;
    info!(book_id = %book_id, "deleted book");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Deleted book {}", book.title)));
    Ok(result.with_books(vec![book]))
}

fn non_empty_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(StoryError::InvalidInput("book title cannot be empty".to_string()));
    }
    Ok(title.to_string())
}
