//! # Command Layer
//!
//! This module contains the **core business logic** of storylab. Commands are
//! grouped by the part of the book they work on:
//!
//! - [`books`]: create, list, show, update and delete books
//! - [`outline`]: parts, chapters, themes, tags, characters and the theme grid
//! - [`corkboard`]: boards and rank-ordered cards
//! - [`template`]: export a book as a template, import one back
//! - [`helpers`]: resolving user references to ids, permission lookups
//!
//! ## Role and Responsibilities
//!
//! Commands:
//! - Check the caller's permissions against the book before doing anything
//! - Run every change inside one store transaction
//! - Return a structured [`CmdResult`] with the rows they touched and messages
//!
//! Commands never print, never read stdin and never exit. The only I/O they do
//! is writing an exported template file when asked to.
//!
//! ## Permissions
//!
//! Reading a book (show, list its outline or cards, export) needs
//! [`Identity::can_read`](crate::identity::Identity::can_read). Every change
//! needs [`Identity::owns`](crate::identity::Identity::owns).
//!
//! ## Testing Strategy
//!
//! Command tests use `InMemoryStore` and the fixtures in
//! [`crate::store::memory::fixtures`], and assert on `CmdResult` contents and
//! on the stored rows.

use std::path::PathBuf;

use serde::Serialize;

use crate::model::{Book, Card, Chapter, Part, TableCounts};
use crate::template::ImportSummary;

pub mod books;
pub mod corkboard;
pub mod helpers;
pub mod outline;
pub mod template;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// One part of a book outline and its chapters in order.
///
/// `part` is `None` for the trailing section that collects chapters outside
/// any part.
#[derive(Debug, Clone, Serialize)]
pub struct OutlineSection {
    pub part: Option<Part>,
    pub chapters: Vec<Chapter>,
}

/// An exported template, ready to be written or printed.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateExport {
    /// `<book-slug>-template.json`
    pub file_name: String,
    pub json: String,
    /// Where the file was written, if it was.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    /// Books created, listed or shown.
    pub books: Vec<Book>,
    /// Row counts of the single book shown by `books::show`.
    pub counts: Option<TableCounts>,
    pub outline: Vec<OutlineSection>,
    /// Cards created, moved or listed, in lane order.
    pub cards: Vec<Card>,
    pub export: Option<TemplateExport>,
    pub import: Option<ImportSummary>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_books(mut self, books: Vec<Book>) -> Self {
        self.books = books;
        self
    }

    pub fn with_cards(mut self, cards: Vec<Card>) -> Self {
        self.cards = cards;
        self
    }
}
