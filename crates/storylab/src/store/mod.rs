//! # Storage Layer
//!
//! This module defines the storage abstraction for storylab. The [`DataStore`]
//! trait lets the application work with different storage backends.
//!
//! ## Unit of Storage
//!
//! A book and every row that belongs to it (parts, chapters, themes, tags,
//! tag links, characters, boards, cards, grid cells) are stored together as one
//! [`BookRecord`](crate::model::BookRecord). This gives us the two guarantees
//! the rest of the crate relies on:
//!
//! - **Consistent reads**: [`DataStore::snapshot`] loads the whole record once,
//!   so an export never sees half of a concurrent change.
//! - **All-or-nothing writes**: [`DataStore::transaction`] hands a working copy
//!   to a closure and commits it with a single atomic backend write, only if
//!   the closure returns `Ok`. Any error drops the working copy.
//!
//! ## Referential Checks
//!
//! Inside a transaction, inserts verify that the rows they point at exist and
//! bulk deletes refuse to remove rows that are still referenced. Callers must
//! therefore delete in reverse dependency order:
//!
//! ```text
//! grid cells → cards → boards → tag links → tags → characters → chapters → parts → themes
//! ```
//!
//! Records written by older versions (or by hand) may still contain ids that
//! do not resolve; readers treat those as absent.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: JSON files on disk, one per book.
//! - [`memory::InMemoryStore`]: For testing logic without filesystem I/O.

use crate::error::Result;
use crate::model::{Book, BookTables, UserId};
use uuid::Uuid;

pub mod backend;
pub mod fs;
pub mod fs_backend;
pub mod mem_backend;
pub mod memory;
pub mod story_store;
pub mod tables;
pub mod transaction;

pub use transaction::Transaction;

/// A read-only, consistent copy of one book and its rows.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub book: Book,
    pub tables: BookTables,
}

/// Abstract interface for book storage.
pub trait DataStore {
    /// Store a new book with no content.
    fn create_book(&mut self, book: &Book) -> Result<()>;

    /// Replace the book row of an existing book, keeping its content.
    fn save_book(&mut self, book: &Book) -> Result<()>;

    /// Get a book by ID
    fn get_book(&self, id: &Uuid) -> Result<Book>;

    /// List the books owned by `owner`, ordered by title.
    fn list_books(&self, owner: &UserId) -> Result<Vec<Book>>;

    /// Delete a book and all of its rows.
    fn delete_book(&mut self, id: &Uuid) -> Result<()>;

    /// Read a book and all of its rows in one consistent pass.
    fn snapshot(&self, id: &Uuid) -> Result<Snapshot>;

    /// Run `f` against a working copy of the book and commit it atomically if
    /// `f` succeeds. Errors from `f` or from the commit are returned untouched.
    fn transaction<T, F>(&mut self, id: &Uuid, f: F) -> Result<T>
    where
        F: FnOnce(&mut Transaction) -> Result<T>;
}
