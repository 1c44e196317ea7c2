use super::backend::StorageBackend;
use super::{DataStore, Snapshot, Transaction};
use crate::error::{Result, StoryError};
use crate::model::{Book, BookRecord, BookTables, UserId};
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

pub struct StoryStore<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
}

impl<B: StorageBackend> StoryStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn load(&self, id: &Uuid) -> Result<BookRecord> {
        self.backend
            .load_record(id)?
            .ok_or(StoryError::BookNotFound(*id))
    }
}

impl<B: StorageBackend> DataStore for StoryStore<B> {
    fn create_book(&mut self, book: &Book) -> Result<()> {
        if self.backend.load_record(&book.id)?.is_some() {
            return Err(StoryError::Store(format!("Book {} already exists", book.id)));
        }
        self.backend.save_record(&BookRecord {
            book: book.clone(),
            tables: BookTables::default(),
        })
    }

    fn save_book(&mut self, book: &Book) -> Result<()> {
        let mut record = self.load(&book.id)?;
        record.book = book.clone();
        self.backend.save_record(&record)
    }

    fn get_book(&self, id: &Uuid) -> Result<Book> {
        Ok(self.load(id)?.book)
    }

    fn list_books(&self, owner: &UserId) -> Result<Vec<Book>> {
        let mut books = Vec::new();
        for id in self.backend.list_record_ids()? {
            if let Some(record) = self.backend.load_record(&id)? {
                if record.book.owner == *owner {
                    books.push(record.book);
                }
            }
        }
        books.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        Ok(books)
    }

    fn delete_book(&mut self, id: &Uuid) -> Result<()> {
        // Surface NotFound rather than silently succeeding.
        self.load(id)?;
        self.backend.delete_record(id)
    }

    fn snapshot(&self, id: &Uuid) -> Result<Snapshot> {
        let record = self.load(id)?;
        Ok(Snapshot {
            book: record.book,
            tables: record.tables,
        })
    }

    fn transaction<T, F>(&mut self, id: &Uuid, f: F) -> Result<T>
    where
        F: FnOnce(&mut Transaction) -> Result<T>,
    {
        let record = self.load(id)?;
        let mut tx = Transaction::begin(record);

        let value = f(&mut tx)?;

        if tx.is_dirty() {
            let mut record = tx.into_record();
            record.book.updated_at = Utc::now();
            self.backend.save_record(&record)?;
            debug!(book_id = %id, "committed transaction");
        }
        Ok(value)
    }
}
