use crate::error::Result;
use crate::model::BookRecord;
use uuid::Uuid;

/// Abstract interface for raw storage I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while StoryStore handles the "what" (lookups, ownership filters, transactions).
///
/// A book and all of its child rows travel as one [`BookRecord`]. Writing a
/// record is the commit point of a transaction, which is why `save_record`
/// must replace the previous record atomically.
pub trait StorageBackend {
    /// Load the record for a book.
    /// Returns Ok(None) if the book does not exist.
    fn load_record(&self, id: &Uuid) -> Result<Option<BookRecord>>;

    /// Write a record, replacing any previous version.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial commits.
    fn save_record(&self, record: &BookRecord) -> Result<()>;

    /// Remove a record. Removing a missing record is not an error.
    fn delete_record(&self, id: &Uuid) -> Result<()>;

    /// List the ids of all stored books.
    fn list_record_ids(&self) -> Result<Vec<Uuid>>;
}
