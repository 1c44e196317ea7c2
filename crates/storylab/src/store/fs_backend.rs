use super::backend::StorageBackend;
use crate::error::{Result, StoryError};
use crate::model::BookRecord;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Filesystem backend: one pretty-printed JSON file per book.
///
/// ```text
/// <root>/
/// ├── book-{uuid}.json
/// └── .book-{uuid}.tmp     # only while a commit is in flight
/// ```
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &Uuid) -> PathBuf {
        self.root.join(format!("book-{}.json", id))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(StoryError::Io)?;
        }
        Ok(())
    }
}

impl StorageBackend for FsBackend {
    fn load_record(&self, id: &Uuid) -> Result<Option<BookRecord>> {
        let path = self.record_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(StoryError::Io)?;
        let record: BookRecord =
            serde_json::from_str(&content).map_err(StoryError::Serialization)?;
        Ok(Some(record))
    }

    fn save_record(&self, record: &BookRecord) -> Result<()> {
        self.ensure_dir()?;

        let target = self.record_path(&record.book.id);
        let content = serde_json::to_string_pretty(record).map_err(StoryError::Serialization)?;

        // Atomic Write
        let tmp = self.root.join(format!(".book-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, content).map_err(StoryError::Io)?;
        fs::rename(&tmp, target).map_err(StoryError::Io)?;

        Ok(())
    }

    fn delete_record(&self, id: &Uuid) -> Result<()> {
        let path = self.record_path(id);
        if path.exists() {
            fs::remove_file(path).map_err(StoryError::Io)?;
        }
        Ok(())
    }

    fn list_record_ids(&self) -> Result<Vec<Uuid>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        let entries = fs::read_dir(&self.root).map_err(StoryError::Io)?;

        for entry in entries {
            let entry = entry.map_err(StoryError::Io)?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
            if let (true, Some(uuid_part)) = (is_json, stem.strip_prefix("book-")) {
                if let Ok(id) = Uuid::parse_str(uuid_part) {
                    ids.push(id);
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}
