use super::fs_backend::FsBackend;
use super::story_store::StoryStore;
use std::path::PathBuf;

/// Production store: one JSON record per book under a data directory.
pub type FileStore = StoryStore<FsBackend>;

impl FileStore {
    pub fn new(data_dir: PathBuf) -> Self {
        StoryStore::with_backend(FsBackend::new(data_dir))
    }
}
