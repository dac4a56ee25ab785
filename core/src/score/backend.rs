//! Places a score document can live in.

use hashbrown::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::StoreError;

/// Raw key/document storage used by [`ScoreStore`](super::ScoreStore).
pub trait ScoreBackend {
    /// Document stored under `key`, `None` if nothing was stored yet
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn write(&mut self, key: &str, document: &str) -> Result<(), StoreError>;
}

impl<B: ScoreBackend + ?Sized> ScoreBackend for Box<B> {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, document: &str) -> Result<(), StoreError> {
        (**self).write(key, document)
    }
}

/// Keeps documents in memory, for tests and sessions that should not persist.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    documents: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, key: impl Into<String>, document: impl Into<String>) -> Self {
        self.documents.insert(key.into(), document.into());
        self
    }

    pub fn document(&self, key: &str) -> Option<&str> {
        self.documents.get(key).map(String::as_str)
    }
}

impl ScoreBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.documents.get(key).cloned())
    }

    fn write(&mut self, key: &str, document: &str) -> Result<(), StoreError> {
        self.documents.insert(key.to_owned(), document.to_owned());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Clone, Debug)]
pub struct FileBackend {
    base_dir: PathBuf,
}

impl FileBackend {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn document_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", key))
    }
}

impl ScoreBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.document_path(key)) {
            Ok(document) => Ok(Some(document)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&mut self, key: &str, document: &str) -> Result<(), StoreError> {
        let path = self.document_path(key);
        let temp_path = path.with_extension("json.tmp");

        fs::write(&temp_path, document)?;
        fs::rename(&temp_path, &path)?;

        log::debug!("Saved {} to {}", key, path.display());
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageBackend;

#[cfg(target_arch = "wasm32")]
mod local_storage {
    use gloo::storage::{LocalStorage, Storage};

    use super::*;

    /// Browser local storage, keys are prefixed with `squares:`.
    #[derive(Copy, Clone, Debug, Default)]
    pub struct LocalStorageBackend;

    impl LocalStorageBackend {
        const PREFIX: &'static str = "squares:";

        fn storage_key(key: &str) -> String {
            format!("{}{}", Self::PREFIX, key)
        }
    }

    impl ScoreBackend for LocalStorageBackend {
        fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
            LocalStorage::raw()
                .get_item(&Self::storage_key(key))
                .map_err(|err| StoreError::Backend(format!("{:?}", err)))
        }

        fn write(&mut self, key: &str, document: &str) -> Result<(), StoreError> {
            LocalStorage::raw()
                .set_item(&Self::storage_key(key), document)
                .map_err(|err| StoreError::Backend(format!("{:?}", err)))
        }
    }
}
