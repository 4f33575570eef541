use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;

const SLOT_EXTENSION: &str = "json";

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "io error: {err}"),
            StorageError::Json(err) => write!(f, "json error: {err}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        StorageError::Io(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        StorageError::Json(value)
    }
}

/// String-keyed slots holding string values, in the shape of browser local storage.
pub trait KeyValueStore {
    /// `Ok(None)` when nothing has been stored under `key` yet.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }
}

/// One `<key>.json` file per slot under `root`.
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.{SLOT_EXTENSION}"))
    }

    fn write_atomic(&self, path: PathBuf, bytes: &[u8]) -> Result<(), StorageError> {
        let temp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(bytes)?;
            file.sync_all()?;
        }
        fs::rename(temp_path, path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut file = match File::open(self.slot_path(key)) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let mut buf = String::new();
        file.read_to_string(&mut buf)?;
        Ok(Some(buf))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.ensure_dirs()?;
        self.write_atomic(self.slot_path(key), value.as_bytes())
    }
}

/// In-process slots. Counts writes and can be told to fail them.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: RefCell<HashMap<String, String>>,
    writes: Cell<usize>,
    fail_writes: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(key: &str, value: &str) -> Self {
        let storage = Self::default();
        storage
            .slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        storage
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Io(std::io::Error::other("writes disabled")));
        }
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_missing_slot_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("data"));
        assert!(storage.get_item("todos").unwrap().is_none());
    }

    #[test]
    fn file_storage_set_creates_root_and_overwrites_slot() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("data"));

        storage.set_item("todos", "[1]").unwrap();
        assert!(storage.slot_path("todos").is_file());
        assert_eq!(storage.get_item("todos").unwrap().as_deref(), Some("[1]"));

        storage.set_item("todos", "[]").unwrap();
        assert_eq!(storage.get_item("todos").unwrap().as_deref(), Some("[]"));
        // The temp file is renamed away on success.
        assert!(!storage.slot_path("todos").with_extension("tmp").exists());
    }

    #[test]
    fn file_storage_reports_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf());

        // A directory where the slot file should be cannot be read or replaced.
        fs::create_dir_all(storage.slot_path("todos")).unwrap();
        assert!(matches!(
            storage.get_item("todos"),
            Err(StorageError::Io(_))
        ));
        assert!(storage.set_item("todos", "[]").is_err());

        // A file where the root directory should be.
        let blocked = dir.path().join("blocked");
        fs::write(&blocked, b"x").unwrap();
        let storage = FileStorage::new(blocked);
        assert!(storage.set_item("todos", "[]").is_err());
    }

    #[test]
    fn memory_storage_counts_writes_and_can_fail() {
        let storage = MemoryStorage::with_item("todos", "[]");
        assert_eq!(storage.get_item("todos").unwrap().as_deref(), Some("[]"));
        assert_eq!(storage.writes(), 0);

        storage.set_item("todos", "[1]").unwrap();
        assert_eq!(storage.writes(), 1);

        storage.set_fail_writes(true);
        assert!(storage.set_item("todos", "[2]").is_err());
        assert_eq!(storage.writes(), 1);
        assert_eq!(storage.get_item("todos").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn storage_error_display_names_the_source() {
        let io = StorageError::from(std::io::Error::other("disk full"));
        assert_eq!(io.to_string(), "io error: disk full");

        let json_err = serde_json::from_str::<Vec<i64>>("{").unwrap_err();
        let json = StorageError::from(json_err);
        assert!(json.to_string().starts_with("json error: "));
    }
}
