//! Gift links: storage for the photo list a shared tree is built from.
//!
//! A gift is written once under a caller-chosen id and read back by id.
//! Writing an id that already exists fails instead of overwriting.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GiftError {
    #[error("Invalid gift id {0:?}: use letters, digits, dashes or underscores")]
    InvalidId(String),

    #[error("Gift id {0:?} is already taken")]
    AlreadyExists(String),

    #[error("Gift {0:?} not found")]
    NotFound(String),

    #[error("Gift storage I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Gift record is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// One stored gift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftRecord {
    pub photo_urls: Vec<String>,
    /// Unix seconds.
    pub created_at: u64,
}

impl GiftRecord {
    pub fn new(photo_urls: Vec<String>) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            photo_urls,
            created_at,
        }
    }
}

/// Accept only non-empty `[A-Za-z0-9_-]+` ids.
pub fn validate_id(id: &str) -> Result<(), GiftError> {
    let ok = !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if ok {
        Ok(())
    } else {
        Err(GiftError::InvalidId(id.to_string()))
    }
}

/// Persistence for gift photo lists.
pub trait PhotoStore {
    /// Store `photo_urls` under `id`, exactly once.
    fn save(&mut self, id: &str, photo_urls: &[String]) -> Result<GiftRecord, GiftError>;

    /// Load the record stored under `id`.
    fn load(&self, id: &str) -> Result<GiftRecord, GiftError>;

    /// Ordered photo URLs stored under `id`.
    fn photo_urls(&self, id: &str) -> Result<Vec<String>, GiftError> {
        Ok(self.load(id)?.photo_urls)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPhotoStore {
    records: HashMap<String, GiftRecord>,
}

impl InMemoryPhotoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl PhotoStore for InMemoryPhotoStore {
    fn save(&mut self, id: &str, photo_urls: &[String]) -> Result<GiftRecord, GiftError> {
        validate_id(id)?;
        if self.records.contains_key(id) {
            return Err(GiftError::AlreadyExists(id.to_string()));
        }
        let record = GiftRecord::new(photo_urls.to_vec());
        self.records.insert(id.to_string(), record.clone());
        Ok(record)
    }

    fn load(&self, id: &str) -> Result<GiftRecord, GiftError> {
        validate_id(id)?;
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| GiftError::NotFound(id.to_string()))
    }
}

/// JSON files under `<root>/gifts/<id>.json`.
#[derive(Debug, Clone)]
pub struct FilePhotoStore {
    root: PathBuf,
}

impl FilePhotoStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.root.join("gifts").join(format!("{id}.json"))
    }
}

impl FilePhotoStore {
    /// Write `bytes` to a temp file next to the gift, then link it into
    /// place only if the id is still free. A failed write leaves nothing
    /// behind, so the id can be retried.
    fn write_new<F>(&self, id: &str, bytes: &[u8], write: F) -> Result<(), GiftError>
    where
        F: FnOnce(&mut File, &[u8]) -> io::Result<()>,
    {
        let path = self.path_for(id);
        let dir = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        write(tmp.as_file_mut(), bytes)?;
        tmp.as_file().sync_all()?;

        match tmp.persist_noclobber(&path) {
            Ok(_) => Ok(()),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                Err(GiftError::AlreadyExists(id.to_string()))
            }
            Err(e) => Err(e.error.into()),
        }
    }
}

impl PhotoStore for FilePhotoStore {
    fn save(&mut self, id: &str, photo_urls: &[String]) -> Result<GiftRecord, GiftError> {
        validate_id(id)?;
        if self.path_for(id).exists() {
            return Err(GiftError::AlreadyExists(id.to_string()));
        }

        let record = GiftRecord::new(photo_urls.to_vec());
        let bytes = serde_json::to_vec(&record)?;
        self.write_new(id, &bytes, |file, bytes| file.write_all(bytes))
            .inspect_err(|e| log::warn!("Saving gift {id} failed: {e}"))?;
        log::info!("Saved gift {id} with {} photos", record.photo_urls.len());
        Ok(record)
    }

    fn load(&self, id: &str) -> Result<GiftRecord, GiftError> {
        validate_id(id)?;
        let bytes = match fs::read(self.path_for(id)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(GiftError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id("merry-xmas_2024").is_ok());
        assert!(matches!(validate_id(""), Err(GiftError::InvalidId(_))));
        assert!(matches!(validate_id("../etc"), Err(GiftError::InvalidId(_))));
        assert!(matches!(validate_id("a b"), Err(GiftError::InvalidId(_))));
    }

    #[test]
    fn test_memory_store_rejects_duplicates() {
        let mut store = InMemoryPhotoStore::new();
        let urls = vec!["a.jpg".to_string(), "b.jpg".to_string()];
        store.save("gift", &urls).unwrap();
        assert!(matches!(
            store.save("gift", &[]),
            Err(GiftError::AlreadyExists(_))
        ));
        assert_eq!(store.photo_urls("gift").unwrap(), urls);
        assert!(matches!(store.load("other"), Err(GiftError::NotFound(_))));
    }

    #[test]
    fn test_failed_write_leaves_id_free() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = FilePhotoStore::new(dir.path());
        let urls = vec!["a.jpg".to_string()];

        // Disk fills up halfway through the record.
        let result = store.write_new("gift", br#"{"photoUrls":["a.jpg"]}"#, |file, bytes| {
            file.write_all(&bytes[..bytes.len() / 2])?;
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        });
        assert!(matches!(result, Err(GiftError::Io(_))));
        assert!(!store.path_for("gift").exists());
        let leftovers = fs::read_dir(dir.path().join("gifts")).unwrap().count();
        assert_eq!(leftovers, 0);

        store.save("gift", &urls).unwrap();
        assert_eq!(store.photo_urls("gift").unwrap(), urls);
        assert!(matches!(
            store.save("gift", &[]),
            Err(GiftError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_record_json_uses_camel_case() {
        let record = GiftRecord {
            photo_urls: vec!["x".into()],
            created_at: 5,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"photoUrls":["x"],"createdAt":5}"#);
    }
}
