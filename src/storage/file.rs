//! Filesystem backend for keyed entries
//!
//! One file per entry under the per-session directory, named by the
//! sanitized entry key plus a `.json` suffix. File contents are the codec's
//! encoded text.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, error, warn};

use super::KeyedStore;
use crate::codec::{self, StateValue};
use crate::error::Result;

/// Filesystem store for keyed entries
pub struct FileKeyedStore {
    session_dir: PathBuf,
}

impl FileKeyedStore {
    /// Create the store, ensuring the session directory exists (idempotent,
    /// parents included)
    pub fn new(session_dir: impl Into<PathBuf>) -> Result<Self> {
        let session_dir = session_dir.into();
        std::fs::create_dir_all(&session_dir)?;

        debug!("Filesystem keyed store ready at {:?}", session_dir);
        Ok(Self { session_dir })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.session_dir.join(format!("{}.json", sanitize_key(key)))
    }
}

/// Escape characters that are unsafe in file names
///
/// `%` is escaped first, so the mapping is injective: distinct entry keys
/// never produce the same file name.
fn sanitize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            '\\' => out.push_str("%5C"),
            ':' => out.push_str("%3A"),
            _ => out.push(c),
        }
    }
    out
}

#[async_trait]
impl KeyedStore for FileKeyedStore {
    async fn write(&self, key: &str, value: &StateValue) -> Result<()> {
        let path = self.entry_path(key);

        if let Err(e) = tokio::fs::write(&path, codec::encode(value)).await {
            error!("Failed to write entry {}: {}", key, e);
            return Err(e.into());
        }

        debug!("Wrote entry: {}", key);
        Ok(())
    }

    async fn read(&self, key: &str) -> Option<StateValue> {
        let path = self.entry_path(key);

        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Entry not found: {}", key);
                return None;
            }
            Err(e) => {
                warn!("Failed to read entry {}: {}", key, e);
                return None;
            }
        };

        match codec::decode(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Failed to decode entry {}: {}", key, e);
                None
            }
        }
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key);

        if let Err(e) = tokio::fs::remove_file(&path).await {
            error!("Failed to remove entry {}: {}", key, e);
            return Err(e.into());
        }

        debug!("Removed entry: {}", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use tempfile::TempDir;

    fn test_store() -> (FileKeyedStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyedStore::new(temp_dir.path().join("session-1")).unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let (store, _dir) = test_store();

        store
            .write("pre-key-1", &StateValue::from("value"))
            .await
            .unwrap();

        let read = store.read("pre-key-1").await;
        assert_eq!(read, Some(StateValue::from("value")));
    }

    #[tokio::test]
    async fn test_read_missing_is_none() {
        let (store, _dir) = test_store();

        assert_eq!(store.read("nonexistent").await, None);
    }

    #[tokio::test]
    async fn test_remove_then_read() {
        let (store, _dir) = test_store();

        store
            .write("pre-key-1", &StateValue::from("value"))
            .await
            .unwrap();
        store.remove("pre-key-1").await.unwrap();

        assert_eq!(store.read("pre-key-1").await, None);
    }

    #[tokio::test]
    async fn test_remove_missing_is_error() {
        let (store, _dir) = test_store();

        let result = store.remove("nonexistent").await;
        assert!(matches!(result, Err(StoreError::Io(_))));
    }

    #[tokio::test]
    async fn test_corrupt_entry_reads_as_none() {
        let (store, _dir) = test_store();

        tokio::fs::write(store.entry_path("broken"), "{not json")
            .await
            .unwrap();

        assert_eq!(store.read("broken").await, None);
    }

    #[tokio::test]
    async fn test_idempotent_directory_creation() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("session-1");

        let store = FileKeyedStore::new(&dir).unwrap();
        store
            .write("pre-key-1", &StateValue::from("value"))
            .await
            .unwrap();

        // Re-creating the store for the same directory keeps existing entries
        let store = FileKeyedStore::new(&dir).unwrap();
        assert_eq!(store.read("pre-key-1").await, Some(StateValue::from("value")));
    }

    #[test]
    fn test_sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_key("app-state-sync-key-AAAAAA=="), "app-state-sync-key-AAAAAA==");
        assert_eq!(sanitize_key("sender-key-g/us:1"), "sender-key-g%2Fus%3A1");
        assert_eq!(sanitize_key("a\\b"), "a%5Cb");
    }

    #[test]
    fn test_sanitize_is_injective() {
        // A key that already contains an escape sequence must not collide
        // with the key that sanitizes to it
        assert_ne!(sanitize_key("a/b"), sanitize_key("a%2Fb"));
        assert_ne!(sanitize_key("a:b"), sanitize_key("a%3Ab"));
        assert_ne!(sanitize_key("a%b"), sanitize_key("a%25b"));
    }
}
