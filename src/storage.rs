use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::StoreError;

// 1. SessionStore Contract
/// SessionStore
///
/// The durable key/value port the session is persisted through. The manager only
/// ever touches one key, but the port stays generic so any medium (a file, a
/// browser-side storage bridge, an in-memory map) can sit behind it.
///
/// All three operations complete before returning: a value written by `set` is
/// visible to every later `get`, including one made by a new process.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the raw text stored under `key`, or `None` when nothing is stored.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing whatever was there.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// SessionStoreState
///
/// The shared handle the manager and the application state hold.
pub type SessionStoreState = Arc<dyn SessionStore>;

/// sanitize_key
///
/// Reduces a key to a single safe file name component: path separators, `.` and
/// `..` segments are dropped so a key can never address anything outside the
/// store directory.
fn sanitize_key(key: &str) -> String {
    let joined = key
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("_");

    if joined.is_empty() {
        "_".to_string()
    } else {
        joined
    }
}

// 2. The File Implementation
/// FileSessionStore
///
/// Keeps each key in `<dir>/<key>.json`. Writes go to a temp file that is synced
/// and then renamed over the target, so a crash mid-write leaves either the old
/// record or the new one, never a torn file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Full path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read {
                key: key.to_string(),
                path,
                source,
            }),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::CreateDir {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.path_for(key);
        let temp_path = self
            .dir
            .join(format!(".{}.{}.tmp", sanitize_key(key), Uuid::new_v4()));

        let write_err = |source: std::io::Error| StoreError::Write {
            key: key.to_string(),
            path: temp_path.clone(),
            source,
        };

        let mut file = tokio::fs::File::create(&temp_path).await.map_err(write_err)?;
        file.write_all(value.as_bytes()).await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;
        drop(file);

        if let Err(source) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StoreError::Write {
                key: key.to_string(),
                path,
                source,
            });
        }

        tracing::debug!(path = ?path, "Session record written");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = ?path, "Session record deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Delete {
                key: key.to_string(),
                path,
                source,
            }),
        }
    }
}

// 3. The In-Memory Implementation (For Tests)
/// MemorySessionStore
///
/// A `HashMap` behind a mutex. Clones share the same map, which is how tests
/// simulate a restart: build a second manager over a clone of the first store.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Plants raw text under `key`, bypassing serialization. Used to stage
    /// corrupt or hand-written records.
    pub fn seed(&self, key: &str, raw: &str) {
        self.lock().insert(key.to_string(), raw.to_string());
    }

    /// Raw text currently stored under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map still holds consistent strings; keep serving it.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.should_fail {
            return Err(StoreError::Unavailable(
                "Mock Session Store Error: Simulation requested".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check()?;
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.check()?;
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::sanitize_key;

    #[test]
    fn sanitize_key_strips_traversal() {
        assert_eq!(sanitize_key("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_key("user"), "user");
        assert_eq!(sanitize_key(".."), "_");
        assert_eq!(sanitize_key("a\\..\\b"), "a_b");
    }
}
