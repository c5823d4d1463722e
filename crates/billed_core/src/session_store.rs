//! Key/value session persistence holding the signed-in user.

use crate::error::{BilledError, Result};
use crate::types::SessionUser;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Key under which the session user is stored.
pub const USER_KEY: &str = "user";

/// String key/value store scoped to the current session.
pub trait SessionStore: Send + Sync {
    /// Reads a value.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value, replacing any previous one.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes a value. Missing keys are not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Deletes every value.
    fn clear(&self) -> Result<()>;
}

impl SessionUser {
    /// Reads the signed-in user, if any.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSessionUser` if the stored value is not a valid user.
    pub fn load(store: &dyn SessionStore) -> Result<Option<Self>> {
        match store.get_item(USER_KEY)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| BilledError::InvalidSessionUser(e.to_string())),
            None => Ok(None),
        }
    }

    /// Reads the signed-in user, failing with `NotSignedIn` when absent.
    pub fn require(store: &dyn SessionStore) -> Result<Self> {
        Self::load(store)?.ok_or(BilledError::NotSignedIn)
    }

    /// Stores this user as the signed-in user.
    pub fn save(&self, store: &dyn SessionStore) -> Result<()> {
        let raw =
            serde_json::to_string(self).map_err(|e| BilledError::Serialization(e.to_string()))?;
        store.set_item(USER_KEY, &raw)
    }
}

/// In-memory session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with `user` already signed in.
    pub fn signed_in(user: &SessionUser) -> Result<Self> {
        let store = Self::new();
        user.save(&store)?;
        Ok(store)
    }

    fn items(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // A poisoned map is still a valid map.
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.items().clear();
        Ok(())
    }
}

/// Session store persisted as a JSON object in a single file.
///
/// Writes are atomic using temp file + rename.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Creates a store backed by `path`. The file is created on first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| BilledError::CorruptedStore {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_vec_pretty(items)
            .map_err(|e| BilledError::Serialization(e.to_string()))?;
        let temp_path = self.path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&content)?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.read_all()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.write_all(&BTreeMap::new())
    }
}
