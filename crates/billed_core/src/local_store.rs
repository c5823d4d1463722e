//! File-backed bills service used by the command line.
//!
//! Layout under the store root:
//!
//! ```text
//! receipts/{shard}/{hex}.{ext}   content-addressed receipt scans
//! bills.json                     drafts and finalized bills
//! bills.lock                     held while bills.json is rewritten
//! ```

use crate::bills_service::BillsService;
use crate::config::Config;
use crate::error::{BilledError, Result};
use crate::receipt_id::ReceiptId;
use crate::types::{Bill, CreatedReceipt, ReceiptUpload};
use async_trait::async_trait;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extension used for receipts whose name has none.
const FALLBACK_EXTENSION: &str = "bin";

/// A receipt uploaded by `create` whose bill has not been finalized yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct DraftRecord {
    receipt: String,
    extension: String,
    file_name: String,
    file_url: String,
    email: String,
}

/// On-disk content of `bills.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    drafts: BTreeMap<String, DraftRecord>,
    #[serde(default)]
    bills: Vec<Bill>,
}

/// Bills service persisted in a local directory.
///
/// # Examples
///
/// ```
/// use billed_core::{BillsService, Config, LocalBillsStore};
/// use tempfile::TempDir;
///
/// let tmp = TempDir::new().unwrap();
/// let store = LocalBillsStore::open(tmp.path(), &Config::default()).unwrap();
///
/// let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// assert!(rt.block_on(store.list()).unwrap().is_empty());
/// ```
#[derive(Debug)]
pub struct LocalBillsStore {
    root: PathBuf,
    max_receipt_size: usize,
    public_base_url: Option<String>,
}

impl LocalBillsStore {
    /// Opens (creating if needed) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>, config: &Config) -> Result<Self> {
        let root = root.as_ref();
        fs::create_dir_all(root.join("receipts"))?;
        let root = fs::canonicalize(root)?;

        Ok(Self {
            root,
            max_receipt_size: config.receipts.max_size_bytes,
            public_base_url: config
                .service
                .public_base_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string()),
        })
    }

    /// Returns the root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path where a receipt with this id and extension is stored.
    pub fn receipt_path(&self, id: ReceiptId, extension: &str) -> PathBuf {
        self.root
            .join("receipts")
            .join(id.shard())
            .join(format!("{}.{}", id.as_hex(), extension))
    }

    /// Reads a stored receipt back, verifying its hash.
    ///
    /// # Errors
    ///
    /// Returns `CorruptedStore` if the contents no longer match `id`.
    pub fn read_receipt(&self, id: ReceiptId, extension: &str) -> Result<Vec<u8>> {
        let path = self.receipt_path(id, extension);
        let data = fs::read(&path)?;
        let actual = ReceiptId::for_contents(&data);
        if actual != id {
            return Err(BilledError::CorruptedStore {
                path,
                reason: format!("hash mismatch: expected {}, got {}", id, actual),
            });
        }
        Ok(data)
    }

    /// Number of drafts awaiting `update`.
    pub fn pending_drafts(&self) -> Result<usize> {
        Ok(self.read_store()?.drafts.len())
    }

    /// Writes a receipt, returning its id, path, and whether it was new.
    fn put_receipt(&self, data: &[u8], extension: &str) -> Result<(ReceiptId, PathBuf, bool)> {
        if data.len() > self.max_receipt_size {
            return Err(BilledError::ReceiptTooLarge {
                size: data.len(),
                limit: self.max_receipt_size,
            });
        }

        let id = ReceiptId::for_contents(data);
        let path = self.receipt_path(id, extension);
        if path.exists() {
            return Ok((id, path, false));
        }

        let dir = path
            .parent()
            .ok_or_else(|| BilledError::Io(format!("no parent for {}", path.display())))?;
        fs::create_dir_all(dir)?;
        write_atomic(&path, data)?;
        Ok((id, path, true))
    }

    /// Checks that the receipt a draft points to is still intact.
    fn verify_draft_receipt(&self, draft: &DraftRecord) -> Result<()> {
        let id = ReceiptId::from_hex(&draft.receipt).map_err(|e| BilledError::CorruptedStore {
            path: self.store_path(),
            reason: format!("draft receipt id: {}", e),
        })?;
        self.read_receipt(id, &draft.extension)?;
        Ok(())
    }

    fn file_url(&self, id: ReceiptId, extension: &str, path: &Path) -> String {
        match &self.public_base_url {
            Some(base) => format!(
                "{}/receipts/{}/{}.{}",
                base,
                id.shard(),
                id.as_hex(),
                extension
            ),
            None => format!("file://{}", path.display()),
        }
    }

    fn store_path(&self) -> PathBuf {
        self.root.join("bills.json")
    }

    fn read_store(&self) -> Result<StoreFile> {
        let path = self.store_path();
        if !path.exists() {
            return Ok(StoreFile::default());
        }
        let content = fs::read(&path)?;
        serde_json::from_slice(&content).map_err(|e| BilledError::CorruptedStore {
            path,
            reason: e.to_string(),
        })
    }

    fn write_store(&self, store: &StoreFile) -> Result<()> {
        let content = serde_json::to_vec_pretty(store)
            .map_err(|e| BilledError::Serialization(e.to_string()))?;
        write_atomic(&self.store_path(), &content)
    }

    /// Runs a read-modify-write of `bills.json` under the store lock.
    fn with_store<T>(&self, f: impl FnOnce(&mut StoreFile) -> Result<T>) -> Result<T> {
        let _lock = StoreLock::acquire(&self.root.join("bills.lock"))?;
        let mut store = self.read_store()?;
        let value = f(&mut store)?;
        self.write_store(&store)?;
        Ok(value)
    }
}

#[async_trait]
impl BillsService for LocalBillsStore {
    async fn create(&self, upload: ReceiptUpload) -> Result<CreatedReceipt> {
        let extension = upload
            .file
            .extension()
            .unwrap_or_else(|| FALLBACK_EXTENSION.to_string());
        let key = uuid::Uuid::new_v4().simple().to_string();

        // The receipt is written under the lock and removed again if the
        // draft cannot be recorded, so a failed create leaves nothing behind.
        let mut written = None;
        let result = self.with_store(|store| {
            let (id, path, fresh) = self.put_receipt(upload.file.bytes(), &extension)?;
            if fresh {
                written = Some(path.clone());
            }
            let file_url = self.file_url(id, &extension, &path);
            store.drafts.insert(
                key.clone(),
                DraftRecord {
                    receipt: id.as_hex(),
                    extension: extension.clone(),
                    file_name: upload.file.name().to_string(),
                    file_url: file_url.clone(),
                    email: upload.email.clone(),
                },
            );
            Ok((id, file_url))
        });
        let (id, file_url) = match result {
            Ok(created) => created,
            Err(e) => {
                if let Some(path) = written {
                    let _ = fs::remove_file(path);
                }
                return Err(e);
            }
        };

        debug!(key = %key, receipt = %id, "Receipt stored");
        Ok(CreatedReceipt { file_url, key })
    }

    async fn update(&self, selector: &str, bill: &Bill) -> Result<Bill> {
        let stored = self.with_store(|store| {
            let mut stored = bill.clone();
            stored.id = Some(selector.to_string());

            if let Some(draft) = store.drafts.remove(selector) {
                self.verify_draft_receipt(&draft)?;
                if stored.file_url.is_none() {
                    stored.file_url = Some(draft.file_url);
                }
                if stored.file_name.is_none() {
                    stored.file_name = Some(draft.file_name);
                }
                store.bills.push(stored.clone());
            } else if let Some(existing) = store
                .bills
                .iter_mut()
                .find(|b| b.id.as_deref() == Some(selector))
            {
                *existing = stored.clone();
            } else {
                return Err(BilledError::BillNotFound(selector.to_string()));
            }
            Ok(stored)
        })?;

        info!(key = %selector, "Bill saved");
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<Bill>> {
        Ok(self.read_store()?.bills)
    }
}

/// Atomic write: temp file + fsync + rename.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let tmp_path = path.with_extension("tmp");
    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// RAII guard for the store lock.
struct StoreLock {
    file: File,
}

impl StoreLock {
    fn acquire(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        file.try_lock_exclusive()
            .map_err(|_| BilledError::StoreLocked)?;
        Ok(Self { file })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
