//! CLI commands.

pub mod init;
pub mod list;
pub mod new;
pub mod session;

use anyhow::{bail, Context, Result};
use billed_core::{Config, FileSessionStore, LocalBillsStore};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Data directory, relative to the working directory.
pub const DATA_DIR: &str = ".billed";

/// Handles on an initialized `.billed/` directory.
pub struct DataDir {
    pub config: Config,
    pub store: LocalBillsStore,
    pub session: FileSessionStore,
}

impl DataDir {
    /// Opens `.billed/` in the current directory.
    pub fn open() -> Result<Self> {
        let root = PathBuf::from(DATA_DIR);
        if !root.is_dir() {
            bail!("No {} directory here. Run `billed init` first.", DATA_DIR);
        }
        let config = Config::load(&root).context("Failed to load config.toml")?;
        let store = LocalBillsStore::open(store_dir(&root), &config)
            .context("Failed to open bills store")?;
        debug!(store = %store.root().display(), "Opened data directory");
        Ok(Self {
            session: FileSessionStore::new(session_path(&root)),
            config,
            store,
        })
    }
}

pub fn store_dir(root: &Path) -> PathBuf {
    root.join("store")
}

pub fn session_path(root: &Path) -> PathBuf {
    root.join("session.json")
}
