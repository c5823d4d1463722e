//! Initialize a `.billed` directory.

use super::{session_path, store_dir, DATA_DIR};
use anyhow::{bail, Context, Result};
use billed_core::{Config, FileSessionStore, LocalBillsStore, SessionStore};
use std::path::Path;

/// Creates `.billed/` with default configuration, an empty store and no session.
pub fn run() -> Result<()> {
    let root = Path::new(DATA_DIR);
    if root.exists() {
        bail!("{} already exists", DATA_DIR);
    }
    std::fs::create_dir_all(root).context("Failed to create data directory")?;

    let config = Config::default();
    config.save(root).context("Failed to write config.toml")?;
    LocalBillsStore::open(store_dir(root), &config).context("Failed to create bills store")?;
    FileSessionStore::new(session_path(root))
        .clear()
        .context("Failed to create session")?;

    println!("Initialized Billed in {}/", DATA_DIR);
    println!();
    println!("Directory structure:");
    println!("  {}/config.toml     - Receipt and form settings", DATA_DIR);
    println!("  {}/session.json    - Signed-in user", DATA_DIR);
    println!("  {}/store/receipts/ - Receipt scans by content hash", DATA_DIR);
    println!("  {}/store/bills.json", DATA_DIR);
    println!();
    println!("Next: billed login <email>");

    Ok(())
}
