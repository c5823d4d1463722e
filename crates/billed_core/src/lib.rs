//! Billed Core Library
//!
//! The new-bill workflow of the Billed expense-report app:
//! - Receipt upload with extension checks
//! - Bill assembly and submission through a pluggable bills service
//! - Session identity and navigation as injected collaborators
//! - A local, content-addressed bills store
//!
//! # Quick Start
//!
//! ```
//! use billed_core::{
//!     BillFields, BillsList, FileChangeEvent, MemorySessionStore, MockBillsService, NewBill,
//!     ReceiptFile, Route, SessionUser, SubmitEvent,
//! };
//! use std::sync::Arc;
//!
//! let service = Arc::new(MockBillsService::with_fixtures());
//! let session = Arc::new(MemorySessionStore::signed_in(&SessionUser::employee("a@a")).unwrap());
//! let mut new_bill = NewBill::new(service.clone(), session.clone(), |_: Route| {});
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! rt.block_on(async {
//!     let receipt = ReceiptFile::new("test.jpg", b"jpeg".to_vec());
//!     new_bill.handle_change_file(&mut FileChangeEvent::select(receipt)).await;
//!
//!     let mut submit = SubmitEvent::new(BillFields {
//!         date: "2022-03-04".into(),
//!         amount: "348".into(),
//!         ..BillFields::default()
//!     });
//!     new_bill.handle_submit(&mut submit).await;
//!
//!     let list = BillsList::load(service.as_ref(), session.as_ref()).await.unwrap();
//!     assert_eq!(list.len(), 5);
//! });
//! ```
//!
//! # Local Store
//!
//! Receipts are stored by BLAKE3 hash, so identical scans are kept once:
//!
//! ```
//! use billed_core::{BillsService, Config, LocalBillsStore, ReceiptFile, ReceiptUpload};
//! use tempfile::TempDir;
//!
//! let tmp = TempDir::new().unwrap();
//! let store = LocalBillsStore::open(tmp.path(), &Config::default()).unwrap();
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let (a, b) = rt.block_on(async {
//!     let upload = |name: &str| ReceiptUpload {
//!         file: ReceiptFile::new(name, b"same scan".to_vec()),
//!         email: "a@a".into(),
//!     };
//!     let a = store.create(upload("a.png")).await.unwrap();
//!     let b = store.create(upload("b.png")).await.unwrap();
//!     (a, b)
//! });
//! assert_eq!(a.file_url, b.file_url);
//! assert_ne!(a.key, b.key);
//! ```

mod bills_list;
mod bills_service;
mod config;
mod error;
mod fixtures;
mod local_store;
mod mock_store;
mod new_bill;
mod receipt;
mod receipt_id;
mod routes;
mod session_store;
mod types;

pub use bills_list::{format_date, BillRow, BillsList};
pub use bills_service::BillsService;
pub use config::{
    Config, FormConfig, ReceiptConfig, ServiceConfig, DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_PCT,
};
pub use error::{BilledError, Result};
pub use fixtures::{fixture_bills, FIXTURE_EMAIL};
pub use local_store::LocalBillsStore;
pub use mock_store::{MockBillsService, MOCK_IMAGE_BASE};
pub use new_bill::{
    BillFields, FileChangeEvent, FileChangeOutcome, NewBill, SubmitEvent, SubmitOutcome,
};
pub use receipt::{file_name_from_value, FileInput, ReceiptFile, ReceiptPolicy};
pub use receipt_id::ReceiptId;
pub use routes::{Navigator, Route};
pub use session_store::{FileSessionStore, MemorySessionStore, SessionStore, USER_KEY};
pub use types::*;
