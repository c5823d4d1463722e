//! In-memory bills service with scriptable failures.

use crate::bills_service::BillsService;
use crate::error::{BilledError, Result};
use crate::fixtures::fixture_bills;
use crate::types::{Bill, CreatedReceipt, ReceiptUpload};
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Base URL of the images served by the mock backend.
pub const MOCK_IMAGE_BASE: &str = "https://localhost:3456/images";

/// First key handed out by `create`.
const FIRST_KEY: u64 = 1234;

#[derive(Debug, Clone)]
struct Draft {
    email: String,
}

#[derive(Debug)]
struct MockState {
    bills: Vec<Bill>,
    drafts: BTreeMap<String, Draft>,
    next_key: u64,
    create_failures: VecDeque<BilledError>,
    update_failures: VecDeque<BilledError>,
    uploads: Vec<ReceiptUpload>,
    create_calls: usize,
    update_calls: usize,
    list_calls: usize,
}

/// Bills service backed by memory, for tests and demos.
///
/// `create` answers `{ fileUrl: "https://localhost:3456/images/<name>", key }`
/// with keys counting up from `"1234"`. Failures queued with
/// [`fail_next_create`](Self::fail_next_create) or
/// [`fail_next_update`](Self::fail_next_update) are returned by the next
/// matching call, in order.
#[derive(Debug)]
pub struct MockBillsService {
    state: Mutex<MockState>,
}

impl MockBillsService {
    /// Creates a service with no bills.
    pub fn new() -> Self {
        Self::with_bills(Vec::new())
    }

    /// Creates a service seeded with the sample bills.
    pub fn with_fixtures() -> Self {
        Self::with_bills(fixture_bills())
    }

    /// Creates a service seeded with `bills`.
    pub fn with_bills(bills: Vec<Bill>) -> Self {
        Self {
            state: Mutex::new(MockState {
                bills,
                drafts: BTreeMap::new(),
                next_key: FIRST_KEY,
                create_failures: VecDeque::new(),
                update_failures: VecDeque::new(),
                uploads: Vec::new(),
                create_calls: 0,
                update_calls: 0,
                list_calls: 0,
            }),
        }
    }

    /// Makes the next `create` call fail with `error`.
    pub fn fail_next_create(&self, error: BilledError) {
        self.state().create_failures.push_back(error);
    }

    /// Makes the next `update` call fail with `error`.
    pub fn fail_next_update(&self, error: BilledError) {
        self.state().update_failures.push_back(error);
    }

    /// Number of `create` calls so far, failed ones included.
    pub fn create_calls(&self) -> usize {
        self.state().create_calls
    }

    /// Number of `update` calls so far, failed ones included.
    pub fn update_calls(&self) -> usize {
        self.state().update_calls
    }

    /// Number of `list` calls so far.
    pub fn list_calls(&self) -> usize {
        self.state().list_calls
    }

    /// Every upload received by a successful `create`.
    pub fn uploads(&self) -> Vec<ReceiptUpload> {
        self.state().uploads.clone()
    }

    /// Snapshot of the finalized bills.
    pub fn bills(&self) -> Vec<Bill> {
        self.state().bills.clone()
    }

    /// Number of drafts awaiting `update`.
    pub fn pending_drafts(&self) -> usize {
        self.state().drafts.len()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MockBillsService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BillsService for MockBillsService {
    async fn create(&self, upload: ReceiptUpload) -> Result<CreatedReceipt> {
        let mut state = self.state();
        state.create_calls += 1;
        if let Some(error) = state.create_failures.pop_front() {
            return Err(error);
        }

        let key = state.next_key.to_string();
        state.next_key += 1;
        let file_url = format!("{}/{}", MOCK_IMAGE_BASE, upload.file.name());

        state.drafts.insert(
            key.clone(),
            Draft {
                email: upload.email.clone(),
            },
        );
        state.uploads.push(upload);
        debug!(key = %key, file_url = %file_url, "Mock receipt created");

        Ok(CreatedReceipt { file_url, key })
    }

    async fn update(&self, selector: &str, bill: &Bill) -> Result<Bill> {
        let mut state = self.state();
        state.update_calls += 1;
        if let Some(error) = state.update_failures.pop_front() {
            return Err(error);
        }

        let mut stored = bill.clone();
        stored.id = Some(selector.to_string());

        if let Some(draft) = state.drafts.remove(selector) {
            if stored.email.is_empty() {
                stored.email = draft.email;
            }
            state.bills.push(stored.clone());
        } else if let Some(existing) = state
            .bills
            .iter_mut()
            .find(|b| b.id.as_deref() == Some(selector))
        {
            *existing = stored.clone();
        } else {
            return Err(BilledError::BillNotFound(selector.to_string()));
        }

        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<Bill>> {
        let mut state = self.state();
        state.list_calls += 1;
        Ok(state.bills.clone())
    }
}
