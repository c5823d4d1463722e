//! Remote bills collection interface.

use crate::error::Result;
use crate::types::{Bill, CreatedReceipt, ReceiptUpload};
use async_trait::async_trait;

/// Handle on the bills collection of the backend.
///
/// `create` uploads a receipt and registers a draft record; `update`
/// finalizes that draft with the completed bill. Only finalized bills are
/// returned by `list`.
#[async_trait]
pub trait BillsService: Send + Sync {
    /// Uploads a receipt for `upload.email` and opens a draft record.
    ///
    /// # Errors
    ///
    /// Returns a transport or HTTP error when the upload is refused.
    async fn create(&self, upload: ReceiptUpload) -> Result<CreatedReceipt>;

    /// Finalizes the draft identified by `selector` with `bill`.
    ///
    /// # Errors
    ///
    /// Returns `BillNotFound` for an unknown selector, or a transport or
    /// HTTP error.
    async fn update(&self, selector: &str, bill: &Bill) -> Result<Bill>;

    /// Lists every finalized bill.
    async fn list(&self) -> Result<Vec<Bill>>;
}
