//! Content identifiers for stored receipts.

use crate::error::{BilledError, Result};
use std::fmt;

/// A 32-byte BLAKE3 hash of a receipt's contents.
///
/// The same scan always produces the same ReceiptId, so uploading a receipt
/// twice stores it once.
///
/// # Examples
///
/// ```
/// use billed_core::ReceiptId;
///
/// let id = ReceiptId::from_bytes([0xab; 32]);
/// assert_eq!(id.as_hex().len(), 64);
/// assert_eq!(id.shard(), "ab");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReceiptId([u8; 32]);

impl ReceiptId {
    /// The length of a ReceiptId as a hex string.
    pub const HEX_LEN: usize = 64;

    /// Creates a ReceiptId from raw bytes.
    #[inline]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hashes receipt contents.
    pub fn for_contents(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Returns this ReceiptId as a lowercase hex string.
    pub fn as_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns the shard prefix (first 2 hex characters).
    ///
    /// Receipts live at `receipts/{shard}/{full_hex}.{ext}`.
    pub fn shard(&self) -> String {
        hex::encode(&self.0[..1])
    }

    /// Parses a ReceiptId from a hex string.
    ///
    /// # Errors
    ///
    /// Returns `Deserialization` if the string is not 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() != Self::HEX_LEN {
            return Err(BilledError::Deserialization(format!(
                "expected {} hex chars, got {}",
                Self::HEX_LEN,
                s.len()
            )));
        }

        let bytes = hex::decode(s).map_err(|e| BilledError::Deserialization(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| BilledError::Deserialization("invalid length".to_string()))?;

        Ok(Self(arr))
    }
}

impl fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

impl fmt::Debug for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReceiptId({}...)", &self.as_hex()[..12])
    }
}
