//! Error types for billed_core operations.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for billed_core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BilledError {
    /// The selected receipt has an extension outside the allow-list.
    #[error("receipt extension not allowed: {file_name}")]
    InvalidExtension {
        /// Name of the rejected file
        file_name: String,
    },

    /// A submit arrived before any receipt was uploaded.
    #[error("no receipt has been uploaded for this bill")]
    MissingReceipt,

    /// A form field failed validation at submit time.
    #[error("invalid field {field}: {reason}")]
    InvalidField {
        /// Form field name
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// No user is stored in the session.
    #[error("no signed-in user in session")]
    NotSignedIn,

    /// The stored session user could not be parsed.
    #[error("invalid session user: {0}")]
    InvalidSessionUser(String),

    /// The bills service could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// The bills service answered with an error status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response message
        message: String,
    },

    /// No bill (or draft) exists for the given key.
    #[error("bill not found: {0}")]
    BillNotFound(String),

    /// Receipt exceeds maximum allowed size.
    #[error("receipt too large: {size} bytes exceeds limit of {limit} bytes")]
    ReceiptTooLarge {
        /// Actual size of the receipt
        size: usize,
        /// Maximum allowed size
        limit: usize,
    },

    /// Invalid form state transition.
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        /// Source state
        from: String,
        /// Target state
        to: String,
    },

    /// The store file is corrupted or has invalid format.
    #[error("corrupted store at {}: {}", path.display(), reason)]
    CorruptedStore {
        /// Path to the corrupted file
        path: PathBuf,
        /// Description of the corruption
        reason: String,
    },

    /// Store is locked by another process.
    #[error("bill store locked by another process")]
    StoreLocked,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(String),

    /// Configuration error (loading, parsing, invalid values).
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl BilledError {
    /// Returns true when the error came from the remote bills service.
    pub fn is_service_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::Http { .. }
                | Self::BillNotFound(_)
                | Self::ReceiptTooLarge { .. }
                | Self::CorruptedStore { .. }
                | Self::StoreLocked
                | Self::Io(_)
        )
    }

    /// Returns a user-friendly recovery suggestion for the error, if available.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidExtension { .. } => Some("Choose a .jpg, .jpeg or .png receipt."),
            Self::MissingReceipt => Some("Attach a receipt before sending the bill."),
            Self::NotSignedIn => Some("Sign in first with 'billed login <email>'."),
            Self::InvalidSessionUser(_) => {
                Some("The session is unreadable. Run 'billed logout' and sign in again.")
            }
            Self::Transport(_) => Some("Check your connection and try again."),
            Self::CorruptedStore { .. } => {
                Some("Inspect .billed/bills.json, or move it aside to start from an empty store.")
            }
            Self::StoreLocked => {
                Some("Wait for the other process to finish, or remove .billed/bills.lock if it is dead.")
            }
            Self::ReceiptTooLarge { .. } => {
                Some("Use a smaller scan, or raise receipts.max_size_bytes in .billed/config.toml.")
            }
            _ => None,
        }
    }
}

impl From<std::io::Error> for BilledError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Convenience Result type for billed_core operations.
pub type Result<T> = std::result::Result<T, BilledError>;
