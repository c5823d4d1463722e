//! Core data types for Billed.

use crate::error::{BilledError, Result};
use crate::receipt::ReceiptFile;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Expense category of a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ExpenseType {
    /// Travel and transport.
    #[default]
    #[serde(rename = "Transports")]
    Transports,
    /// Restaurants and bars.
    #[serde(rename = "Restaurants et bars")]
    RestaurantsEtBars,
    /// Hotels and lodging.
    #[serde(rename = "Hôtel et logement")]
    HotelEtLogement,
    /// Online services.
    #[serde(rename = "Services en ligne")]
    ServicesEnLigne,
    /// IT and electronics.
    #[serde(rename = "IT et électronique")]
    ItEtElectronique,
    /// Equipment and hardware.
    #[serde(rename = "Equipement et matériel")]
    EquipementEtMateriel,
    /// Office supplies.
    #[serde(rename = "Fournitures de bureau")]
    FournituresDeBureau,
}

impl ExpenseType {
    /// Every category, in the order the form lists them.
    pub const ALL: [ExpenseType; 7] = [
        ExpenseType::Transports,
        ExpenseType::RestaurantsEtBars,
        ExpenseType::HotelEtLogement,
        ExpenseType::ServicesEnLigne,
        ExpenseType::ItEtElectronique,
        ExpenseType::EquipementEtMateriel,
        ExpenseType::FournituresDeBureau,
    ];

    /// Label as displayed and stored.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Transports => "Transports",
            Self::RestaurantsEtBars => "Restaurants et bars",
            Self::HotelEtLogement => "Hôtel et logement",
            Self::ServicesEnLigne => "Services en ligne",
            Self::ItEtElectronique => "IT et électronique",
            Self::EquipementEtMateriel => "Equipement et matériel",
            Self::FournituresDeBureau => "Fournitures de bureau",
        }
    }
}

impl fmt::Display for ExpenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExpenseType {
    type Err = BilledError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.label() == s)
            .ok_or_else(|| BilledError::InvalidField {
                field: "type",
                reason: format!("unknown expense type {:?}", s),
            })
    }
}

/// Review status of a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    /// Awaiting admin review.
    #[default]
    Pending,
    /// Approved by an admin.
    Accepted,
    /// Rejected by an admin.
    Refused,
}

impl BillStatus {
    /// Label shown in the bills list.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "En attente",
            Self::Accepted => "Accepté",
            Self::Refused => "Refused",
        }
    }
}

/// A single expense-report record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    /// Record key assigned by the bills service.
    #[serde(default)]
    pub id: Option<String>,
    /// Expense category.
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
    /// Short name of the expense.
    #[serde(default)]
    pub name: String,
    /// Expense date, `YYYY-MM-DD`.
    pub date: String,
    /// Amount in whole euros.
    pub amount: i64,
    /// VAT amount as typed.
    #[serde(default)]
    pub vat: String,
    /// Reimbursement percentage.
    pub pct: u32,
    /// Free-form commentary.
    #[serde(default)]
    pub commentary: String,
    /// URL of the uploaded receipt.
    #[serde(default)]
    pub file_url: Option<String>,
    /// Original receipt file name.
    #[serde(default)]
    pub file_name: Option<String>,
    /// Review status.
    #[serde(default)]
    pub status: BillStatus,
    /// Admin comment, set on review.
    #[serde(default)]
    pub comment_admin: Option<String>,
    /// Owner email.
    pub email: String,
}

/// Kind of signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserType {
    /// Submits bills.
    Employee,
    /// Reviews bills.
    Admin,
}

/// The identity stored in the session under the `"user"` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Employee or Admin.
    #[serde(rename = "type")]
    pub user_type: UserType,
    /// Email, stamped on every bill the user creates.
    pub email: String,
}

impl SessionUser {
    /// Creates an employee identity.
    pub fn employee(email: impl Into<String>) -> Self {
        Self {
            user_type: UserType::Employee,
            email: email.into(),
        }
    }

    /// Creates an admin identity.
    pub fn admin(email: impl Into<String>) -> Self {
        Self {
            user_type: UserType::Admin,
            email: email.into(),
        }
    }
}

/// Payload of a `create` call: the receipt plus its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptUpload {
    /// The selected file.
    pub file: ReceiptFile,
    /// Owner email.
    pub email: String,
}

/// Result of a successful `create` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedReceipt {
    /// Where the receipt can be fetched.
    pub file_url: String,
    /// Key of the draft record, used as the `update` selector.
    pub key: String,
}

/// New-bill form state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    /// No receipt uploaded yet.
    Idle,
    /// Receipt upload in flight.
    Uploading,
    /// Receipt uploaded, form can be submitted.
    FileReady,
    /// Bill update in flight; submit control disabled.
    Submitting,
    /// Bill persisted and navigation triggered.
    Submitted,
}

impl FormState {
    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(&self, next: FormState) -> bool {
        use FormState::*;

        matches!(
            (self, next),
            (Idle, Uploading)
                | (Uploading, FileReady)
                | (Uploading, Idle)
                | (FileReady, Uploading)
                | (FileReady, Submitting)
                | (Submitting, Submitted)
                | (Submitting, FileReady)
        )
    }
}
