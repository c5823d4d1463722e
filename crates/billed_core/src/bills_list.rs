//! Rows of the bills page.

use crate::bills_service::BillsService;
use crate::error::Result;
use crate::session_store::SessionStore;
use crate::types::{Bill, BillStatus, SessionUser, UserType};
use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

const MONTHS: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Jui", "Jui", "Aoû", "Sep", "Oct", "Nov", "Déc",
];

/// A displayed bill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillRow {
    /// The bill as stored.
    pub bill: Bill,
    /// Formatted date, or the raw one when it does not parse.
    pub date: String,
    /// Status label.
    pub status: &'static str,
}

/// The bills visible to the session user, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillsList {
    rows: Vec<BillRow>,
}

impl BillsList {
    /// Lists bills through `service`.
    ///
    /// An employee only sees bills carrying their email; an admin sees all.
    pub async fn load(service: &dyn BillsService, session: &dyn SessionStore) -> Result<Self> {
        let user = SessionUser::require(session)?;
        let bills = service.list().await?;
        let total = bills.len();

        let visible: Vec<Bill> = match user.user_type {
            UserType::Admin => bills,
            UserType::Employee => bills.into_iter().filter(|b| b.email == user.email).collect(),
        };
        debug!(total, visible = visible.len(), "Bills listed");

        Ok(Self::from_bills(visible))
    }

    /// Builds rows from `bills` without filtering.
    pub fn from_bills(bills: Vec<Bill>) -> Self {
        let mut dated: Vec<(Option<NaiveDate>, BillRow)> = bills
            .into_iter()
            .map(|bill| {
                let parsed = NaiveDate::parse_from_str(&bill.date, "%Y-%m-%d").ok();
                let date = match parsed {
                    Some(d) => format_date(d),
                    None => {
                        warn!(date = %bill.date, "Unparseable bill date");
                        bill.date.clone()
                    }
                };
                let status = bill.status.label();
                (parsed, BillRow { bill, date, status })
            })
            .collect();

        // Newest first; `None` sorts below any date.
        dated.sort_by(|a, b| b.0.cmp(&a.0));

        Self {
            rows: dated.into_iter().map(|(_, row)| row).collect(),
        }
    }

    /// The rows, in display order.
    pub fn rows(&self) -> &[BillRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the list has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows with `status`.
    pub fn count_with_status(&self, status: BillStatus) -> usize {
        self.rows.iter().filter(|r| r.bill.status == status).count()
    }
}

/// Formats a bill date the way the bills page shows it.
///
/// ```
/// use billed_core::format_date;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2004, 4, 4).unwrap();
/// assert_eq!(format_date(date), "4 Avr. 04");
/// ```
pub fn format_date(date: NaiveDate) -> String {
    format!(
        "{} {}. {:02}",
        date.day(),
        MONTHS[date.month0() as usize],
        date.year().rem_euclid(100)
    )
}
