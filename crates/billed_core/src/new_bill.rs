//! The new-bill form container.
//!
//! `NewBill` reacts to two form events. A file change validates and uploads
//! the receipt; a submit assembles the bill and finalizes it. Handlers never
//! return errors: failures are logged, kept as [`NewBill::last_error`], and
//! reported through the returned outcome so the form stays usable.

use crate::bills_service::BillsService;
use crate::config::{Config, DEFAULT_PCT};
use crate::error::{BilledError, Result};
use crate::receipt::{file_name_from_value, FileInput, ReceiptFile, ReceiptPolicy};
use crate::routes::{Navigator, Route};
use crate::session_store::SessionStore;
use crate::types::{Bill, BillStatus, ExpenseType, FormState, ReceiptUpload, SessionUser};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// A change on the receipt file input.
#[derive(Debug, Clone, Default)]
pub struct FileChangeEvent {
    /// Value shown by the input, e.g. `C:\fakepath\test.jpg`.
    pub value: String,
    /// Selected files; only the first one is used.
    pub files: Vec<ReceiptFile>,
    default_prevented: bool,
}

impl FileChangeEvent {
    /// A change showing `value` with `files` selected.
    pub fn new(value: impl Into<String>, files: Vec<ReceiptFile>) -> Self {
        Self {
            value: value.into(),
            files,
            default_prevented: false,
        }
    }

    /// A selection of a single file, with the value a browser would show.
    pub fn select(file: ReceiptFile) -> Self {
        Self::new(format!("C:\\fakepath\\{}", file.name()), vec![file])
    }

    /// Marks the event as handled.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether a handler prevented the default action.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Raw values of the form's bill fields, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillFields {
    /// Selected expense category label.
    pub expense_type: String,
    /// Expense name.
    pub name: String,
    /// Date picker value, `YYYY-MM-DD`.
    pub date: String,
    /// Amount input.
    pub amount: String,
    /// VAT input.
    pub vat: String,
    /// Percentage input; empty means the default.
    pub pct: String,
    /// Commentary text area.
    pub commentary: String,
}

impl Default for BillFields {
    fn default() -> Self {
        Self {
            expense_type: ExpenseType::default().label().to_string(),
            name: String::new(),
            date: String::new(),
            amount: String::new(),
            vat: String::new(),
            pct: String::new(),
            commentary: String::new(),
        }
    }
}

/// Submission of the new-bill form.
#[derive(Debug, Clone, Default)]
pub struct SubmitEvent {
    /// Current field values.
    pub fields: BillFields,
    default_prevented: bool,
}

impl SubmitEvent {
    /// A submit carrying `fields`.
    pub fn new(fields: BillFields) -> Self {
        Self {
            fields,
            default_prevented: false,
        }
    }

    /// Marks the event as handled.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether a handler prevented the default action.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// What a file change did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChangeOutcome {
    /// The selection was refused and the input cleared.
    Rejected {
        /// Name of the refused file, empty when nothing was selected.
        file_name: String,
    },
    /// The receipt was uploaded.
    Uploaded {
        /// Draft key returned by the service.
        bill_id: String,
        /// Where the receipt was stored.
        file_url: String,
    },
    /// The upload (or the session lookup before it) failed.
    UploadFailed(BilledError),
    /// The form no longer accepts receipt changes.
    Ignored,
}

/// What a submit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The bill was saved and the view navigated to the bills list.
    Submitted(Bill),
    /// The form content was refused before contacting the service.
    Invalid(BilledError),
    /// The service refused the update.
    UpdateFailed(BilledError),
    /// The submit control was disabled.
    Ignored,
}

/// Container owning the state of the new-bill form.
///
/// # Examples
///
/// ```
/// use billed_core::{
///     BillFields, FileChangeEvent, FormState, MemorySessionStore, MockBillsService, NewBill,
///     ReceiptFile, Route, SessionUser, SubmitEvent, SubmitOutcome,
/// };
/// use std::sync::Arc;
///
/// let service = Arc::new(MockBillsService::new());
/// let session = Arc::new(MemorySessionStore::signed_in(&SessionUser::employee("a@a")).unwrap());
/// let mut new_bill = NewBill::new(service.clone(), session, |route: Route| {
///     assert_eq!(route, Route::Bills);
/// });
///
/// let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// rt.block_on(async {
///     let file = ReceiptFile::new("test.jpg", b"jpeg".to_vec());
///     new_bill.handle_change_file(&mut FileChangeEvent::select(file)).await;
///     assert_eq!(new_bill.state(), FormState::FileReady);
///
///     let fields = BillFields {
///         date: "2004-04-04".into(),
///         amount: "400".into(),
///         ..BillFields::default()
///     };
///     let outcome = new_bill.handle_submit(&mut SubmitEvent::new(fields)).await;
///     assert!(matches!(outcome, SubmitOutcome::Submitted(_)));
/// });
/// assert_eq!(service.bills().len(), 1);
/// ```
pub struct NewBill {
    service: Arc<dyn BillsService>,
    session: Arc<dyn SessionStore>,
    navigator: Box<dyn Navigator>,
    policy: ReceiptPolicy,
    default_pct: u32,
    state: FormState,
    file_input: FileInput,
    submit_disabled: bool,
    bill_id: Option<String>,
    file_url: Option<String>,
    file_name: Option<String>,
    last_error: Option<BilledError>,
}

impl NewBill {
    /// Creates a container in the `Idle` state.
    pub fn new(
        service: Arc<dyn BillsService>,
        session: Arc<dyn SessionStore>,
        navigator: impl Navigator + 'static,
    ) -> Self {
        Self {
            service,
            session,
            navigator: Box::new(navigator),
            policy: ReceiptPolicy::default(),
            default_pct: DEFAULT_PCT,
            state: FormState::Idle,
            file_input: FileInput::default(),
            submit_disabled: false,
            bill_id: None,
            file_url: None,
            file_name: None,
            last_error: None,
        }
    }

    /// Applies the receipt allow-list and pct default from `config`.
    pub fn with_config(mut self, config: &Config) -> Self {
        self.policy = ReceiptPolicy::from(&config.receipts);
        self.default_pct = config.form.default_pct;
        self
    }

    /// Current state of the form.
    pub fn state(&self) -> FormState {
        self.state
    }

    /// Draft key of the uploaded receipt.
    pub fn bill_id(&self) -> Option<&str> {
        self.bill_id.as_deref()
    }

    /// URL of the uploaded receipt.
    pub fn file_url(&self) -> Option<&str> {
        self.file_url.as_deref()
    }

    /// Original name of the uploaded receipt.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// The receipt file input.
    pub fn file_input(&self) -> &FileInput {
        &self.file_input
    }

    /// Whether the submit control is disabled.
    pub fn is_submit_disabled(&self) -> bool {
        self.submit_disabled
    }

    /// Most recent service or validation failure, for display.
    pub fn last_error(&self) -> Option<&BilledError> {
        self.last_error.as_ref()
    }

    /// Handles a change of the receipt file input.
    ///
    /// A disallowed selection clears the input and uploads nothing. An
    /// allowed one is uploaded right away; on success the returned key, URL
    /// and file name are kept for the submit, on failure they stay unset.
    pub async fn handle_change_file(&mut self, event: &mut FileChangeEvent) -> FileChangeOutcome {
        event.prevent_default();

        if matches!(self.state, FormState::Submitting | FormState::Submitted) {
            debug!(state = ?self.state, "Ignoring receipt change");
            return FileChangeOutcome::Ignored;
        }

        let file = match event.files.first().cloned() {
            Some(file) => file,
            None => {
                self.file_input.clear();
                return FileChangeOutcome::Rejected {
                    file_name: String::new(),
                };
            }
        };
        let file_name = if event.value.is_empty() {
            file.name().to_string()
        } else {
            file_name_from_value(&event.value).to_string()
        };

        if !self.policy.accepts(&file_name) {
            debug!(file_name = %file_name, "Receipt extension refused, clearing input");
            self.file_input.clear();
            return FileChangeOutcome::Rejected { file_name };
        }

        self.file_input.select(event.value.clone(), file.clone());
        self.clear_receipt();
        if let Err(e) = self.transition(FormState::Uploading) {
            return FileChangeOutcome::UploadFailed(self.surface(e));
        }

        let email = match SessionUser::require(self.session.as_ref()) {
            Ok(user) => user.email,
            Err(e) => {
                self.fall_back(FormState::Idle);
                return FileChangeOutcome::UploadFailed(self.surface(e));
            }
        };

        match self.service.create(ReceiptUpload { file, email }).await {
            Ok(created) => {
                debug!(key = %created.key, file_url = %created.file_url, "Receipt uploaded");
                self.bill_id = Some(created.key.clone());
                self.file_url = Some(created.file_url.clone());
                self.file_name = Some(file_name);
                self.last_error = None;
                self.fall_back(FormState::FileReady);
                FileChangeOutcome::Uploaded {
                    bill_id: created.key,
                    file_url: created.file_url,
                }
            }
            Err(e) => {
                self.fall_back(FormState::Idle);
                FileChangeOutcome::UploadFailed(self.surface(e))
            }
        }
    }

    /// Handles submission of the form.
    ///
    /// Assembles a bill from the event's fields, the uploaded receipt and the
    /// session user, then calls [`update_bill`](Self::update_bill).
    pub async fn handle_submit(&mut self, event: &mut SubmitEvent) -> SubmitOutcome {
        event.prevent_default();

        if self.submit_disabled || self.state == FormState::Submitted {
            debug!(state = ?self.state, "Submit control disabled, ignoring submit");
            return SubmitOutcome::Ignored;
        }

        match self.assemble_bill(&event.fields) {
            Ok(bill) => self.update_bill(bill).await,
            Err(e) => {
                warn!(error = %e, "Bill form refused");
                self.last_error = Some(e.clone());
                SubmitOutcome::Invalid(e)
            }
        }
    }

    /// Saves `bill` through the service, then navigates to the bills list.
    ///
    /// The draft key of the uploaded receipt is the update selector. On
    /// failure the form returns to `FileReady` and does not navigate.
    pub async fn update_bill(&mut self, bill: Bill) -> SubmitOutcome {
        if self.submit_disabled {
            return SubmitOutcome::Ignored;
        }
        let selector = match (&self.bill_id, self.state) {
            (Some(key), FormState::FileReady) => key.clone(),
            _ => {
                let e = BilledError::MissingReceipt;
                warn!(state = ?self.state, "No uploaded receipt to attach the bill to");
                self.last_error = Some(e.clone());
                return SubmitOutcome::Invalid(e);
            }
        };

        if let Err(e) = self.transition(FormState::Submitting) {
            return SubmitOutcome::Invalid(self.surface(e));
        }

        match self.service.update(&selector, &bill).await {
            Ok(saved) => {
                info!(key = %selector, email = %saved.email, "Bill submitted");
                self.last_error = None;
                self.fall_back(FormState::Submitted);
                self.navigator.navigate(Route::Bills);
                SubmitOutcome::Submitted(saved)
            }
            Err(e) => {
                self.fall_back(FormState::FileReady);
                SubmitOutcome::UpdateFailed(self.surface(e))
            }
        }
    }

    /// Builds the bill a submit of `fields` would save.
    fn assemble_bill(&self, fields: &BillFields) -> Result<Bill> {
        if self.state != FormState::FileReady {
            return Err(BilledError::MissingReceipt);
        }
        let email = SessionUser::require(self.session.as_ref())?.email;

        let expense_type = if fields.expense_type.trim().is_empty() {
            ExpenseType::default()
        } else {
            fields.expense_type.parse()?
        };

        NaiveDate::parse_from_str(fields.date.trim(), "%Y-%m-%d").map_err(|_| {
            BilledError::InvalidField {
                field: "date",
                reason: format!("expected YYYY-MM-DD, got {:?}", fields.date),
            }
        })?;

        let amount = parse_int_prefix(&fields.amount).ok_or_else(|| BilledError::InvalidField {
            field: "amount",
            reason: format!("not a number: {:?}", fields.amount),
        })?;

        let pct = match parse_int_prefix(&fields.pct) {
            None | Some(0) => self.default_pct,
            Some(p) => u32::try_from(p).map_err(|_| BilledError::InvalidField {
                field: "pct",
                reason: format!("out of range: {}", p),
            })?,
        };

        Ok(Bill {
            id: self.bill_id.clone(),
            expense_type,
            name: fields.name.clone(),
            date: fields.date.trim().to_string(),
            amount,
            vat: fields.vat.clone(),
            pct,
            commentary: fields.commentary.clone(),
            file_url: self.file_url.clone(),
            file_name: self.file_name.clone(),
            status: BillStatus::Pending,
            comment_admin: None,
            email,
        })
    }

    fn clear_receipt(&mut self) {
        self.bill_id = None;
        self.file_url = None;
        self.file_name = None;
    }

    fn transition(&mut self, next: FormState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(BilledError::InvalidStateTransition {
                from: format!("{:?}", self.state),
                to: format!("{:?}", next),
            });
        }
        debug!(from = ?self.state, to = ?next, "Form state change");
        self.state = next;
        self.submit_disabled = matches!(next, FormState::Submitting | FormState::Submitted);
        Ok(())
    }

    /// Transition that follows an in-flight call and cannot be refused.
    fn fall_back(&mut self, next: FormState) {
        if let Err(e) = self.transition(next) {
            error!(error = %e, "Unexpected form state");
        }
    }

    /// Logs an error and keeps it for display.
    fn surface(&mut self, e: BilledError) -> BilledError {
        if e.is_service_failure() {
            error!(error = %e, "Bills service call failed");
        } else {
            warn!(error = %e, "Bill form error");
        }
        self.last_error = Some(e.clone());
        e
    }
}

impl std::fmt::Debug for NewBill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewBill")
            .field("state", &self.state)
            .field("bill_id", &self.bill_id)
            .field("file_url", &self.file_url)
            .field("file_name", &self.file_name)
            .field("submit_disabled", &self.submit_disabled)
            .field("last_error", &self.last_error)
            .finish()
    }
}

/// Leading integer of `s`: optional sign then digits, rest ignored.
///
/// `"348.5"` gives 348, `" 80 %"` gives 80, `""` and `"abc"` give None.
fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok().map(|n| sign * n)
}
