use super::assertions::{Assertion, FileChangeMatch, SubmitMatch};
use super::steps::{Field, ScenarioStep};
use super::workspace::TestWorkspace;
use anyhow::{anyhow, bail, ensure, Context, Result};
use billed_core::{
    BillFields, BillsList, BillsService, Config, FileChangeEvent, FileChangeOutcome,
    FileSessionStore, LocalBillsStore, MockBillsService, NewBill, ReceiptFile, Route,
    SessionStore, SubmitEvent, SubmitOutcome,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Which bills service the form talks to
pub enum Backend {
    /// In-memory service seeded with the sample bills
    Mock(Arc<MockBillsService>),
    /// Directory store inside the test workspace
    Local(Arc<LocalBillsStore>),
}

impl Backend {
    fn service(&self) -> Arc<dyn BillsService> {
        match self {
            Self::Mock(mock) => mock.clone() as Arc<dyn BillsService>,
            Self::Local(store) => store.clone(),
        }
    }

    fn mock(&self) -> Result<&MockBillsService> {
        match self {
            Self::Mock(mock) => Ok(mock),
            Self::Local(_) => bail!("step needs the mock backend"),
        }
    }
}

/// Which backend a scenario starts with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Mock,
    Local,
}

/// Executes scenarios against a real NewBill container
pub struct ScenarioRunner {
    workspace: TestWorkspace,
    runtime: tokio::runtime::Runtime,
    config: Config,
    backend: Backend,
    session: Arc<FileSessionStore>,
    routes: Arc<Mutex<Vec<Route>>>,
    new_bill: NewBill,
    fields: BillFields,
    last_file_change: Option<FileChangeOutcome>,
    last_submit: Option<SubmitOutcome>,
    current_step: usize,
}

impl ScenarioRunner {
    /// Create a new runner with initial files
    pub fn new(
        initial_files: HashMap<String, Vec<u8>>,
        kind: BackendKind,
        config: Config,
    ) -> Result<Self> {
        let workspace = TestWorkspace::with_files(initial_files)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .context("Failed to build tokio runtime")?;
        let backend = match kind {
            BackendKind::Mock => Backend::Mock(Arc::new(MockBillsService::with_fixtures())),
            BackendKind::Local => Backend::Local(Arc::new(workspace.open_store(&config)?)),
        };
        let session = Arc::new(workspace.session());
        let routes = Arc::new(Mutex::new(Vec::new()));
        let new_bill = open_page(&backend, &session, &routes, &config);

        Ok(Self {
            workspace,
            runtime,
            config,
            backend,
            session,
            routes,
            new_bill,
            fields: BillFields::default(),
            last_file_change: None,
            last_submit: None,
            current_step: 0,
        })
    }

    /// Get current step number
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Execute all steps in sequence
    pub fn execute(&mut self, steps: &[ScenarioStep]) -> Result<()> {
        for (i, step) in steps.iter().enumerate() {
            self.current_step = i;
            self.execute_step(step)
                .with_context(|| format!("Step {}: {:?}", i, step))?;
        }
        Ok(())
    }

    fn execute_step(&mut self, step: &ScenarioStep) -> Result<()> {
        match step {
            ScenarioStep::SignIn { user } => Ok(user.save(self.session.as_ref())?),
            ScenarioStep::SignOut => Ok(self.session.clear()?),

            ScenarioStep::SelectReceipt { name, content } => {
                self.handle_select(ReceiptFile::new(name.as_str(), content.clone()))
            }
            ScenarioStep::SelectWorkspaceFile { path } => {
                let content = self.workspace.read_file(path)?;
                let name = billed_core::file_name_from_value(path).to_string();
                self.handle_select(ReceiptFile::new(name, content))
            }
            ScenarioStep::SelectNothing => self.handle_change(FileChangeEvent::default()),
            ScenarioStep::Fill { field, value } => {
                self.handle_fill(*field, value);
                Ok(())
            }
            ScenarioStep::Submit => self.handle_submit(),

            ScenarioStep::CreateFails { error } => {
                self.backend.mock()?.fail_next_create(error.clone());
                Ok(())
            }
            ScenarioStep::UpdateFails { error } => {
                self.backend.mock()?.fail_next_update(error.clone());
                Ok(())
            }

            ScenarioStep::ReloadPage => {
                self.reload_page();
                Ok(())
            }
            ScenarioStep::RestartBackend => self.handle_restart_backend(),

            ScenarioStep::Assert { assertion } => self.handle_assertion(assertion),
        }
    }

    // ===== Form handlers =====

    fn handle_select(&mut self, file: ReceiptFile) -> Result<()> {
        self.handle_change(FileChangeEvent::select(file))
    }

    fn handle_change(&mut self, mut event: FileChangeEvent) -> Result<()> {
        let outcome = self
            .runtime
            .block_on(self.new_bill.handle_change_file(&mut event));
        ensure!(event.default_prevented(), "file change default was not prevented");
        self.last_file_change = Some(outcome);
        Ok(())
    }

    fn handle_fill(&mut self, field: Field, value: &str) {
        let slot = match field {
            Field::ExpenseType => &mut self.fields.expense_type,
            Field::Name => &mut self.fields.name,
            Field::Date => &mut self.fields.date,
            Field::Amount => &mut self.fields.amount,
            Field::Vat => &mut self.fields.vat,
            Field::Pct => &mut self.fields.pct,
            Field::Commentary => &mut self.fields.commentary,
        };
        *slot = value.to_string();
    }

    fn handle_submit(&mut self) -> Result<()> {
        let mut event = SubmitEvent::new(self.fields.clone());
        let outcome = self.runtime.block_on(self.new_bill.handle_submit(&mut event));
        ensure!(event.default_prevented(), "submit default was not prevented");
        self.last_submit = Some(outcome);
        Ok(())
    }

    // ===== Lifecycle handlers =====

    fn reload_page(&mut self) {
        self.new_bill = open_page(&self.backend, &self.session, &self.routes, &self.config);
        self.fields = BillFields::default();
        self.last_file_change = None;
        self.last_submit = None;
    }

    fn handle_restart_backend(&mut self) -> Result<()> {
        if matches!(self.backend, Backend::Mock(_)) {
            bail!("the mock backend does not survive a restart");
        }
        self.backend = Backend::Local(Arc::new(self.workspace.open_store(&self.config)?));
        self.reload_page();
        Ok(())
    }

    // ===== Assertion handler =====

    fn handle_assertion(&mut self, assertion: &Assertion) -> Result<()> {
        match assertion {
            Assertion::FormState(expected) => {
                let actual = self.new_bill.state();
                ensure!(actual == *expected, "expected form state {:?}, got {:?}", expected, actual);
            }
            Assertion::InputCleared => {
                let input = self.new_bill.file_input();
                ensure!(
                    input.value().is_empty() && input.files().is_empty(),
                    "file input not cleared: value {:?}, {} file(s)",
                    input.value(),
                    input.files().len()
                );
            }
            Assertion::InputHolds(name) => {
                let held = self.new_bill.file_input().file().map(|f| f.name().to_string());
                ensure!(
                    held.as_deref() == Some(name.as_str()),
                    "expected input to hold {:?}, got {:?}",
                    name,
                    held
                );
            }
            Assertion::BillId(expected) => {
                check_field("bill_id", self.new_bill.bill_id(), expected)?;
            }
            Assertion::FileUrl(expected) => {
                check_field("file_url", self.new_bill.file_url(), expected)?;
            }
            Assertion::FileName(expected) => {
                check_field("file_name", self.new_bill.file_name(), expected)?;
            }
            Assertion::SubmitDisabled(expected) => {
                let actual = self.new_bill.is_submit_disabled();
                ensure!(actual == *expected, "submit disabled = {}, expected {}", actual, expected);
            }
            Assertion::HasError(expected) => {
                let actual = self.new_bill.last_error();
                ensure!(
                    actual.is_some() == *expected,
                    "expected error: {}, last error: {:?}",
                    expected,
                    actual
                );
            }
            Assertion::LastFileChange(expected) => {
                let actual = self.last_file_change.as_ref().map(file_change_match);
                ensure!(
                    actual == Some(*expected),
                    "expected file change {:?}, got {:?}",
                    expected,
                    self.last_file_change
                );
            }
            Assertion::LastSubmit(expected) => {
                let actual = self.last_submit.as_ref().map(submit_match);
                ensure!(
                    actual == Some(*expected),
                    "expected submit {:?}, got {:?}",
                    expected,
                    self.last_submit
                );
            }
            Assertion::SubmittedPct(expected) => match &self.last_submit {
                Some(SubmitOutcome::Submitted(bill)) => {
                    ensure!(bill.pct == *expected, "pct {}, expected {}", bill.pct, expected);
                }
                other => bail!("no submitted bill, last submit: {:?}", other),
            },
            Assertion::NavigationCount(expected) => {
                let count = self.routes().len();
                ensure!(count == *expected, "{} navigation(s), expected {}", count, expected);
            }
            Assertion::NavigatedTo(route) => {
                let routes = self.routes();
                ensure!(
                    routes.last() == Some(route),
                    "expected last navigation to {:?}, got {:?}",
                    route,
                    routes
                );
            }
            Assertion::BillsListLen(expected) => {
                let list = self.bills_list()?;
                ensure!(list.len() == *expected, "{} row(s), expected {}", list.len(), expected);
            }
            Assertion::BillsListContains { name } => {
                let list = self.bills_list()?;
                ensure!(
                    list.rows().iter().any(|r| &r.bill.name == name),
                    "no row named {:?}",
                    name
                );
            }
            Assertion::CreateCalls(expected) => {
                let calls = self.backend.mock()?.create_calls();
                ensure!(calls == *expected, "{} create call(s), expected {}", calls, expected);
            }
            Assertion::UpdateCalls(expected) => {
                let calls = self.backend.mock()?.update_calls();
                ensure!(calls == *expected, "{} update call(s), expected {}", calls, expected);
            }
            Assertion::PendingDrafts(expected) => {
                let drafts = match &self.backend {
                    Backend::Mock(mock) => mock.pending_drafts(),
                    Backend::Local(store) => store.pending_drafts()?,
                };
                ensure!(drafts == *expected, "{} draft(s), expected {}", drafts, expected);
            }
            Assertion::StoredReceipts(expected) => {
                let count = self.workspace.count_receipts()?;
                ensure!(count == *expected, "{} receipt file(s), expected {}", count, expected);
            }
            Assertion::Custom(check) => check(&self.new_bill)?,
        }
        Ok(())
    }

    fn routes(&self) -> Vec<Route> {
        self.routes
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    fn bills_list(&self) -> Result<BillsList> {
        let service = self.backend.service();
        let session: &dyn SessionStore = self.session.as_ref();
        self.runtime
            .block_on(BillsList::load(service.as_ref(), session))
            .map_err(|e| anyhow!("Failed to list bills: {}", e))
    }
}

fn open_page(
    backend: &Backend,
    session: &Arc<FileSessionStore>,
    routes: &Arc<Mutex<Vec<Route>>>,
    config: &Config,
) -> NewBill {
    let sink = routes.clone();
    NewBill::new(backend.service(), session.clone(), move |route: Route| {
        if let Ok(mut routes) = sink.lock() {
            routes.push(route);
        }
    })
    .with_config(config)
}

fn check_field(name: &str, actual: Option<&str>, expected: &Option<String>) -> Result<()> {
    ensure!(
        actual == expected.as_deref(),
        "{} = {:?}, expected {:?}",
        name,
        actual,
        expected
    );
    Ok(())
}

fn file_change_match(outcome: &FileChangeOutcome) -> FileChangeMatch {
    match outcome {
        FileChangeOutcome::Rejected { .. } => FileChangeMatch::Rejected,
        FileChangeOutcome::Uploaded { .. } => FileChangeMatch::Uploaded,
        FileChangeOutcome::UploadFailed(_) => FileChangeMatch::UploadFailed,
        FileChangeOutcome::Ignored => FileChangeMatch::Ignored,
    }
}

fn submit_match(outcome: &SubmitOutcome) -> SubmitMatch {
    match outcome {
        SubmitOutcome::Submitted(_) => SubmitMatch::Submitted,
        SubmitOutcome::Invalid(_) => SubmitMatch::Invalid,
        SubmitOutcome::UpdateFailed(_) => SubmitMatch::UpdateFailed,
        SubmitOutcome::Ignored => SubmitMatch::Ignored,
    }
}
