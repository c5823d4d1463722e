//! Submit a new bill.

use super::DataDir;
use anyhow::{bail, Context, Result};
use billed_core::{
    BillFields, BilledError, FileChangeEvent, FileChangeOutcome, NewBill, ReceiptFile, Route,
    SubmitEvent, SubmitOutcome,
};
use console::style;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Receipt scan (jpg, jpeg or png)
    pub receipt: PathBuf,
    /// Expense category, e.g. "Transports"
    #[arg(long = "type", default_value = "Transports")]
    pub expense_type: String,
    /// Expense name
    #[arg(long, default_value = "")]
    pub name: String,
    /// Expense date (YYYY-MM-DD)
    #[arg(long)]
    pub date: String,
    /// Amount in euros
    #[arg(long)]
    pub amount: String,
    /// VAT amount
    #[arg(long, default_value = "")]
    pub vat: String,
    /// Reimbursement percentage (default from config)
    #[arg(long, default_value = "")]
    pub pct: String,
    /// Commentary
    #[arg(long, default_value = "")]
    pub commentary: String,
}

/// Uploads the receipt, then submits the bill against the local store.
pub async fn run(args: NewArgs) -> Result<()> {
    let data = DataDir::open()?;
    let bytes = std::fs::read(&args.receipt)
        .with_context(|| format!("Failed to read {}", args.receipt.display()))?;
    let file_name = args
        .receipt
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let config = data.config.clone();
    let mut new_bill = NewBill::new(Arc::new(data.store), Arc::new(data.session), |route: Route| {
        println!("{} {}", style("→").dim(), route);
    })
    .with_config(&config);

    let mut event = FileChangeEvent::new(
        args.receipt.display().to_string(),
        vec![ReceiptFile::new(file_name, bytes)],
    );
    match new_bill.handle_change_file(&mut event).await {
        FileChangeOutcome::Uploaded { file_url, .. } => {
            println!("{} Receipt stored at {}", style("✓").green(), file_url);
        }
        FileChangeOutcome::Rejected { file_name } => {
            return Err(with_hint(BilledError::InvalidExtension { file_name }));
        }
        FileChangeOutcome::UploadFailed(e) => return Err(with_hint(e)),
        FileChangeOutcome::Ignored => bail!("Form no longer accepts receipts"),
    }

    let mut submit = SubmitEvent::new(BillFields {
        expense_type: args.expense_type,
        name: args.name,
        date: args.date,
        amount: args.amount,
        vat: args.vat,
        pct: args.pct,
        commentary: args.commentary,
    });
    match new_bill.handle_submit(&mut submit).await {
        SubmitOutcome::Submitted(bill) => {
            println!(
                "{} Bill {} submitted: {} €, {}%",
                style("✓").green(),
                style(bill.id.as_deref().unwrap_or("?")).cyan(),
                bill.amount,
                bill.pct
            );
            Ok(())
        }
        SubmitOutcome::Invalid(e) | SubmitOutcome::UpdateFailed(e) => Err(with_hint(e)),
        SubmitOutcome::Ignored => bail!("Submit ignored"),
    }
}

fn with_hint(e: BilledError) -> anyhow::Error {
    match e.recovery_suggestion() {
        Some(hint) => anyhow::anyhow!("{}\n  hint: {}", e, hint),
        None => anyhow::Error::new(e),
    }
}
