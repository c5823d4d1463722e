//! Print the bills list.

use super::DataDir;
use anyhow::{Context, Result};
use billed_core::{BillStatus, BillsList};
use console::style;

/// Prints the bills visible to the session user, newest first.
pub async fn run() -> Result<()> {
    let data = DataDir::open()?;
    let list = BillsList::load(&data.store, &data.session)
        .await
        .context("Failed to list bills")?;

    if list.is_empty() {
        println!("No bills yet");
        return Ok(());
    }

    println!("{}", style("Mes notes de frais").bold());
    for row in list.rows() {
        let status = match row.bill.status {
            BillStatus::Pending => style(row.status).yellow(),
            BillStatus::Accepted => style(row.status).green(),
            BillStatus::Refused => style(row.status).red(),
        };
        println!(
            "  {:<22} {:<12} {:<20} {:>6} €  {}",
            row.bill.expense_type.label(),
            row.date,
            row.bill.name,
            row.bill.amount,
            status
        );
    }
    println!();
    println!("{} bill(s)", style(list.len()).cyan());

    Ok(())
}
