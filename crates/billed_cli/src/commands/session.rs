//! Sign in and out.

use super::DataDir;
use anyhow::{Context, Result};
use billed_core::{SessionStore, SessionUser, UserType};
use console::style;

/// Stores `email` as the session user.
pub fn login(email: &str, admin: bool) -> Result<()> {
    let data = DataDir::open()?;
    let user = if admin {
        SessionUser::admin(email)
    } else {
        SessionUser::employee(email)
    };
    user.save(&data.session).context("Failed to save session")?;

    println!("{} Signed in as {}", style("✓").green(), style(email).cyan());
    Ok(())
}

/// Clears the session.
pub fn logout() -> Result<()> {
    let data = DataDir::open()?;
    data.session.clear().context("Failed to clear session")?;

    println!("Signed out");
    Ok(())
}

/// Prints the session user.
pub fn whoami() -> Result<()> {
    let data = DataDir::open()?;
    match SessionUser::load(&data.session)? {
        Some(user) => {
            let role = match user.user_type {
                UserType::Employee => "employee",
                UserType::Admin => "admin",
            };
            println!("{} ({})", style(&user.email).cyan(), role);
        }
        None => println!("{}", style("Not signed in").yellow()),
    }
    Ok(())
}
