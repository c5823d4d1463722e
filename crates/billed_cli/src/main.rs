//! Billed CLI - submit expense bills from the command line.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "billed")]
#[command(about = "Expense reports with receipts", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a .billed directory
    Init,
    /// Sign in
    Login {
        /// Email stamped on new bills
        email: String,
        /// Sign in as an administrator
        #[arg(long)]
        admin: bool,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Submit a new bill with its receipt
    New(commands::new::NewArgs),
    /// List bills
    List,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Respects RUST_LOG environment variable (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Login { email, admin } => commands::session::login(&email, admin),
        Commands::Logout => commands::session::logout(),
        Commands::Whoami => commands::session::whoami(),
        Commands::New(args) => commands::new::run(args).await,
        Commands::List => commands::list::run().await,
    }
}
