//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Track accounts, imports, and recurring transactions
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Personal finance tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "tally.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Manage accounts
    Accounts {
        #[command(subcommand)]
        action: Option<AccountsAction>,
    },

    /// Import a statement (CSV, or an image/text file via the extraction backend)
    Import {
        /// Statement file to import
        #[arg(short, long)]
        file: PathBuf,

        /// Account to import into (created if missing)
        #[arg(short, long)]
        account: String,
    },

    /// Manage recurring transactions
    Recurring {
        #[command(subcommand)]
        action: Option<RecurringAction>,
    },

    /// Suggest recurring definitions from transaction history
    Suggest,

    /// List transactions
    Transactions {
        /// Only show transactions for this account
        #[arg(short, long)]
        account: Option<String>,

        /// Maximum number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },
}

#[derive(Subcommand)]
pub enum AccountsAction {
    /// Add an account
    Add {
        /// Account name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum RecurringAction {
    /// List recurring definitions
    List,

    /// Add a recurring definition
    Add {
        /// Description copied onto materialized transactions
        #[arg(short, long)]
        description: String,

        /// Amount (negative = expense, positive = income)
        #[arg(short, long, allow_hyphen_values = true)]
        amount: f64,

        /// Interval: daily, weekly, monthly, yearly
        #[arg(short, long)]
        interval: String,

        /// First scheduled date (YYYY-MM-DD)
        #[arg(short, long)]
        start: String,

        /// Account to book materialized transactions into
        #[arg(long)]
        account: Option<String>,

        /// Category label for materialized transactions
        #[arg(long)]
        category: Option<String>,
    },

    /// Fire everything due and advance schedules
    Run {
        /// Process as of this date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Deactivate a definition (keeps its history)
    Pause {
        /// Definition id
        id: i64,
    },

    /// Reactivate a paused definition
    Resume {
        /// Definition id
        id: i64,
    },
}
