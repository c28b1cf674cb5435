//! Tally CLI - Personal finance tracker
//!
//! Usage:
//!   tally init                       Initialize database
//!   tally import --file statement.csv --account Checking
//!   tally recurring run              Fire due recurring transactions
//!   tally suggest                    Suggest recurring definitions from history

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Accounts { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                None => commands::cmd_accounts_list(&db),
                Some(AccountsAction::Add { name }) => commands::cmd_accounts_add(&db, &name),
            }
        }
        Commands::Import { file, account } => {
            commands::cmd_import(&cli.db, &file, &account).await
        }
        Commands::Recurring { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                None | Some(RecurringAction::List) => commands::cmd_recurring_list(&db),
                Some(RecurringAction::Add {
                    description,
                    amount,
                    interval,
                    start,
                    account,
                    category,
                }) => commands::cmd_recurring_add(
                    &db,
                    &description,
                    amount,
                    &interval,
                    &start,
                    account.as_deref(),
                    category.as_deref(),
                ),
                Some(RecurringAction::Run { date }) => {
                    commands::cmd_recurring_run(&db, date.as_deref())
                }
                Some(RecurringAction::Pause { id }) => commands::cmd_recurring_pause(&db, id),
                Some(RecurringAction::Resume { id }) => commands::cmd_recurring_resume(&db, id),
            }
        }
        Commands::Suggest => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_suggest(&db)
        }
        Commands::Transactions { account, limit } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_transactions_list(&db, account.as_deref(), limit)
        }
    }
}
