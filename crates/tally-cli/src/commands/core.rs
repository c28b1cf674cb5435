//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database
//! - `cmd_accounts_*` - Account commands

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::db::Database;

/// Open the database, running migrations if needed
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Database path is not valid UTF-8"))?;
    Database::new(path_str).context("Failed to open database")
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path)?;

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Add an account:        tally accounts add Checking");
    println!("  2. Import a statement:    tally import --file statement.csv --account Checking");
    println!("  3. Fire recurring items:  tally recurring run");

    Ok(())
}

pub fn cmd_accounts_add(db: &Database, name: &str) -> Result<()> {
    let id = db.upsert_account(name)?;
    println!("✅ Account '{}' ready (id {})", name, id);
    Ok(())
}

pub fn cmd_accounts_list(db: &Database) -> Result<()> {
    let accounts = db.list_accounts()?;

    if accounts.is_empty() {
        println!("No accounts yet. Add one with: tally accounts add <name>");
        return Ok(());
    }

    println!("📒 Accounts");
    for account in accounts {
        println!("   {:>4}  {}", account.id, account.name);
    }
    Ok(())
}
