//! Transaction listing command

use anyhow::Result;
use tally_core::db::Database;

use super::truncate;

pub fn cmd_transactions_list(db: &Database, account: Option<&str>, limit: i64) -> Result<()> {
    let account_id = match account {
        Some(name) => {
            let found = db
                .list_accounts()?
                .into_iter()
                .find(|a| a.name == name)
                .map(|a| a.id);
            match found {
                Some(id) => Some(id),
                None => {
                    println!("No account named '{}'", name);
                    return Ok(());
                }
            }
        }
        None => None,
    };

    let transactions = db.list_transactions(account_id, limit, 0)?;

    if transactions.is_empty() {
        println!("No transactions yet.");
        return Ok(());
    }

    println!("💳 Transactions (newest first)");
    for tx in transactions {
        let marker = if tx.is_recurring { "🔁" } else { "  " };
        println!(
            "   {} {}  {:<32} {:>10.2}",
            marker,
            tx.date,
            truncate(&tx.description, 32),
            tx.amount
        );
    }
    Ok(())
}
