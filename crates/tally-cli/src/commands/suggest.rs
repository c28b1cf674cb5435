//! Recurring suggestion command

use anyhow::Result;
use tally_core::{db::Database, detect::analyze_transactions};

use super::truncate;

pub fn cmd_suggest(db: &Database) -> Result<()> {
    println!("🔍 Scanning history for recurring charges...");

    let history = db.list_transactions(None, 10000, 0)?;
    let existing = db.list_recurring(false)?;
    let suggestions = analyze_transactions(&history, &existing);

    if suggestions.is_empty() {
        println!("No recurring patterns found.");
        return Ok(());
    }

    println!();
    println!("💡 Suggested recurring definitions");
    println!(
        "   {:<28} {:>10}  {:<8} {:>6} {:>11}",
        "description", "amount", "interval", "seen", "confidence"
    );
    for s in &suggestions {
        println!(
            "   {:<28} {:>10.2}  {:<8} {:>6} {:>10.0}%",
            truncate(&s.description, 28),
            s.amount,
            s.interval.as_str(),
            s.occurrence_count,
            s.confidence * 100.0
        );
    }

    println!();
    println!("Add one with: tally recurring add --description <text> --amount <n> --interval <i> --start <date>");
    Ok(())
}
