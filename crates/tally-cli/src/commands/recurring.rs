//! Recurring definition commands

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use tally_core::{
    db::Database,
    models::{Interval, NewRecurring},
    recurring::run_due,
};

use super::truncate;

pub fn cmd_recurring_list(db: &Database) -> Result<()> {
    let definitions = db.list_recurring(true)?;

    if definitions.is_empty() {
        println!("No recurring definitions yet. Add one with: tally recurring add");
        return Ok(());
    }

    println!("🔁 Recurring definitions");
    println!(
        "   {:>4}  {:<28} {:>10}  {:<8} {:<12} {}",
        "id", "description", "amount", "interval", "next run", "status"
    );
    for def in definitions {
        println!(
            "   {:>4}  {:<28} {:>10.2}  {:<8} {:<12} {}",
            def.id,
            truncate(&def.description, 28),
            def.amount,
            def.interval.as_str(),
            def.next_run_date,
            if def.active { "active" } else { "paused" }
        );
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_recurring_add(
    db: &Database,
    description: &str,
    amount: f64,
    interval: &str,
    start: &str,
    account: Option<&str>,
    category: Option<&str>,
) -> Result<()> {
    let interval: Interval = interval
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let next_run_date = NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .context("Invalid --start date format (use YYYY-MM-DD)")?;

    let account_id = account.map(|name| db.upsert_account(name)).transpose()?;
    let category_id = category.map(|label| db.resolve_category(Some(label))).transpose()?;

    let id = db.insert_recurring(&NewRecurring {
        description: description.to_string(),
        amount,
        interval,
        next_run_date,
        account_id,
        category_id,
    })?;

    println!(
        "✅ Recurring definition {} created: {} {:.2} {} starting {}",
        id, description, amount, interval, next_run_date
    );
    Ok(())
}

pub fn cmd_recurring_run(db: &Database, date: Option<&str>) -> Result<()> {
    let today = match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .context("Invalid --date format (use YYYY-MM-DD)")?,
        None => Utc::now().date_naive(),
    };

    println!("🔁 Processing recurring transactions as of {}...", today);

    let report = run_due(db, today)?;

    println!("✅ Run complete!");
    println!("   Fired: {}", report.fired);
    if report.already_fired > 0 {
        println!("   Already materialized: {}", report.already_fired);
    }
    for (id, error) in &report.failed {
        println!("   ⚠️  Definition {} failed: {}", id, error);
    }
    for (id, interval) in &report.malformed {
        println!(
            "   ⚠️  Definition {} skipped: malformed interval '{}'",
            id, interval
        );
    }
    Ok(())
}

pub fn cmd_recurring_pause(db: &Database, id: i64) -> Result<()> {
    db.set_recurring_active(id, false)?;
    println!("⏸️  Definition {} paused (history kept)", id);
    Ok(())
}

pub fn cmd_recurring_resume(db: &Database, id: i64) -> Result<()> {
    db.set_recurring_active(id, true)?;
    println!("▶️  Definition {} resumed", id);
    Ok(())
}
