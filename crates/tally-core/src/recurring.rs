//! Recurring transaction engine
//!
//! Converts due recurring definitions into concrete transactions and keeps
//! their schedules correct going forward. A definition is due when it is
//! active and its next run date has arrived or passed; each run advances a
//! due definition by exactly one interval, so a definition overdue by several
//! cycles fires once per invocation and callers re-invoke for catch-up.

use chrono::{Duration, Months, NaiveDate};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::db::{Database, TransactionInsertResult};
use crate::error::Result;
use crate::models::{Interval, NewTransaction, RecurringDefinition};

/// Transactions materialized by `process_due`, with the advanced definitions.
#[derive(Debug, Default)]
pub struct ProcessOutcome {
    pub fired: Vec<NewTransaction>,
    pub updated: Vec<RecurringDefinition>,
}

/// Result of a storage-backed recurring run
#[derive(Debug, Default)]
pub struct RecurringRunReport {
    /// Definitions materialized and advanced this run
    pub fired: usize,
    /// Cycles whose recurrence key already existed; schedule advanced only
    pub already_fired: usize,
    /// Definitions whose storage writes failed, with the error text
    pub failed: Vec<(i64, String)>,
    /// Stored rows skipped because their interval column did not parse
    pub malformed: Vec<(i64, String)>,
}

impl RecurringRunReport {
    pub fn processed(&self) -> usize {
        self.fired + self.already_fired
    }
}

/// Idempotency key for one fired cycle of one definition.
///
/// Unique per (definition, due date): two invocations that observe the same
/// due definition produce the same key, so the second insert is rejected and
/// the cycle cannot be double-booked.
pub fn recurrence_key(definition_id: i64, fired_date: NaiveDate) -> String {
    let mut hasher = Sha256::new();
    hasher.update(definition_id.to_be_bytes());
    hasher.update(fired_date.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Add exactly one interval unit to a date.
///
/// Monthly and yearly steps clamp to the last valid day of the target month
/// (Jan 31 + 1 month = Feb 28 or 29).
fn step(date: NaiveDate, interval: Interval) -> NaiveDate {
    match interval {
        Interval::Daily => date + Duration::days(1),
        Interval::Weekly => date + Duration::days(7),
        Interval::Monthly => date
            .checked_add_months(Months::new(1))
            .expect("calendar month add stays in range"),
        Interval::Yearly => date
            .checked_add_months(Months::new(12))
            .expect("calendar year add stays in range"),
    }
}

/// True when a definition should fire. Date-only comparison, no time of day.
pub fn is_due(def: &RecurringDefinition, today: NaiveDate) -> bool {
    def.active && def.next_run_date <= today
}

/// Advance a definition's schedule by one interval from its current
/// `next_run_date`, recording the fired date as `last_run_date`.
///
/// Pure: returns the advanced definition and leaves persistence to the
/// caller.
pub fn advance(def: &RecurringDefinition) -> RecurringDefinition {
    let fired = def.next_run_date;
    RecurringDefinition {
        next_run_date: step(fired, def.interval),
        last_run_date: Some(fired),
        ..def.clone()
    }
}

/// Build the concrete transaction for a due definition's current cycle.
///
/// The transaction is dated on the due date, not the processing date.
fn materialize(def: &RecurringDefinition) -> NewTransaction {
    NewTransaction {
        account_id: def.account_id,
        category_id: def.category_id,
        date: def.next_run_date,
        description: def.description.clone(),
        amount: def.amount,
        is_recurring: true,
        recurrence_key: Some(recurrence_key(def.id, def.next_run_date)),
    }
}

/// Materialize every due definition exactly once and advance its schedule.
///
/// Definitions that are inactive or not yet due pass through untouched.
/// Nothing due is an empty outcome, not an error.
pub fn process_due(definitions: &[RecurringDefinition], today: NaiveDate) -> ProcessOutcome {
    let mut outcome = ProcessOutcome::default();
    for def in definitions.iter().filter(|d| is_due(d, today)) {
        debug!(
            definition = def.id,
            due = %def.next_run_date,
            "firing recurring definition"
        );
        outcome.fired.push(materialize(def));
        outcome.updated.push(advance(def));
    }
    outcome
}

/// Read due definitions from storage, materialize each, and write the
/// advanced schedules back.
///
/// Each definition is processed independently and best-effort: a storage
/// failure for one is recorded in the report and does not block the rest.
/// Rows whose stored interval does not parse are skipped and reported.
pub fn run_due(db: &Database, today: NaiveDate) -> Result<RecurringRunReport> {
    let due = db.list_due_recurring(today)?;
    let mut report = RecurringRunReport {
        malformed: due.malformed,
        ..Default::default()
    };

    for (id, raw) in &report.malformed {
        warn!(definition = id, interval = %raw, "skipping definition with malformed interval");
    }

    for def in &due.definitions {
        let tx = materialize(def);
        let inserted = match db.insert_transaction(&tx) {
            Ok(TransactionInsertResult::Inserted(_)) => true,
            Ok(TransactionInsertResult::Duplicate(existing)) => {
                debug!(
                    definition = def.id,
                    existing, "cycle already materialized, advancing schedule only"
                );
                false
            }
            Err(e) => {
                warn!(definition = def.id, error = %e, "failed to materialize recurring transaction");
                report.failed.push((def.id, e.to_string()));
                continue; // leave the schedule untouched so a retry can fire this cycle
            }
        };

        let advanced = advance(def);
        if let Err(e) =
            db.update_recurring_schedule(def.id, advanced.next_run_date, advanced.last_run_date)
        {
            warn!(definition = def.id, error = %e, "materialized but failed to advance schedule");
            report.failed.push((def.id, e.to_string()));
            continue;
        }

        if inserted {
            report.fired += 1;
        } else {
            report.already_fired += 1;
        }
    }

    info!(
        "Recurring run complete: {} fired, {} already materialized, {} failed, {} malformed",
        report.fired,
        report.already_fired,
        report.failed.len(),
        report.malformed.len()
    );

    Ok(report)
}
