//! Recurring definition storage
//!
//! The due query is the engine's input contract:
//! `active AND next_run_date <= today`, date-only.

use chrono::NaiveDate;
use rusqlite::params;
use tracing::warn;

use super::{parse_date_column, parse_datetime, Database};
use crate::error::Result;
use crate::models::{Interval, NewRecurring, RecurringDefinition};

/// Due definitions read from storage, with rows whose interval column did
/// not parse reported separately (skipped, never fatal for the batch).
#[derive(Debug, Default)]
pub struct DueRecurring {
    pub definitions: Vec<RecurringDefinition>,
    pub malformed: Vec<(i64, String)>,
}

/// Row image before the interval column is parsed
struct RawRecurringRow {
    id: i64,
    description: String,
    amount: f64,
    interval: String,
    next_run_date: NaiveDate,
    last_run_date: Option<NaiveDate>,
    active: bool,
    account_id: Option<i64>,
    category_id: Option<i64>,
    created_at: String,
}

impl RawRecurringRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        let next_run_str: String = row.get(6)?;
        let last_run_str: Option<String> = row.get(7)?;
        Ok(Self {
            id: row.get(0)?,
            description: row.get(1)?,
            amount: row.get(2)?,
            interval: row.get(3)?,
            account_id: row.get(4)?,
            category_id: row.get(5)?,
            next_run_date: parse_date_column(&next_run_str, 6)?,
            last_run_date: last_run_str
                .as_deref()
                .map(|s| parse_date_column(s, 7))
                .transpose()?,
            active: row.get(8)?,
            created_at: row.get(9)?,
        })
    }

    fn into_definition(self) -> std::result::Result<RecurringDefinition, (i64, String)> {
        let interval: Interval = match self.interval.parse() {
            Ok(i) => i,
            Err(_) => return Err((self.id, self.interval)),
        };
        Ok(RecurringDefinition {
            id: self.id,
            description: self.description,
            amount: self.amount,
            interval,
            next_run_date: self.next_run_date,
            last_run_date: self.last_run_date,
            active: self.active,
            account_id: self.account_id,
            category_id: self.category_id,
            created_at: parse_datetime(&self.created_at),
        })
    }
}

const RECURRING_COLUMNS: &str = "id, description, amount, interval, account_id, category_id, \
     next_run_date, last_run_date, active, created_at";

impl Database {
    /// Insert a recurring definition; `next_run_date` is its first scheduled
    /// date.
    pub fn insert_recurring(&self, def: &NewRecurring) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO recurring (description, amount, interval, next_run_date, account_id, category_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                def.description,
                def.amount,
                def.interval.as_str(),
                def.next_run_date.to_string(),
                def.account_id,
                def.category_id,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// List recurring definitions, active only by default.
    ///
    /// Rows with a malformed interval are logged and skipped here; the due
    /// query reports them instead so runs can surface them.
    pub fn list_recurring(&self, include_inactive: bool) -> Result<Vec<RecurringDefinition>> {
        let conn = self.conn()?;
        let sql = if include_inactive {
            format!(
                "SELECT {} FROM recurring ORDER BY next_run_date, id",
                RECURRING_COLUMNS
            )
        } else {
            format!(
                "SELECT {} FROM recurring WHERE active = 1 ORDER BY next_run_date, id",
                RECURRING_COLUMNS
            )
        };

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], RawRecurringRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut definitions = Vec::with_capacity(rows.len());
        for raw in rows {
            match raw.into_definition() {
                Ok(def) => definitions.push(def),
                Err((id, interval)) => {
                    warn!(definition = id, interval = %interval, "skipping row with malformed interval");
                }
            }
        }
        Ok(definitions)
    }

    /// Read the definitions due on `today`: active with a next run date that
    /// has arrived or passed.
    pub fn list_due_recurring(&self, today: NaiveDate) -> Result<DueRecurring> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM recurring WHERE active = 1 AND next_run_date <= ? ORDER BY next_run_date, id",
            RECURRING_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![today.to_string()], RawRecurringRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut due = DueRecurring::default();
        for raw in rows {
            match raw.into_definition() {
                Ok(def) => due.definitions.push(def),
                Err(malformed) => due.malformed.push(malformed),
            }
        }
        Ok(due)
    }

    /// Write an advanced schedule back to storage
    pub fn update_recurring_schedule(
        &self,
        id: i64,
        next_run_date: NaiveDate,
        last_run_date: Option<NaiveDate>,
    ) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE recurring SET next_run_date = ?, last_run_date = ? WHERE id = ?",
            params![
                next_run_date.to_string(),
                last_run_date.map(|d| d.to_string()),
                id
            ],
        )?;
        Ok(())
    }

    /// Activate or deactivate a definition. Deactivation removes it from
    /// consideration without touching its materialized history.
    pub fn set_recurring_active(&self, id: i64, active: bool) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE recurring SET active = ? WHERE id = ?",
            params![active, id],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample(next: NaiveDate) -> NewRecurring {
        NewRecurring {
            description: "Netflix".to_string(),
            amount: -12.99,
            interval: Interval::Monthly,
            next_run_date: next,
            account_id: None,
            category_id: None,
        }
    }

    #[test]
    fn test_insert_and_list_round_trip() {
        let db = Database::in_memory().unwrap();
        let id = db.insert_recurring(&sample(date(2024, 1, 15))).unwrap();

        let defs = db.list_recurring(false).unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].id, id);
        assert_eq!(defs[0].interval, Interval::Monthly);
        assert_eq!(defs[0].next_run_date, date(2024, 1, 15));
        assert_eq!(defs[0].last_run_date, None);
        assert!(defs[0].active);
    }

    #[test]
    fn test_due_query_boundary() {
        let db = Database::in_memory().unwrap();
        db.insert_recurring(&sample(date(2024, 1, 15))).unwrap();

        // the day before: not due
        assert!(db
            .list_due_recurring(date(2024, 1, 14))
            .unwrap()
            .definitions
            .is_empty());
        // on the day and after: due
        assert_eq!(
            db.list_due_recurring(date(2024, 1, 15))
                .unwrap()
                .definitions
                .len(),
            1
        );
        assert_eq!(
            db.list_due_recurring(date(2024, 3, 1))
                .unwrap()
                .definitions
                .len(),
            1
        );
    }

    #[test]
    fn test_inactive_excluded_from_due() {
        let db = Database::in_memory().unwrap();
        let id = db.insert_recurring(&sample(date(2024, 1, 15))).unwrap();
        db.set_recurring_active(id, false).unwrap();

        assert!(db
            .list_due_recurring(date(2024, 2, 1))
            .unwrap()
            .definitions
            .is_empty());
        // still visible when listing everything
        assert_eq!(db.list_recurring(true).unwrap().len(), 1);
        assert!(db.list_recurring(false).unwrap().is_empty());
    }

    #[test]
    fn test_schedule_update_round_trip() {
        let db = Database::in_memory().unwrap();
        let id = db.insert_recurring(&sample(date(2024, 1, 15))).unwrap();
        db.update_recurring_schedule(id, date(2024, 2, 15), Some(date(2024, 1, 15)))
            .unwrap();

        let defs = db.list_recurring(false).unwrap();
        assert_eq!(defs[0].next_run_date, date(2024, 2, 15));
        assert_eq!(defs[0].last_run_date, Some(date(2024, 1, 15)));
    }

    #[test]
    fn test_malformed_interval_reported_by_due_query() {
        let db = Database::in_memory().unwrap();
        let id = db.insert_recurring(&sample(date(2024, 1, 15))).unwrap();

        let conn = db.conn().unwrap();
        conn.execute(
            "UPDATE recurring SET interval = 'sometimes' WHERE id = ?",
            params![id],
        )
        .unwrap();
        drop(conn);

        let due = db.list_due_recurring(date(2024, 2, 1)).unwrap();
        assert!(due.definitions.is_empty());
        assert_eq!(due.malformed, vec![(id, "sometimes".to_string())]);
    }
}
