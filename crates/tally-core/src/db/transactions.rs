//! Transaction operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use super::{parse_date_column, parse_datetime, Database};
use crate::error::Result;
use crate::models::{NewTransaction, Transaction};

/// Result of inserting a transaction
#[derive(Debug, Clone)]
pub enum TransactionInsertResult {
    /// Transaction was inserted successfully, contains new transaction ID
    Inserted(i64),
    /// The recurrence key already existed, contains existing transaction ID
    Duplicate(i64),
}

fn transaction_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Transaction> {
    let date_str: String = row.get(3)?;
    let created_at: String = row.get(8)?;
    Ok(Transaction {
        id: row.get(0)?,
        account_id: row.get(1)?,
        category_id: row.get(2)?,
        date: parse_date_column(&date_str, 3)?,
        description: row.get(4)?,
        amount: row.get(5)?,
        is_recurring: row.get(6)?,
        recurrence_key: row.get(7)?,
        created_at: parse_datetime(&created_at),
    })
}

const TRANSACTION_COLUMNS: &str =
    "id, account_id, category_id, date, description, amount, is_recurring, recurrence_key, created_at";

impl Database {
    /// Insert a transaction.
    ///
    /// When the transaction carries a recurrence key, an existing row with
    /// the same key makes this a no-op returning `Duplicate` - the cycle was
    /// already materialized, possibly by a concurrent run.
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<TransactionInsertResult> {
        let conn = self.conn()?;

        if let Some(key) = &tx.recurrence_key {
            let existing: Option<i64> = conn
                .query_row(
                    "SELECT id FROM transactions WHERE recurrence_key = ?",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(existing_id) = existing {
                return Ok(TransactionInsertResult::Duplicate(existing_id));
            }
        }

        conn.execute(
            r#"
            INSERT INTO transactions (account_id, category_id, date, description, amount, is_recurring, recurrence_key)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.account_id,
                tx.category_id,
                tx.date.to_string(),
                tx.description,
                tx.amount,
                tx.is_recurring,
                tx.recurrence_key,
            ],
        )?;

        Ok(TransactionInsertResult::Inserted(conn.last_insert_rowid()))
    }

    /// List transactions, newest first, optionally filtered by account
    pub fn list_transactions(
        &self,
        account_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let transactions = if let Some(acc_id) = account_id {
            let sql = format!(
                "SELECT {} FROM transactions WHERE account_id = ? ORDER BY date DESC, id DESC LIMIT ? OFFSET ?",
                TRANSACTION_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![acc_id, limit, offset], transaction_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        } else {
            let sql = format!(
                "SELECT {} FROM transactions ORDER BY date DESC, id DESC LIMIT ? OFFSET ?",
                TRANSACTION_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![limit, offset], transaction_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        };

        Ok(transactions)
    }

    /// List an account's transactions within an inclusive date range.
    ///
    /// This is the duplicate-check window for statement imports.
    pub fn list_transactions_in_range(
        &self,
        account_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions WHERE account_id = ? AND date >= ? AND date <= ? ORDER BY date, id",
            TRANSACTION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let transactions = stmt
            .query_map(
                params![account_id, from.to_string(), to.to_string()],
                transaction_from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_tx(date: NaiveDate, amount: f64, key: Option<&str>) -> NewTransaction {
        NewTransaction {
            account_id: None,
            category_id: None,
            date,
            description: "TEST".to_string(),
            amount,
            is_recurring: key.is_some(),
            recurrence_key: key.map(String::from),
        }
    }

    #[test]
    fn test_insert_without_key_never_deduplicates() {
        let db = Database::in_memory().unwrap();
        let tx = new_tx(date(2024, 1, 1), -5.0, None);
        assert!(matches!(
            db.insert_transaction(&tx).unwrap(),
            TransactionInsertResult::Inserted(_)
        ));
        assert!(matches!(
            db.insert_transaction(&tx).unwrap(),
            TransactionInsertResult::Inserted(_)
        ));
        assert_eq!(db.list_transactions(None, 10, 0).unwrap().len(), 2);
    }

    #[test]
    fn test_insert_with_key_deduplicates() {
        let db = Database::in_memory().unwrap();
        let tx = new_tx(date(2024, 1, 1), -5.0, Some("abc123"));

        let first = db.insert_transaction(&tx).unwrap();
        let TransactionInsertResult::Inserted(first_id) = first else {
            panic!("expected insert");
        };

        match db.insert_transaction(&tx).unwrap() {
            TransactionInsertResult::Duplicate(existing) => assert_eq!(existing, first_id),
            other => panic!("expected duplicate, got {:?}", other),
        }

        assert_eq!(db.list_transactions(None, 10, 0).unwrap().len(), 1);
    }

    #[test]
    fn test_range_query_is_inclusive_and_account_scoped() {
        let db = Database::in_memory().unwrap();
        let account = db.upsert_account("Checking").unwrap();
        let other = db.upsert_account("Savings").unwrap();

        for (day, acc) in [(1, account), (5, account), (9, account), (5, other)] {
            let mut tx = new_tx(date(2024, 1, day), -5.0, None);
            tx.account_id = Some(acc);
            db.insert_transaction(&tx).unwrap();
        }

        let in_range = db
            .list_transactions_in_range(account, date(2024, 1, 1), date(2024, 1, 5))
            .unwrap();
        assert_eq!(in_range.len(), 2);
        assert!(in_range.iter().all(|t| t.account_id == Some(account)));
    }
}
