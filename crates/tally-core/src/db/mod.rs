//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `accounts` - Bank account operations
//! - `categories` - Category lookup and seeding
//! - `recurring` - Recurring definition storage and due queries
//! - `transactions` - Transaction insertion and listing

use chrono::{DateTime, NaiveDate, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::Result;

mod accounts;
mod categories;
mod recurring;
mod transactions;

pub use recurring::DueRecurring;
pub use transactions::TransactionInsertResult;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // SQLite stores as "YYYY-MM-DD HH:MM:SS" format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Parse a stored "YYYY-MM-DD" column, surfacing corruption as a rusqlite
/// conversion error instead of a panic.
pub(crate) fn parse_date_column(s: &str, idx: usize) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Create a new database connection pool and run migrations
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because each pooled
    /// connection would otherwise get its own private in-memory database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = format!(
            "{}/tally_test_{}_{}.db",
            std::env::temp_dir().display(),
            std::process::id(),
            id
        );

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new(&path)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Enable foreign keys
            PRAGMA foreign_keys = ON;

            -- WAL mode: better concurrency, readers don't block writers
            PRAGMA journal_mode = WAL;

            -- Synchronous NORMAL: good balance of safety and performance
            PRAGMA synchronous = NORMAL;

            -- Store temp tables in memory
            PRAGMA temp_store = MEMORY;

            -- Accounts (bank accounts)
            CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Categories (free-text statement labels resolve against these)
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE COLLATE NOCASE,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Transactions (imported, materialized, or manual)
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                account_id INTEGER REFERENCES accounts(id),
                category_id INTEGER REFERENCES categories(id),
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                is_recurring INTEGER NOT NULL DEFAULT 0,
                -- One row per (definition, due date): blocks concurrent
                -- recurring runs from double-booking a cycle
                recurrence_key TEXT UNIQUE,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_account_date
                ON transactions(account_id, date);

            -- Recurring definitions
            CREATE TABLE IF NOT EXISTS recurring (
                id INTEGER PRIMARY KEY,
                account_id INTEGER REFERENCES accounts(id),
                category_id INTEGER REFERENCES categories(id),
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                interval TEXT NOT NULL,
                next_run_date TEXT NOT NULL,
                last_run_date TEXT,
                active INTEGER NOT NULL DEFAULT 1,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_recurring_due
                ON recurring(active, next_run_date);

            -- Seed categories; imports fall back to 'Other' when a statement
            -- label matches nothing
            INSERT OR IGNORE INTO categories (name) VALUES
                ('Groceries'),
                ('Dining'),
                ('Transport'),
                ('Entertainment'),
                ('Utilities'),
                ('Housing'),
                ('Subscriptions'),
                ('Income'),
                ('Other');
            "#,
        )?;

        info!("Database migrations complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let db = Database::in_memory().unwrap();
        // run_migrations already ran in new(); running again must not fail
        db.run_migrations().unwrap();
    }

    #[test]
    fn test_categories_seeded() {
        let db = Database::in_memory().unwrap();
        let categories = db.list_categories().unwrap();
        assert!(categories.iter().any(|c| c.name == "Other"));
        assert!(categories.len() >= 9);
    }
}
