//! Tally Core Library
//!
//! Shared functionality for the Tally personal finance tracker:
//! - Database access and migrations
//! - Statement CSV parsing and the import pipeline
//! - Recurring transaction engine
//! - Statement duplicate detection
//! - Recurring charge suggestions from transaction history
//! - Pluggable statement extraction backends (Ollama, mock)

pub mod db;
pub mod dedup;
pub mod detect;
pub mod error;
pub mod extract;
pub mod import;
pub mod models;
pub mod recurring;

pub use db::{Database, DueRecurring, TransactionInsertResult};
pub use dedup::{filter_new, FilterOutcome, AMOUNT_TOLERANCE, MATCH_WINDOW_DAYS};
pub use detect::{analyze_transactions, MAX_SUGGESTIONS};
pub use error::{Error, Result};
pub use extract::{
    ExtractionBackend, ExtractionClient, MockExtractor, OllamaExtractor, StatementMedia,
};
pub use import::{import_candidates, import_csv, import_statement, parse_csv};
pub use models::{
    Account, Candidate, Category, ImportSummary, Interval, NewRecurring, NewTransaction,
    RecurringDefinition, RecurringSuggestion, Transaction,
};
pub use recurring::{
    advance, is_due, process_due, recurrence_key, run_due, ProcessOutcome, RecurringRunReport,
};
