//! Integration tests for tally-core
//!
//! These tests exercise the full import → dedup → suggest and
//! recurring-run workflows.

use chrono::NaiveDate;

use tally_core::{
    db::Database,
    detect::analyze_transactions,
    extract::{ExtractionClient, MockExtractor, StatementMedia},
    import::{import_csv, import_statement},
    models::{Candidate, Interval, NewRecurring},
    recurring::run_due,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Statement with three Netflix charges at ~30-day gaps plus noise
fn statement_csv() -> &'static str {
    "Date,Description,Amount,Category\n\
     2024-01-05,Netflix 01,-12.99,Entertainment\n\
     2024-02-04,Netflix 02,-12.99,Entertainment\n\
     2024-03-05,Netflix 03,-12.99,Entertainment\n\
     2024-01-12,GROCERY OUTLET,-84.20,Groceries\n\
     2024-02-20,GROCERY OUTLET,-61.75,Groceries\n\
     2024-03-01,PAYCHECK,2500.00,Income\n"
}

// =============================================================================
// Import + Dedup
// =============================================================================

#[test]
fn test_full_import_workflow() {
    let db = Database::in_memory().expect("Failed to create test database");
    let account_id = db.upsert_account("Checking").unwrap();

    let summary = import_csv(&db, account_id, statement_csv().as_bytes()).unwrap();
    assert_eq!(summary.total, 6);
    assert_eq!(summary.imported, 6);
    assert_eq!(summary.duplicates, 0);

    // Re-importing the same statement classifies everything as duplicate
    let summary = import_csv(&db, account_id, statement_csv().as_bytes()).unwrap();
    assert_eq!(summary.imported, 0);
    assert_eq!(summary.duplicates, 6);

    let stored = db.list_transactions(None, 100, 0).unwrap();
    assert_eq!(stored.len(), 6);

    // Category labels resolved against the seeded table
    let categories = db.list_categories().unwrap();
    let income = categories.iter().find(|c| c.name == "Income").unwrap();
    let paycheck = stored.iter().find(|t| t.description == "PAYCHECK").unwrap();
    assert_eq!(paycheck.category_id, Some(income.id));
}

#[tokio::test]
async fn test_statement_extraction_workflow() {
    let db = Database::in_memory().unwrap();
    let account_id = db.upsert_account("Checking").unwrap();

    // Pretend the vision model read two rows off a statement photo
    let extractor = ExtractionClient::Mock(MockExtractor::with_candidates(vec![
        Candidate {
            date: date(2024, 1, 10),
            description: "COFFEE HOUSE".to_string(),
            amount: -4.50,
            category: Some("Dining".to_string()),
        },
        Candidate {
            date: date(2024, 1, 11),
            description: "BOOKSTORE".to_string(),
            amount: -22.00,
            category: None,
        },
    ]));

    let summary = import_statement(&db, account_id, b"raw image bytes", StatementMedia::Image, &extractor)
        .await
        .unwrap();
    assert_eq!(summary.imported, 2);

    // A second pass over the same statement finds only duplicates
    let summary = import_statement(&db, account_id, b"raw image bytes", StatementMedia::Image, &extractor)
        .await
        .unwrap();
    assert_eq!(summary.imported, 0);
    assert_eq!(summary.duplicates, 2);
}

// =============================================================================
// Recurring suggestions over imported history
// =============================================================================

#[test]
fn test_suggestions_from_imported_history() {
    let db = Database::in_memory().unwrap();
    let account_id = db.upsert_account("Checking").unwrap();
    import_csv(&db, account_id, statement_csv().as_bytes()).unwrap();

    let history = db.list_transactions(None, 1000, 0).unwrap();
    let existing = db.list_recurring(false).unwrap();
    let suggestions = analyze_transactions(&history, &existing);

    // The grocery runs vary too much and the paycheck appears once;
    // only Netflix survives.
    assert_eq!(suggestions.len(), 1);
    let s = &suggestions[0];
    assert_eq!(s.interval, Interval::Monthly);
    assert_eq!(s.occurrence_count, 3);
    assert!((s.confidence - 0.95).abs() < 1e-9);

    // Once a matching definition exists, the suggestion disappears
    db.insert_recurring(&NewRecurring {
        description: "Netflix".to_string(),
        amount: s.amount,
        interval: s.interval,
        next_run_date: date(2024, 4, 4),
        account_id: Some(account_id),
        category_id: None,
    })
    .unwrap();

    let existing = db.list_recurring(false).unwrap();
    assert!(analyze_transactions(&history, &existing).is_empty());
}

// =============================================================================
// Recurring engine over storage
// =============================================================================

#[test]
fn test_recurring_run_materializes_and_advances() {
    let db = Database::in_memory().unwrap();
    let account_id = db.upsert_account("Checking").unwrap();

    db.insert_recurring(&NewRecurring {
        description: "Rent".to_string(),
        amount: -1200.0,
        interval: Interval::Monthly,
        next_run_date: date(2024, 1, 15),
        account_id: Some(account_id),
        category_id: None,
    })
    .unwrap();

    // Overdue by six weeks: fires once, dated on the due date
    let report = run_due(&db, date(2024, 3, 1)).unwrap();
    assert_eq!(report.fired, 1);
    assert!(report.failed.is_empty());

    let transactions = db.list_transactions(Some(account_id), 10, 0).unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].date, date(2024, 1, 15));
    assert_eq!(transactions[0].amount, -1200.0);
    assert!(transactions[0].is_recurring);

    let defs = db.list_recurring(false).unwrap();
    assert_eq!(defs[0].next_run_date, date(2024, 2, 15));
    assert_eq!(defs[0].last_run_date, Some(date(2024, 1, 15)));

    // Re-invoking walks the schedule forward one cycle at a time
    let report = run_due(&db, date(2024, 3, 1)).unwrap();
    assert_eq!(report.fired, 1);
    let defs = db.list_recurring(false).unwrap();
    assert_eq!(defs[0].next_run_date, date(2024, 3, 15));

    // Now ahead of today: nothing due
    let report = run_due(&db, date(2024, 3, 1)).unwrap();
    assert_eq!(report.processed(), 0);
    assert_eq!(db.list_transactions(Some(account_id), 10, 0).unwrap().len(), 2);
}

#[test]
fn test_recurring_and_import_dedup_interplay() {
    // A statement that contains the same charge the engine materialized
    // should not double-book it.
    let db = Database::in_memory().unwrap();
    let account_id = db.upsert_account("Checking").unwrap();

    db.insert_recurring(&NewRecurring {
        description: "Gym Membership".to_string(),
        amount: -30.0,
        interval: Interval::Monthly,
        next_run_date: date(2024, 1, 10),
        account_id: Some(account_id),
        category_id: None,
    })
    .unwrap();

    run_due(&db, date(2024, 1, 10)).unwrap();

    // The bank statement shows the same charge two days later
    let csv = "Date,Description,Amount\n2024-01-12,GYM MEMBERSHIP LLC,-30.00\n";
    let summary = import_csv(&db, account_id, csv.as_bytes()).unwrap();
    assert_eq!(summary.imported, 0);
    assert_eq!(summary.duplicates, 1);

    assert_eq!(db.list_transactions(Some(account_id), 10, 0).unwrap().len(), 1);
}
