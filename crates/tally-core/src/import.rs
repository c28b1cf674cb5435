//! Statement import
//!
//! CSV parsing for bank statement exports plus the candidate pipeline:
//! parse or extract candidates, drop the ones already present in the
//! account's history, resolve category labels, insert the rest. The summary
//! reports total/new/duplicate counts so skipped duplicates are visible
//! rather than silently lost.

use std::io::Read;

use chrono::{Duration, NaiveDate};
use csv::ReaderBuilder;
use tracing::{debug, info};

use crate::db::Database;
use crate::dedup::{self, MATCH_WINDOW_DAYS};
use crate::error::{Error, Result};
use crate::extract::{ExtractionBackend, ExtractionClient, StatementMedia};
use crate::models::{Candidate, ImportSummary, NewTransaction};

/// Column indices resolved from a statement CSV header
struct StatementColumns {
    date: usize,
    description: usize,
    amount: usize,
    category: Option<usize>,
}

impl StatementColumns {
    /// Resolve required columns by header name, case-insensitive.
    ///
    /// Banks disagree on header spelling; the aliases below cover the common
    /// exports (Chase-style "Transaction Date", generic "Date", "Payee").
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |names: &[&str]| {
            headers.iter().position(|h| {
                let h = h.trim().to_lowercase();
                names.iter().any(|n| h == *n)
            })
        };

        let date = find(&["date", "transaction date", "posted date"]);
        let description = find(&["description", "payee", "merchant"]);
        let amount = find(&["amount"]);
        let category = find(&["category"]);

        match (date, description, amount) {
            (Some(date), Some(description), Some(amount)) => Ok(Self {
                date,
                description,
                amount,
                category,
            }),
            _ => Err(Error::UnsupportedFormat(
                headers.iter().collect::<Vec<_>>().join(","),
            )),
        }
    }
}

/// Parse a statement CSV into import candidates.
///
/// The header must name date, description and amount columns; a category
/// column is carried through as a free-text label when present. Rows with an
/// empty amount cell are skipped.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Candidate>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = StatementColumns::from_headers(&headers)?;

    let mut candidates = Vec::new();

    for result in rdr.records() {
        let record = result?;

        let date_str = record
            .get(columns.date)
            .ok_or_else(|| Error::Import("Missing date".into()))?;
        let date = parse_date(date_str)?;

        let description = record
            .get(columns.description)
            .ok_or_else(|| Error::Import("Missing description".into()))?
            .trim()
            .to_string();

        let amount_str = record.get(columns.amount).unwrap_or("");
        if amount_str.trim().is_empty() {
            continue; // pending rows export without an amount
        }
        let amount = parse_amount(amount_str)?;

        let category = columns
            .category
            .and_then(|col| record.get(col))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        candidates.push(Candidate {
            date,
            description,
            amount,
            category,
        });
    }

    debug!("Parsed {} statement row(s)", candidates.len());
    Ok(candidates)
}

/// Run candidates through the duplicate check and insert the survivors.
///
/// The duplicate window is the candidates' own date span padded by the
/// match window on both sides, scoped to the target account.
pub fn import_candidates(
    db: &Database,
    account_id: i64,
    candidates: Vec<Candidate>,
) -> Result<ImportSummary> {
    let total = candidates.len();
    if candidates.is_empty() {
        return Ok(ImportSummary::default());
    }

    // candidates is non-empty, min/max exist
    let first = candidates.iter().map(|c| c.date).min().unwrap_or_default();
    let last = candidates.iter().map(|c| c.date).max().unwrap_or_default();
    let existing = db.list_transactions_in_range(
        account_id,
        first - Duration::days(MATCH_WINDOW_DAYS),
        last + Duration::days(MATCH_WINDOW_DAYS),
    )?;

    let outcome = dedup::filter_new(candidates, &existing);

    let mut imported = 0;
    for candidate in outcome.accepted {
        let category_id = db.resolve_category(candidate.category.as_deref())?;
        db.insert_transaction(&NewTransaction {
            account_id: Some(account_id),
            category_id: Some(category_id),
            date: candidate.date,
            description: candidate.description,
            amount: candidate.amount,
            is_recurring: false,
            recurrence_key: None,
        })?;
        imported += 1;
    }

    info!(
        "Import complete: {} row(s), {} new, {} duplicate(s) skipped",
        total, imported, outcome.duplicate_count
    );

    Ok(ImportSummary {
        total,
        imported,
        duplicates: outcome.duplicate_count,
    })
}

/// Parse a statement CSV and import it into an account
pub fn import_csv<R: Read>(db: &Database, account_id: i64, reader: R) -> Result<ImportSummary> {
    let candidates = parse_csv(reader)?;
    import_candidates(db, account_id, candidates)
}

/// Extract candidates from raw statement bytes and import them.
///
/// An extraction failure fails the whole batch; a half-parsed statement is
/// never partially accepted.
pub async fn import_statement(
    db: &Database,
    account_id: i64,
    data: &[u8],
    media: StatementMedia,
    extractor: &ExtractionClient,
) -> Result<ImportSummary> {
    let candidates = extractor.extract_statement(data, media).await?;
    import_candidates(db, account_id, candidates)
}

/// Parse a date string in various common formats
pub(crate) fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    // Try common date formats
    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%m/%d/%y", // 01/15/24
        "%m-%d-%Y", // 01-15-2024
        "%d/%m/%Y", // 15/01/2024 (European)
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse an amount string, handling currency symbols and commas
pub(crate) fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned
        .parse::<f64>()
        .map_err(|_| Error::Import(format!("Unable to parse amount: {}", s)))
}
