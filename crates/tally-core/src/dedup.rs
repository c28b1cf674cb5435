//! Statement duplicate detection
//!
//! Decides whether newly observed transactions already exist in an account's
//! history, so statement imports and recurring collisions don't double-book.
//! Two records describe the same real-world charge when their amounts are
//! within a currency-unit tolerance and their dates within a few days; the
//! description does not participate in the match.

use tracing::debug;

use crate::models::{Candidate, Transaction};

/// Amounts closer than this are treated as equal (strict `<`).
pub const AMOUNT_TOLERANCE: f64 = 0.01;

/// Candidate and existing dates may differ by up to this many days.
pub const MATCH_WINDOW_DAYS: i64 = 3;

/// Candidates that survived the duplicate check, plus the count that didn't.
#[derive(Debug, Default)]
pub struct FilterOutcome {
    pub accepted: Vec<Candidate>,
    pub duplicate_count: usize,
}

fn is_duplicate_pair(existing: &Transaction, candidate: &Candidate) -> bool {
    (existing.amount - candidate.amount).abs() < AMOUNT_TOLERANCE
        && (existing.date - candidate.date).num_days().abs() <= MATCH_WINDOW_DAYS
}

/// Split candidates into genuinely-new records and duplicates of history.
///
/// The match is greedy and non-consuming: the first matching existing
/// transaction marks a candidate as duplicate, and one existing transaction
/// may mark any number of candidates. Deterministic for given input sets.
pub fn filter_new(candidates: Vec<Candidate>, existing: &[Transaction]) -> FilterOutcome {
    let total = candidates.len();
    let accepted: Vec<Candidate> = candidates
        .into_iter()
        .filter(|candidate| !existing.iter().any(|e| is_duplicate_pair(e, candidate)))
        .collect();
    let duplicate_count = total - accepted.len();

    if duplicate_count > 0 {
        debug!(
            "Duplicate check: {} of {} candidate(s) already present",
            duplicate_count, total
        );
    }

    FilterOutcome {
        accepted,
        duplicate_count,
    }
}
