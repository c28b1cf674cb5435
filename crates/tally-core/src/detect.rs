//! Recurring charge suggestion
//!
//! Scans transaction history for charges that repeat at a recognizable
//! cadence with a steady amount, and proposes recurring definitions for
//! them. Groups are keyed by a normalized description (lowercased, digits
//! stripped) so "Netflix 01" and "Netflix 02" land together.

use std::collections::HashMap;

use tracing::debug;

use crate::models::{Interval, RecurringDefinition, RecurringSuggestion, Transaction};

/// At most this many suggestions are returned, ranked by occurrence count.
pub const MAX_SUGGESTIONS: usize = 5;

/// Groups whose amounts deviate from the mean by more than this fraction of
/// the mean absolute amount are not suggested.
const AMOUNT_VARIANCE: f64 = 0.10;

/// Normalize a description into a grouping key: lowercase, digits stripped,
/// whitespace collapsed.
fn normalize_description(description: &str) -> String {
    description
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_digit())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Check that every amount in the group sits within the variance band
/// around the mean absolute amount.
fn amounts_steady(group: &[&Transaction]) -> bool {
    let amounts: Vec<f64> = group.iter().map(|t| t.amount.abs()).collect();
    let mean = amounts.iter().sum::<f64>() / amounts.len() as f64;
    if mean < 0.01 {
        return false; // avoid division by zero on tiny amounts
    }
    amounts.iter().all(|a| (a - mean).abs() <= AMOUNT_VARIANCE * mean)
}

/// Classify the average day-gap between consecutive charges.
///
/// Monthly within 30±5 days, weekly 7±2, yearly 365±10; anything else is no
/// recognizable cadence. Expects the group sorted by date.
fn classify_cadence(sorted: &[&Transaction]) -> Option<Interval> {
    let gaps: Vec<i64> = sorted
        .windows(2)
        .map(|w| (w[1].date - w[0].date).num_days())
        .collect();
    if gaps.is_empty() {
        return None;
    }

    let avg = gaps.iter().sum::<i64>() as f64 / gaps.len() as f64;

    if (avg - 30.0).abs() <= 5.0 {
        Some(Interval::Monthly)
    } else if (avg - 7.0).abs() <= 2.0 {
        Some(Interval::Weekly)
    } else if (avg - 365.0).abs() <= 10.0 {
        Some(Interval::Yearly)
    } else {
        None
    }
}

/// True when the group is already covered by a recurring definition:
/// the normalized key appears inside the definition's description and the
/// amounts are within one currency unit.
fn covered_by_existing(key: &str, amount: f64, existing: &[RecurringDefinition]) -> bool {
    existing
        .iter()
        .any(|def| def.description.to_lowercase().contains(key) && (def.amount - amount).abs() < 1.0)
}

/// Detect recurring charge patterns in a transaction history.
///
/// Returns at most [`MAX_SUGGESTIONS`] suggestions, ranked by occurrence
/// count descending. Each carries the literal description and amount of the
/// group's most recent transaction, and a confidence score of
/// `0.8 + 0.05 * occurrences` (a ranking score, uncapped).
pub fn analyze_transactions(
    transactions: &[Transaction],
    existing: &[RecurringDefinition],
) -> Vec<RecurringSuggestion> {
    let mut groups: HashMap<String, Vec<&Transaction>> = HashMap::new();
    for tx in transactions {
        let key = normalize_description(&tx.description);
        if key.is_empty() {
            continue;
        }
        groups.entry(key).or_default().push(tx);
    }

    let mut suggestions = Vec::new();

    for (key, mut group) in groups {
        if group.len() < 2 {
            continue; // need at least 2 charges to see a pattern
        }

        if !amounts_steady(&group) {
            debug!(key = %key, "dropping group with unsteady amounts");
            continue;
        }

        group.sort_by_key(|t| t.date);

        let Some(interval) = classify_cadence(&group) else {
            continue;
        };

        // group is non-empty, sorted; last is the most recent charge
        let latest = group[group.len() - 1];

        if covered_by_existing(&key, latest.amount, existing) {
            debug!(key = %key, "group already covered by a recurring definition");
            continue;
        }

        suggestions.push(RecurringSuggestion {
            description: latest.description.clone(),
            amount: latest.amount,
            interval,
            occurrence_count: group.len(),
            confidence: 0.8 + 0.05 * group.len() as f64,
        });
    }

    suggestions.sort_by(|a, b| b.occurrence_count.cmp(&a.occurrence_count));
    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn tx(id: i64, date: NaiveDate, description: &str, amount: f64) -> Transaction {
        Transaction {
            id,
            account_id: Some(1),
            category_id: None,
            date,
            description: description.to_string(),
            amount,
            is_recurring: false,
            recurrence_key: None,
            created_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_normalize_description() {
        assert_eq!(normalize_description("Netflix 01"), "netflix");
        assert_eq!(normalize_description("  SPOTIFY  123  "), "spotify");
        assert_eq!(normalize_description("12345"), "");
    }

    #[test]
    fn test_monthly_pattern_detected() {
        // Three Netflix charges at ~30-day gaps: monthly, count 3,
        // confidence 0.8 + 3 * 0.05 = 0.95.
        let history = vec![
            tx(1, date(2024, 1, 5), "Netflix 01", -12.99),
            tx(2, date(2024, 2, 4), "Netflix 02", -12.99),
            tx(3, date(2024, 3, 5), "Netflix 03", -12.99),
        ];

        let suggestions = analyze_transactions(&history, &[]);
        assert_eq!(suggestions.len(), 1);

        let s = &suggestions[0];
        assert_eq!(s.interval, Interval::Monthly);
        assert_eq!(s.occurrence_count, 3);
        assert!((s.confidence - 0.95).abs() < 1e-9);
        // literal fields from the most recent charge
        assert_eq!(s.description, "Netflix 03");
        assert_eq!(s.amount, -12.99);
    }

    #[test]
    fn test_weekly_and_yearly_cadence() {
        let weekly = vec![
            tx(1, date(2024, 1, 1), "Cleaner A", -40.0),
            tx(2, date(2024, 1, 8), "Cleaner B", -40.0),
            tx(3, date(2024, 1, 15), "Cleaner C", -40.0),
        ];
        let yearly = vec![
            tx(4, date(2022, 3, 1), "Domain 1", -15.0),
            tx(5, date(2023, 3, 1), "Domain 2", -15.0),
        ];

        let s = analyze_transactions(&weekly, &[]);
        assert_eq!(s[0].interval, Interval::Weekly);

        let s = analyze_transactions(&yearly, &[]);
        assert_eq!(s[0].interval, Interval::Yearly);
    }

    #[test]
    fn test_unsteady_amounts_rejected() {
        // 20% swing exceeds the 10% band
        let history = vec![
            tx(1, date(2024, 1, 5), "Grocer 1", -100.0),
            tx(2, date(2024, 2, 4), "Grocer 2", -140.0),
        ];
        assert!(analyze_transactions(&history, &[]).is_empty());
    }

    #[test]
    fn test_unrecognized_cadence_dropped() {
        // ~17-day gap matches no cadence
        let history = vec![
            tx(1, date(2024, 1, 1), "Cafe 1", -9.0),
            tx(2, date(2024, 1, 18), "Cafe 2", -9.0),
        ];
        assert!(analyze_transactions(&history, &[]).is_empty());
    }

    #[test]
    fn test_single_charge_no_suggestion() {
        let history = vec![tx(1, date(2024, 1, 1), "One Off", -5.0)];
        assert!(analyze_transactions(&history, &[]).is_empty());
    }

    #[test]
    fn test_existing_definition_suppresses_group() {
        let history = vec![
            tx(1, date(2024, 1, 5), "Netflix 01", -12.99),
            tx(2, date(2024, 2, 4), "Netflix 02", -12.99),
        ];
        let existing = vec![RecurringDefinition {
            id: 1,
            description: "Netflix".to_string(),
            amount: -12.99,
            interval: Interval::Monthly,
            next_run_date: date(2024, 3, 5),
            last_run_date: None,
            active: true,
            account_id: None,
            category_id: None,
            created_at: Utc::now(),
        }];

        assert!(analyze_transactions(&history, &existing).is_empty());

        // a definition at a very different amount does not suppress
        let mut other = existing.clone();
        other[0].amount = -29.99;
        assert_eq!(analyze_transactions(&history, &other).len(), 1);
    }

    #[test]
    fn test_ranked_by_occurrences_and_truncated() {
        let mut history = Vec::new();
        // six distinct monthly patterns with different occurrence counts
        for (i, name) in ["Alpha", "Beta", "Gamma", "Delta", "Epsilon", "Zeta"]
            .iter()
            .enumerate()
        {
            let occurrences = i + 2;
            for n in 0..occurrences {
                history.push(tx(
                    (i * 10 + n) as i64,
                    date(2023, 1, 15) + chrono::Duration::days(30 * n as i64),
                    &format!("{} Service", name),
                    -10.0 - i as f64,
                ));
            }
        }

        let suggestions = analyze_transactions(&history, &[]);
        assert_eq!(suggestions.len(), MAX_SUGGESTIONS);
        // descending occurrence counts
        for pair in suggestions.windows(2) {
            assert!(pair[0].occurrence_count >= pair[1].occurrence_count);
        }
        assert_eq!(suggestions[0].occurrence_count, 7);
        // the 2-occurrence group fell off the end
        assert!(suggestions.iter().all(|s| s.occurrence_count > 2));
    }
}
