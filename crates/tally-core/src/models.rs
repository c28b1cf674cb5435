//! Domain models for Tally

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A bank account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A spending category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Recurring schedule interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" | "annual" => Ok(Self::Yearly),
            _ => Err(format!("Unknown interval: {}", s)),
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recurring transaction definition
///
/// `next_run_date` is always the earliest date the definition is eligible to
/// fire. Once fired, it advances by exactly one interval unit from its
/// pre-fire value, and `last_run_date` records that pre-fire value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringDefinition {
    pub id: i64,
    pub description: String,
    /// Negative = expense, positive = income
    pub amount: f64,
    pub interval: Interval,
    pub next_run_date: NaiveDate,
    pub last_run_date: Option<NaiveDate>,
    /// Inactive definitions are permanently out of consideration but keep
    /// their materialized history.
    pub active: bool,
    pub account_id: Option<i64>,
    pub category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// A new recurring definition to be persisted
#[derive(Debug, Clone)]
pub struct NewRecurring {
    pub description: String,
    pub amount: f64,
    pub interval: Interval,
    /// First scheduled date
    pub next_run_date: NaiveDate,
    pub account_id: Option<i64>,
    pub category_id: Option<i64>,
}

/// A persisted financial transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub account_id: Option<i64>,
    pub category_id: Option<i64>,
    pub date: NaiveDate,
    pub description: String,
    /// Negative = expense, positive = income
    pub amount: f64,
    /// True when materialized from a recurring definition
    pub is_recurring: bool,
    /// Idempotency key for materialized recurring cycles
    pub recurrence_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A new transaction to be persisted
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: Option<i64>,
    pub category_id: Option<i64>,
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub is_recurring: bool,
    pub recurrence_key: Option<String>,
}

/// An unpersisted transaction observed during statement import
///
/// Exists only for the duration of the import pipeline; discarded after the
/// duplicate check decides its fate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    /// Free-text category label from the statement or the extraction model
    pub category: Option<String>,
}

/// A proposed recurring definition detected from transaction history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringSuggestion {
    /// Literal description of the group's most recent transaction
    pub description: String,
    pub amount: f64,
    pub interval: Interval,
    pub occurrence_count: usize,
    /// Ranking score, not a probability; grows with occurrence count and is
    /// deliberately not capped at 1.0.
    pub confidence: f64,
}

/// Outcome counts for one statement import
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total: usize,
    pub imported: usize,
    pub duplicates: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_round_trip() {
        for interval in [
            Interval::Daily,
            Interval::Weekly,
            Interval::Monthly,
            Interval::Yearly,
        ] {
            assert_eq!(interval.as_str().parse::<Interval>().unwrap(), interval);
        }
    }

    #[test]
    fn test_interval_rejects_unknown() {
        assert!("fortnightly".parse::<Interval>().is_err());
        assert!("".parse::<Interval>().is_err());
    }
}
