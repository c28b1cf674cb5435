//! JSON recovery for extraction responses
//!
//! Models often wrap the JSON payload in extra prose; these helpers locate
//! the JSON array in the response and convert its records into candidates.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::import::parse_date;
use crate::models::Candidate;

/// One extracted record as the model emits it
#[derive(Debug, Deserialize)]
struct WireTransaction {
    date: String,
    description: String,
    amount: f64,
    #[serde(default)]
    category: Option<String>,
}

/// Parse candidate transactions out of a model response
pub fn parse_candidates(response: &str) -> Result<Vec<Candidate>> {
    let response = response.trim();

    // Look for the JSON array
    let start = response.find('[');
    let end = response.rfind(']');

    let json_str = match (start, end) {
        (Some(s), Some(e)) if s < e => &response[s..=e],
        _ => {
            return Err(Error::InvalidData(format!(
                "No JSON array found in extraction response | Raw: {}",
                truncate(response)
            )))
        }
    };

    let records: Vec<WireTransaction> = serde_json::from_str(json_str).map_err(|e| {
        Error::InvalidData(format!(
            "Invalid JSON from extraction: {} | Raw: {}",
            e,
            truncate(json_str)
        ))
    })?;

    records
        .into_iter()
        .map(|r| {
            Ok(Candidate {
                date: parse_date(&r.date)?,
                description: r.description,
                amount: r.amount,
                category: r.category,
            })
        })
        .collect()
}

/// Truncate long responses for error messages
fn truncate(s: &str) -> String {
    if s.len() > 200 {
        format!("{}...", &s[..200])
    } else {
        s.to_string()
    }
}
