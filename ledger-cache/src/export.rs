//! CSV export
//!
//! Renders a snapshot as CSV for download. The header and the `N/A`
//! placeholder for a missing fraud score are part of the product contract
//! and must not change.

use chrono::Utc;

use crate::types::LedgerEntry;

/// Fixed header row
pub const CSV_HEADER: &str = "ID,Amount,Prediction,Probability,Fraud Score,Timestamp";

/// Render entries as CSV, one row per entry in snapshot order
pub fn to_csv(entries: &[LedgerEntry]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + entries.len() * 64);
    out.push_str(CSV_HEADER);
    out.push('\n');

    for entry in entries {
        let verdict = entry.verdict.as_ref();

        let prediction = verdict.map(|v| v.prediction.label().to_string()).unwrap_or_default();
        let probability = verdict.map(|v| v.probability.to_string()).unwrap_or_default();
        let fraud_score = verdict
            .and_then(|v| v.fraud_score)
            .map(|score| score.to_string())
            .unwrap_or_else(|| "N/A".to_string());

        let row = [
            escape_field(entry.id.as_str()),
            entry.amount.to_string(),
            prediction,
            probability,
            fraud_score,
            entry.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ];

        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

/// Download filename in the product's established convention
pub fn suggested_filename() -> String {
    format!(
        "fraudguard_transactions_{}.csv",
        Utc::now().timestamp_millis()
    )
}

/// Quote a field when it would break the row structure
///
/// Only ids can carry arbitrary text (remote-assigned); the other columns
/// are numbers, fixed labels or formatted timestamps.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
