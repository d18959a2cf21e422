//! Ledger statistics
//!
//! Aggregates are derived from the full snapshot on every access, never
//! maintained incrementally; with the snapshot capped at capacity the scan
//! is cheap and cannot drift from the entries it describes.

use serde::{Deserialize, Serialize};

use crate::types::LedgerEntry;

/// Aggregate counters over a ledger snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LedgerStats {
    /// Number of entries
    pub total: usize,

    /// Entries scored as fraudulent
    pub frauds: usize,

    /// Everything else, including unscored entries
    pub legitimate: usize,

    /// Share of legitimate entries in percent, one decimal
    ///
    /// A legitimate-rate proxy, not ground-truth model accuracy. `0.0`
    /// for an empty snapshot.
    pub accuracy_proxy: f64,
}

impl LedgerStats {
    /// Derive statistics from a snapshot
    pub fn compute(entries: &[LedgerEntry]) -> Self {
        let total = entries.len();
        let frauds = entries.iter().filter(|entry| entry.is_fraud()).count();
        let legitimate = total - frauds;

        let accuracy_proxy = if total == 0 {
            0.0
        } else {
            round_one_decimal(legitimate as f64 / total as f64 * 100.0)
        };

        Self {
            total,
            frauds,
            legitimate,
            accuracy_proxy,
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountId, EntryDraft, Prediction, Verdict};
    use rust_decimal_macros::dec;

    fn scored_entry(prediction: Prediction) -> LedgerEntry {
        EntryDraft::new(AccountId::new("AC1"), AccountId::new("AC2"), dec!(100))
            .with_verdict(Verdict::new(prediction, 0.5))
            .finalize()
    }

    fn unscored_entry() -> LedgerEntry {
        EntryDraft::new(AccountId::new("AC1"), AccountId::new("AC2"), dec!(100)).finalize()
    }

    #[test]
    fn test_empty_snapshot_is_all_zero() {
        let stats = LedgerStats::compute(&[]);

        assert_eq!(stats.total, 0);
        assert_eq!(stats.frauds, 0);
        assert_eq!(stats.legitimate, 0);
        assert_eq!(stats.accuracy_proxy, 0.0);
    }

    #[test]
    fn test_single_legitimate_entry() {
        let stats = LedgerStats::compute(&[scored_entry(Prediction::Legitimate)]);

        assert_eq!(stats.total, 1);
        assert_eq!(stats.frauds, 0);
        assert_eq!(stats.legitimate, 1);
        assert_eq!(stats.accuracy_proxy, 100.0);
    }

    #[test]
    fn test_mixed_snapshot() {
        let entries = vec![
            scored_entry(Prediction::Fraudulent),
            scored_entry(Prediction::Fraudulent),
            scored_entry(Prediction::Fraudulent),
            scored_entry(Prediction::Legitimate),
            scored_entry(Prediction::Legitimate),
        ];

        let stats = LedgerStats::compute(&entries);

        assert_eq!(stats.total, 5);
        assert_eq!(stats.frauds, 3);
        assert_eq!(stats.legitimate, 2);
        assert_eq!(stats.accuracy_proxy, 40.0);
    }

    #[test]
    fn test_unscored_entries_count_as_legitimate() {
        let entries = vec![scored_entry(Prediction::Fraudulent), unscored_entry()];

        let stats = LedgerStats::compute(&entries);

        assert_eq!(stats.frauds, 1);
        assert_eq!(stats.legitimate, 1);
        assert_eq!(stats.accuracy_proxy, 50.0);
    }

    #[test]
    fn test_accuracy_proxy_rounds_to_one_decimal() {
        let entries = vec![
            scored_entry(Prediction::Fraudulent),
            scored_entry(Prediction::Legitimate),
            scored_entry(Prediction::Legitimate),
        ];

        // 2/3 = 66.666..%
        let stats = LedgerStats::compute(&entries);
        assert_eq!(stats.accuracy_proxy, 66.7);
    }

    #[test]
    fn test_counters_always_reconcile() {
        let entries = vec![
            scored_entry(Prediction::Fraudulent),
            scored_entry(Prediction::Legitimate),
            unscored_entry(),
        ];

        let stats = LedgerStats::compute(&entries);
        assert_eq!(stats.frauds + stats.legitimate, stats.total);
    }
}
