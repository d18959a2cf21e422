//! Core types for the transaction ledger
//!
//! All types are designed for:
//! - Deterministic serialization (bincode for the persisted snapshot)
//! - Exact arithmetic (Decimal for money and numeric features)
//! - Immutability once persisted (append/clear only, no in-place edits)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::features::FeatureSchema;

/// Probability above which a verdict is escalated as high risk in the UI.
///
/// Part of the presentation contract of the surrounding product; the value
/// must stay at 0.8.
pub const HIGH_RISK_THRESHOLD: f64 = 0.8;

/// Account identifier (free-form, e.g. `AC45841234567890123`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create new account ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the identifier is empty or whitespace only
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ledger entry identifier
///
/// Locally generated ids use a `txn-` prefix over a UUIDv7 so they stay
/// time-ordered and collision-free within and across process lifetimes.
/// Ids assigned by the remote authority are accepted verbatim on hydrate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(String);

impl EntryId {
    /// Wrap an existing identifier (e.g. one received from the remote side)
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh local identifier
    pub fn generate() -> Self {
        Self(format!("txn-{}", Uuid::now_v7().simple()))
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scoring verdict label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prediction {
    /// Scored as fraudulent
    Fraudulent,
    /// Scored as legitimate
    Legitimate,
}

impl Prediction {
    /// Display label, as rendered in tables and CSV exports
    pub fn label(&self) -> &'static str {
        match self {
            Prediction::Fraudulent => "Fraudulent",
            Prediction::Legitimate => "Legitimate",
        }
    }

    /// Parse from a wire label (case-insensitive)
    pub fn from_label(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("fraudulent") {
            Some(Prediction::Fraudulent)
        } else if s.eq_ignore_ascii_case("legitimate") {
            Some(Prediction::Legitimate)
        } else {
            None
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Scoring result attached to a ledger entry
///
/// Bundling `prediction` and `probability` into one struct encodes the
/// invariant that a probability exists only together with a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Fraudulent or legitimate
    pub prediction: Prediction,

    /// Fraud likelihood in `[0, 1]`
    pub probability: f64,

    /// Secondary risk magnitude in `[0, 10]`, optional even when scored
    pub fraud_score: Option<f64>,

    /// Human-readable explanations, ordered by relevance
    #[serde(default)]
    pub risk_factors: Vec<String>,
}

impl Verdict {
    /// Create a verdict with no secondary score or explanations
    pub fn new(prediction: Prediction, probability: f64) -> Self {
        Self {
            prediction,
            probability,
            fraud_score: None,
            risk_factors: Vec::new(),
        }
    }

    /// True when the probability crosses the UI escalation threshold
    pub fn is_high_risk(&self) -> bool {
        self.probability > HIGH_RISK_THRESHOLD
    }
}

/// A single feature value, tagged by kind
///
/// The tag keeps bincode round-trips unambiguous; conversion to the flat
/// wire representation happens at the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureValue {
    /// Numeric feature (amounts, counts, scores)
    Numeric(Decimal),
    /// Boolean flag
    Flag(bool),
    /// One of an enumerated set of options
    Category(String),
}

impl FeatureValue {
    /// Kind name used in validation messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            FeatureValue::Numeric(_) => "numeric",
            FeatureValue::Flag(_) => "flag",
            FeatureValue::Category(_) => "categorical",
        }
    }
}

/// One scored transaction, immutable once persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique entry ID (see [`EntryId`])
    pub id: EntryId,

    /// Sending account
    pub account_from: AccountId,

    /// Receiving account
    pub account_to: AccountId,

    /// Transaction amount (positive, currency-agnostic)
    pub amount: Decimal,

    /// Feature vector keyed by the catalog (see [`FeatureSchema`])
    #[serde(default)]
    pub features: BTreeMap<String, FeatureValue>,

    /// Scoring result; absent until scoring completes
    pub verdict: Option<Verdict>,

    /// Creation timestamp, set once at finalization
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// True when this entry was scored as fraudulent
    pub fn is_fraud(&self) -> bool {
        matches!(
            self.verdict,
            Some(Verdict {
                prediction: Prediction::Fraudulent,
                ..
            })
        )
    }
}

/// Candidate entry handed to [`crate::service::LedgerService::append`]
///
/// Same shape as [`LedgerEntry`] minus the fields the service assigns at
/// finalization (`id`, `created_at`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDraft {
    /// Sending account
    pub account_from: AccountId,

    /// Receiving account
    pub account_to: AccountId,

    /// Transaction amount
    pub amount: Decimal,

    /// Feature vector keyed by the catalog
    #[serde(default)]
    pub features: BTreeMap<String, FeatureValue>,

    /// Scoring result, if the caller already scored the candidate
    pub verdict: Option<Verdict>,
}

impl EntryDraft {
    /// Create a draft with no features or verdict
    pub fn new(account_from: AccountId, account_to: AccountId, amount: Decimal) -> Self {
        Self {
            account_from,
            account_to,
            amount,
            features: BTreeMap::new(),
            verdict: None,
        }
    }

    /// Attach a feature vector
    pub fn with_features(mut self, features: BTreeMap<String, FeatureValue>) -> Self {
        self.features = features;
        self
    }

    /// Attach a scoring verdict
    pub fn with_verdict(mut self, verdict: Verdict) -> Self {
        self.verdict = Some(verdict);
        self
    }

    /// Validate the candidate against the required-field and catalog rules
    ///
    /// Runs before any persistence attempt; a rejected draft leaves no trace
    /// in the ledger.
    pub fn validate(&self, schema: &FeatureSchema) -> Result<()> {
        if self.account_from.is_blank() || self.account_to.is_blank() {
            return Err(Error::Validation(
                "Both 'From Account' and 'To Account' are required.".to_string(),
            ));
        }

        if self.amount <= Decimal::ZERO {
            return Err(Error::Validation(
                "Invalid amount. Please enter a transaction amount greater than 0.".to_string(),
            ));
        }

        schema.validate_features(&self.features)
    }

    /// Finalize into a persisted entry, assigning id and timestamp
    pub(crate) fn finalize(self) -> LedgerEntry {
        LedgerEntry {
            id: EntryId::generate(),
            account_from: self.account_from,
            account_to: self.account_to,
            amount: self.amount,
            features: self.features,
            verdict: self.verdict,
            created_at: Utc::now(),
        }
    }
}
