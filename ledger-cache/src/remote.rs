//! Remote ledger client
//!
//! Request/response interface to the remote authority that holds the
//! server-side copy of the ledger. Every failure on this boundary becomes a
//! [`RemoteError`], which callers consume as an "unavailable" outcome; it is
//! never allowed to fail a local operation.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::RemoteConfig;
use crate::features::{FeatureSchema, FeatureSpec};
use crate::types::{AccountId, EntryId, FeatureValue, LedgerEntry, Prediction, Verdict};

/// Result type for remote operations
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Remote-side failure, always recoverable locally
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Request exceeded the configured timeout
    #[error("Timeout after {seconds}s: {operation}")]
    Timeout {
        /// Timeout duration
        seconds: u64,
        /// Operation
        operation: String,
    },

    /// Transport-level failure (connection refused, DNS, TLS)
    #[error("Network error: {0}")]
    Network(String),

    /// Remote answered with a non-2xx status
    #[error("Remote returned status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// Response body did not decode as expected
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

/// Remote ledger interface
#[async_trait]
pub trait RemoteLedger: Send + Sync {
    /// Fetch the authoritative entries scoped to `identity`, newest first
    async fn fetch_entries(&self, identity: &str, limit: usize) -> RemoteResult<Vec<LedgerEntry>>;

    /// Mirror a locally appended entry to the remote side
    async fn mirror_entry(&self, entry: &LedgerEntry) -> RemoteResult<()>;

    /// Get client name
    fn name(&self) -> &str;
}

/// HTTP client for the remote ledger endpoints
#[derive(Debug)]
pub struct HttpRemoteLedger {
    config: RemoteConfig,
    client: Client,
    schema: Arc<FeatureSchema>,
}

impl HttpRemoteLedger {
    /// Create a new client
    pub fn new(config: RemoteConfig, schema: Arc<FeatureSchema>) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| crate::Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            schema,
        })
    }

    fn map_transport_error(&self, err: reqwest::Error, operation: &str) -> RemoteError {
        if err.is_timeout() {
            RemoteError::Timeout {
                seconds: self.config.request_timeout_secs,
                operation: operation.to_string(),
            }
        } else {
            RemoteError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl RemoteLedger for HttpRemoteLedger {
    async fn fetch_entries(&self, identity: &str, limit: usize) -> RemoteResult<Vec<LedgerEntry>> {
        let url = format!("{}/transactions", self.config.base_url);
        let limit_param = limit.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[("account_id", identity), ("limit", limit_param.as_str())])
            .send()
            .await
            .map_err(|e| self.map_transport_error(e, "fetch entries"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
            });
        }

        // Rows are decoded one by one; a malformed row is dropped, not fatal.
        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_value::<RemoteEntryRecord>(row) {
                Ok(record) => {
                    if let Some(entry) = record.into_entry(&self.schema) {
                        entries.push(entry);
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Skipping undecodable remote entry");
                }
            }
        }

        tracing::debug!(
            identity = %identity,
            count = entries.len(),
            "Fetched remote entries"
        );

        Ok(entries)
    }

    async fn mirror_entry(&self, entry: &LedgerEntry) -> RemoteResult<()> {
        let url = format!("{}/transactions", self.config.base_url);
        let body = MirrorEntryRequest::from_entry(entry);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e, "mirror entry"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
            });
        }

        tracing::debug!(entry_id = %entry.id, "Entry mirrored to remote ledger");

        Ok(())
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// POST /transactions body
#[derive(Debug, Serialize)]
struct MirrorEntryRequest<'a> {
    id: &'a str,
    account_id: &'a str,
    recipient_id: &'a str,
    transaction_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    prediction: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    probability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fraud_score: Option<f64>,
    timestamp: String,
}

impl<'a> MirrorEntryRequest<'a> {
    fn from_entry(entry: &'a LedgerEntry) -> Self {
        let verdict = entry.verdict.as_ref();

        Self {
            id: entry.id.as_str(),
            account_id: entry.account_from.as_str(),
            recipient_id: entry.account_to.as_str(),
            transaction_amount: entry.amount.to_f64().unwrap_or_default(),
            prediction: verdict.map(|v| v.prediction.label()),
            probability: verdict.map(|v| v.probability),
            fraud_score: verdict.and_then(|v| v.fraud_score),
            timestamp: entry.created_at.to_rfc3339(),
        }
    }
}

/// One row of the GET /transactions response
///
/// Decoding is tolerant: rows written by older clients carry
/// `account_id`/`recipient_id` instead of `from_account`/`to_account`,
/// flags arrive as 0/1 integers, and `risk_factors` may be a JSON array or
/// a stringified one.
#[derive(Debug, Deserialize)]
struct RemoteEntryRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, alias = "account_id")]
    from_account: Option<String>,
    #[serde(default, alias = "recipient_id")]
    to_account: Option<String>,
    #[serde(default)]
    transaction_amount: Option<f64>,
    #[serde(default)]
    prediction: Option<String>,
    #[serde(default)]
    probability: Option<f64>,
    #[serde(default)]
    fraud_score: Option<f64>,
    #[serde(default)]
    risk_factors: Option<serde_json::Value>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl RemoteEntryRecord {
    /// Convert into a ledger entry; `None` drops the row
    fn into_entry(self, schema: &FeatureSchema) -> Option<LedgerEntry> {
        let id = self.id?;
        let amount = self.transaction_amount.and_then(Decimal::from_f64)?;
        let created_at = self.timestamp.as_deref().and_then(parse_timestamp)?;

        let account_from = self
            .from_account
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "unknown".to_string());
        let account_to = self
            .to_account
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "unknown".to_string());

        let prediction = self.prediction.as_deref().and_then(Prediction::from_label);
        let verdict = match (prediction, self.probability) {
            (Some(prediction), Some(probability)) => Some(Verdict {
                prediction,
                probability,
                fraud_score: self.fraud_score,
                risk_factors: parse_risk_factors(self.risk_factors),
            }),
            _ => None,
        };

        Some(LedgerEntry {
            id: EntryId::new(id),
            account_from: AccountId::new(account_from),
            account_to: AccountId::new(account_to),
            amount,
            features: convert_features(schema, self.extra),
            verdict,
            created_at,
        })
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    // Naive ISO form without an offset, as emitted by some backends
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn parse_risk_factors(value: Option<serde_json::Value>) -> Vec<String> {
    match value {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        Some(serde_json::Value::String(raw)) => {
            serde_json::from_str::<Vec<String>>(&raw).unwrap_or_default()
        }
        _ => Vec::new(),
    }
}

/// Convert the row's loose extra columns into catalog features
///
/// Keys outside the catalog and values of the wrong shape are skipped;
/// hydrate never rejects a row over them.
fn convert_features(
    schema: &FeatureSchema,
    extra: BTreeMap<String, serde_json::Value>,
) -> BTreeMap<String, FeatureValue> {
    let mut features = BTreeMap::new();

    for (key, value) in extra {
        let spec = match schema.get(&key) {
            Some(spec) => spec,
            None => continue,
        };

        let converted = match spec {
            FeatureSpec::Numeric(_) => value
                .as_f64()
                .and_then(Decimal::from_f64)
                .map(FeatureValue::Numeric),
            FeatureSpec::Flag(_) => match value {
                serde_json::Value::Bool(flag) => Some(FeatureValue::Flag(flag)),
                serde_json::Value::Number(n) => {
                    n.as_f64().map(|f| FeatureValue::Flag(f != 0.0))
                }
                _ => None,
            },
            FeatureSpec::Categorical(_) => value
                .as_str()
                .map(|s| FeatureValue::Category(s.to_string())),
        };

        if let Some(feature) = converted {
            features.insert(key, feature);
        }
    }

    features
}
