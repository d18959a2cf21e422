//! Scoring client
//!
//! Sends a candidate entry's feature vector to the fraud model's predict
//! endpoint and turns the answer into a [`Verdict`]. Shares the failure
//! semantics of the remote ledger boundary: any error is a
//! [`RemoteError`] the caller can treat as "scoring unavailable".

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use std::time::Duration;

use crate::config::RemoteConfig;
use crate::remote::{RemoteError, RemoteResult};
use crate::types::{EntryDraft, FeatureValue, Prediction, Verdict};

/// Fraud scoring interface
#[async_trait]
pub trait ScoringClient: Send + Sync {
    /// Score a candidate entry
    async fn score(&self, draft: &EntryDraft) -> RemoteResult<Verdict>;

    /// Get client name
    fn name(&self) -> &str;
}

/// HTTP client for the model's predict endpoint
#[derive(Debug)]
pub struct HttpScoringClient {
    config: RemoteConfig,
    client: Client,
}

impl HttpScoringClient {
    /// Create a new client
    pub fn new(config: RemoteConfig) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| crate::Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl ScoringClient for HttpScoringClient {
    async fn score(&self, draft: &EntryDraft) -> RemoteResult<Verdict> {
        let url = format!("{}/predict", self.config.base_url);
        let body = scoring_request(draft);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RemoteError::Timeout {
                        seconds: self.config.request_timeout_secs,
                        operation: "score entry".to_string(),
                    }
                } else {
                    RemoteError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
            });
        }

        let decoded: ScoringResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        let prediction = Prediction::from_label(&decoded.prediction).ok_or_else(|| {
            RemoteError::Decode(format!("Unknown prediction label: {}", decoded.prediction))
        })?;

        tracing::debug!(
            prediction = prediction.label(),
            probability = decoded.probability,
            "Candidate entry scored"
        );

        Ok(Verdict {
            prediction,
            probability: decoded.probability,
            fraud_score: decoded.fraud_score,
            risk_factors: decoded.risk_factors,
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// POST /predict response body
#[derive(Debug, Deserialize)]
struct ScoringResponse {
    prediction: String,
    probability: f64,
    #[serde(default)]
    fraud_score: Option<f64>,
    #[serde(default)]
    risk_factors: Vec<String>,
}

/// Build the flat wire map the model expects
///
/// Flags travel as 0/1 integers. The transaction amount is always present,
/// taken from the feature vector when mirrored there and from the draft
/// amount otherwise.
fn scoring_request(draft: &EntryDraft) -> serde_json::Map<String, serde_json::Value> {
    let mut body = serde_json::Map::new();

    for (key, value) in &draft.features {
        body.insert(key.clone(), feature_wire_value(value));
    }

    body.entry("transaction_amount".to_string()).or_insert_with(|| {
        serde_json::json!(draft.amount.to_f64().unwrap_or_default())
    });

    body
}

fn feature_wire_value(value: &FeatureValue) -> serde_json::Value {
    match value {
        FeatureValue::Numeric(n) => serde_json::json!(n.to_f64().unwrap_or_default()),
        FeatureValue::Flag(flag) => serde_json::json!(u8::from(*flag)),
        FeatureValue::Category(option) => serde_json::json!(option),
    }
}
