//! Feature catalog
//!
//! A fixed, versioned catalog of the features a transaction carries.
//! The catalog is read-only process-wide configuration: the generator and
//! any input builder consult it, nothing mutates it at runtime. Feature
//! maps on the append path are validated against it; unknown keys are
//! rejected there (and skipped, not rejected, on the lenient hydrate path).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::types::FeatureValue;

/// Catalog version; bump when the feature set changes shape
pub const SCHEMA_VERSION: u32 = 1;

/// Descriptor for a numeric feature
#[derive(Debug, Clone, PartialEq)]
pub struct NumericFeature {
    /// Catalog key, also the wire name
    pub key: &'static str,

    /// Display name
    pub name: &'static str,

    /// Lower bound (inclusive)
    pub min: Decimal,

    /// Upper bound (inclusive)
    pub max: Decimal,

    /// Step granularity; its decimal scale is the rounding precision
    pub step: Decimal,

    /// Display unit, when one applies
    pub unit: Option<&'static str>,

    /// Short operator-facing description
    pub description: &'static str,
}

/// Descriptor for a boolean flag feature
#[derive(Debug, Clone, PartialEq)]
pub struct FlagFeature {
    /// Catalog key, also the wire name
    pub key: &'static str,

    /// Display name
    pub name: &'static str,

    /// Short operator-facing description
    pub description: &'static str,
}

/// Descriptor for a categorical feature
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalFeature {
    /// Catalog key, also the wire name
    pub key: &'static str,

    /// Display name
    pub name: &'static str,

    /// Enumerated options; the first is the canonical safe option
    pub options: &'static [&'static str],

    /// Short operator-facing description
    pub description: &'static str,
}

impl CategoricalFeature {
    /// The canonical safe option (first in the enumeration)
    pub fn safe_option(&self) -> &'static str {
        self.options[0]
    }

    /// The risky subset (every option past the first)
    pub fn risky_options(&self) -> &'static [&'static str] {
        &self.options[1..]
    }
}

/// One catalog descriptor, tagged by kind
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureSpec {
    /// Numeric feature
    Numeric(NumericFeature),
    /// Boolean flag
    Flag(FlagFeature),
    /// Enumerated option
    Categorical(CategoricalFeature),
}

impl FeatureSpec {
    /// Catalog key
    pub fn key(&self) -> &'static str {
        match self {
            FeatureSpec::Numeric(f) => f.key,
            FeatureSpec::Flag(f) => f.key,
            FeatureSpec::Categorical(f) => f.key,
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            FeatureSpec::Numeric(f) => f.name,
            FeatureSpec::Flag(f) => f.name,
            FeatureSpec::Categorical(f) => f.name,
        }
    }

    /// Kind name used in validation messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            FeatureSpec::Numeric(_) => "numeric",
            FeatureSpec::Flag(_) => "flag",
            FeatureSpec::Categorical(_) => "categorical",
        }
    }

    fn matches(&self, value: &FeatureValue) -> bool {
        matches!(
            (self, value),
            (FeatureSpec::Numeric(_), FeatureValue::Numeric(_))
                | (FeatureSpec::Flag(_), FeatureValue::Flag(_))
                | (FeatureSpec::Categorical(_), FeatureValue::Category(_))
        )
    }
}

/// The feature catalog
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    version: u32,
    specs: Vec<FeatureSpec>,
}

fn numeric(
    key: &'static str,
    name: &'static str,
    min: Decimal,
    max: Decimal,
    step: Decimal,
    unit: Option<&'static str>,
    description: &'static str,
) -> FeatureSpec {
    FeatureSpec::Numeric(NumericFeature {
        key,
        name,
        min,
        max,
        step,
        unit,
        description,
    })
}

fn flag(key: &'static str, name: &'static str, description: &'static str) -> FeatureSpec {
    FeatureSpec::Flag(FlagFeature {
        key,
        name,
        description,
    })
}

fn categorical(
    key: &'static str,
    name: &'static str,
    options: &'static [&'static str],
    description: &'static str,
) -> FeatureSpec {
    FeatureSpec::Categorical(CategoricalFeature {
        key,
        name,
        options,
        description,
    })
}

impl FeatureSchema {
    /// The built-in transaction feature catalog
    pub fn builtin() -> Self {
        let specs = vec![
            numeric(
                "transaction_amount",
                "Transaction Amount",
                dec!(0),
                dec!(100000),
                dec!(0.01),
                Some("₹"),
                "The monetary value of the transaction",
            ),
            numeric(
                "transaction_frequency",
                "Transaction Frequency",
                dec!(0),
                dec!(100),
                dec!(1),
                None,
                "Number of transactions in recent period",
            ),
            numeric(
                "behavioral_biometrics",
                "Behavioral Biometrics",
                dec!(0),
                dec!(3),
                dec!(0.1),
                None,
                "User behavior pattern score",
            ),
            numeric(
                "time_since_last_transaction",
                "Time Since Last Transaction",
                dec!(0),
                dec!(30),
                dec!(0.1),
                Some("hours"),
                "Hours since previous transaction",
            ),
            numeric(
                "social_trust_score",
                "Social Trust Score",
                dec!(0),
                dec!(100),
                dec!(1),
                None,
                "User reputation score (0-100)",
            ),
            numeric(
                "account_age",
                "Account Age",
                dec!(0),
                dec!(5),
                dec!(0.1),
                Some("years"),
                "Age of the account in years",
            ),
            numeric(
                "normalized_transaction_amount",
                "Normalized Transaction Amount",
                dec!(0),
                dec!(1),
                dec!(0.01),
                None,
                "Transaction amount normalized (0-1)",
            ),
            numeric(
                "transaction_context_anomalies",
                "Transaction Context Anomalies",
                dec!(0),
                dec!(3),
                dec!(0.1),
                None,
                "Contextual anomaly score",
            ),
            numeric(
                "fraud_complaints_count",
                "Fraud Complaints Count",
                dec!(0),
                dec!(50),
                dec!(1),
                None,
                "Number of fraud complaints",
            ),
            flag(
                "recipient_blacklist_status",
                "Recipient Blacklist Status",
                "Is recipient on blacklist?",
            ),
            flag(
                "device_fingerprinting",
                "Device Fingerprinting",
                "Device flagged as suspicious?",
            ),
            flag(
                "vpn_proxy_usage",
                "VPN or Proxy Usage",
                "Using VPN or proxy?",
            ),
            flag(
                "high_risk_transaction_times",
                "High-Risk Transaction Times",
                "Transaction at unusual time?",
            ),
            flag(
                "past_fraudulent_behavior",
                "Past Fraudulent Behavior Flags",
                "History of fraudulent activity?",
            ),
            flag(
                "location_inconsistent",
                "Location-Inconsistent Transactions",
                "Transaction from unusual location?",
            ),
            flag(
                "merchant_category_mismatch",
                "Merchant Category Mismatch",
                "Merchant category unusual?",
            ),
            flag(
                "user_daily_limit_exceeded",
                "User Daily Limit Exceeded",
                "Exceeded daily transaction limit?",
            ),
            flag(
                "recent_high_value_flags",
                "Recent High-Value Transaction Flags",
                "Recent high-value transactions?",
            ),
            categorical(
                "recipient_verification_status",
                "Recipient Verification Status",
                &["verified", "recently_registered", "suspicious"],
                "Verification status of recipient",
            ),
            categorical(
                "geo_location_flags",
                "Geo-Location Flags",
                &["normal", "high-risk", "unusual"],
                "Geographic risk level",
            ),
        ];

        Self {
            version: SCHEMA_VERSION,
            specs,
        }
    }

    /// Catalog version
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Number of catalog entries
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// True when the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Look up a descriptor by key
    pub fn get(&self, key: &str) -> Option<&FeatureSpec> {
        self.specs.iter().find(|spec| spec.key() == key)
    }

    /// Iterate over all descriptors in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &FeatureSpec> {
        self.specs.iter()
    }

    /// Iterate over numeric descriptors
    pub fn numeric_features(&self) -> impl Iterator<Item = &NumericFeature> {
        self.specs.iter().filter_map(|spec| match spec {
            FeatureSpec::Numeric(f) => Some(f),
            _ => None,
        })
    }

    /// Iterate over flag descriptors
    pub fn flag_features(&self) -> impl Iterator<Item = &FlagFeature> {
        self.specs.iter().filter_map(|spec| match spec {
            FeatureSpec::Flag(f) => Some(f),
            _ => None,
        })
    }

    /// Iterate over categorical descriptors
    pub fn categorical_features(&self) -> impl Iterator<Item = &CategoricalFeature> {
        self.specs.iter().filter_map(|spec| match spec {
            FeatureSpec::Categorical(f) => Some(f),
            _ => None,
        })
    }

    /// Structural sanity checks, run once at startup
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::BTreeSet::new();

        for spec in &self.specs {
            if !seen.insert(spec.key()) {
                return Err(Error::Config(format!(
                    "Duplicate feature key in catalog: {}",
                    spec.key()
                )));
            }

            match spec {
                FeatureSpec::Numeric(f) => {
                    if f.min >= f.max {
                        return Err(Error::Config(format!(
                            "Feature '{}' has an empty range",
                            f.key
                        )));
                    }
                    if f.step <= Decimal::ZERO {
                        return Err(Error::Config(format!(
                            "Feature '{}' has a non-positive step",
                            f.key
                        )));
                    }
                }
                FeatureSpec::Categorical(f) => {
                    if f.options.is_empty() {
                        return Err(Error::Config(format!(
                            "Feature '{}' has no options",
                            f.key
                        )));
                    }
                }
                FeatureSpec::Flag(_) => {}
            }
        }

        Ok(())
    }

    /// Validate a feature map on the append path
    ///
    /// Every key must exist in the catalog and carry a value of the declared
    /// kind. Numeric ranges are generator and display metadata, not append
    /// constraints.
    pub fn validate_features(&self, features: &BTreeMap<String, FeatureValue>) -> Result<()> {
        for (key, value) in features {
            let spec = self.get(key).ok_or_else(|| Error::UnknownFeature {
                key: key.clone(),
            })?;

            if !spec.matches(value) {
                return Err(Error::FeatureKind {
                    key: key.clone(),
                    expected: spec.kind_name(),
                });
            }
        }

        Ok(())
    }

    /// Baseline feature vector: numerics at their minimum, flags off,
    /// categoricals at the safe option
    pub fn default_features(&self) -> BTreeMap<String, FeatureValue> {
        self.specs
            .iter()
            .map(|spec| {
                let value = match spec {
                    FeatureSpec::Numeric(f) => FeatureValue::Numeric(f.min),
                    FeatureSpec::Flag(_) => FeatureValue::Flag(false),
                    FeatureSpec::Categorical(f) => {
                        FeatureValue::Category(f.safe_option().to_string())
                    }
                };
                (spec.key().to_string(), value)
            })
            .collect()
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::builtin()
    }
}
