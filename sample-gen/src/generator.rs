//! Synthetic sample generation
//!
//! Pure function of `(profile, schema, rng)`: produces a complete candidate
//! transaction without touching the ledger or any persistence. Callers
//! decide whether to score it and feed it into the ledger service.

use ledger_cache::{AccountId, EntryDraft, FeatureSchema, FeatureSpec, FeatureValue, Verdict};
use rand::Rng;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

use crate::profile::SampleProfile;

/// A generated candidate transaction
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticSample {
    /// Sending account
    pub account_from: AccountId,

    /// Receiving account, always distinct from `account_from`
    pub account_to: AccountId,

    /// Transaction amount, also mirrored into the feature vector
    pub amount: Decimal,

    /// Complete feature vector covering the whole catalog
    pub features: BTreeMap<String, FeatureValue>,
}

impl SyntheticSample {
    /// Adapt the sample for [`ledger_cache::service::LedgerService::append`]
    pub fn into_draft(self, verdict: Option<Verdict>) -> EntryDraft {
        let mut draft = EntryDraft::new(self.account_from, self.account_to, self.amount)
            .with_features(self.features);
        if let Some(verdict) = verdict {
            draft = draft.with_verdict(verdict);
        }
        draft
    }
}

/// Generate one synthetic sample under `profile`
pub fn generate<R: Rng>(
    profile: SampleProfile,
    schema: &FeatureSchema,
    rng: &mut R,
) -> SyntheticSample {
    let account_from = account_number(rng);
    let account_to = loop {
        let candidate = account_number(rng);
        if candidate != account_from {
            break candidate;
        }
    };

    let (amount_min, amount_max) = profile.amount_range();
    let amount = sample_decimal(amount_min, amount_max, dec!(0.01), rng);

    let mut features = BTreeMap::new();
    for spec in schema.iter() {
        let value = match spec {
            FeatureSpec::Numeric(numeric) => {
                // The amount feature follows the profile's amount range, not
                // the generic half-range sampler
                if numeric.key == "transaction_amount" {
                    FeatureValue::Numeric(amount)
                } else {
                    let (lo, hi) = profile.numeric_range(numeric.min, numeric.max);
                    FeatureValue::Numeric(sample_decimal(lo, hi, numeric.step, rng))
                }
            }
            FeatureSpec::Flag(flag) => {
                FeatureValue::Flag(rng.gen_bool(profile.flag_probability(flag.key)))
            }
            FeatureSpec::Categorical(categorical) => {
                let option = match profile {
                    SampleProfile::ElevatedRisk => {
                        let risky = categorical.risky_options();
                        if risky.is_empty() {
                            categorical.safe_option()
                        } else {
                            risky[rng.gen_range(0..risky.len())]
                        }
                    }
                    SampleProfile::SuppressedRisk => categorical.safe_option(),
                };
                FeatureValue::Category(option.to_string())
            }
        };

        features.insert(spec.key().to_string(), value);
    }

    SyntheticSample {
        account_from: AccountId::new(account_from),
        account_to: AccountId::new(account_to),
        amount,
        features,
    }
}

/// Uniform draw from `[min, max]`, rounded half-up at the step's scale
fn sample_decimal<R: Rng>(min: Decimal, max: Decimal, step: Decimal, rng: &mut R) -> Decimal {
    let lo = min.to_f64().unwrap_or(0.0);
    let hi = max.to_f64().unwrap_or(lo);

    let raw = if hi > lo { rng.gen_range(lo..=hi) } else { lo };
    let value = Decimal::from_f64(raw).unwrap_or(min);

    value.round_dp_with_strategy(step.scale(), RoundingStrategy::MidpointAwayFromZero)
}

/// Account identifier in the product's `AC` + branch + body format
fn account_number<R: Rng>(rng: &mut R) -> String {
    let prefix: u32 = rng.gen_range(1000..10000);
    let body: u64 = rng.gen_range(1_000_000_000_000..10_000_000_000_000);
    format!("AC{}{}", prefix, body)
}
