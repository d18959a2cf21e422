//! Sampling profiles
//!
//! A profile steers every sampled dimension of a synthetic transaction.
//! The two profiles are deliberately far apart so that generated batches
//! are visibly separable in the dashboard.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Statistical profile for the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleProfile {
    /// Bias toward risk signals: upper numeric ranges, frequent flags,
    /// risky categorical options
    ElevatedRisk,

    /// Bias away from risk signals: lower numeric ranges, rare flags,
    /// safe categorical options
    SuppressedRisk,
}

impl SampleProfile {
    /// Probability that the flag named `key` is set under this profile
    ///
    /// Elevated probabilities sit in 0.6..=0.8 graded by how strong a fraud
    /// signal the flag is; suppressed in 0.1..=0.2.
    pub fn flag_probability(&self, key: &str) -> f64 {
        let (elevated, suppressed) = match key {
            "recipient_blacklist_status" => (0.8, 0.1),
            "past_fraudulent_behavior" => (0.8, 0.1),
            "vpn_proxy_usage" => (0.7, 0.15),
            "recent_high_value_flags" => (0.7, 0.15),
            "device_fingerprinting" => (0.65, 0.15),
            "high_risk_transaction_times" => (0.65, 0.15),
            "location_inconsistent" => (0.6, 0.15),
            "merchant_category_mismatch" => (0.6, 0.2),
            "user_daily_limit_exceeded" => (0.6, 0.2),
            _ => (0.7, 0.15),
        };

        match self {
            SampleProfile::ElevatedRisk => elevated,
            SampleProfile::SuppressedRisk => suppressed,
        }
    }

    /// Transaction amount range under this profile
    pub fn amount_range(&self) -> (Decimal, Decimal) {
        match self {
            SampleProfile::ElevatedRisk => (dec!(2000), dec!(8000)),
            SampleProfile::SuppressedRisk => (dec!(50), dec!(800)),
        }
    }

    /// Sub-range of a numeric feature's `[min, max]` this profile draws from
    ///
    /// Elevated draws from the upper half, suppressed from the lower half.
    pub fn numeric_range(&self, min: Decimal, max: Decimal) -> (Decimal, Decimal) {
        let midpoint = min + (max - min) / dec!(2);

        match self {
            SampleProfile::ElevatedRisk => (midpoint, max),
            SampleProfile::SuppressedRisk => (min, midpoint),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_probabilities_stay_in_contract_bands() {
        let keys = [
            "recipient_blacklist_status",
            "past_fraudulent_behavior",
            "vpn_proxy_usage",
            "device_fingerprinting",
            "high_risk_transaction_times",
            "location_inconsistent",
            "merchant_category_mismatch",
            "user_daily_limit_exceeded",
            "recent_high_value_flags",
            "some_future_flag",
        ];

        for key in keys {
            let elevated = SampleProfile::ElevatedRisk.flag_probability(key);
            let suppressed = SampleProfile::SuppressedRisk.flag_probability(key);

            assert!((0.6..=0.8).contains(&elevated), "{}: {}", key, elevated);
            assert!((0.1..=0.2).contains(&suppressed), "{}: {}", key, suppressed);
        }
    }

    #[test]
    fn test_amount_ranges_do_not_overlap() {
        let (elevated_min, elevated_max) = SampleProfile::ElevatedRisk.amount_range();
        let (suppressed_min, suppressed_max) = SampleProfile::SuppressedRisk.amount_range();

        assert!(suppressed_min < suppressed_max);
        assert!(elevated_min < elevated_max);
        assert!(suppressed_max < elevated_min);
    }

    #[test]
    fn test_numeric_halves_partition_the_range() {
        let (lo_min, lo_max) = SampleProfile::SuppressedRisk.numeric_range(dec!(0), dec!(30));
        let (hi_min, hi_max) = SampleProfile::ElevatedRisk.numeric_range(dec!(0), dec!(30));

        assert_eq!((lo_min, lo_max), (dec!(0), dec!(15)));
        assert_eq!((hi_min, hi_max), (dec!(15), dec!(30)));
    }
}
