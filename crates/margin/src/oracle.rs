//! Decoded oracle price samples

use palisade_math::{StdNumber, WideNumber};
use serde::{Deserialize, Serialize};

/// A price observation already decoded from an oracle account.
///
/// The realized price is `value * 10^exponent`. Samples whose confidence
/// interval failed the caller's threshold arrive with
/// `confidence_valid = false` and value as zero everywhere downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSample {
    /// Integer mantissa of the price.
    pub value: i64,
    /// Power-of-ten exponent applied to `value`.
    pub exponent: i32,
    /// Publish time of the observation, seconds since the epoch.
    pub timestamp: i64,
    /// Whether the oracle confidence interval passed the caller's check.
    pub confidence_valid: bool,
}

impl PriceSample {
    /// The realized price in valuation precision; zero for untrusted samples.
    pub fn price(&self) -> StdNumber {
        if !self.confidence_valid {
            return StdNumber::ZERO;
        }
        StdNumber::from_decimal(self.value as i128, self.exponent)
    }

    /// The realized price in pool precision; zero for untrusted samples.
    pub fn price_wide(&self) -> WideNumber {
        if !self.confidence_valid {
            return WideNumber::ZERO;
        }
        WideNumber::from_decimal(self.value as i128, self.exponent)
    }
}

/// Derived prices for a pool's two note tokens, expressed at the same
/// exponent as the underlying token sample so they can slot straight into
/// an [`crate::AccountPosition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotePrices {
    pub deposit_note: PriceSample,
    pub loan_note: PriceSample,
}
