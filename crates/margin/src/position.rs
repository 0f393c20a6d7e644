//! Single-position valuation
//!
//! A position is one token balance held by a margin account, annotated
//! with the price and weighting needed to turn it into a collateral or
//! liability contribution.

use palisade_math::StdNumber;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::oracle::PriceSample;
use crate::SETUP_LEVERAGE_FRACTION;

/// How a position participates in account valuation.
///
/// The enum is closed and matched exhaustively everywhere it is consumed;
/// adding a kind will not compile until every valuation path handles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionKind {
    /// Carries no value for margin purposes.
    NoValue,

    /// Deposit notes counting toward collateral.
    Deposit,

    /// Loan notes counting toward liabilities and collateral requirements.
    Claim,

    /// Collateral held by an external adapter, valued like a deposit.
    AdapterCollateral,
}

/// Whether a collateral requirement is evaluated at steady state or while
/// the position is still being set up. Setup requirements are stricter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValuationMode {
    SteadyState,
    Setup,
}

/// One decoded position from a margin account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AccountPosition {
    /// Mint of the token this position holds (a note mint for pool
    /// positions).
    pub token: Pubkey,

    /// Balance in token-note units.
    pub balance: u64,

    /// Power-of-ten exponent converting `balance` to whole tokens.
    pub exponent: i32,

    /// Price of one whole token.
    pub price: PriceSample,

    /// Weighting in `[0, 1]`: collateral weight for deposits, inverse
    /// leverage for claims. Zero on a claim means no leverage configured.
    pub value_modifier: StdNumber,

    pub kind: PositionKind,
}

impl AccountPosition {
    /// The position's raw market value.
    pub fn value(&self) -> StdNumber {
        StdNumber::from_decimal(self.balance, self.exponent) * self.price.price()
    }

    /// The value this position contributes as collateral.
    pub fn collateral_value(&self) -> StdNumber {
        match self.kind {
            PositionKind::Deposit | PositionKind::AdapterCollateral => {
                self.value_modifier * self.value()
            }
            PositionKind::NoValue | PositionKind::Claim => StdNumber::ZERO,
        }
    }

    /// The collateral this position requires to be held against it.
    ///
    /// A claim with no leverage configured requires the maximum sentinel:
    /// the account can never be healthy while it holds one, which is the
    /// intended fail-closed behavior.
    pub fn required_collateral_value(&self, mode: ValuationMode) -> StdNumber {
        match self.kind {
            PositionKind::Claim => {
                if self.value_modifier == StdNumber::ZERO {
                    return StdNumber::MAX;
                }
                let required = self.value() / self.value_modifier;
                match mode {
                    ValuationMode::SteadyState => required,
                    ValuationMode::Setup => required / SETUP_LEVERAGE_FRACTION,
                }
            }
            PositionKind::NoValue | PositionKind::Deposit | PositionKind::AdapterCollateral => {
                StdNumber::ZERO
            }
        }
    }

    /// The value this position contributes to liabilities.
    pub fn liability_value(&self) -> StdNumber {
        match self.kind {
            PositionKind::Claim => self.value(),
            PositionKind::NoValue | PositionKind::Deposit | PositionKind::AdapterCollateral => {
                StdNumber::ZERO
            }
        }
    }
}
