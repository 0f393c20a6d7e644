//! Client-side accounting and risk projection for Palisade margin pools.
//!
//! The crate consumes already-decoded ledger snapshots ([`MarginPool`],
//! [`AccountSnapshot`], [`PriceSample`]) and computes, without any I/O:
//!
//! - note/token exchange rates and pool interest rates;
//! - per-position collateral and liability values;
//! - an account-level [`Valuation`] and scalar risk indicator;
//! - projected rates and risk after a hypothetical deposit, withdraw,
//!   borrow, repay, or swap ([`Projector`]).
//!
//! Every computation is a pure function of its inputs; callers are
//! responsible for fetching consistent snapshots. Account decoding, RPC,
//! and transaction building live in their own crates.

pub mod account;
pub mod error;
pub mod interest;
pub mod oracle;
pub mod pool;
pub mod position;
pub mod projection;

pub use account::{risk_indicator, AccountSnapshot, Valuation, MAX_POSITIONS};
pub use error::MarginError;
pub use oracle::{NotePrices, PriceSample};
pub use pool::{
    Amount, AmountKind, FullAmount, MarginPool, MarginPoolConfig, PoolAction, RoundingDirection,
};
pub use position::{AccountPosition, PositionKind, ValuationMode};
pub use projection::{PoolRates, ProjectionResult, Projector, SwapProjection};

use palisade_math::StdNumber;

/// Fraction of configured leverage available while a position is being set
/// up; setup collateral requirements divide by this, so they are always at
/// least the steady-state requirement.
pub const SETUP_LEVERAGE_FRACTION: StdNumber = StdNumber::from_raw(5_000_000_000); // 0.5

/// Risk indicator level at which the UI starts warning.
pub const RISK_WARNING_LEVEL: StdNumber = StdNumber::from_raw(8_000_000_000); // 0.8

/// Risk indicator level treated as critical.
pub const RISK_CRITICAL_LEVEL: StdNumber = StdNumber::from_raw(9_000_000_000); // 0.9

/// Risk indicator level at which an account becomes liquidatable.
pub const RISK_LIQUIDATION_LEVEL: StdNumber = StdNumber::ONE;
