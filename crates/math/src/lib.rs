//! Fixed-point decimal arithmetic for the Palisade client core.
//!
//! Everything downstream of the ledger is computed on [`Number`], a signed
//! fixed-point decimal with a const-generic precision. Two precisions are in
//! use across the client:
//!
//! - [`WideNumber`] (15 decimals) for pool-internal math: reserves, note
//!   exchange rates, interest rates.
//! - [`StdNumber`] (10 decimals) for position valuation and risk math.
//!
//! Mixing the two families in one expression is a type error; convert
//! explicitly with [`Number::rescale`].

mod error;
mod number;

pub use error::NumberError;
pub use number::{Number, StdNumber, WideNumber, STD_PRECISION, WIDE_PRECISION};
