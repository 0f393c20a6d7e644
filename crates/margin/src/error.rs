//! Error type for margin computations

use palisade_math::NumberError;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Errors surfaced by pool and account computations.
///
/// Degenerate-but-legal inputs (an empty pool, a claim with no leverage
/// configured, an oversized projection amount) are not errors; they take the
/// documented fallback values instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MarginError {
    /// A fixed-point conversion overflowed or hit a sign violation.
    #[error("fixed-point conversion failed: {0}")]
    Arithmetic(#[from] NumberError),

    /// A note/token conversion where exactly one side rounds to zero.
    /// Allowing these would let value leak across the exchange rate.
    #[error("conversion between notes and tokens would zero out one side")]
    InvalidConversion,

    /// The account holds no position for the requested token.
    #[error("account has no position for token {0}")]
    UnknownPosition(Pubkey),
}
