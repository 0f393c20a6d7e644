//! Shared fixtures for the end-to-end accounting scenarios.
//!
//! Everything here builds plain snapshot values; the scenarios under
//! `tests/` drive the whole pipeline (exchange rates, valuation, risk,
//! projection) through them without any I/O.

use palisade_margin::{
    AccountPosition, AccountSnapshot, MarginPool, MarginPoolConfig, PositionKind, PriceSample,
};
use palisade_math::{StdNumber, WideNumber};
use solana_sdk::pubkey::Pubkey;

/// Decimals used by every fixture mint.
pub const TOKEN_DECIMALS: u8 = 6;

/// One whole token in base units.
pub const UNIT: u64 = 1_000_000;

/// A trusted price sample worth `value * 10^-6`.
pub fn price(value: i64) -> PriceSample {
    PriceSample {
        value,
        exponent: -(TOKEN_DECIMALS as i32),
        timestamp: 1_700_000_000,
        confidence_valid: true,
    }
}

/// Rate curve rising to 5% at half utilization, then 20% at 90%, capped
/// at 100%, with no management fee.
pub fn standard_config() -> MarginPoolConfig {
    MarginPoolConfig {
        utilization_rate_1: 5_000,
        utilization_rate_2: 9_000,
        borrow_rate_0: 0,
        borrow_rate_1: 500,
        borrow_rate_2: 2_000,
        borrow_rate_3: 10_000,
        management_fee_rate: 0,
        collateral_weight: 10_000,
        leverage_fraction: 5_000,
    }
}

/// A pool holding `vault + borrowed` tokens of value with the given note
/// supplies, under the standard curve.
pub fn pool(vault: u64, borrowed: u64, deposit_notes: u64, loan_notes: u64) -> MarginPool {
    MarginPool {
        address: Pubkey::new_unique(),
        token_mint: Pubkey::new_unique(),
        deposit_note_mint: Pubkey::new_unique(),
        loan_note_mint: Pubkey::new_unique(),
        vault_balance: vault,
        borrowed_tokens: WideNumber::from(borrowed),
        uncollected_fees: WideNumber::ZERO,
        deposit_note_supply: deposit_notes,
        loan_note_supply: loan_notes,
        token_decimals: TOKEN_DECIMALS,
        config: standard_config(),
    }
}

/// A deposit-note position in `pool` at full collateral weight.
pub fn deposit_position(pool: &MarginPool, notes: u64, note_price: PriceSample) -> AccountPosition {
    AccountPosition {
        token: pool.deposit_note_mint,
        balance: notes,
        exponent: -(TOKEN_DECIMALS as i32),
        price: note_price,
        value_modifier: StdNumber::from_bps(pool.config.collateral_weight),
        kind: PositionKind::Deposit,
    }
}

/// A loan-note position in `pool` at the configured leverage fraction.
pub fn claim_position(pool: &MarginPool, notes: u64, note_price: PriceSample) -> AccountPosition {
    AccountPosition {
        token: pool.loan_note_mint,
        balance: notes,
        exponent: -(TOKEN_DECIMALS as i32),
        price: note_price,
        value_modifier: StdNumber::from_bps(pool.config.leverage_fraction),
        kind: PositionKind::Claim,
    }
}

pub fn account(positions: Vec<AccountPosition>) -> AccountSnapshot {
    AccountSnapshot {
        address: Pubkey::new_unique(),
        positions,
    }
}
