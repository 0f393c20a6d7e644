//! What-if projection of account risk and pool rates
//!
//! A [`Projector`] answers "what happens if": given live snapshots of an
//! account, a pool, and the pool token's price, it reports the risk
//! indicator and pool rates that would hold after a hypothetical deposit,
//! withdrawal, borrow, repayment, or swap. Nothing is mutated; every
//! method builds a perturbed copy of the account's positions and runs it
//! through the same valuation path the live snapshot uses.
//!
//! Projections never reject an oversized amount. Balances saturate at
//! zero and utilization is clamped into `[0, 1]`, so an over-withdrawal
//! projects the drained account it would produce instead of erroring.

use log::debug;
use palisade_math::{StdNumber, WideNumber};
use solana_sdk::pubkey::Pubkey;

use crate::account::{risk_indicator, valuation_of, AccountSnapshot};
use crate::error::MarginError;
use crate::interest;
use crate::oracle::PriceSample;
use crate::pool::MarginPool;
use crate::position::{AccountPosition, PositionKind, ValuationMode};

/// Projected rates for a single pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolRates {
    pub deposit_rate: WideNumber,
    pub borrow_rate: WideNumber,
}

/// Outcome of projecting a single-pool action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionResult {
    /// Risk indicator of the account after the action, valued in setup
    /// mode so the projection is at least as strict as steady state.
    pub risk_indicator: StdNumber,
    pub deposit_rate: WideNumber,
    pub borrow_rate: WideNumber,
}

/// Outcome of projecting a swap, which touches two pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapProjection {
    pub risk_indicator: StdNumber,
    pub source: PoolRates,
    pub destination: PoolRates,
}

/// Signed change to one note position, priced and weighted so a missing
/// position can be synthesized on the spot.
struct NoteDelta {
    mint: Pubkey,
    kind: PositionKind,
    price: PriceSample,
    value_modifier: StdNumber,
    exponent: i32,
    notes: i128,
}

/// Borrows the three snapshots a projection reads from.
#[derive(Debug, Clone, Copy)]
pub struct Projector<'a> {
    pub account: &'a AccountSnapshot,
    pub pool: &'a MarginPool,
    /// Price of the pool's underlying token.
    pub price: &'a PriceSample,
}

impl<'a> Projector<'a> {
    pub fn new(account: &'a AccountSnapshot, pool: &'a MarginPool, price: &'a PriceSample) -> Self {
        Self {
            account,
            pool,
            price,
        }
    }

    /// Projects depositing `tokens` from the wallet into the pool.
    pub fn after_deposit(&self, tokens: u64) -> Result<ProjectionResult, MarginError> {
        debug!(
            "projecting deposit of {} tokens into pool {}",
            tokens, self.pool.address
        );
        let amount = WideNumber::from(tokens);
        let deltas = [self.deposit_note_delta(tokens, Direction::Increase)?];
        self.project(
            &deltas,
            self.pool.borrowed_tokens,
            self.pool.total_value() + amount,
        )
    }

    /// Projects withdrawing `tokens` from the account's deposit back to
    /// the wallet.
    pub fn after_withdraw(&self, tokens: u64) -> Result<ProjectionResult, MarginError> {
        debug!(
            "projecting withdrawal of {} tokens from pool {}",
            tokens, self.pool.address
        );
        let amount = WideNumber::from(tokens);
        let deltas = [self.deposit_note_delta(tokens, Direction::Decrease)?];
        self.project(
            &deltas,
            self.pool.borrowed_tokens,
            self.pool.total_value() - amount,
        )
    }

    /// Projects borrowing `tokens`. The proceeds land back in the pool as
    /// a deposit, so both note positions grow and so does the pool.
    pub fn after_borrow(&self, tokens: u64) -> Result<ProjectionResult, MarginError> {
        debug!(
            "projecting borrow of {} tokens against pool {}",
            tokens, self.pool.address
        );
        let amount = WideNumber::from(tokens);
        let deltas = [
            self.loan_note_delta(tokens, Direction::Increase)?,
            self.deposit_note_delta(tokens, Direction::Increase)?,
        ];
        self.project(
            &deltas,
            self.pool.borrowed_tokens + amount,
            self.pool.total_value() + amount,
        )
    }

    /// Projects repaying `tokens` of debt directly from the wallet. The
    /// repaid tokens re-enter the vault, so the pool's total is unchanged.
    pub fn after_repay(&self, tokens: u64) -> Result<ProjectionResult, MarginError> {
        debug!(
            "projecting wallet repayment of {} tokens to pool {}",
            tokens, self.pool.address
        );
        let amount = WideNumber::from(tokens);
        let deltas = [self.loan_note_delta(tokens, Direction::Decrease)?];
        self.project(
            &deltas,
            self.pool.borrowed_tokens - amount,
            self.pool.total_value(),
        )
    }

    /// Projects repaying `tokens` of debt out of the account's own
    /// deposit, shrinking both note positions and the pool.
    pub fn after_repay_from_deposit(&self, tokens: u64) -> Result<ProjectionResult, MarginError> {
        debug!(
            "projecting deposit-funded repayment of {} tokens to pool {}",
            tokens, self.pool.address
        );
        let amount = WideNumber::from(tokens);
        let deltas = [
            self.loan_note_delta(tokens, Direction::Decrease)?,
            self.deposit_note_delta(tokens, Direction::Decrease)?,
        ];
        self.project(
            &deltas,
            self.pool.borrowed_tokens - amount,
            self.pool.total_value() - amount,
        )
    }

    /// Projects swapping `amount_in` tokens of this pool's deposit for
    /// `amount_out` tokens deposited into `destination`. The caller quotes
    /// the swap; the projector only accounts for it.
    pub fn after_swap(
        &self,
        destination: &MarginPool,
        destination_price: &PriceSample,
        amount_in: u64,
        amount_out: u64,
    ) -> Result<SwapProjection, MarginError> {
        debug!(
            "projecting swap of {} tokens from pool {} into {} tokens of pool {}",
            amount_in, self.pool.address, amount_out, destination.address
        );
        let source_delta = self.deposit_note_delta(amount_in, Direction::Decrease)?;
        let destination_delta =
            deposit_note_delta_for(destination, destination_price, amount_out, Direction::Increase)?;

        let positions = self.perturbed(&[source_delta, destination_delta]);
        let valuation = valuation_of(&positions, ValuationMode::Setup);

        Ok(SwapProjection {
            risk_indicator: risk_indicator(&valuation),
            source: rates_at(
                self.pool,
                self.pool.borrowed_tokens,
                self.pool.total_value() - WideNumber::from(amount_in),
            ),
            destination: rates_at(
                destination,
                destination.borrowed_tokens,
                destination.total_value() + WideNumber::from(amount_out),
            ),
        })
    }

    fn project(
        &self,
        deltas: &[NoteDelta],
        borrowed: WideNumber,
        total: WideNumber,
    ) -> Result<ProjectionResult, MarginError> {
        let positions = self.perturbed(deltas);
        let valuation = valuation_of(&positions, ValuationMode::Setup);
        let rates = rates_at(self.pool, borrowed, total);

        Ok(ProjectionResult {
            risk_indicator: risk_indicator(&valuation),
            deposit_rate: rates.deposit_rate,
            borrow_rate: rates.borrow_rate,
        })
    }

    /// Copies the account's positions and applies each delta, saturating
    /// balances at zero and synthesizing positions that do not exist yet.
    fn perturbed(&self, deltas: &[NoteDelta]) -> Vec<AccountPosition> {
        let mut positions = self.account.positions.clone();
        for delta in deltas {
            match positions.iter().position(|p| p.token == delta.mint) {
                Some(index) => {
                    let position = &mut positions[index];
                    position.balance = if delta.notes >= 0 {
                        position.balance.saturating_add(delta.notes as u64)
                    } else {
                        let shed = u64::try_from(delta.notes.unsigned_abs()).unwrap_or(u64::MAX);
                        position.balance.saturating_sub(shed)
                    };
                }
                None if delta.notes > 0 => positions.push(AccountPosition {
                    token: delta.mint,
                    balance: delta.notes as u64,
                    exponent: delta.exponent,
                    price: delta.price,
                    value_modifier: delta.value_modifier,
                    kind: delta.kind,
                }),
                // Removing from a position the account never held.
                None => {}
            }
        }
        positions
    }

    fn deposit_note_delta(&self, tokens: u64, direction: Direction) -> Result<NoteDelta, MarginError> {
        deposit_note_delta_for(self.pool, self.price, tokens, direction)
    }

    fn loan_note_delta(&self, tokens: u64, direction: Direction) -> Result<NoteDelta, MarginError> {
        let notes = notes_for(tokens, self.pool.loan_note_exchange_rate())?;
        Ok(NoteDelta {
            mint: self.pool.loan_note_mint,
            kind: PositionKind::Claim,
            price: self.pool.note_prices(self.price)?.loan_note,
            value_modifier: StdNumber::from_bps(self.pool.config.leverage_fraction),
            exponent: -(self.pool.token_decimals as i32),
            notes: direction.signed(notes),
        })
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Increase,
    Decrease,
}

impl Direction {
    fn signed(self, notes: u64) -> i128 {
        match self {
            Direction::Increase => notes as i128,
            Direction::Decrease => -(notes as i128),
        }
    }
}

fn deposit_note_delta_for(
    pool: &MarginPool,
    price: &PriceSample,
    tokens: u64,
    direction: Direction,
) -> Result<NoteDelta, MarginError> {
    let notes = notes_for(tokens, pool.deposit_note_exchange_rate())?;
    Ok(NoteDelta {
        mint: pool.deposit_note_mint,
        kind: PositionKind::Deposit,
        price: pool.note_prices(price)?.deposit_note,
        value_modifier: StdNumber::from_bps(pool.config.collateral_weight),
        exponent: -(pool.token_decimals as i32),
        notes: direction.signed(notes),
    })
}

/// Note count for an amount of underlying tokens. An exchange rate that
/// truncated to zero has no meaningful note equivalent; that is an error,
/// not a clamp, because no perturbed state can be built from it.
fn notes_for(tokens: u64, exchange_rate: WideNumber) -> Result<u64, MarginError> {
    if exchange_rate == WideNumber::ZERO {
        return Err(MarginError::InvalidConversion);
    }
    Ok((WideNumber::from(tokens) / exchange_rate).as_u64_rounded(0)?)
}

/// Rates at a perturbed ledger state. A non-positive total means the pool
/// would be drained; its utilization reads as zero rather than dividing
/// by zero or going negative.
fn rates_at(pool: &MarginPool, borrowed: WideNumber, total: WideNumber) -> PoolRates {
    let utilization = if total <= WideNumber::ZERO {
        WideNumber::ZERO
    } else {
        (borrowed / total).max(WideNumber::ZERO).min(WideNumber::ONE)
    };
    let rate = interest::continuous_compounding_rate(&pool.config, utilization);

    PoolRates {
        deposit_rate: interest::deposit_rate(rate, utilization, pool.fee_fraction()),
        borrow_rate: interest::borrow_rate(rate),
    }
}
