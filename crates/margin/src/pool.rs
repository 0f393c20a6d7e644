//! Margin pool snapshots, exchange rates, and note/token conversion
//!
//! A [`MarginPool`] is a read-only snapshot of a lending pool's ledger
//! state. The engine never mutates one; callers refresh them wholesale.

use palisade_math::{NumberError, WideNumber};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::error::MarginError;
use crate::interest;
use crate::oracle::{NotePrices, PriceSample};

/// Rate-curve and fee configuration for a pool, all in basis points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginPoolConfig {
    /// Utilization at which the first curve segment transitions to the second.
    pub utilization_rate_1: u16,

    /// Utilization at which the second curve segment transitions to the third.
    pub utilization_rate_2: u16,

    /// Borrow rate at zero utilization.
    pub borrow_rate_0: u16,

    /// Borrow rate at the first transition point.
    pub borrow_rate_1: u16,

    /// Borrow rate at the second transition point.
    pub borrow_rate_2: u16,

    /// Borrow rate at full utilization.
    pub borrow_rate_3: u16,

    /// Fee taken from interest payments before they reach depositors.
    pub management_fee_rate: u16,

    /// Collateral weight applied to deposit-note value.
    pub collateral_weight: u16,

    /// Inverse leverage for claims against this pool: a claim requires
    /// `value / (leverage_fraction / 10_000)` in collateral. Zero means no
    /// leverage is configured and any claim is uncoverable.
    pub leverage_fraction: u16,
}

/// Decoded state of a single margin pool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarginPool {
    /// Address of the pool account.
    pub address: Pubkey,

    /// Mint of the underlying token.
    pub token_mint: Pubkey,

    /// Mint of the notes issued to depositors.
    pub deposit_note_mint: Pubkey,

    /// Mint of the notes recording outstanding debt.
    pub loan_note_mint: Pubkey,

    /// Tokens currently sitting in the pool vault.
    pub vault_balance: u64,

    /// Tokens lent out and owed back to the pool, including accrued interest.
    pub borrowed_tokens: WideNumber,

    /// Interest reserved for collection as fees; always <= total value.
    pub uncollected_fees: WideNumber,

    /// Total deposit notes outstanding.
    pub deposit_note_supply: u64,

    /// Total loan notes outstanding.
    pub loan_note_supply: u64,

    /// Decimals of the underlying token mint.
    pub token_decimals: u8,

    pub config: MarginPoolConfig,
}

impl MarginPool {
    /// Total value owned by or owed to the pool.
    pub fn total_value(&self) -> WideNumber {
        self.borrowed_tokens + WideNumber::from(self.vault_balance)
    }

    /// Fraction of the pool's value currently lent out; zero for a pool
    /// with no value at all.
    pub fn utilization_rate(&self) -> WideNumber {
        let total = self.total_value();
        if total == WideNumber::ZERO {
            return WideNumber::ZERO;
        }
        self.borrowed_tokens / total
    }

    /// Exchange rate from one deposit note to underlying tokens.
    ///
    /// Both sides carry a floor of one so an empty pool yields a rate of
    /// exactly 1 instead of dividing by zero; this is the documented
    /// empty-pool behavior, not an error path. The floor applies to the
    /// total value before fees come off, so a pool whose entire value is
    /// uncollected fees prices deposit notes at zero.
    pub fn deposit_note_exchange_rate(&self) -> WideNumber {
        let deposit_notes = self.deposit_note_supply.max(1);
        let total_value = self.total_value().max(WideNumber::ONE) - self.uncollected_fees;
        total_value / WideNumber::from(deposit_notes)
    }

    /// Exchange rate from one loan note to underlying tokens, with the same
    /// floor-of-one guards as the deposit rate.
    pub fn loan_note_exchange_rate(&self) -> WideNumber {
        let loan_notes = self.loan_note_supply.max(1);
        let total_borrowed = self.borrowed_tokens.max(WideNumber::ONE);
        total_borrowed / WideNumber::from(loan_notes)
    }

    /// The continuous compounding rate at the pool's current utilization.
    pub fn interest_rate(&self) -> WideNumber {
        // Nothing deposited yet: the curve starts at its base rate.
        if self.deposit_note_supply == 0 {
            return WideNumber::from_bps(self.config.borrow_rate_0);
        }
        interest::continuous_compounding_rate(&self.config, self.utilization_rate())
    }

    /// The APR paid by borrowers.
    pub fn borrow_rate(&self) -> WideNumber {
        interest::borrow_rate(self.interest_rate())
    }

    /// The rate earned by depositors after the management fee.
    pub fn deposit_rate(&self) -> WideNumber {
        interest::deposit_rate(
            self.interest_rate(),
            self.utilization_rate(),
            self.fee_fraction(),
        )
    }

    /// The management fee as a fraction.
    pub fn fee_fraction(&self) -> WideNumber {
        WideNumber::from_bps(self.config.management_fee_rate)
    }

    /// Position-ready prices for the pool's note tokens, derived from the
    /// underlying token price and the current exchange rates.
    pub fn note_prices(&self, sample: &PriceSample) -> Result<NotePrices, MarginError> {
        let price = sample.price_wide();

        let deposit_value = (price * self.deposit_note_exchange_rate())
            .as_u64_rounded(sample.exponent)?;
        let loan_value = (price * self.loan_note_exchange_rate())
            .as_u64_rounded(sample.exponent)?;

        let note_sample = |value: u64| -> Result<PriceSample, MarginError> {
            Ok(PriceSample {
                value: i64::try_from(value)
                    .map_err(|_| MarginError::Arithmetic(NumberError::Overflow))?,
                exponent: sample.exponent,
                timestamp: sample.timestamp,
                confidence_valid: sample.confidence_valid,
            })
        };

        Ok(NotePrices {
            deposit_note: note_sample(deposit_value)?,
            loan_note: note_sample(loan_value)?,
        })
    }

    /// Converts an amount of tokens or notes to the matching [`FullAmount`]
    /// under the rounding direction the pool requires for `action`.
    ///
    /// Conversions where exactly one side rounds to zero are rejected: a
    /// withdrawal of one token for zero notes drains the pool, and a deposit
    /// of one token for zero notes burns the depositor.
    pub fn convert_amount(
        &self,
        amount: Amount,
        action: PoolAction,
    ) -> Result<FullAmount, MarginError> {
        let exchange_rate = match action {
            PoolAction::Deposit | PoolAction::Withdraw => self.deposit_note_exchange_rate(),
            PoolAction::Borrow | PoolAction::Repay => self.loan_note_exchange_rate(),
        };
        let rounding = RoundingDirection::direction(action, amount.kind);
        let full = Self::convert_with_rounding_and_rate(amount, rounding, exchange_rate)?;

        if (full.notes == 0 && full.tokens > 0) || (full.tokens == 0 && full.notes > 0) {
            return Err(MarginError::InvalidConversion);
        }

        Ok(full)
    }

    /// Isolated so the rounding behavior stays testable on its own.
    fn convert_with_rounding_and_rate(
        amount: Amount,
        rounding: RoundingDirection,
        exchange_rate: WideNumber,
    ) -> Result<FullAmount, MarginError> {
        // A note supply far enough above the pool's value truncates the
        // rate to exactly zero; no conversion is meaningful at that rate.
        if exchange_rate == WideNumber::ZERO {
            return Err(MarginError::InvalidConversion);
        }

        let full = match amount.kind {
            AmountKind::Tokens => {
                let notes = WideNumber::from(amount.value) / exchange_rate;
                FullAmount {
                    tokens: amount.value,
                    notes: match rounding {
                        RoundingDirection::Down => notes.as_u64(0)?,
                        RoundingDirection::Up => notes.as_u64_ceil(0)?,
                    },
                }
            }
            AmountKind::Notes => {
                let tokens = WideNumber::from(amount.value) * exchange_rate;
                FullAmount {
                    notes: amount.value,
                    tokens: match rounding {
                        RoundingDirection::Down => tokens.as_u64(0)?,
                        RoundingDirection::Up => tokens.as_u64_ceil(0)?,
                    },
                }
            }
        };
        Ok(full)
    }
}

/// A quantity expressed either in underlying tokens or in notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amount {
    pub kind: AmountKind,
    pub value: u64,
}

impl Amount {
    pub const fn tokens(value: u64) -> Self {
        Self {
            kind: AmountKind::Tokens,
            value,
        }
    }

    pub const fn notes(value: u64) -> Self {
        Self {
            kind: AmountKind::Notes,
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountKind {
    Tokens,
    Notes,
}

/// A conversion result carrying both sides of the exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FullAmount {
    pub tokens: u64,
    pub notes: u64,
}

/// The four primary pool actions; together with the amount kind they fix
/// the rounding direction of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolAction {
    Deposit,
    Withdraw,
    Borrow,
    Repay,
}

/// Rounding direction for note/token conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingDirection {
    Down,
    Up,
}

impl RoundingDirection {
    /// Rounding always favors the pool. Inflows (deposit, repay) give the
    /// user fewer notes per token and charge more tokens per note; outflows
    /// (withdraw, borrow) give fewer tokens per note and burn more notes
    /// per token.
    ///
    /// | Action   | Tokens -> Notes | Notes -> Tokens |
    /// | :------- | :-------------- | :-------------- |
    /// | Deposit  | Down            | Up              |
    /// | Withdraw | Up              | Down            |
    /// | Borrow   | Up              | Down            |
    /// | Repay    | Down            | Up              |
    pub const fn direction(action: PoolAction, kind: AmountKind) -> Self {
        use RoundingDirection::*;
        match (action, kind) {
            (PoolAction::Borrow, AmountKind::Tokens)
            | (PoolAction::Deposit, AmountKind::Notes)
            | (PoolAction::Repay, AmountKind::Notes)
            | (PoolAction::Withdraw, AmountKind::Tokens) => Up,
            (PoolAction::Borrow, AmountKind::Notes)
            | (PoolAction::Deposit, AmountKind::Tokens)
            | (PoolAction::Repay, AmountKind::Tokens)
            | (PoolAction::Withdraw, AmountKind::Notes) => Down,
        }
    }
}
