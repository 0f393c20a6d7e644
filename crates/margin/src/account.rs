//! Account-level valuation and the risk indicator

use palisade_math::StdNumber;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::error::MarginError;
use crate::position::{AccountPosition, PositionKind, ValuationMode};

/// Maximum positions a margin account can hold on the ledger.
pub const MAX_POSITIONS: usize = 32;

/// Decoded state of a margin account: the owner address and its positions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub address: Pubkey,
    pub positions: Vec<AccountPosition>,
}

/// The three aggregates the risk indicator is derived from. All fields are
/// clamped at zero before they leave the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Valuation {
    /// Collateral the account's claims require.
    pub required_collateral: StdNumber,

    /// Weight-adjusted value of the account's collateral.
    pub effective_collateral: StdNumber,

    /// Market value of everything the account owes.
    pub liabilities: StdNumber,
}

impl Valuation {
    /// Clamps every aggregate at zero. Independent rounding across terms
    /// can leave a small negative residue after a projection delta; letting
    /// it through would flip the sign of the risk ratio.
    fn clamped(self) -> Self {
        Self {
            required_collateral: self.required_collateral.max(StdNumber::ZERO),
            effective_collateral: self.effective_collateral.max(StdNumber::ZERO),
            liabilities: self.liabilities.max(StdNumber::ZERO),
        }
    }

    /// Collateral available beyond what the claims require.
    pub fn available_collateral(&self) -> StdNumber {
        self.effective_collateral - self.required_collateral
    }
}

impl AccountSnapshot {
    /// Aggregates every position into a [`Valuation`] in a single pass.
    pub fn valuation(&self, mode: ValuationMode) -> Valuation {
        valuation_of(&self.positions, mode)
    }

    /// The account's scalar risk indicator at steady state.
    pub fn risk_indicator(&self) -> StdNumber {
        risk_indicator(&self.valuation(ValuationMode::SteadyState))
    }

    /// Finds the position holding `token`, if any.
    pub fn position(&self, token: &Pubkey) -> Option<&AccountPosition> {
        self.positions.iter().find(|p| p.token == *token)
    }

    /// Like [`Self::position`] but for callers that treat a missing
    /// position as an error, such as balance checks before an action.
    pub fn require_position(&self, token: &Pubkey) -> Result<&AccountPosition, MarginError> {
        self.position(token)
            .ok_or(MarginError::UnknownPosition(*token))
    }
}

/// Valuation over any position slice; the projector feeds perturbed copies
/// through the same path the live snapshot uses.
pub(crate) fn valuation_of(positions: &[AccountPosition], mode: ValuationMode) -> Valuation {
    debug_assert!(positions.len() <= MAX_POSITIONS);

    let mut valuation = Valuation::default();
    for position in positions {
        match position.kind {
            PositionKind::NoValue => {}
            PositionKind::Deposit | PositionKind::AdapterCollateral => {
                valuation.effective_collateral += position.collateral_value();
            }
            PositionKind::Claim => {
                valuation.required_collateral += position.required_collateral_value(mode);
                valuation.liabilities += position.liability_value();
            }
        }
    }
    valuation.clamped()
}

/// The risk indicator: `0` for a debt-free account, `1` when collateral
/// exactly covers requirements, above `1` when the account is liquidatable.
///
/// No debt means no risk regardless of collateral. Debt with no effective
/// collateral is uncoverable and reports the maximum sentinel. Otherwise
/// the ratio is non-decreasing in required collateral and non-increasing
/// in effective collateral, so it compares cleanly against the fixed
/// warning and liquidation thresholds.
pub fn risk_indicator(valuation: &Valuation) -> StdNumber {
    if valuation.liabilities == StdNumber::ZERO {
        return StdNumber::ZERO;
    }
    if valuation.effective_collateral <= StdNumber::ZERO {
        return StdNumber::MAX;
    }
    valuation.required_collateral / valuation.effective_collateral
}
