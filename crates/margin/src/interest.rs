//! Interest rates from the piecewise-linear utilization curve
//!
//! The curve has three linear segments joined at two utilization
//! breakpoints. All breakpoints arrive as basis points in
//! [`MarginPoolConfig`] and are normalized here.

use palisade_math::{Number, WideNumber};

use crate::pool::MarginPoolConfig;

/// Linear interpolation of `x` over `[x0, x1] -> [y0, y1]`.
///
/// `x0 <= x <= x1` is a precondition; violating it is a logic error in the
/// caller, not a recoverable condition. A zero-width segment returns `y0`,
/// which keeps the curve continuous when a breakpoint sits at an endpoint.
pub fn interpolate<const P: u32>(
    x: Number<P>,
    x0: Number<P>,
    x1: Number<P>,
    y0: Number<P>,
    y1: Number<P>,
) -> Number<P> {
    debug_assert!(x0 <= x && x <= x1, "interpolation input out of segment");
    if x1 == x0 {
        return y0;
    }
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

/// The continuous compounding rate for a pool at the given utilization.
///
/// Utilization is clamped to `[0, 1]` before a segment is selected, so a
/// transiently out-of-range input (possible mid-projection before negative
/// aggregates are clamped) lands on the curve endpoints instead of
/// extrapolating past `borrow_rate_3`.
pub fn continuous_compounding_rate(
    config: &MarginPoolConfig,
    utilization: WideNumber,
) -> WideNumber {
    let util = utilization.max(WideNumber::ZERO).min(WideNumber::ONE);

    let util_1 = WideNumber::from_bps(config.utilization_rate_1);
    let borrow_0 = WideNumber::from_bps(config.borrow_rate_0);
    let borrow_1 = WideNumber::from_bps(config.borrow_rate_1);

    if util <= util_1 {
        return interpolate(util, WideNumber::ZERO, util_1, borrow_0, borrow_1);
    }

    let util_2 = WideNumber::from_bps(config.utilization_rate_2);
    let borrow_2 = WideNumber::from_bps(config.borrow_rate_2);

    if util <= util_2 {
        return interpolate(util, util_1, util_2, borrow_1, borrow_2);
    }

    let borrow_3 = WideNumber::from_bps(config.borrow_rate_3);

    interpolate(util, util_2, WideNumber::ONE, borrow_2, borrow_3)
}

/// The borrow APR implied by a continuous compounding rate.
///
/// In this model the continuous rate already is the borrow rate.
pub fn borrow_rate(cc_rate: WideNumber) -> WideNumber {
    cc_rate
}

/// The deposit rate: the borrow interest flowing back to depositors after
/// the management fee, scaled by how much of the pool is lent out.
pub fn deposit_rate(
    cc_rate: WideNumber,
    utilization: WideNumber,
    fee_fraction: WideNumber,
) -> WideNumber {
    (WideNumber::ONE - fee_fraction) * cc_rate * utilization
}
