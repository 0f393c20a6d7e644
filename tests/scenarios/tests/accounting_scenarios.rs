//! End-to-end accounting scenarios
//!
//! Each test drives the full pipeline on plain fixture snapshots: pool
//! rates from the curve, note prices from exchange rates, position and
//! account valuation, the risk indicator, and projections.

use palisade_margin::{
    risk_indicator, Amount, PoolAction, Projector, ValuationMode, RISK_LIQUIDATION_LEVEL,
    RISK_WARNING_LEVEL,
};
use palisade_math::{StdNumber, WideNumber};
use palisade_scenario_tests::{account, claim_position, deposit_position, pool, price, UNIT};

#[test]
fn pool_rates_at_one_fifth_utilization() {
    // 800 idle + 200 borrowed, unit exchange rates on both mints.
    let pool = pool(800 * UNIT, 200 * UNIT, 1_000 * UNIT, 200 * UNIT);

    assert_eq!(pool.utilization_rate(), WideNumber::from_decimal(2i64, -1));
    // The first curve segment runs from 0% at zero to 5% at half
    // utilization, so a fifth of utilization prices at 2%.
    assert_eq!(pool.interest_rate(), WideNumber::from_decimal(2i64, -2));
    assert_eq!(pool.borrow_rate(), WideNumber::from_decimal(2i64, -2));
    // Depositors earn the borrow rate scaled by utilization: 0.4%.
    assert_eq!(pool.deposit_rate(), WideNumber::from_decimal(4i64, -3));
}

#[test]
fn accrued_interest_flows_into_note_prices() {
    // 150 of accrued interest against 1,000 deposit notes and 100 loan
    // notes: deposit notes are worth 1.15, loan notes 1.5.
    let pool = pool(1_000 * UNIT, 150 * UNIT, 1_000 * UNIT, 100 * UNIT);

    assert_eq!(
        pool.deposit_note_exchange_rate(),
        WideNumber::from_decimal(115i64, -2)
    );
    assert_eq!(
        pool.loan_note_exchange_rate(),
        WideNumber::from_decimal(15i64, -1)
    );

    let prices = pool.note_prices(&price(2_000_000)).unwrap();
    assert_eq!(prices.deposit_note.value, 2_300_000);
    assert_eq!(prices.loan_note.value, 3_000_000);
}

#[test]
fn account_moves_through_the_risk_levels_as_prices_move() {
    let usdc_pool = pool(800 * UNIT, 200 * UNIT, 1_000 * UNIT, 200 * UNIT);
    let sol_pool = pool(800 * UNIT, 200 * UNIT, 1_000 * UNIT, 200 * UNIT);
    let usdc_price = price(1_000_000);
    let sol_price = price(20_000_000);

    let usdc_notes = usdc_pool.note_prices(&usdc_price).unwrap();
    let sol_notes = sol_pool.note_prices(&sol_price).unwrap();

    // Deposit only: no debt, no risk.
    let deposits_only = account(vec![deposit_position(
        &usdc_pool,
        200 * UNIT,
        usdc_notes.deposit_note,
    )]);
    assert_eq!(deposits_only.risk_indicator(), StdNumber::ZERO);

    // Borrow 5 SOL at 20: 100 of debt requires exactly the 200 of
    // collateral on hand, the liquidation edge.
    let levered = account(vec![
        deposit_position(&usdc_pool, 200 * UNIT, usdc_notes.deposit_note),
        claim_position(&sol_pool, 5 * UNIT, sol_notes.loan_note),
    ]);
    let valuation = levered.valuation(ValuationMode::SteadyState);
    assert_eq!(valuation.liabilities, StdNumber::from_decimal(100i64, 0));
    assert_eq!(
        valuation.required_collateral,
        StdNumber::from_decimal(200i64, 0)
    );
    assert_eq!(levered.risk_indicator(), RISK_LIQUIDATION_LEVEL);

    // SOL rallies to 24: the same claim now requires 240 against 200.
    let sol_notes_rallied = sol_pool.note_prices(&price(24_000_000)).unwrap();
    let under_water = account(vec![
        deposit_position(&usdc_pool, 200 * UNIT, usdc_notes.deposit_note),
        claim_position(&sol_pool, 5 * UNIT, sol_notes_rallied.loan_note),
    ]);
    assert_eq!(
        under_water.risk_indicator(),
        StdNumber::from_decimal(12i64, -1)
    );
    assert!(under_water.risk_indicator() > RISK_LIQUIDATION_LEVEL);

    // SOL at 13 instead: 130 of required collateral is a healthy 0.65.
    let sol_notes_cooled = sol_pool.note_prices(&price(13_000_000)).unwrap();
    let healthy = account(vec![
        deposit_position(&usdc_pool, 200 * UNIT, usdc_notes.deposit_note),
        claim_position(&sol_pool, 5 * UNIT, sol_notes_cooled.loan_note),
    ]);
    assert!(healthy.risk_indicator() < RISK_WARNING_LEVEL);
}

#[test]
fn projections_bracket_the_live_risk() {
    let margin_pool = pool(800 * UNIT, 200 * UNIT, 1_000 * UNIT, 200 * UNIT);
    let token_price = price(1_000_000);
    let notes = margin_pool.note_prices(&token_price).unwrap();

    let snapshot = account(vec![
        deposit_position(&margin_pool, 200 * UNIT, notes.deposit_note),
        claim_position(&margin_pool, 25 * UNIT, notes.loan_note),
    ]);
    let projector = Projector::new(&snapshot, &margin_pool, &token_price);
    let live = risk_indicator(&snapshot.valuation(ValuationMode::Setup));

    let after_deposit = projector.after_deposit(100 * UNIT).unwrap();
    assert!(after_deposit.risk_indicator < live);
    assert!(after_deposit.borrow_rate < margin_pool.borrow_rate());

    let after_borrow = projector.after_borrow(50 * UNIT).unwrap();
    assert!(after_borrow.risk_indicator > live);
    assert!(after_borrow.borrow_rate > margin_pool.borrow_rate());

    // Clearing the whole debt from the wallet zeroes the risk and leaves
    // the pool's total value alone.
    let after_repay = projector.after_repay(25 * UNIT).unwrap();
    assert_eq!(after_repay.risk_indicator, StdNumber::ZERO);
    assert!(after_repay.borrow_rate < margin_pool.borrow_rate());
}

#[test]
fn conversion_rounding_always_favors_the_pool() {
    // 1,000 tokens across 900 notes: exchange rate 1.111...
    let pool = pool(1_000 * UNIT, 0, 900 * UNIT, 0);

    let deposit = pool
        .convert_amount(Amount::tokens(1_000_000), PoolAction::Deposit)
        .unwrap();
    let withdraw = pool
        .convert_amount(Amount::notes(deposit.notes), PoolAction::Withdraw)
        .unwrap();

    // Depositing rounds the minted notes down; cashing those notes back
    // out rounds the returned tokens down again.
    assert!(deposit.notes < deposit.tokens);
    assert!(withdraw.tokens <= deposit.tokens);
}

#[test]
fn snapshots_round_trip_through_json() -> anyhow::Result<()> {
    let margin_pool = pool(800 * UNIT, 200 * UNIT, 1_000 * UNIT, 200 * UNIT);
    let token_price = price(1_000_000);
    let notes = margin_pool.note_prices(&token_price)?;
    let snapshot = account(vec![
        deposit_position(&margin_pool, 200 * UNIT, notes.deposit_note),
        claim_position(&margin_pool, 25 * UNIT, notes.loan_note),
    ]);

    let pool_json = serde_json::to_string(&margin_pool)?;
    let account_json = serde_json::to_string(&snapshot)?;
    let pool_back: palisade_margin::MarginPool = serde_json::from_str(&pool_json)?;
    let account_back: palisade_margin::AccountSnapshot = serde_json::from_str(&account_json)?;

    // A decoded snapshot carries everything the engine needs: the same
    // state produces the same rates and the same risk.
    assert_eq!(pool_back.deposit_rate(), margin_pool.deposit_rate());
    assert_eq!(pool_back.borrow_rate(), margin_pool.borrow_rate());
    assert_eq!(account_back.risk_indicator(), snapshot.risk_indicator());
    Ok(())
}
