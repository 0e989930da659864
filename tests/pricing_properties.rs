//! Property-based tests for the closed-form pricer.
//!
//! These tests verify that:
//! 1. Put-call parity holds for every valid input
//! 2. Prices move the right way in spot, strike, volatility and (calls) time
//! 3. The IV solver recovers the volatility a price was generated with
//! 4. Greeks stay finite and bounded down to expiry

use approx::assert_relative_eq;
use proptest::prelude::*;

use chain_analytics::models::{black_scholes, norm_cdf, BlackScholes};
use chain_analytics::prelude::*;

const RATE: f64 = 0.065;

/// Spot, strike within a factor of two of spot, vol, time in years
fn market_strategy() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    (50.0..50_000.0f64).prop_flat_map(|spot| {
        (
            Just(spot),
            (spot * 0.5)..(spot * 2.0),
            0.05..1.5f64,
            (1.0 / 365.0)..2.0f64,
        )
    })
}

// ============================================================================
// Parity
// ============================================================================

proptest! {
    #[test]
    fn prop_put_call_parity((spot, strike, vol, time) in market_strategy()) {
        let bs = BlackScholes::new(RATE);
        let call = bs.call_price(spot, strike, vol, time).unwrap();
        let put = bs.put_price(spot, strike, vol, time).unwrap();

        let forward = spot - strike * (-RATE * time).exp();
        prop_assert!((call - put - forward).abs() <= 1e-6 * spot);
    }

    #[test]
    fn prop_normal_cdf_symmetry(x in -12.0..12.0f64) {
        prop_assert!((norm_cdf(x) + norm_cdf(-x) - 1.0).abs() < 1e-7);
        prop_assert!((0.0..=1.0).contains(&norm_cdf(x)));
    }
}

// ============================================================================
// Monotonicity
// ============================================================================

proptest! {
    #[test]
    fn prop_call_monotone_in_spot((spot, strike, vol, time) in market_strategy(), bump in 0.001..0.2f64) {
        let bs = BlackScholes::new(RATE);
        let lower = bs.call_price(spot, strike, vol, time).unwrap();
        let higher = bs.call_price(spot * (1.0 + bump), strike, vol, time).unwrap();
        prop_assert!(higher >= lower - 1e-9);
    }

    #[test]
    fn prop_call_monotone_in_strike((spot, strike, vol, time) in market_strategy(), bump in 0.001..0.2f64) {
        let bs = BlackScholes::new(RATE);
        let near = bs.call_price(spot, strike, vol, time).unwrap();
        let far = bs.call_price(spot, strike * (1.0 + bump), vol, time).unwrap();
        prop_assert!(far <= near + 1e-9);
    }

    #[test]
    fn prop_call_monotone_in_time((spot, strike, vol, time) in market_strategy(), bump in 0.01..1.0f64) {
        let bs = BlackScholes::new(RATE);
        let near = bs.call_price(spot, strike, vol, time).unwrap();
        let far = bs.call_price(spot, strike, vol, time * (1.0 + bump)).unwrap();
        prop_assert!(far >= near - 1e-6 * spot);
    }

    #[test]
    fn prop_put_monotone_in_spot((spot, strike, vol, time) in market_strategy(), bump in 0.001..0.2f64) {
        let bs = BlackScholes::new(RATE);
        let lower = bs.put_price(spot, strike, vol, time).unwrap();
        let higher = bs.put_price(spot * (1.0 + bump), strike, vol, time).unwrap();
        prop_assert!(higher <= lower + 1e-6 * spot);
    }

    #[test]
    fn prop_put_monotone_in_strike((spot, strike, vol, time) in market_strategy(), bump in 0.001..0.2f64) {
        let bs = BlackScholes::new(RATE);
        let near = bs.put_price(spot, strike, vol, time).unwrap();
        let far = bs.put_price(spot, strike * (1.0 + bump), vol, time).unwrap();
        prop_assert!(far >= near - 1e-6 * spot);
    }

    #[test]
    fn prop_price_monotone_in_vol((spot, strike, vol, time) in market_strategy(), bump in 0.01..0.5f64) {
        let bs = BlackScholes::new(RATE);
        for side in [OptionType::Call, OptionType::Put] {
            let low = bs.price(spot, strike, vol, time, side).unwrap();
            let high = bs.price(spot, strike, vol + bump, time, side).unwrap();
            prop_assert!(high >= low - 1e-9);
        }
    }
}

// ============================================================================
// Implied volatility
// ============================================================================

proptest! {
    #[test]
    fn prop_iv_round_trip(
        spot in 100.0..30_000.0f64,
        moneyness in 0.9..1.1f64,
        vol in 0.08..1.0f64,
        time in 0.05..1.0f64,
        call in any::<bool>(),
    ) {
        let side = if call { OptionType::Call } else { OptionType::Put };
        let strike = spot * moneyness;
        let price = black_scholes::price(spot, strike, RATE, vol, time, side).unwrap();

        let iv = black_scholes::implied_volatility(price, spot, strike, RATE, time, side).unwrap();
        prop_assert!(iv.converged);
        prop_assert!((iv.value - vol).abs() < 1e-3, "iv {} vs {}", iv.value, vol);
    }
}

#[test]
fn test_iv_unsolvable_prices() {
    assert!(implied_volatility(0.0, 100.0, 100.0, RATE, 0.1, OptionType::Call).is_none());
    assert!(implied_volatility(f64::NAN, 100.0, 100.0, RATE, 0.1, OptionType::Call).is_none());

    // Above the spot, no volatility reaches it: best effort, not converged
    let iv = implied_volatility(150.0, 100.0, 100.0, RATE, 0.1, OptionType::Call).unwrap();
    assert!(!iv.converged);
    assert_eq!(iv.iterations, 100);
}

// ============================================================================
// Greeks boundaries
// ============================================================================

proptest! {
    #[test]
    fn prop_greeks_bounded((spot, strike, vol, _) in market_strategy(), days in 0.0..3.0f64) {
        let bs = BlackScholes::new(RATE);
        let time = days / 365.0;
        let call = bs.greeks(spot, strike, vol, time, OptionType::Call).unwrap();
        let put = bs.greeks(spot, strike, vol, time, OptionType::Put).unwrap();

        prop_assert!(call.is_finite() && put.is_finite());
        prop_assert!((0.0..=1.0).contains(&call.delta));
        prop_assert!((-1.0..=0.0).contains(&put.delta));
        prop_assert!((call.delta - put.delta - 1.0).abs() < 1e-9);
        prop_assert!(call.gamma >= 0.0 && call.vega >= 0.0);
    }
}

#[test]
fn test_greeks_at_expiry() {
    let bs = BlackScholes::new(RATE);

    let itm = bs.greeks(110.0, 100.0, 0.2, 0.0, OptionType::Call).unwrap();
    assert_relative_eq!(itm.delta, 1.0, epsilon = 1e-9);
    let otm = bs.greeks(90.0, 100.0, 0.2, 0.0, OptionType::Call).unwrap();
    assert_relative_eq!(otm.delta, 0.0, epsilon = 1e-9);
    let put = bs.greeks(90.0, 100.0, 0.2, 0.0, OptionType::Put).unwrap();
    assert_relative_eq!(put.delta, -1.0, epsilon = 1e-9);

    // Expired option prices at intrinsic
    let price = bs.call_price(110.0, 100.0, 0.2, -0.01).unwrap();
    assert_relative_eq!(price, 10.0, epsilon = 1e-6);
}
