//! Black-Scholes Model
//!
//! Provides:
//! - European option pricing
//! - Greeks computation
//! - Implied volatility solver (bisection)
//!
//! All entry points return `None` for inputs the formula is undefined on
//! (non-positive spot, strike or vol, non-finite values) instead of
//! panicking or producing NaN. Time to expiry is clamped to a small epsilon
//! and volatility is capped, so options on their expiry day still price.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::normal::{norm_cdf, norm_pdf};
use crate::config::PricingConfig;
use crate::core::{Greeks, OptionType};

/// Spot/strike ratio beyond which the option is priced from its discounted
/// intrinsic value
pub const DEEP_MONEYNESS: f64 = 10.0;

/// Output of the implied volatility solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpliedVol {
    /// Best volatility found
    pub value: f64,
    /// Price error fell below tolerance
    pub converged: bool,
    /// Bisection steps taken
    pub iterations: usize,
}

/// Closed-form pricer with numerical guard rails
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackScholes {
    rate: f64,
    min_time: f64,
    max_vol: f64,
    iv_lower: f64,
    iv_upper: f64,
    iv_tolerance: f64,
    iv_max_iterations: usize,
}

impl Default for BlackScholes {
    fn default() -> Self {
        Self::from_config(&PricingConfig::default())
    }
}

impl BlackScholes {
    /// Pricer with default guard rails at the given risk-free rate
    pub fn new(rate: f64) -> Self {
        Self {
            rate,
            ..Self::default()
        }
    }

    pub fn from_config(config: &PricingConfig) -> Self {
        Self {
            rate: config.risk_free_rate,
            min_time: config.min_time,
            max_vol: config.max_vol,
            iv_lower: config.iv_lower,
            iv_upper: config.iv_upper,
            iv_tolerance: config.iv_tolerance,
            iv_max_iterations: config.iv_max_iterations,
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Validate inputs and apply the time floor and vol cap
    fn prepare(&self, spot: f64, strike: f64, vol: f64, time: f64) -> Option<(f64, f64)> {
        let finite = spot.is_finite() && strike.is_finite() && vol.is_finite() && self.rate.is_finite();
        if !finite || spot <= 0.0 || strike <= 0.0 || vol <= 0.0 || time.is_nan() {
            return None;
        }
        Some((time.max(self.min_time), vol.min(self.max_vol)))
    }

    fn d1_d2_unchecked(&self, spot: f64, strike: f64, vol: f64, time: f64) -> (f64, f64) {
        let vol_sqrt_t = vol * time.sqrt();
        let d1 = ((spot / strike).ln() + (self.rate + 0.5 * vol * vol) * time) / vol_sqrt_t;
        (d1, d1 - vol_sqrt_t)
    }

    /// d1 and d2 after guard rails
    pub fn d1_d2(&self, spot: f64, strike: f64, vol: f64, time: f64) -> Option<(f64, f64)> {
        let (time, vol) = self.prepare(spot, strike, vol, time)?;
        Some(self.d1_d2_unchecked(spot, strike, vol, time))
    }

    /// European option price
    pub fn price(
        &self,
        spot: f64,
        strike: f64,
        vol: f64,
        time: f64,
        option_type: OptionType,
    ) -> Option<f64> {
        let (time, vol) = self.prepare(spot, strike, vol, time)?;
        let discounted_strike = strike * (-self.rate * time).exp();

        // Deep in/out of the money: d1/d2 blow up, price is all intrinsic
        let deep_itm = match option_type {
            OptionType::Call => spot > DEEP_MONEYNESS * strike,
            OptionType::Put => spot < strike / DEEP_MONEYNESS,
        };
        let deep_otm = match option_type {
            OptionType::Call => spot < strike / DEEP_MONEYNESS,
            OptionType::Put => spot > DEEP_MONEYNESS * strike,
        };
        if deep_itm {
            return Some((option_type.phi() * (spot - discounted_strike)).max(0.0));
        }
        if deep_otm {
            return Some(0.0);
        }

        let (d1, d2) = self.d1_d2_unchecked(spot, strike, vol, time);
        let value = match option_type {
            OptionType::Call => spot * norm_cdf(d1) - discounted_strike * norm_cdf(d2),
            OptionType::Put => discounted_strike * norm_cdf(-d2) - spot * norm_cdf(-d1),
        };
        Some(value)
    }

    pub fn call_price(&self, spot: f64, strike: f64, vol: f64, time: f64) -> Option<f64> {
        self.price(spot, strike, vol, time, OptionType::Call)
    }

    pub fn put_price(&self, spot: f64, strike: f64, vol: f64, time: f64) -> Option<f64> {
        self.price(spot, strike, vol, time, OptionType::Put)
    }

    /// Greeks: theta per calendar day, vega and rho per percentage point
    pub fn greeks(
        &self,
        spot: f64,
        strike: f64,
        vol: f64,
        time: f64,
        option_type: OptionType,
    ) -> Option<Greeks> {
        let (time, vol) = self.prepare(spot, strike, vol, time)?;
        let (d1, d2) = self.d1_d2_unchecked(spot, strike, vol, time);

        let sqrt_t = time.sqrt();
        let pdf_d1 = norm_pdf(d1);
        let discounted_strike = strike * (-self.rate * time).exp();

        let delta = match option_type {
            OptionType::Call => norm_cdf(d1),
            OptionType::Put => norm_cdf(d1) - 1.0,
        };

        let gamma = pdf_d1 / (spot * vol * sqrt_t);

        let vega = spot * sqrt_t * pdf_d1 / 100.0;

        let decay = -spot * pdf_d1 * vol / (2.0 * sqrt_t);
        let theta = match option_type {
            OptionType::Call => decay - self.rate * discounted_strike * norm_cdf(d2),
            OptionType::Put => decay + self.rate * discounted_strike * norm_cdf(-d2),
        };

        let rho = match option_type {
            OptionType::Call => time * discounted_strike * norm_cdf(d2) / 100.0,
            OptionType::Put => -time * discounted_strike * norm_cdf(-d2) / 100.0,
        };

        Some(Greeks::new(delta, gamma, theta / 365.0, vega, rho))
    }

    /// Invert the pricer by bisection.
    ///
    /// Returns the midpoint with the smallest price error seen. Hitting the
    /// iteration budget is not an error; `converged` records whether the
    /// tolerance was met.
    pub fn implied_volatility(
        &self,
        market_price: f64,
        spot: f64,
        strike: f64,
        time: f64,
        option_type: OptionType,
    ) -> Option<ImpliedVol> {
        if !market_price.is_finite() || market_price <= 0.0 {
            return None;
        }
        self.prepare(spot, strike, self.iv_lower, time)?;

        let mut low = self.iv_lower;
        let mut high = self.iv_upper;
        let mut best = ImpliedVol {
            value: (low + high) / 2.0,
            converged: false,
            iterations: 0,
        };
        let mut best_error = f64::INFINITY;

        for iteration in 1..=self.iv_max_iterations {
            let mid = (low + high) / 2.0;
            let diff = self.price(spot, strike, mid, time, option_type)? - market_price;

            if diff.abs() < best_error {
                best_error = diff.abs();
                best.value = mid;
            }
            best.iterations = iteration;

            if diff.abs() < self.iv_tolerance {
                best.converged = true;
                return Some(best);
            }

            if diff > 0.0 {
                high = mid;
            } else {
                low = mid;
            }
        }

        debug!(
            market_price,
            strike,
            best_vol = best.value,
            price_error = best_error,
            "implied volatility did not converge"
        );
        Some(best)
    }
}

/// European option price at the given risk-free rate
pub fn price(
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    time: f64,
    option_type: OptionType,
) -> Option<f64> {
    BlackScholes::new(rate).price(spot, strike, vol, time, option_type)
}

pub fn call_price(spot: f64, strike: f64, rate: f64, vol: f64, time: f64) -> Option<f64> {
    price(spot, strike, rate, vol, time, OptionType::Call)
}

pub fn put_price(spot: f64, strike: f64, rate: f64, vol: f64, time: f64) -> Option<f64> {
    price(spot, strike, rate, vol, time, OptionType::Put)
}

/// Black-Scholes Greeks at the given risk-free rate
pub fn greeks(
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    time: f64,
    option_type: OptionType,
) -> Option<Greeks> {
    BlackScholes::new(rate).greeks(spot, strike, vol, time, option_type)
}

/// Implied volatility with the default bracket [0.0001, 5]
pub fn implied_volatility(
    market_price: f64,
    spot: f64,
    strike: f64,
    rate: f64,
    time: f64,
    option_type: OptionType,
) -> Option<ImpliedVol> {
    BlackScholes::new(rate).implied_volatility(market_price, spot, strike, time, option_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    const T30: f64 = 30.0 / 365.0;

    #[test]
    fn test_nifty_atm_reference() {
        let call = call_price(18000.0, 18000.0, 0.065, 0.20, T30).unwrap();
        let put = put_price(18000.0, 18000.0, 0.065, 0.20, T30).unwrap();

        assert!((call - 460.32).abs() < 0.05, "call = {}", call);
        assert!((put - 364.42).abs() < 0.05, "put = {}", put);

        let g = greeks(18000.0, 18000.0, 0.065, 0.20, T30, OptionType::Call).unwrap();
        assert!(g.delta > 0.54 && g.delta < 0.56, "delta = {}", g.delta);
    }

    #[test]
    fn test_bs_price() {
        // ATM call, 20% vol, 1 year, 5% rate
        let call = call_price(100.0, 100.0, 0.05, 0.20, 1.0).unwrap();
        assert!(call > 10.40 && call < 10.50);

        // Put-call parity
        let put = put_price(100.0, 100.0, 0.05, 0.20, 1.0).unwrap();
        let parity = call - put - (100.0 - 100.0 * (-0.05_f64).exp());
        assert!(parity.abs() < 1e-9);
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(call_price(0.0, 100.0, 0.05, 0.2, 1.0), None);
        assert_eq!(call_price(100.0, -1.0, 0.05, 0.2, 1.0), None);
        assert_eq!(call_price(100.0, 100.0, 0.05, 0.0, 1.0), None);
        assert_eq!(call_price(f64::NAN, 100.0, 0.05, 0.2, 1.0), None);
        assert_eq!(greeks(100.0, 100.0, 0.05, -0.2, 1.0, OptionType::Put), None);
    }

    #[test]
    fn test_expiry_day_prices() {
        // T = 0 is clamped, not rejected
        let call = call_price(110.0, 100.0, 0.05, 0.2, 0.0).unwrap();
        assert!((call - 10.0).abs() < 1e-3);
        let put = put_price(110.0, 100.0, 0.05, 0.2, 0.0).unwrap();
        assert!(put.abs() < 1e-6);
    }

    #[test]
    fn test_deep_moneyness_guards() {
        let df = (-0.05_f64 * 0.5).exp();

        let deep_call = call_price(2000.0, 100.0, 0.05, 0.3, 0.5).unwrap();
        assert!((deep_call - (2000.0 - 100.0 * df)).abs() < 1e-9);
        assert_eq!(put_price(2000.0, 100.0, 0.05, 0.3, 0.5), Some(0.0));

        assert_eq!(call_price(5.0, 100.0, 0.05, 0.3, 0.5), Some(0.0));
        let deep_put = put_price(5.0, 100.0, 0.05, 0.3, 0.5).unwrap();
        assert!((deep_put - (100.0 * df - 5.0)).abs() < 1e-9);
    }

    #[test]
    fn test_vol_cap() {
        let capped = call_price(100.0, 100.0, 0.05, 50.0, 1.0).unwrap();
        let at_cap = call_price(100.0, 100.0, 0.05, 5.0, 1.0).unwrap();
        assert_eq!(capped, at_cap);
    }

    #[test]
    fn test_greeks() {
        let g = greeks(100.0, 100.0, 0.05, 0.20, 1.0, OptionType::Call).unwrap();

        // ATM call delta should be around 0.5-0.7
        assert!(g.delta > 0.5 && g.delta < 0.7);
        assert!(g.gamma > 0.0);
        // Time decay
        assert!(g.theta < 0.0);
        assert!(g.vega > 0.0);
        assert!(g.rho > 0.0);

        let p = greeks(100.0, 100.0, 0.05, 0.20, 1.0, OptionType::Put).unwrap();
        assert!((g.delta - p.delta - 1.0).abs() < 1e-12);
        assert_eq!(g.gamma, p.gamma);
        assert_eq!(g.vega, p.vega);
        assert!(p.rho < 0.0);
    }

    #[test]
    fn test_greeks_near_expiry() {
        let t = 1e-6;
        let itm = greeks(110.0, 100.0, 0.05, 0.2, t, OptionType::Call).unwrap();
        let otm = greeks(90.0, 100.0, 0.05, 0.2, t, OptionType::Call).unwrap();
        let atm = greeks(100.0, 100.0, 0.05, 0.2, t, OptionType::Call).unwrap();

        assert!((itm.delta - 1.0).abs() < 1e-9);
        assert!(otm.delta.abs() < 1e-9);
        assert!(itm.gamma < 1e-9 && otm.gamma < 1e-9);
        assert!(itm.vega < 1e-9 && otm.vega < 1e-9);
        assert!(atm.gamma > 1.0);
    }

    #[test]
    fn test_implied_vol() {
        let market = price(100.0, 100.0, 0.05, 0.25, 0.5, OptionType::Call).unwrap();
        let iv = implied_volatility(market, 100.0, 100.0, 0.05, 0.5, OptionType::Call).unwrap();

        assert!(iv.converged);
        assert!(iv.iterations <= 100);
        assert!((iv.value - 0.25).abs() < 1e-3);
    }

    #[test]
    fn test_iv_otm_put() {
        let market = price(100.0, 90.0, 0.05, 0.30, 0.25, OptionType::Put).unwrap();
        let iv = implied_volatility(market, 100.0, 90.0, 0.05, 0.25, OptionType::Put).unwrap();

        assert!((iv.value - 0.30).abs() < 1e-3);
    }

    #[test]
    fn test_iv_unreachable_price_returns_best_effort() {
        // Above the spot: no volatility reproduces it
        let iv = implied_volatility(150.0, 100.0, 100.0, 0.05, 0.5, OptionType::Call).unwrap();
        assert!(!iv.converged);
        assert_eq!(iv.iterations, 100);
        assert!(iv.value > 4.9);
    }

    #[test]
    fn test_iv_invalid() {
        assert!(implied_volatility(0.0, 100.0, 100.0, 0.05, 0.5, OptionType::Call).is_none());
        assert!(implied_volatility(5.0, 0.0, 100.0, 0.05, 0.5, OptionType::Call).is_none());
    }
}
