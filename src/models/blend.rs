//! Hybrid pricing
//!
//! Blends the closed-form price with the stochastic-volatility price using
//! weights that depend on moneyness, tenor and the volatility regime, then
//! applies a bounded correction term.
//!
//! The correction is a [`PriceCorrection`] hook. The shipped
//! [`SentimentHeuristic`] is a hand-written rule of thumb over the volatility
//! index, put-call ratio and tenor. It is not a fitted model.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::black_scholes::{BlackScholes, ImpliedVol};
use super::heston::{HestonModel, HestonParams};
use crate::config::{BlendConfig, PricingConfig};
use crate::core::{moneyness_ratio, Estimate, Greeks, OptionType};

/// Relative weights of the two pricing models, summing to 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelWeights {
    pub black_scholes: f64,
    pub heston: f64,
}

impl Default for ModelWeights {
    fn default() -> Self {
        Self {
            black_scholes: 0.5,
            heston: 0.5,
        }
    }
}

impl ModelWeights {
    /// Regime-dependent weights
    pub fn determine(features: &OptionFeatures, market: &MarketConditions, config: &BlendConfig) -> Self {
        let mut bs = 0.5;
        let mut sv = 0.5;

        let mut shift = |amount: f64| {
            bs -= amount;
            sv += amount;
        };

        if features.moneyness < config.moneyness_lower || features.moneyness > config.moneyness_upper {
            shift(config.moneyness_shift);
        }

        if features.days_to_expiry < config.short_dte_days {
            shift(-config.short_dte_shift);
        } else if features.days_to_expiry > config.long_dte_days {
            shift(config.long_dte_shift);
        }

        if market.volatility_index > config.high_volatility_index {
            shift(config.volatility_index_shift);
        }

        let bs = bs.max(0.0);
        let sv = sv.max(0.0);
        let total = bs + sv;
        if total <= 0.0 {
            return Self::default();
        }

        Self {
            black_scholes: bs / total,
            heston: sv / total,
        }
    }
}

/// Per-option characteristics the blender and correction look at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionFeatures {
    /// S/K
    pub moneyness: f64,
    /// Calendar days to expiry
    pub days_to_expiry: f64,
    /// Years to expiry
    pub time_to_expiry: f64,
}

/// Market-wide regime inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketConditions {
    /// Volatility index level (India VIX)
    pub volatility_index: f64,
    /// Chain OI put-call ratio, when defined
    pub put_call_ratio: Option<f64>,
}

impl MarketConditions {
    pub fn new(volatility_index: f64, put_call_ratio: Option<f64>) -> Self {
        Self {
            volatility_index,
            put_call_ratio,
        }
    }
}

/// Fractional price adjustment applied after blending
pub trait PriceCorrection: fmt::Debug + Send + Sync {
    /// Correction as a fraction of the blended price (0.01 = +1%)
    fn correction(&self, features: &OptionFeatures, market: &MarketConditions) -> f64;

    fn name(&self) -> &'static str;
}

/// Rule-of-thumb adjustment for Indian index options
#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentHeuristic;

impl PriceCorrection for SentimentHeuristic {
    fn correction(&self, features: &OptionFeatures, market: &MarketConditions) -> f64 {
        let mut correction = 0.0;

        if market.volatility_index > 20.0 {
            correction += 0.02 * features.moneyness;
        }

        match market.put_call_ratio {
            Some(pcr) if pcr > 1.2 => correction -= 0.01,
            Some(pcr) if pcr < 0.8 => correction += 0.01,
            _ => {}
        }

        // Under ~18 days
        if features.time_to_expiry < 0.05 {
            correction += 0.03 * (1.0 - features.moneyness);
        }

        correction
    }

    fn name(&self) -> &'static str {
        "sentiment-heuristic"
    }
}

/// No adjustment
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCorrection;

impl PriceCorrection for NoCorrection {
    fn correction(&self, _features: &OptionFeatures, _market: &MarketConditions) -> f64 {
        0.0
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// One side of one strike to price
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingInput {
    pub option_type: OptionType,
    pub spot: f64,
    pub strike: f64,
    /// Years to expiry
    pub time: f64,
    /// Calendar days to expiry
    pub days_to_expiry: f64,
    /// Last traded price, if the contract traded
    pub market_price: Option<f64>,
}

/// Full pricing output for one side of one strike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub option_type: OptionType,
    pub strike: f64,
    pub market_price: Option<f64>,
    /// Solved from the market price
    pub implied_volatility: Option<ImpliedVol>,
    /// Volatility the Greeks were computed at
    pub greeks_volatility: Estimate,
    /// Blended and corrected price
    pub theoretical_price: f64,
    pub black_scholes_price: f64,
    pub heston_price: f64,
    pub weights: ModelWeights,
    pub correction: f64,
    pub greeks: Greeks,
    /// (market - theoretical) / theoretical * 100
    pub price_difference_pct: Option<f64>,
    /// Theoretical price rests on a fallback reference volatility
    pub estimated: bool,
}

/// Blended closed-form / stochastic-vol pricer
#[derive(Debug)]
pub struct HybridPricer {
    pricer: BlackScholes,
    heston: HestonModel,
    config: BlendConfig,
    correction: Box<dyn PriceCorrection>,
}

impl HybridPricer {
    pub fn new(pricing: &PricingConfig, heston: HestonParams, config: BlendConfig) -> Self {
        let pricer = BlackScholes::from_config(pricing);
        let correction: Box<dyn PriceCorrection> = if config.use_correction {
            Box::new(SentimentHeuristic)
        } else {
            Box::new(NoCorrection)
        };
        Self {
            pricer,
            heston: HestonModel::new(heston, pricer),
            config,
            correction,
        }
    }

    /// Replace the correction hook
    pub fn with_correction(mut self, correction: impl PriceCorrection + 'static) -> Self {
        self.correction = Box::new(correction);
        self
    }

    pub fn pricer(&self) -> &BlackScholes {
        &self.pricer
    }

    pub fn correction_name(&self) -> &'static str {
        self.correction.name()
    }

    /// Price one side.
    ///
    /// Both model components are evaluated at `reference_vol` (the chain's
    /// ATM volatility). Greeks use the option's own implied volatility when
    /// its market price can be inverted, else the reference.
    pub fn price(
        &self,
        input: &PricingInput,
        reference_vol: Estimate,
        market: &MarketConditions,
    ) -> Option<PricingResult> {
        let PricingInput {
            option_type,
            spot,
            strike,
            time,
            days_to_expiry,
            market_price,
        } = *input;

        let market_price = market_price.filter(|p| p.is_finite() && *p > 0.0);
        let implied_volatility = market_price
            .and_then(|p| self.pricer.implied_volatility(p, spot, strike, time, option_type));

        let black_scholes_price = self.pricer.price(spot, strike, reference_vol.value(), time, option_type)?;
        let heston_price = self.heston.price(spot, strike, time, option_type)?;

        let features = OptionFeatures {
            moneyness: moneyness_ratio(spot, strike),
            days_to_expiry,
            time_to_expiry: time,
        };
        let weights = ModelWeights::determine(&features, market, &self.config);

        let limit = self.config.max_correction;
        let correction = self.correction.correction(&features, market).clamp(-limit, limit);

        let blended = weights.black_scholes * black_scholes_price + weights.heston * heston_price;
        let theoretical_price = blended * (1.0 + correction);

        let greeks_volatility = implied_volatility
            .filter(|iv| iv.converged)
            .map(|iv| Estimate::Market(iv.value))
            .unwrap_or(reference_vol);
        let greeks = self
            .pricer
            .greeks(spot, strike, greeks_volatility.value(), time, option_type)?;

        let price_difference_pct = match market_price {
            Some(m) if theoretical_price > 0.0 => Some((m - theoretical_price) / theoretical_price * 100.0),
            _ => None,
        };

        Some(PricingResult {
            option_type,
            strike,
            market_price,
            implied_volatility,
            greeks_volatility,
            theoretical_price,
            black_scholes_price,
            heston_price,
            weights,
            correction,
            greeks,
            price_difference_pct,
            estimated: reference_vol.is_fallback(),
        })
    }
}

impl Default for HybridPricer {
    fn default() -> Self {
        Self::new(&PricingConfig::default(), HestonParams::default(), BlendConfig::default())
    }
}
