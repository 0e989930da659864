//! Support and resistance levels
//!
//! Two sources are merged per side:
//! 1. **Open-interest walls**: the top-N strikes by put OI below spot
//!    (support) and by call OI above spot (resistance)
//! 2. **Volatility bands**: spot ∓ k·σ_daily for each configured multiplier,
//!    where σ_daily = spot · annual_vol / √252
//!
//! Levels are rounded to two decimals, deduplicated and ordered closest to
//! spot first.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::config::{LevelsConfig, VolatilityConfig};
use crate::core::{ChainSnapshot, OptionType, StrikeRow};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportResistance {
    /// Below spot, descending
    pub support: Vec<f64>,
    /// Above spot, ascending
    pub resistance: Vec<f64>,
}

impl SupportResistance {
    pub fn is_support(&self, strike: f64) -> bool {
        self.support.iter().any(|&s| s == round2(strike))
    }

    pub fn is_resistance(&self, strike: f64) -> bool {
        self.resistance.iter().any(|&r| r == round2(strike))
    }

    /// Nearest support below spot
    pub fn nearest_support(&self) -> Option<f64> {
        self.support.first().copied()
    }

    /// Nearest resistance above spot
    pub fn nearest_resistance(&self) -> Option<f64> {
        self.resistance.first().copied()
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// One-day expected move in price units
pub fn daily_move(spot: f64, annual_vol: f64, trading_days: f64) -> f64 {
    spot * annual_vol / trading_days.sqrt()
}

/// Support/resistance detector
#[derive(Debug, Clone)]
pub struct LevelDetector {
    config: LevelsConfig,
    trading_days: f64,
}

impl LevelDetector {
    /// Create a new detector with default configuration
    pub fn new() -> Self {
        Self::with_config(LevelsConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(config: LevelsConfig) -> Self {
        Self {
            config,
            trading_days: VolatilityConfig::default().trading_days_per_year,
        }
    }

    /// Override the trading-day count used for the daily move
    pub fn with_trading_days(mut self, trading_days: f64) -> Self {
        self.trading_days = trading_days;
        self
    }

    /// Get current configuration
    pub fn config(&self) -> &LevelsConfig {
        &self.config
    }

    /// Update configuration
    pub fn set_config(&mut self, config: LevelsConfig) {
        self.config = config;
    }

    /// Strikes with the largest OI on one side of spot
    fn oi_walls(&self, rows: &[StrikeRow], spot: f64, side: OptionType) -> Vec<f64> {
        let mut candidates: Vec<(f64, u64)> = rows
            .iter()
            .filter(|row| match side {
                OptionType::Put => row.strike < spot,
                OptionType::Call => row.strike > spot,
            })
            .filter_map(|row| {
                let oi = row.side(side)?.oi;
                (oi > 0).then_some((row.strike, oi))
            })
            .collect();

        // Highest OI first; closer strike wins a tie
        candidates.sort_by(|a, b| {
            b.1.cmp(&a.1).then_with(|| {
                (a.0 - spot)
                    .abs()
                    .partial_cmp(&(b.0 - spot).abs())
                    .unwrap_or(Ordering::Equal)
            })
        });
        candidates.truncate(self.config.top_n);
        candidates.into_iter().map(|(strike, _)| strike).collect()
    }

    /// Detect levels for a chain given the annualised volatility used for bands
    pub fn detect(&self, chain: &ChainSnapshot, annual_vol: f64) -> SupportResistance {
        let spot = chain.spot();
        if !(spot.is_finite() && spot > 0.0) {
            return SupportResistance::default();
        }

        let mut support = self.oi_walls(chain.rows(), spot, OptionType::Put);
        let mut resistance = self.oi_walls(chain.rows(), spot, OptionType::Call);

        if annual_vol.is_finite() && annual_vol > 0.0 {
            let one_day = daily_move(spot, annual_vol, self.trading_days);
            for &k in &self.config.band_multipliers {
                support.push(spot - k * one_day);
                resistance.push(spot + k * one_day);
            }
        }

        SupportResistance {
            support: finalize(support, |a, b| b.total_cmp(a)),
            resistance: finalize(resistance, |a, b| a.total_cmp(b)),
        }
    }
}

impl Default for LevelDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn finalize(levels: Vec<f64>, order: impl Fn(&f64, &f64) -> Ordering) -> Vec<f64> {
    let mut levels: Vec<f64> = levels
        .into_iter()
        .map(round2)
        .filter(|l| l.is_finite() && *l > 0.0)
        .collect();
    levels.sort_by(&order);
    levels.dedup();
    levels
}

/// Convenience function: detect levels with default configuration
pub fn support_resistance(chain: &ChainSnapshot, annual_vol: f64) -> SupportResistance {
    LevelDetector::new().detect(chain, annual_vol)
}
