//! Historical volatility
//!
//! Annualised sample standard deviation of daily log returns over a trailing
//! window. Close series are always held oldest-first; callers holding
//! newest-first data convert once through [`CloseSeries::from_newest_first`].

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;

use crate::config::VolatilityConfig;
use crate::core::Estimate;

/// Daily closing prices in chronological order (oldest first)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CloseSeries(Vec<f64>);

impl CloseSeries {
    pub fn from_oldest_first(closes: Vec<f64>) -> Self {
        Self(closes)
    }

    pub fn from_newest_first(mut closes: Vec<f64>) -> Self {
        closes.reverse();
        Self(closes)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Most recent close
    pub fn latest(&self) -> Option<f64> {
        self.0.last().copied()
    }

    /// Log returns over the last `window` intervals, skipping pairs with a
    /// non-positive price
    pub fn log_returns(&self, window: usize) -> Vec<f64> {
        let start = self.0.len().saturating_sub(window + 1);
        self.0[start..]
            .windows(2)
            .filter(|w| w[0] > 0.0 && w[1] > 0.0)
            .map(|w| (w[1] / w[0]).ln())
            .collect()
    }
}

impl From<Vec<f64>> for CloseSeries {
    fn from(closes: Vec<f64>) -> Self {
        Self::from_oldest_first(closes)
    }
}

/// Trailing-window historical volatility estimator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoricalVolatility {
    window: usize,
    trading_days: f64,
    fallback: f64,
}

impl Default for HistoricalVolatility {
    fn default() -> Self {
        Self::from_config(&VolatilityConfig::default())
    }
}

impl HistoricalVolatility {
    pub fn from_config(config: &VolatilityConfig) -> Self {
        Self {
            window: config.hv_window,
            trading_days: config.trading_days_per_year,
            fallback: config.fallback_volatility,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Annualised volatility, or the fallback when fewer than `window + 1`
    /// closes are available
    pub fn estimate(&self, closes: &CloseSeries) -> Estimate {
        if closes.len() < self.window + 1 {
            debug!(
                closes = closes.len(),
                window = self.window,
                fallback = self.fallback,
                "close series too short, using fallback volatility"
            );
            return Estimate::Fallback(self.fallback);
        }

        let returns = closes.log_returns(self.window);
        if returns.len() < 2 {
            debug!(returns = returns.len(), "too few valid returns, using fallback volatility");
            return Estimate::Fallback(self.fallback);
        }

        let variance: f64 = returns.iter().variance();
        if !variance.is_finite() {
            return Estimate::Fallback(self.fallback);
        }

        Estimate::Market((variance * self.trading_days).sqrt())
    }
}

/// Historical volatility with default window (20), 252 days and 0.3 fallback
pub fn historical_volatility(closes: &CloseSeries) -> Estimate {
    HistoricalVolatility::default().estimate(closes)
}
