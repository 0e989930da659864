//! Implied vs historical volatility skew
//!
//! Classifies the IV/HV ratio into five pricing buckets, each with a trading
//! signal and an interpretation. Missing inputs produce an explicit
//! insufficient-data result with a HOLD signal rather than a neutral reading.

use serde::{Deserialize, Serialize};

use crate::config::VolatilityConfig;
use crate::core::Estimate;

/// Trading signal derived from the IV/HV ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkewSignal {
    Buy,
    Sell,
    NeutralBuy,
    NeutralSell,
    Neutral,
    Hold,
}

impl SkewSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkewSignal::Buy => "BUY",
            SkewSignal::Sell => "SELL",
            SkewSignal::NeutralBuy => "NEUTRAL_BUY",
            SkewSignal::NeutralSell => "NEUTRAL_SELL",
            SkewSignal::Neutral => "NEUTRAL",
            SkewSignal::Hold => "HOLD",
        }
    }

    /// BUY or NEUTRAL_BUY
    pub fn leans_buy(&self) -> bool {
        matches!(self, SkewSignal::Buy | SkewSignal::NeutralBuy)
    }

    /// SELL or NEUTRAL_SELL
    pub fn leans_sell(&self) -> bool {
        matches!(self, SkewSignal::Sell | SkewSignal::NeutralSell)
    }
}

impl std::fmt::Display for SkewSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Pricing bucket for an IV/HV ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkewClass {
    StronglyOverpriced,
    Overpriced,
    FairlyPriced,
    Underpriced,
    StronglyUnderpriced,
    InsufficientData,
}

impl SkewClass {
    pub fn signal(&self) -> SkewSignal {
        match self {
            SkewClass::StronglyOverpriced => SkewSignal::Sell,
            SkewClass::Overpriced => SkewSignal::NeutralSell,
            SkewClass::FairlyPriced => SkewSignal::Neutral,
            SkewClass::Underpriced => SkewSignal::NeutralBuy,
            SkewClass::StronglyUnderpriced => SkewSignal::Buy,
            SkewClass::InsufficientData => SkewSignal::Hold,
        }
    }

    pub fn interpretation(&self) -> &'static str {
        match self {
            SkewClass::StronglyOverpriced => {
                "Implied volatility is significantly higher than historical volatility, suggesting options may be overpriced"
            }
            SkewClass::Overpriced => {
                "Implied volatility is higher than historical volatility, suggesting options may be slightly overpriced"
            }
            SkewClass::FairlyPriced => {
                "Implied volatility is in line with historical volatility, suggesting options are fairly priced"
            }
            SkewClass::Underpriced => {
                "Implied volatility is lower than historical volatility, suggesting options may be slightly underpriced"
            }
            SkewClass::StronglyUnderpriced => {
                "Implied volatility is significantly lower than historical volatility, suggesting options may be underpriced"
            }
            SkewClass::InsufficientData => "Insufficient data to analyze volatility skew",
        }
    }
}

/// IV/HV comparison for one option or the whole chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityProfile {
    pub implied_volatility: Option<f64>,
    pub historical_volatility: Option<f64>,
    /// IV / HV
    pub skew_ratio: Option<f64>,
    /// IV - HV
    pub skew_difference: Option<f64>,
    /// (IV - HV) / HV * 100
    pub skew_percentage: Option<f64>,
    pub classification: SkewClass,
    pub interpretation: String,
    pub signal: SkewSignal,
    /// At least one input is a fallback value
    pub estimated: bool,
}

impl VolatilityProfile {
    pub fn insufficient_data(implied: Option<f64>, historical: Option<f64>) -> Self {
        let class = SkewClass::InsufficientData;
        Self {
            implied_volatility: implied,
            historical_volatility: historical,
            skew_ratio: None,
            skew_difference: None,
            skew_percentage: None,
            classification: class,
            interpretation: class.interpretation().to_string(),
            signal: class.signal(),
            estimated: false,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        self.classification == SkewClass::InsufficientData
    }
}

/// Threshold-based skew classifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkewAnalyzer {
    strong_over: f64,
    mild_over: f64,
    mild_under: f64,
    strong_under: f64,
}

impl Default for SkewAnalyzer {
    fn default() -> Self {
        Self::from_config(&VolatilityConfig::default())
    }
}

impl SkewAnalyzer {
    pub fn from_config(config: &VolatilityConfig) -> Self {
        Self {
            strong_over: config.strong_over,
            mild_over: config.mild_over,
            mild_under: config.mild_under,
            strong_under: config.strong_under,
        }
    }

    /// Bucket a ratio; all comparisons are strict
    pub fn classify(&self, ratio: f64) -> SkewClass {
        if ratio > self.strong_over {
            SkewClass::StronglyOverpriced
        } else if ratio < self.strong_under {
            SkewClass::StronglyUnderpriced
        } else if ratio > self.mild_over {
            SkewClass::Overpriced
        } else if ratio < self.mild_under {
            SkewClass::Underpriced
        } else {
            SkewClass::FairlyPriced
        }
    }

    /// Compare IV against HV
    pub fn analyze(&self, implied: Option<Estimate>, historical: Option<Estimate>) -> VolatilityProfile {
        let iv = implied.map(|e| e.value());
        let hv = historical.map(|e| e.value());

        let (Some(iv_value), Some(hv_value)) = (iv, hv) else {
            return VolatilityProfile::insufficient_data(iv, hv);
        };
        if !(iv_value.is_finite() && hv_value.is_finite() && iv_value > 0.0 && hv_value > 0.0) {
            return VolatilityProfile::insufficient_data(iv, hv);
        }

        let ratio = iv_value / hv_value;
        let difference = iv_value - hv_value;
        let class = self.classify(ratio);
        let estimated = implied.map_or(false, |e| e.is_fallback())
            || historical.map_or(false, |e| e.is_fallback());

        VolatilityProfile {
            implied_volatility: iv,
            historical_volatility: hv,
            skew_ratio: Some(ratio),
            skew_difference: Some(difference),
            skew_percentage: Some(difference / hv_value * 100.0),
            classification: class,
            interpretation: class.interpretation().to_string(),
            signal: class.signal(),
            estimated,
        }
    }
}

/// Skew analysis of market-derived IV and HV with default thresholds
pub fn analyze_skew(implied: Option<f64>, historical: Option<f64>) -> VolatilityProfile {
    SkewAnalyzer::default().analyze(implied.map(Estimate::Market), historical.map(Estimate::Market))
}
