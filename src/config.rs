//! Configuration for the analytics pipeline
//!
//! Every section has defaults matching Indian index options (NIFTY/BANKNIFTY):
//! 6.5% risk-free rate, 252 trading days, 10% mispricing threshold, top-3 OI
//! strikes. Configurations load from and save to TOML.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::{AnalyticsError, AnalyticsResult};
use crate::models::HestonParams;

/// Top-level analytics configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Closed-form pricer and IV solver
    pub pricing: PricingConfig,
    /// Stochastic-volatility parameters
    pub heston: HestonParams,
    /// Model blending
    pub blend: BlendConfig,
    /// Historical volatility and skew classification
    pub volatility: VolatilityConfig,
    /// Support/resistance and ATM detection
    pub levels: LevelsConfig,
    /// Mispricing signals and opportunity ranking
    pub signals: SignalsConfig,
}

impl AnalyticsConfig {
    /// Fewer, stronger signals
    pub fn conservative() -> Self {
        Self {
            signals: SignalsConfig {
                threshold_pct: 15.0,
                exclude_estimated: true,
                ..Default::default()
            },
            levels: LevelsConfig {
                top_n: 2,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// More signals, wider level set
    pub fn aggressive() -> Self {
        Self {
            signals: SignalsConfig {
                threshold_pct: 5.0,
                ..Default::default()
            },
            levels: LevelsConfig {
                top_n: 5,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Parse from a TOML string and validate
    pub fn from_toml_str(content: &str) -> AnalyticsResult<Self> {
        let config: AnalyticsConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file and validate
    pub fn from_toml_file(path: impl AsRef<Path>) -> AnalyticsResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "loaded analytics config");
        Ok(config)
    }

    pub fn to_toml_string(&self) -> AnalyticsResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the numeric routines cannot work with.
    ///
    /// NaN never passes: every numeric field must be finite.
    pub fn validate(&self) -> AnalyticsResult<()> {
        let p = &self.pricing;
        finite("risk_free_rate", p.risk_free_rate)?;
        positive("days_per_year", p.days_per_year)?;
        positive("min_time", p.min_time)?;
        positive("max_vol", p.max_vol)?;
        positive("iv_lower", p.iv_lower)?;
        positive("iv_upper", p.iv_upper)?;
        if p.iv_lower >= p.iv_upper {
            return Err(AnalyticsError::config(
                "IV bracket must satisfy 0 < iv_lower < iv_upper",
            ));
        }
        positive("iv_tolerance", p.iv_tolerance)?;
        if p.iv_max_iterations == 0 {
            return Err(AnalyticsError::config("iv_max_iterations must be positive"));
        }

        self.heston
            .validate()
            .map_err(|e| AnalyticsError::config(e.to_string()))?;

        let v = &self.volatility;
        if v.hv_window < 2 {
            return Err(AnalyticsError::config("hv_window must be at least 2"));
        }
        positive("trading_days_per_year", v.trading_days_per_year)?;
        positive("fallback_volatility", v.fallback_volatility)?;
        for (name, value) in [
            ("strong_under", v.strong_under),
            ("mild_under", v.mild_under),
            ("mild_over", v.mild_over),
            ("strong_over", v.strong_over),
        ] {
            positive(name, value)?;
        }
        if !(v.strong_under < v.mild_under
            && v.mild_under <= v.mild_over
            && v.mild_over < v.strong_over)
        {
            return Err(AnalyticsError::config(
                "skew thresholds must satisfy strong_under < mild_under <= mild_over < strong_over",
            ));
        }

        let b = &self.blend;
        positive("moneyness_lower", b.moneyness_lower)?;
        positive("moneyness_upper", b.moneyness_upper)?;
        if b.moneyness_lower >= b.moneyness_upper {
            return Err(AnalyticsError::config("moneyness band is empty"));
        }
        for (name, value) in [
            ("moneyness_shift", b.moneyness_shift),
            ("short_dte_days", b.short_dte_days),
            ("short_dte_shift", b.short_dte_shift),
            ("long_dte_days", b.long_dte_days),
            ("long_dte_shift", b.long_dte_shift),
            ("high_volatility_index", b.high_volatility_index),
            ("volatility_index_shift", b.volatility_index_shift),
            ("max_correction", b.max_correction),
        ] {
            non_negative(name, value)?;
        }
        positive("default_volatility_index", b.default_volatility_index)?;

        let s = &self.signals;
        non_negative("threshold_pct", s.threshold_pct)?;
        non_negative("strong_pct", s.strong_pct)?;
        non_negative("moderate_pct", s.moderate_pct)?;
        if s.moderate_pct > s.strong_pct {
            return Err(AnalyticsError::config("moderate_pct must not exceed strong_pct"));
        }

        let l = &self.levels;
        non_negative("atm_band", l.atm_band)?;
        for &m in &l.band_multipliers {
            positive("band multipliers", m)?;
        }

        Ok(())
    }
}

fn finite(name: &str, value: f64) -> AnalyticsResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AnalyticsError::config(format!("{} must be finite, got {}", name, value)))
    }
}

fn positive(name: &str, value: f64) -> AnalyticsResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AnalyticsError::config(format!("{} must be positive, got {}", name, value)))
    }
}

fn non_negative(name: &str, value: f64) -> AnalyticsResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AnalyticsError::config(format!("{} must be non-negative, got {}", name, value)))
    }
}

/// Closed-form pricer and IV solver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Annual risk-free rate
    /// Default: 0.065
    pub risk_free_rate: f64,

    /// Calendar days per year for T and theta
    /// Default: 365
    pub days_per_year: f64,

    /// Smallest time to expiry in years; shorter T is clamped up to this
    /// Default: 1e-8
    pub min_time: f64,

    /// Volatility cap keeping d1/d2 finite
    /// Default: 5.0
    pub max_vol: f64,

    /// IV bisection lower bound
    pub iv_lower: f64,
    /// IV bisection upper bound
    pub iv_upper: f64,
    /// IV convergence tolerance on price error
    pub iv_tolerance: f64,
    /// IV iteration budget
    pub iv_max_iterations: usize,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.065,
            days_per_year: 365.0,
            min_time: 1e-8,
            max_vol: 5.0,
            iv_lower: 0.0001,
            iv_upper: 5.0,
            iv_tolerance: 1e-5,
            iv_max_iterations: 100,
        }
    }
}

/// Model blending configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendConfig {
    /// S/K below this favours the stochastic-vol model
    pub moneyness_lower: f64,
    /// S/K above this favours the stochastic-vol model
    pub moneyness_upper: f64,
    /// Weight moved to stochastic vol outside the moneyness band
    pub moneyness_shift: f64,

    /// Days to expiry below which closed-form is favoured
    pub short_dte_days: f64,
    /// Weight moved to closed-form for short-dated options
    pub short_dte_shift: f64,

    /// Days to expiry above which stochastic vol is favoured
    pub long_dte_days: f64,
    /// Weight moved to stochastic vol for long-dated options
    pub long_dte_shift: f64,

    /// Volatility index level above which stochastic vol is favoured
    pub high_volatility_index: f64,
    /// Weight moved to stochastic vol in high-vol regimes
    pub volatility_index_shift: f64,

    /// Volatility index assumed when the caller supplies none (India VIX)
    /// Default: 18.5
    pub default_volatility_index: f64,

    /// Apply the heuristic correction term
    pub use_correction: bool,
    /// Bound on |correction|
    /// Default: 0.03
    pub max_correction: f64,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            moneyness_lower: 0.95,
            moneyness_upper: 1.05,
            moneyness_shift: 0.2,
            short_dte_days: 7.0,
            short_dte_shift: 0.3,
            long_dte_days: 30.0,
            long_dte_shift: 0.2,
            high_volatility_index: 20.0,
            volatility_index_shift: 0.1,
            default_volatility_index: 18.5,
            use_correction: true,
            max_correction: 0.03,
        }
    }
}

/// Historical volatility and skew classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilityConfig {
    /// Number of log returns in the trailing HV window
    /// Default: 20
    pub hv_window: usize,

    /// Trading days used to annualise HV and daily bands
    /// Default: 252
    pub trading_days_per_year: f64,

    /// Volatility substituted when data is insufficient
    /// Default: 0.3
    pub fallback_volatility: f64,

    /// IV/HV ratio above which options are strongly overpriced
    pub strong_over: f64,
    /// IV/HV ratio above which options are mildly overpriced
    pub mild_over: f64,
    /// IV/HV ratio below which options are mildly underpriced
    pub mild_under: f64,
    /// IV/HV ratio below which options are strongly underpriced
    pub strong_under: f64,
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        Self {
            hv_window: 20,
            trading_days_per_year: 252.0,
            fallback_volatility: 0.3,
            strong_over: 1.3,
            mild_over: 1.1,
            mild_under: 0.9,
            strong_under: 0.7,
        }
    }
}

/// Support/resistance configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelsConfig {
    /// Highest-OI strikes taken on each side
    /// Default: 3
    pub top_n: usize,

    /// Daily-sigma multiples for volatility bands
    /// Default: [1.0, 2.0]
    pub band_multipliers: Vec<f64>,

    /// ATM band as a fraction of spot for moneyness labels
    /// Default: 0.005
    pub atm_band: f64,
}

impl Default for LevelsConfig {
    fn default() -> Self {
        Self {
            top_n: 3,
            band_multipliers: vec![1.0, 2.0],
            atm_band: 0.005,
        }
    }
}

/// Mispricing signal configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalsConfig {
    /// |percent difference| at or above which an opportunity is emitted
    /// Default: 10.0
    pub threshold_pct: f64,

    /// Price-difference signal: strong band
    pub strong_pct: f64,
    /// Price-difference signal: moderate band
    pub moderate_pct: f64,

    /// Skip opportunities whose theoretical price rests on fallback volatility
    /// Default: false
    pub exclude_estimated: bool,
}

impl Default for SignalsConfig {
    fn default() -> Self {
        Self {
            threshold_pct: 10.0,
            strong_pct: 10.0,
            moderate_pct: 5.0,
            exclude_estimated: false,
        }
    }
}
