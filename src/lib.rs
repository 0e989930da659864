//! # Chain Analytics - Option Chain Pricing and Signals
//!
//! An analytics engine for exchange-traded index option chains (NIFTY,
//! BANKNIFTY and similar).
//!
//! ## Overview
//!
//! Given a chain snapshot (strike-indexed call/put quotes), the underlying
//! spot and a series of daily closes, the crate computes:
//! - **Theoretical values**: Black-Scholes and a Heston effective-variance
//!   price, blended by moneyness, days to expiry and the volatility index
//! - **Greeks and implied volatility** per option
//! - **Volatility diagnostics**: historical volatility and IV/HV skew
//! - **Chain aggregates**: ATM strike, put-call ratio, max pain,
//!   support/resistance, put-call parity, sentiment
//! - **Signals**: ranked mispricing opportunities and per-option
//!   recommendations
//! - **Scenarios**: what-if repricing under spot, time and volatility shocks
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chain_analytics::prelude::*;
//!
//! # fn run(chain_json: &str, history_json: &str) -> AnalyticsResult<()> {
//! let chain = parse_option_chain(chain_json, None)?;
//! let closes = parse_history(history_json)?;
//!
//! let analyzer = ChainAnalyzer::new(AnalyticsConfig::default())?;
//! let analysis = analyzer.analyze(&chain.snapshot, &closes, chain.volatility_index, chrono::Utc::now());
//!
//! for opp in analysis.opportunities.all() {
//!     println!("{} {} {:+.1}%", opp.strike, opp.option_type, opp.percent_difference);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Sparse Data
//!
//! Missing quotes, unsolvable implied volatilities and short close series
//! never produce errors. Values are `None` or tagged
//! [`Estimate::Fallback`](core::Estimate). Errors are reserved for malformed
//! input: broker JSON, configuration files, unsorted or duplicate strikes.
//!
//! ## What This Crate Does NOT Do
//!
//! - Fetch data or manage broker sessions
//! - Persist results
//! - Execute orders

pub mod chain;
pub mod config;
pub mod core;
pub mod data;
pub mod models;
pub mod pipeline;
pub mod scenario;
pub mod signals;
pub mod volatility;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{
        moneyness_ratio, time_value, AnalyticsError, AnalyticsResult, ChainSnapshot, Estimate, Expiry,
        Greeks, Moneyness, OptionType, Quote, StrikeRow, Underlying,
    };

    // Configuration
    pub use crate::config::{
        AnalyticsConfig, BlendConfig, LevelsConfig, PricingConfig, SignalsConfig, VolatilityConfig,
    };

    // Models
    pub use crate::models::{
        black_scholes::{
            greeks as bs_greeks, implied_volatility, price as bs_price,
        },
        norm_cdf, norm_pdf, BlackScholes, HestonModel, HestonParams, HybridPricer, ImpliedVol,
        MarketConditions, ModelWeights, NoCorrection, PriceCorrection, PricingInput, PricingResult,
        SentimentHeuristic,
    };

    // Volatility
    pub use crate::volatility::{
        analyze_skew, historical_volatility, CloseSeries, HistoricalVolatility, SkewAnalyzer, SkewClass,
        SkewSignal, VolatilityProfile,
    };

    // Chain analytics
    pub use crate::chain::{
        atm_strike, max_pain_strike, parity_deviation, put_call_ratio, support_resistance,
        LevelDetector, ParityDeviation, Sentiment, SentimentSummary, SupportResistance, VolumeMetrics,
    };

    // Signals
    pub use crate::signals::{
        Action, Opportunity, OpportunityRanker, PriceSignal, Recommendation, Strength,
        TradingOpportunities,
    };

    // Scenarios
    pub use crate::scenario::{Scenario, ScenarioAnalyzer, ScenarioShock};

    // Ingestion
    pub use crate::data::{parse_history, parse_option_chain, FyersChain};

    // Pipeline
    pub use crate::pipeline::{AnalyticsState, ChainAnalysis, ChainAnalyzer, EnrichedRow, EnrichedSide};
}

// Re-export main types at crate root
pub use crate::core::{AnalyticsError, AnalyticsResult};
pub use crate::pipeline::{ChainAnalysis, ChainAnalyzer};
