//! Chain-wide analysis
//!
//! [`ChainAnalyzer::analyze`] turns one chain snapshot and its close series
//! into a complete [`ChainAnalysis`]. The function is pure: the same inputs
//! and `now` always produce the same bundle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chain::{
    atm_implied_volatility, atm_row, atm_strike, max_pain_strike, put_call_ratio, row_parity,
    LevelDetector, ParityDeviation, SentimentInputs, SentimentSummary, SupportResistance, VolumeMetrics,
};
use crate::config::AnalyticsConfig;
use crate::core::{
    time_value, AnalyticsResult, ChainSnapshot, Estimate, Expiry, Moneyness, OptionType, Quote, StrikeRow,
    Underlying,
};
use crate::models::{HybridPricer, MarketConditions, PriceCorrection, PricingInput, PricingResult};
use crate::signals::{OpportunityRanker, PriceSignal, Recommendation, TradingOpportunities};
use crate::volatility::{CloseSeries, HistoricalVolatility, SkewAnalyzer, VolatilityProfile};

/// One side of an enriched strike row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedSide {
    pub quote: Quote,
    pub moneyness: Moneyness,
    pub intrinsic_value: f64,
    /// Premium above intrinsic; `None` without a traded price
    pub time_value: Option<f64>,
    /// `None` when the option cannot be priced
    pub pricing: Option<PricingResult>,
    /// The option's own IV against the chain HV
    pub volatility: VolatilityProfile,
    pub price_signal: Option<PriceSignal>,
    pub recommendation: Recommendation,
}

/// Strike row with per-side analytics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRow {
    pub strike: f64,
    pub call: Option<EnrichedSide>,
    pub put: Option<EnrichedSide>,
    pub parity: Option<ParityDeviation>,
    pub is_support: bool,
    pub is_resistance: bool,
}

impl EnrichedRow {
    pub fn side(&self, option_type: OptionType) -> Option<&EnrichedSide> {
        match option_type {
            OptionType::Call => self.call.as_ref(),
            OptionType::Put => self.put.as_ref(),
        }
    }
}

/// Everything derived from one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainAnalysis {
    pub underlying: Underlying,
    pub expiry: Expiry,
    pub computed_at: DateTime<Utc>,
    pub days_to_expiry: f64,
    /// Years, as used by the pricers
    pub time_to_expiry: f64,

    pub atm_strike: Option<f64>,
    /// ATM implied volatility used as the model input
    pub reference_volatility: Estimate,
    pub historical_volatility: Estimate,
    /// Chain-wide IV/HV comparison
    pub volatility_skew: VolatilityProfile,
    pub market: MarketConditions,

    pub support_resistance: SupportResistance,
    pub put_call_ratio: Option<f64>,
    pub volume_metrics: VolumeMetrics,
    pub max_pain_strike: Option<f64>,
    /// Put-call parity at the ATM strike
    pub parity: Option<ParityDeviation>,
    pub sentiment: SentimentSummary,
    pub opportunities: TradingOpportunities,

    pub rows: Vec<EnrichedRow>,
}

impl ChainAnalysis {
    pub fn spot(&self) -> f64 {
        self.underlying.ltp
    }

    pub fn row_at(&self, strike: f64) -> Option<&EnrichedRow> {
        self.rows.iter().find(|r| r.strike == strike)
    }

    /// All pricing results, calls before puts within each strike
    pub fn pricing_results(&self) -> impl Iterator<Item = &PricingResult> {
        self.rows
            .iter()
            .flat_map(|r| [r.call.as_ref(), r.put.as_ref()])
            .flatten()
            .filter_map(|s| s.pricing.as_ref())
    }
}

/// Composes the pricing, volatility, chain and signal components
#[derive(Debug)]
pub struct ChainAnalyzer {
    config: AnalyticsConfig,
    pricer: HybridPricer,
    historical: HistoricalVolatility,
    skew: SkewAnalyzer,
    levels: LevelDetector,
    ranker: OpportunityRanker,
}

impl Default for ChainAnalyzer {
    fn default() -> Self {
        Self::build(AnalyticsConfig::default())
    }
}

impl ChainAnalyzer {
    /// Validate `config` and build the components from it
    pub fn new(config: AnalyticsConfig) -> AnalyticsResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: AnalyticsConfig) -> Self {
        let pricer = HybridPricer::new(&config.pricing, config.heston, config.blend.clone());
        let historical = HistoricalVolatility::from_config(&config.volatility);
        let skew = SkewAnalyzer::from_config(&config.volatility);
        let levels = LevelDetector::with_config(config.levels.clone())
            .with_trading_days(config.volatility.trading_days_per_year);
        let ranker = OpportunityRanker::from_config(&config.signals);
        Self {
            config,
            pricer,
            historical,
            skew,
            levels,
            ranker,
        }
    }

    /// Replace the blender's correction term
    pub fn with_correction(mut self, correction: impl PriceCorrection + 'static) -> Self {
        self.pricer = self.pricer.with_correction(correction);
        self
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn pricer(&self) -> &HybridPricer {
        &self.pricer
    }

    /// Analyse one snapshot.
    ///
    /// `volatility_index` falls back to the configured default when absent.
    pub fn analyze(
        &self,
        chain: &ChainSnapshot,
        closes: &CloseSeries,
        volatility_index: Option<f64>,
        now: DateTime<Utc>,
    ) -> ChainAnalysis {
        let spot = chain.spot();
        let rate = self.config.pricing.risk_free_rate;
        let days_to_expiry = chain.expiry.days_to_expiry(now);
        let time_to_expiry = chain.expiry.time_to_expiry(now, self.config.pricing.days_per_year);

        let reference_volatility = atm_implied_volatility(
            chain,
            self.pricer.pricer(),
            time_to_expiry,
            self.config.volatility.fallback_volatility,
        );
        let historical_volatility = self.historical.estimate(closes);
        let volatility_skew = self
            .skew
            .analyze(Some(reference_volatility), Some(historical_volatility));

        let put_call_ratio = put_call_ratio(chain.rows());
        let market = MarketConditions::new(
            volatility_index.unwrap_or(self.config.blend.default_volatility_index),
            put_call_ratio,
        );

        let support_resistance = self.levels.detect(chain, reference_volatility.value());

        let rows: Vec<EnrichedRow> = chain
            .rows()
            .iter()
            .map(|row| EnrichedRow {
                strike: row.strike,
                call: self.enrich_side(
                    row,
                    OptionType::Call,
                    spot,
                    time_to_expiry,
                    days_to_expiry,
                    reference_volatility,
                    historical_volatility,
                    &market,
                ),
                put: self.enrich_side(
                    row,
                    OptionType::Put,
                    spot,
                    time_to_expiry,
                    days_to_expiry,
                    reference_volatility,
                    historical_volatility,
                    &market,
                ),
                parity: row_parity(row, spot, rate, time_to_expiry),
                is_support: support_resistance.is_support(row.strike),
                is_resistance: support_resistance.is_resistance(row.strike),
            })
            .collect();

        let atm = atm_row(chain);
        let parity = atm.and_then(|row| row_parity(row, spot, rate, time_to_expiry));
        let sentiment = SentimentSummary::from_inputs(&SentimentInputs {
            implied_volatility: reference_volatility.market(),
            historical_volatility: historical_volatility.market(),
            put_call_ratio,
            atm_parity: parity,
            atm_row: atm,
        });

        let opportunities = self.ranker.rank(
            rows.iter()
                .flat_map(|r| [r.call.as_ref(), r.put.as_ref()])
                .flatten()
                .filter_map(|s| s.pricing.as_ref()),
        );

        debug!(
            reference_vol = reference_volatility.value(),
            historical_vol = historical_volatility.value(),
            estimated = reference_volatility.is_fallback() || historical_volatility.is_fallback(),
            "volatility inputs"
        );
        info!(
            symbol = %chain.underlying.symbol,
            strikes = rows.len(),
            opportunities = opportunities.len(),
            days_to_expiry,
            "chain analysed"
        );

        ChainAnalysis {
            underlying: chain.underlying.clone(),
            expiry: chain.expiry.clone(),
            computed_at: now,
            days_to_expiry,
            time_to_expiry,
            atm_strike: atm_strike(chain),
            reference_volatility,
            historical_volatility,
            volatility_skew,
            market,
            support_resistance,
            put_call_ratio,
            volume_metrics: VolumeMetrics::from_rows(chain.rows()),
            max_pain_strike: max_pain_strike(chain.rows()),
            parity,
            sentiment,
            opportunities,
            rows,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn enrich_side(
        &self,
        row: &StrikeRow,
        option_type: OptionType,
        spot: f64,
        time: f64,
        days_to_expiry: f64,
        reference_vol: Estimate,
        historical_vol: Estimate,
        market: &MarketConditions,
    ) -> Option<EnrichedSide> {
        let quote = row.side(option_type)?;
        let strike = row.strike;
        let traded = quote.traded_price();

        let pricing = self.pricer.price(
            &PricingInput {
                option_type,
                spot,
                strike,
                time,
                days_to_expiry,
                market_price: traded,
            },
            reference_vol,
            market,
        );
        if pricing.is_none() {
            debug!(strike, side = %option_type, "option could not be priced");
        }

        let implied = pricing
            .as_ref()
            .and_then(|p| p.implied_volatility)
            .map(|iv| match iv.converged {
                true => Estimate::Market(iv.value),
                false => Estimate::Fallback(iv.value),
            });
        let volatility = self.skew.analyze(implied, Some(historical_vol));

        let price_difference_pct = pricing.as_ref().and_then(|p| p.price_difference_pct);
        let price_signal = price_difference_pct.map(|pct| PriceSignal::from_difference(pct, &self.config.signals));
        let recommendation = Recommendation::new(price_difference_pct, volatility.signal);

        Some(EnrichedSide {
            quote: quote.clone(),
            moneyness: Moneyness::classify(option_type, spot, strike, self.config.levels.atm_band),
            intrinsic_value: option_type.intrinsic(spot, strike),
            time_value: traded.map(|p| time_value(option_type, p, spot, strike)),
            pricing,
            volatility,
            price_signal,
            recommendation,
        })
    }
}
