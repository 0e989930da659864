//! Trading-opportunity ranking
//!
//! An option whose market price sits at least `threshold_pct` away from its
//! theoretical value becomes a candidate: SELL when rich, BUY when cheap.
//! Calls and puts are ranked separately by |percent difference|.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::Action;
use crate::config::SignalsConfig;
use crate::core::OptionType;
use crate::models::PricingResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub strike: f64,
    pub option_type: OptionType,
    pub market_price: f64,
    pub theoretical_price: f64,
    /// (market - theoretical) / theoretical · 100
    pub percent_difference: f64,
    pub action: Action,
    /// |percent_difference|
    pub score: f64,
    /// Theoretical price rests on a fallback volatility
    pub estimated: bool,
}

/// Ranked candidates, highest score first within each side
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradingOpportunities {
    pub calls: Vec<Opportunity>,
    pub puts: Vec<Opportunity>,
}

impl TradingOpportunities {
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.puts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.calls.len() + self.puts.len()
    }

    /// Both sides merged, highest score first
    pub fn all(&self) -> Vec<&Opportunity> {
        let mut all: Vec<&Opportunity> = self.calls.iter().chain(self.puts.iter()).collect();
        all.sort_by(|a, b| by_score(a, b));
        all
    }
}

fn by_score(a: &Opportunity, b: &Opportunity) -> Ordering {
    b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal)
}

#[derive(Debug, Clone)]
pub struct OpportunityRanker {
    threshold_pct: f64,
    exclude_estimated: bool,
}

impl Default for OpportunityRanker {
    fn default() -> Self {
        Self::from_config(&SignalsConfig::default())
    }
}

impl OpportunityRanker {
    pub fn from_config(config: &SignalsConfig) -> Self {
        Self {
            threshold_pct: config.threshold_pct,
            exclude_estimated: config.exclude_estimated,
        }
    }

    pub fn with_threshold(mut self, threshold_pct: f64) -> Self {
        self.threshold_pct = threshold_pct;
        self
    }

    /// Candidate for one option, if mispriced beyond the threshold
    pub fn evaluate(
        &self,
        option_type: OptionType,
        strike: f64,
        market_price: f64,
        theoretical_price: f64,
        estimated: bool,
    ) -> Option<Opportunity> {
        if estimated && self.exclude_estimated {
            return None;
        }
        if !(market_price.is_finite() && market_price > 0.0) {
            return None;
        }
        if !(theoretical_price.is_finite() && theoretical_price > 0.0) {
            return None;
        }

        let percent_difference = (market_price - theoretical_price) / theoretical_price * 100.0;
        let score = percent_difference.abs();
        if score < self.threshold_pct {
            return None;
        }

        Some(Opportunity {
            strike,
            option_type,
            market_price,
            theoretical_price,
            percent_difference,
            action: if percent_difference > 0.0 { Action::Sell } else { Action::Buy },
            score,
            estimated,
        })
    }

    /// Rank priced options
    pub fn rank<'a>(&self, results: impl IntoIterator<Item = &'a PricingResult>) -> TradingOpportunities {
        let mut out = TradingOpportunities::default();

        for result in results {
            let Some(market) = result.market_price else {
                continue;
            };
            let Some(opportunity) = self.evaluate(
                result.option_type,
                result.strike,
                market,
                result.theoretical_price,
                result.estimated,
            ) else {
                continue;
            };
            match opportunity.option_type {
                OptionType::Call => out.calls.push(opportunity),
                OptionType::Put => out.puts.push(opportunity),
            }
        }

        out.calls.sort_by(by_score);
        out.puts.sort_by(by_score);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_and_direction() {
        let ranker = OpportunityRanker::default();

        // 12% rich: SELL
        let rich = ranker.evaluate(OptionType::Call, 18000.0, 112.0, 100.0, false).unwrap();
        assert_eq!(rich.action, Action::Sell);
        assert!((rich.score - 12.0).abs() < 1e-9);

        // 8%: below threshold
        assert!(ranker.evaluate(OptionType::Call, 18100.0, 108.0, 100.0, false).is_none());

        // Exactly at threshold counts
        let cheap = ranker.evaluate(OptionType::Put, 17900.0, 90.0, 100.0, false).unwrap();
        assert_eq!(cheap.action, Action::Buy);
        assert!((cheap.percent_difference + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_prices_skipped() {
        let ranker = OpportunityRanker::default();
        assert!(ranker.evaluate(OptionType::Call, 1.0, 0.0, 100.0, false).is_none());
        assert!(ranker.evaluate(OptionType::Call, 1.0, 50.0, 0.0, false).is_none());
    }

    #[test]
    fn test_exclude_estimated() {
        let ranker = OpportunityRanker::from_config(&SignalsConfig {
            exclude_estimated: true,
            ..Default::default()
        });
        assert!(ranker.evaluate(OptionType::Call, 1.0, 150.0, 100.0, true).is_none());
        assert!(ranker.evaluate(OptionType::Call, 1.0, 150.0, 100.0, false).is_some());

        // Default keeps them, flagged
        let kept = OpportunityRanker::default()
            .evaluate(OptionType::Call, 1.0, 150.0, 100.0, true)
            .unwrap();
        assert!(kept.estimated);
    }

    #[test]
    fn test_all_merges_sorted() {
        let ranker = OpportunityRanker::default();
        let list = TradingOpportunities {
            calls: vec![ranker.evaluate(OptionType::Call, 1.0, 115.0, 100.0, false).unwrap()],
            puts: vec![
                ranker.evaluate(OptionType::Put, 2.0, 60.0, 100.0, false).unwrap(),
                ranker.evaluate(OptionType::Put, 3.0, 120.0, 100.0, false).unwrap(),
            ],
        };
        let scores: Vec<f64> = list.all().iter().map(|o| o.score.round()).collect();
        assert_eq!(scores, vec![40.0, 20.0, 15.0]);
        assert_eq!(list.len(), 3);
    }
}
