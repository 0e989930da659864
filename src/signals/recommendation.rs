//! Per-option signals
//!
//! [`PriceSignal`] grades the market/theoretical gap alone. [`Recommendation`]
//! combines that gap with the option's volatility skew signal.

use serde::{Deserialize, Serialize};

use super::Action;
use crate::config::SignalsConfig;
use crate::volatility::SkewSignal;

/// Gap above which the recommendation takes a side
const RECOMMENDATION_GAP_PCT: f64 = 10.0;
const BASE_CONFIDENCE: f64 = 50.0;
const SKEW_CONFIDENCE_BONUS: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strength {
    Strong,
    Moderate,
    Neutral,
}

/// Signal from the price difference alone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSignal {
    pub action: Action,
    pub strength: Strength,
    /// 0.0 to 1.0
    pub confidence: f64,
}

impl PriceSignal {
    /// Grade a price difference in percent
    pub fn from_difference(pct: f64, config: &SignalsConfig) -> Self {
        let (action, strength, confidence) = if pct > config.strong_pct {
            (Action::Sell, Strength::Strong, 0.8)
        } else if pct > config.moderate_pct {
            (Action::Sell, Strength::Moderate, 0.6)
        } else if pct < -config.strong_pct {
            (Action::Buy, Strength::Strong, 0.8)
        } else if pct < -config.moderate_pct {
            (Action::Buy, Strength::Moderate, 0.6)
        } else {
            (Action::Hold, Strength::Neutral, 0.5)
        };
        Self {
            action,
            strength,
            confidence,
        }
    }
}

/// Combined per-option recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: Action,
    /// 0 to 100
    pub confidence: f64,
    pub reason: String,
}

impl Recommendation {
    /// Combine the price gap with the skew signal.
    ///
    /// A gap beyond 10% picks a side with confidence 2·|gap| (capped at 100).
    /// A skew signal leaning either way then overrides the side and adds 20.
    pub fn new(price_difference_pct: Option<f64>, skew: SkewSignal) -> Self {
        let mut action = Action::Hold;
        let mut confidence = BASE_CONFIDENCE;
        let mut reason = String::from("Price is close to theoretical value");

        if let Some(pct) = price_difference_pct.filter(|p| p.abs() > RECOMMENDATION_GAP_PCT) {
            confidence = (pct.abs() * 2.0).round().min(100.0);
            if pct > 0.0 {
                action = Action::Sell;
                reason = format!("Option appears overpriced by {:.1}% relative to theoretical value", pct);
            } else {
                action = Action::Buy;
                reason = format!(
                    "Option appears underpriced by {:.1}% relative to theoretical value",
                    pct.abs()
                );
            }
        }

        if skew.leans_buy() {
            action = Action::Buy;
            confidence = (confidence + SKEW_CONFIDENCE_BONUS).min(100.0);
            reason.push_str(" and volatility analysis suggests buying");
        } else if skew.leans_sell() {
            action = Action::Sell;
            confidence = (confidence + SKEW_CONFIDENCE_BONUS).min(100.0);
            reason.push_str(" and volatility analysis suggests selling");
        }

        Self {
            action,
            confidence,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_signal_bands() {
        let config = SignalsConfig::default();
        let s = PriceSignal::from_difference(12.0, &config);
        assert_eq!((s.action, s.strength, s.confidence), (Action::Sell, Strength::Strong, 0.8));

        let s = PriceSignal::from_difference(7.0, &config);
        assert_eq!((s.action, s.strength), (Action::Sell, Strength::Moderate));

        let s = PriceSignal::from_difference(-11.0, &config);
        assert_eq!((s.action, s.strength), (Action::Buy, Strength::Strong));

        let s = PriceSignal::from_difference(-6.0, &config);
        assert_eq!(s.confidence, 0.6);

        // Band edges fall to the weaker grade
        let s = PriceSignal::from_difference(5.0, &config);
        assert_eq!((s.action, s.strength, s.confidence), (Action::Hold, Strength::Neutral, 0.5));
        assert_eq!(PriceSignal::from_difference(10.0, &config).strength, Strength::Moderate);
    }

    #[test]
    fn test_recommendation_from_price_gap() {
        let r = Recommendation::new(Some(-15.0), SkewSignal::Neutral);
        assert_eq!(r.action, Action::Buy);
        assert_eq!(r.confidence, 30.0);
        assert!(r.reason.contains("underpriced by 15.0%"));

        let r = Recommendation::new(Some(80.0), SkewSignal::Hold);
        assert_eq!(r.action, Action::Sell);
        assert_eq!(r.confidence, 100.0);
    }

    #[test]
    fn test_skew_overrides_action() {
        let r = Recommendation::new(Some(25.0), SkewSignal::NeutralBuy);
        assert_eq!(r.action, Action::Buy);
        assert_eq!(r.confidence, 70.0);
        assert!(r.reason.ends_with("suggests buying"));
    }

    #[test]
    fn test_hold_default() {
        let r = Recommendation::new(Some(4.0), SkewSignal::Neutral);
        assert_eq!(r.action, Action::Hold);
        assert_eq!(r.confidence, 50.0);

        let r = Recommendation::new(None, SkewSignal::Sell);
        assert_eq!(r.action, Action::Sell);
        assert_eq!(r.confidence, 70.0);
    }
}
