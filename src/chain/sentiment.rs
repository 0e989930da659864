//! Market sentiment summary
//!
//! Six quick readings of the chain, each labelled bullish, bearish or
//! neutral. A reading whose input is missing is `Unknown`, never neutral.

use serde::{Deserialize, Serialize};

use super::parity::ParityDeviation;
use crate::core::StrikeRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
    Unknown,
}

impl Sentiment {
    /// Bearish above `high`, bullish below `low`
    fn from_level(value: Option<f64>, high: f64, low: f64) -> Self {
        match value {
            Some(v) if !v.is_finite() => Sentiment::Unknown,
            Some(v) if v > high => Sentiment::Bearish,
            Some(v) if v < low => Sentiment::Bullish,
            Some(_) => Sentiment::Neutral,
            None => Sentiment::Unknown,
        }
    }

    /// Bullish when calls lead puts
    fn from_pair(pair: Option<SidePair>) -> Self {
        match pair {
            Some(p) if p.call > p.put => Sentiment::Bullish,
            Some(p) if p.call < p.put => Sentiment::Bearish,
            Some(_) => Sentiment::Neutral,
            None => Sentiment::Unknown,
        }
    }
}

/// Call-side and put-side values of one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SidePair {
    pub call: f64,
    pub put: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading<T> {
    pub value: Option<T>,
    pub sentiment: Sentiment,
}

/// Inputs gathered from an analysed chain
#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentInputs<'a> {
    pub implied_volatility: Option<f64>,
    pub historical_volatility: Option<f64>,
    pub put_call_ratio: Option<f64>,
    pub atm_parity: Option<ParityDeviation>,
    pub atm_row: Option<&'a StrikeRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    /// > 0.25 bearish, < 0.18 bullish
    pub implied_volatility: Reading<f64>,
    /// > 1.2 bearish, < 0.8 bullish
    pub iv_hv_ratio: Reading<f64>,
    /// > 1.0 bearish, < 0.8 bullish
    pub put_call_ratio: Reading<f64>,
    /// Positive deviation bullish
    pub parity_deviation: Reading<f64>,
    pub atm_volume: Reading<SidePair>,
    pub atm_oi_change_pct: Reading<SidePair>,
}

impl SentimentSummary {
    pub fn from_inputs(inputs: &SentimentInputs<'_>) -> Self {
        let iv = inputs.implied_volatility;
        let ratio = match (iv, inputs.historical_volatility) {
            (Some(iv), Some(hv)) if hv > 0.0 => Some(iv / hv),
            _ => None,
        };
        let deviation = inputs.atm_parity.map(|p| p.deviation);

        let volume = inputs.atm_row.and_then(|row| {
            Some(SidePair {
                call: row.call.as_ref()?.volume as f64,
                put: row.put.as_ref()?.volume as f64,
            })
        });
        let oi_change = inputs.atm_row.and_then(|row| {
            Some(SidePair {
                call: row.call.as_ref()?.oi_change_pct()?,
                put: row.put.as_ref()?.oi_change_pct()?,
            })
        });

        Self {
            implied_volatility: Reading {
                value: iv,
                sentiment: Sentiment::from_level(iv, 0.25, 0.18),
            },
            iv_hv_ratio: Reading {
                value: ratio,
                sentiment: Sentiment::from_level(ratio, 1.2, 0.8),
            },
            put_call_ratio: Reading {
                value: inputs.put_call_ratio,
                sentiment: Sentiment::from_level(inputs.put_call_ratio, 1.0, 0.8),
            },
            parity_deviation: Reading {
                value: deviation,
                // Sign flipped: a positive deviation is bullish
                sentiment: Sentiment::from_level(deviation.map(|d| -d), 0.0, 0.0),
            },
            atm_volume: Reading {
                value: volume,
                sentiment: Sentiment::from_pair(volume),
            },
            atm_oi_change_pct: Reading {
                value: oi_change,
                sentiment: Sentiment::from_pair(oi_change),
            },
        }
    }

    fn sentiments(&self) -> [Sentiment; 6] {
        [
            self.implied_volatility.sentiment,
            self.iv_hv_ratio.sentiment,
            self.put_call_ratio.sentiment,
            self.parity_deviation.sentiment,
            self.atm_volume.sentiment,
            self.atm_oi_change_pct.sentiment,
        ]
    }

    /// Majority of the known readings; `Unknown` when none are known
    pub fn overall(&self) -> Sentiment {
        let readings = self.sentiments();
        let count = |s: Sentiment| readings.iter().filter(|&&r| r == s).count();

        let bullish = count(Sentiment::Bullish);
        let bearish = count(Sentiment::Bearish);
        if count(Sentiment::Unknown) == readings.len() {
            Sentiment::Unknown
        } else if bullish > bearish {
            Sentiment::Bullish
        } else if bearish > bullish {
            Sentiment::Bearish
        } else {
            Sentiment::Neutral
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Quote;

    #[test]
    fn test_levels() {
        assert_eq!(Sentiment::from_level(Some(0.30), 0.25, 0.18), Sentiment::Bearish);
        assert_eq!(Sentiment::from_level(Some(0.15), 0.25, 0.18), Sentiment::Bullish);
        assert_eq!(Sentiment::from_level(Some(0.25), 0.25, 0.18), Sentiment::Neutral);
        assert_eq!(Sentiment::from_level(None, 0.25, 0.18), Sentiment::Unknown);
        assert_eq!(Sentiment::from_level(Some(f64::NAN), 0.25, 0.18), Sentiment::Unknown);
    }

    #[test]
    fn test_summary() {
        let row = StrikeRow::new(
            18000.0,
            Some(Quote::new(400.0, 1200, 9000).with_oi_change(200)),
            Some(Quote::new(350.0, 1100, 7000).with_oi_change(100)),
        );
        let parity = ParityDeviation {
            strike: 18000.0,
            theoretical: 96.0,
            actual: 50.0,
            deviation: -46.0,
            deviation_pct: -47.9,
        };
        let summary = SentimentSummary::from_inputs(&SentimentInputs {
            implied_volatility: Some(0.15),
            historical_volatility: Some(0.20),
            put_call_ratio: Some(1.3),
            atm_parity: Some(parity),
            atm_row: Some(&row),
        });

        assert_eq!(summary.implied_volatility.sentiment, Sentiment::Bullish);
        assert_eq!(summary.iv_hv_ratio.sentiment, Sentiment::Bullish);
        assert_eq!(summary.put_call_ratio.sentiment, Sentiment::Bearish);
        assert_eq!(summary.parity_deviation.sentiment, Sentiment::Bearish);
        assert_eq!(summary.atm_volume.sentiment, Sentiment::Bullish);
        // CE 200/1000 = 20%, PE 100/1000 = 10%
        assert_eq!(summary.atm_oi_change_pct.sentiment, Sentiment::Bullish);
        assert_eq!(summary.overall(), Sentiment::Bullish);
    }

    #[test]
    fn test_missing_inputs_unknown() {
        let summary = SentimentSummary::from_inputs(&SentimentInputs::default());
        assert_eq!(summary.iv_hv_ratio.sentiment, Sentiment::Unknown);
        assert_eq!(summary.atm_volume.sentiment, Sentiment::Unknown);
        assert_eq!(summary.overall(), Sentiment::Unknown);
    }
}
