//! Chain-wide aggregates
//!
//! ATM detection, open-interest and volume totals, put-call ratios, max
//! pain and the chain's reference implied volatility.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{ChainSnapshot, Estimate, OptionType, StrikeRow};
use crate::models::BlackScholes;

/// Strike closest to spot; the lower strike wins an exact tie
pub fn atm_strike(chain: &ChainSnapshot) -> Option<f64> {
    atm_row(chain).map(|row| row.strike)
}

/// Row closest to spot
pub fn atm_row(chain: &ChainSnapshot) -> Option<&StrikeRow> {
    let spot = chain.spot();
    chain.rows().iter().fold(None, |best: Option<&StrikeRow>, row| match best {
        Some(b) if (b.strike - spot).abs() <= (row.strike - spot).abs() => Some(b),
        _ => Some(row),
    })
}

fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

/// Σ put OI / Σ call OI, `None` when there is no call OI
pub fn put_call_ratio(rows: &[StrikeRow]) -> Option<f64> {
    let (calls, puts) = rows
        .iter()
        .fold((0u64, 0u64), |(c, p), row| (c + row.call_oi(), p + row.put_oi()));
    ratio(puts, calls)
}

/// Open interest and volume totals across the chain
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeMetrics {
    pub total_call_oi: u64,
    pub total_put_oi: u64,
    pub total_call_volume: u64,
    pub total_put_volume: u64,
    /// Put/call open-interest ratio
    pub oi_pcr: Option<f64>,
    /// Put/call volume ratio
    pub volume_pcr: Option<f64>,
}

impl VolumeMetrics {
    pub fn from_rows(rows: &[StrikeRow]) -> Self {
        let mut m = Self::default();
        for row in rows {
            if let Some(call) = &row.call {
                m.total_call_oi += call.oi;
                m.total_call_volume += call.volume;
            }
            if let Some(put) = &row.put {
                m.total_put_oi += put.oi;
                m.total_put_volume += put.volume;
            }
        }
        m.oi_pcr = ratio(m.total_put_oi, m.total_call_oi);
        m.volume_pcr = ratio(m.total_put_volume, m.total_call_volume);
        m
    }
}

/// Total option-writer payout if the underlying settles at `settle`
pub fn writer_pain(rows: &[StrikeRow], settle: f64) -> f64 {
    rows.iter()
        .map(|row| {
            let call_loss = (settle - row.strike).max(0.0) * row.call_oi() as f64;
            let put_loss = (row.strike - settle).max(0.0) * row.put_oi() as f64;
            call_loss + put_loss
        })
        .sum()
}

/// Settlement strike minimising total writer payout.
///
/// Candidates are the chain's strikes; on equal pain the lowest strike wins.
pub fn max_pain_strike(rows: &[StrikeRow]) -> Option<f64> {
    let mut best: Option<(f64, f64)> = None;
    for row in rows {
        let pain = writer_pain(rows, row.strike);
        let better = match best {
            None => true,
            Some((best_strike, best_pain)) => {
                pain < best_pain || (pain == best_pain && row.strike < best_strike)
            }
        };
        if better {
            best = Some((row.strike, pain));
        }
    }
    best.map(|(strike, _)| strike)
}

/// Reference volatility for the chain: mean of the ATM call and put implied
/// volatilities, or `fallback` when neither side converges
pub fn atm_implied_volatility(
    chain: &ChainSnapshot,
    pricer: &BlackScholes,
    time: f64,
    fallback: f64,
) -> Estimate {
    let spot = chain.spot();
    let Some(row) = atm_row(chain) else {
        return Estimate::Fallback(fallback);
    };

    let ivs: Vec<f64> = [OptionType::Call, OptionType::Put]
        .into_iter()
        .filter_map(|side| {
            let price = row.side(side)?.traded_price()?;
            pricer.implied_volatility(price, spot, row.strike, time, side)
        })
        .filter(|iv| iv.converged)
        .map(|iv| iv.value)
        .collect();

    if ivs.is_empty() {
        debug!(strike = row.strike, fallback, "no solvable ATM quotes, using fallback volatility");
        return Estimate::Fallback(fallback);
    }
    Estimate::Market(ivs.iter().sum::<f64>() / ivs.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Expiry, Quote, Underlying};

    fn oi_row(strike: f64, call_oi: u64, put_oi: u64) -> StrikeRow {
        StrikeRow::new(
            strike,
            Some(Quote::new(10.0, call_oi, call_oi / 2)),
            Some(Quote::new(10.0, put_oi, put_oi / 2)),
        )
    }

    fn chain(spot: f64, rows: Vec<StrikeRow>) -> ChainSnapshot {
        ChainSnapshot::new(Underlying::new("NIFTY", spot), Expiry::new("x", 0), rows).unwrap()
    }

    #[test]
    fn test_max_pain_reference_chain() {
        let rows = vec![
            oi_row(17900.0, 0, 500),
            oi_row(18000.0, 300, 300),
            oi_row(18100.0, 500, 0),
        ];
        assert!((writer_pain(&rows, 17900.0) - 30000.0).abs() < 1e-9);
        assert_eq!(writer_pain(&rows, 18000.0), 0.0);
        assert_eq!(max_pain_strike(&rows), Some(18000.0));
    }

    #[test]
    fn test_max_pain_tie_takes_lowest() {
        let rows = vec![oi_row(100.0, 0, 0), oi_row(110.0, 0, 0)];
        assert_eq!(max_pain_strike(&rows), Some(100.0));
        assert_eq!(max_pain_strike(&[]), None);
    }

    #[test]
    fn test_put_call_ratio() {
        let rows = vec![oi_row(100.0, 200, 300), oi_row(110.0, 200, 100)];
        assert_eq!(put_call_ratio(&rows), Some(1.0));

        let no_calls = vec![oi_row(100.0, 0, 300)];
        assert_eq!(put_call_ratio(&no_calls), None);

        let missing_side = vec![StrikeRow::new(100.0, None, Some(Quote::new(1.0, 50, 0)))];
        assert_eq!(put_call_ratio(&missing_side), None);
    }

    #[test]
    fn test_volume_metrics() {
        let rows = vec![oi_row(100.0, 200, 400), oi_row(110.0, 600, 400)];
        let m = VolumeMetrics::from_rows(&rows);
        assert_eq!(m.total_call_oi, 800);
        assert_eq!(m.total_put_oi, 800);
        assert_eq!(m.total_call_volume, 400);
        assert_eq!(m.oi_pcr, Some(1.0));
        assert_eq!(m.volume_pcr, Some(1.0));

        assert_eq!(VolumeMetrics::from_rows(&[]).volume_pcr, None);
    }

    #[test]
    fn test_atm_strike() {
        let c = chain(18040.0, vec![oi_row(17900.0, 1, 1), oi_row(18000.0, 1, 1), oi_row(18100.0, 1, 1)]);
        assert_eq!(atm_strike(&c), Some(18000.0));

        // Equidistant: first (lower) strike
        let c = chain(18050.0, vec![oi_row(18000.0, 1, 1), oi_row(18100.0, 1, 1)]);
        assert_eq!(atm_strike(&c), Some(18000.0));

        assert_eq!(atm_strike(&chain(18000.0, vec![])), None);
    }

    #[test]
    fn test_atm_implied_volatility() {
        let pricer = BlackScholes::new(0.065);
        let t = 30.0 / 365.0;
        let call = pricer.call_price(18000.0, 18000.0, 0.18, t).unwrap();
        let put = pricer.put_price(18000.0, 18000.0, 0.22, t).unwrap();

        let rows = vec![StrikeRow::new(
            18000.0,
            Some(Quote::new(call, 100, 10)),
            Some(Quote::new(put, 100, 10)),
        )];
        let iv = atm_implied_volatility(&chain(18000.0, rows), &pricer, t, 0.3);
        assert!(!iv.is_fallback());
        assert!((iv.value() - 0.20).abs() < 1e-3);

        let untraded = vec![StrikeRow::new(18000.0, Some(Quote::new(0.0, 0, 0)), None)];
        let iv = atm_implied_volatility(&chain(18000.0, untraded), &pricer, t, 0.3);
        assert_eq!(iv, Estimate::Fallback(0.3));
    }

    #[test]
    fn test_atm_iv_skips_unconverged_side() {
        let pricer = BlackScholes::new(0.065);
        let t = 30.0 / 365.0;
        let put = pricer.put_price(18000.0, 18000.0, 0.22, t).unwrap();

        // A call quoted above spot has no volatility that reaches it
        let rows = vec![StrikeRow::new(
            18000.0,
            Some(Quote::new(20000.0, 100, 10)),
            Some(Quote::new(put, 100, 10)),
        )];
        let iv = atm_implied_volatility(&chain(18000.0, rows), &pricer, t, 0.3);
        assert!(!iv.is_fallback());
        assert!((iv.value() - 0.22).abs() < 1e-3);

        let rows = vec![StrikeRow::new(18000.0, Some(Quote::new(20000.0, 100, 10)), None)];
        let iv = atm_implied_volatility(&chain(18000.0, rows), &pricer, t, 0.3);
        assert_eq!(iv, Estimate::Fallback(0.3));
    }
}
