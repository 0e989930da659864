//! Put-call parity deviation
//!
//! For European options C - P = S - K·e^(-rT). A persistent gap between the
//! quoted C - P and that value points at stale quotes, borrow costs or an
//! arbitrage window.

use serde::{Deserialize, Serialize};

use crate::core::StrikeRow;

/// |theoretical| below this reports a 0% deviation
pub const MIN_PARITY_BASE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParityDeviation {
    pub strike: f64,
    /// S - K·e^(-rT)
    pub theoretical: f64,
    /// Quoted C - P
    pub actual: f64,
    /// actual - theoretical
    pub deviation: f64,
    /// deviation / |theoretical| · 100, or 0 near the zero crossing
    pub deviation_pct: f64,
}

/// Parity deviation from call and put prices
pub fn parity_deviation(
    call_price: f64,
    put_price: f64,
    spot: f64,
    strike: f64,
    rate: f64,
    time: f64,
) -> Option<ParityDeviation> {
    let inputs = [call_price, put_price, spot, strike, rate, time];
    if inputs.iter().any(|x| !x.is_finite()) {
        return None;
    }

    let theoretical = spot - strike * (-rate * time.max(0.0)).exp();
    let actual = call_price - put_price;
    let deviation = actual - theoretical;
    let deviation_pct = if theoretical.abs() >= MIN_PARITY_BASE {
        deviation / theoretical.abs() * 100.0
    } else {
        0.0
    };

    Some(ParityDeviation {
        strike,
        theoretical,
        actual,
        deviation,
        deviation_pct,
    })
}

/// Parity deviation for a row; `None` unless both sides have traded
pub fn row_parity(row: &StrikeRow, spot: f64, rate: f64, time: f64) -> Option<ParityDeviation> {
    let call = row.call.as_ref()?.traded_price()?;
    let put = row.put.as_ref()?.traded_price()?;
    parity_deviation(call, put, spot, row.strike, rate, time)
}
