//! Option chain snapshot
//!
//! Market data for one expiry: the underlying reference plus strike rows, each
//! carrying an optional call and an optional put quote.

use serde::{Deserialize, Serialize};

use super::error::{AnalyticsError, AnalyticsResult};
use super::expiry::Expiry;
use super::option::OptionType;

/// One side (call or put) of one strike
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Last traded price (0 when the contract has not traded)
    pub ltp: f64,
    /// Open interest
    #[serde(default)]
    pub oi: u64,
    /// Open-interest change over the period
    #[serde(default)]
    pub oi_change: i64,
    /// Traded volume
    #[serde(default)]
    pub volume: u64,
    /// Best bid
    #[serde(default)]
    pub bid: Option<f64>,
    /// Best ask
    #[serde(default)]
    pub ask: Option<f64>,
    /// Absolute LTP change
    #[serde(default)]
    pub ltp_change: Option<f64>,
    /// Exchange symbol
    #[serde(default)]
    pub symbol: Option<String>,
}

impl Quote {
    pub fn new(ltp: f64, oi: u64, volume: u64) -> Self {
        Self {
            ltp,
            oi,
            volume,
            ..Default::default()
        }
    }

    pub fn with_oi_change(mut self, oi_change: i64) -> Self {
        self.oi_change = oi_change;
        self
    }

    pub fn with_bid_ask(mut self, bid: f64, ask: f64) -> Self {
        self.bid = Some(bid);
        self.ask = Some(ask);
        self
    }

    /// Last traded price if the contract has actually traded
    pub fn traded_price(&self) -> Option<f64> {
        (self.ltp.is_finite() && self.ltp > 0.0).then_some(self.ltp)
    }

    /// Mid price from bid/ask
    pub fn mid(&self) -> Option<f64> {
        match (self.bid, self.ask) {
            (Some(b), Some(a)) if b > 0.0 && a >= b => Some((b + a) / 2.0),
            _ => None,
        }
    }

    /// Bid-ask spread
    pub fn spread(&self) -> Option<f64> {
        match (self.bid, self.ask) {
            (Some(b), Some(a)) => Some(a - b),
            _ => None,
        }
    }

    /// OI change as a percentage of the previous period's OI
    pub fn oi_change_pct(&self) -> Option<f64> {
        let previous = self.oi as i64 - self.oi_change;
        (previous > 0).then(|| self.oi_change as f64 / previous as f64 * 100.0)
    }
}

/// Strike price with optional call and put quotes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikeRow {
    pub strike: f64,
    #[serde(default)]
    pub call: Option<Quote>,
    #[serde(default)]
    pub put: Option<Quote>,
}

impl StrikeRow {
    pub fn new(strike: f64, call: Option<Quote>, put: Option<Quote>) -> Self {
        Self { strike, call, put }
    }

    /// Quote for one side
    pub fn side(&self, option_type: OptionType) -> Option<&Quote> {
        match option_type {
            OptionType::Call => self.call.as_ref(),
            OptionType::Put => self.put.as_ref(),
        }
    }

    pub fn call_oi(&self) -> u64 {
        self.call.as_ref().map(|q| q.oi).unwrap_or(0)
    }

    pub fn put_oi(&self) -> u64 {
        self.put.as_ref().map(|q| q.oi).unwrap_or(0)
    }
}

/// Underlying spot reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Underlying {
    pub symbol: String,
    /// Last traded price
    pub ltp: f64,
    /// Absolute change
    #[serde(default)]
    pub ltp_change: f64,
    /// Percent change
    #[serde(default)]
    pub ltp_change_pct: f64,
}

impl Underlying {
    pub fn new(symbol: impl Into<String>, ltp: f64) -> Self {
        Self {
            symbol: symbol.into(),
            ltp,
            ..Default::default()
        }
    }
}

/// Serialized form of a snapshot, validated into [`ChainSnapshot`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSnapshotData {
    pub underlying: Underlying,
    pub expiry: Expiry,
    pub rows: Vec<StrikeRow>,
}

/// One consistent chain fetch: rows sorted ascending, strikes unique and positive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ChainSnapshotData", into = "ChainSnapshotData")]
pub struct ChainSnapshot {
    pub underlying: Underlying,
    pub expiry: Expiry,
    rows: Vec<StrikeRow>,
}

impl ChainSnapshot {
    /// Validate and sort rows
    pub fn new(
        underlying: Underlying,
        expiry: Expiry,
        mut rows: Vec<StrikeRow>,
    ) -> AnalyticsResult<Self> {
        if let Some(bad) = rows.iter().find(|r| !(r.strike.is_finite() && r.strike > 0.0)) {
            return Err(AnalyticsError::invalid_input(format!(
                "strike must be positive, got {}",
                bad.strike
            )));
        }

        rows.sort_by(|a, b| a.strike.total_cmp(&b.strike));

        if let Some(w) = rows.windows(2).find(|w| w[0].strike == w[1].strike) {
            return Err(AnalyticsError::invalid_input(format!(
                "duplicate strike {}",
                w[0].strike
            )));
        }

        Ok(Self {
            underlying,
            expiry,
            rows,
        })
    }

    /// Rows, ascending by strike
    pub fn rows(&self) -> &[StrikeRow] {
        &self.rows
    }

    pub fn spot(&self) -> f64 {
        self.underlying.ltp
    }

    pub fn strikes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.strike).collect()
    }

    /// Row at an exact strike
    pub fn row_at(&self, strike: f64) -> Option<&StrikeRow> {
        self.rows
            .binary_search_by(|r| r.strike.total_cmp(&strike))
            .ok()
            .map(|i| &self.rows[i])
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

impl TryFrom<ChainSnapshotData> for ChainSnapshot {
    type Error = AnalyticsError;

    fn try_from(data: ChainSnapshotData) -> Result<Self, Self::Error> {
        ChainSnapshot::new(data.underlying, data.expiry, data.rows)
    }
}

impl From<ChainSnapshot> for ChainSnapshotData {
    fn from(snapshot: ChainSnapshot) -> Self {
        Self {
            underlying: snapshot.underlying,
            expiry: snapshot.expiry,
            rows: snapshot.rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expiry() -> Expiry {
        Expiry::new("27-03-2025", 1_743_069_600)
    }

    #[test]
    fn test_rows_sorted_on_construction() {
        let rows = vec![
            StrikeRow::new(18100.0, Some(Quote::new(80.0, 500, 10)), None),
            StrikeRow::new(17900.0, None, Some(Quote::new(60.0, 400, 10))),
            StrikeRow::new(18000.0, None, None),
        ];
        let chain = ChainSnapshot::new(Underlying::new("NIFTY", 18010.0), expiry(), rows).unwrap();

        assert_eq!(chain.strikes(), vec![17900.0, 18000.0, 18100.0]);
        assert_eq!(chain.row_at(18100.0).unwrap().call_oi(), 500);
        assert!(chain.row_at(18050.0).is_none());
    }

    #[test]
    fn test_duplicate_and_nonpositive_strikes_rejected() {
        let dup = vec![
            StrikeRow::new(100.0, None, None),
            StrikeRow::new(100.0, None, None),
        ];
        assert!(ChainSnapshot::new(Underlying::new("X", 100.0), expiry(), dup).is_err());

        let zero = vec![StrikeRow::new(0.0, None, None)];
        assert!(ChainSnapshot::new(Underlying::new("X", 100.0), expiry(), zero).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{
            "underlying": {"symbol": "NIFTY", "ltp": 18000.0},
            "expiry": {"label": "27-03-2025", "value": 1743069600},
            "rows": [
                {"strike": 18100.0, "call": {"ltp": 90.0, "oi": 10}},
                {"strike": 17900.0, "put": {"ltp": 70.0, "oi": 20}}
            ]
        }"#;
        let chain: ChainSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(chain.rows()[0].strike, 17900.0);

        let bad = json.replace("17900.0", "18100.0");
        assert!(serde_json::from_str::<ChainSnapshot>(&bad).is_err());
    }

    #[test]
    fn test_quote_helpers() {
        let q = Quote::new(100.0, 1200, 50)
            .with_oi_change(200)
            .with_bid_ask(99.0, 101.0);

        assert_eq!(q.mid(), Some(100.0));
        assert_eq!(q.spread(), Some(2.0));
        // previous OI = 1000, change 200 -> +20%
        assert!((q.oi_change_pct().unwrap() - 20.0).abs() < 1e-12);

        assert_eq!(Quote::new(0.0, 0, 0).traded_price(), None);
        assert_eq!(Quote::new(0.0, 0, 0).oi_change_pct(), None);
    }
}
