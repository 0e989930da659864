//! Fyers option-chain and history payloads
//!
//! Converts the broker's JSON into validated crate types. This is the only
//! place raw broker data is interpreted:
//! - the row with `strike_price == -1` is the underlying
//! - `option_type` "CE"/"PE" selects the side of a strike
//! - expiry timestamps may arrive as seconds or milliseconds, as numbers or
//!   strings, and leave here as Unix seconds
//! - history candles are sorted chronologically before closes are taken
//!
//! Fetching (auth, HTTP, retries) is left to the caller.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::{
    AnalyticsError, AnalyticsResult, ChainSnapshot, Expiry, OptionType, Quote, StrikeRow, Underlying,
};
use crate::volatility::CloseSeries;

/// Strike value marking the underlying row
const UNDERLYING_STRIKE: f64 = -1.0;

/// Parsed option-chain response
#[derive(Debug, Clone)]
pub struct FyersChain {
    /// Snapshot for the selected expiry
    pub snapshot: ChainSnapshot,
    /// All expiries the broker listed
    pub expiries: Vec<Expiry>,
    /// India VIX last price, when included
    pub volatility_index: Option<f64>,
}

/// Parse an option-chain response.
///
/// `selected` is the expiry the chain was requested for; when `None` the
/// first listed expiry is used.
pub fn parse_option_chain(json: &str, selected: Option<&Expiry>) -> AnalyticsResult<FyersChain> {
    let response: FyersResponse<FyersChainData> = serde_json::from_str(json)?;
    let data = response.into_data()?;

    let expiries = data
        .expiry_data
        .iter()
        .map(|e| Ok(Expiry::from_timestamp(e.date.clone(), e.expiry.value()?)))
        .collect::<AnalyticsResult<Vec<Expiry>>>()?;

    let expiry = match selected {
        Some(e) => e.clone(),
        None => expiries
            .first()
            .cloned()
            .ok_or_else(|| AnalyticsError::data("option chain lists no expiries"))?,
    };

    let mut underlying: Option<Underlying> = None;
    let mut rows: Vec<StrikeRow> = Vec::new();

    for item in data.options_chain {
        if item.strike_price == UNDERLYING_STRIKE {
            underlying = Some(Underlying {
                symbol: item.symbol,
                ltp: item.ltp,
                ltp_change: item.ltpch.unwrap_or(0.0),
                ltp_change_pct: item.ltpchp.unwrap_or(0.0),
            });
            continue;
        }

        let Some(side) = OptionType::from_code(&item.option_type) else {
            warn!(
                symbol = %item.symbol,
                option_type = %item.option_type,
                "skipping chain row with unknown option type"
            );
            continue;
        };

        let strike = item.strike_price;
        let quote = item.into_quote();

        let idx = match rows.iter().position(|r| r.strike == strike) {
            Some(i) => i,
            None => {
                rows.push(StrikeRow::new(strike, None, None));
                rows.len() - 1
            }
        };
        let slot = match side {
            OptionType::Call => &mut rows[idx].call,
            OptionType::Put => &mut rows[idx].put,
        };
        if slot.is_some() {
            return Err(AnalyticsError::invalid_input(format!(
                "duplicate {} quote at strike {}",
                side.exchange_code(),
                strike
            )));
        }
        *slot = Some(quote);
    }

    let underlying = underlying.ok_or_else(|| AnalyticsError::data("option chain has no underlying row"))?;
    let snapshot = ChainSnapshot::new(underlying, expiry, rows)?;
    debug!(
        symbol = %snapshot.underlying.symbol,
        strikes = snapshot.len(),
        expiry = %snapshot.expiry.label,
        "parsed option chain"
    );

    Ok(FyersChain {
        snapshot,
        expiries,
        volatility_index: data.india_vix.map(|v| v.ltp),
    })
}

/// Parse a history response into chronological daily closes
pub fn parse_history(json: &str) -> AnalyticsResult<CloseSeries> {
    let response: FyersHistoryResponse = serde_json::from_str(json)?;
    if response.s != "ok" {
        return Err(AnalyticsError::data(
            response.message.unwrap_or_else(|| "history request failed".into()),
        ));
    }

    let mut candles: Vec<(i64, f64)> = Vec::with_capacity(response.candles.len());
    for candle in &response.candles {
        // [timestamp, open, high, low, close, volume]
        match (candle.first(), candle.get(4)) {
            (Some(ts), Some(close)) => candles.push((*ts as i64, *close)),
            _ => warn!(len = candle.len(), "skipping malformed candle"),
        }
    }
    candles.sort_by_key(|(ts, _)| *ts);

    Ok(CloseSeries::from_oldest_first(
        candles.into_iter().map(|(_, close)| close).collect(),
    ))
}

// Fyers API response structures

#[derive(Debug, Deserialize)]
struct FyersResponse<T> {
    s: String,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

impl<T> FyersResponse<T> {
    fn into_data(self) -> AnalyticsResult<T> {
        if self.s != "ok" {
            return Err(AnalyticsError::data(
                self.message.unwrap_or_else(|| "option chain request failed".into()),
            ));
        }
        self.data
            .ok_or_else(|| AnalyticsError::data("response has no data"))
    }
}

#[derive(Debug, Deserialize)]
struct FyersChainData {
    #[serde(rename = "optionsChain")]
    options_chain: Vec<FyersChainItem>,
    #[serde(rename = "expiryData", default)]
    expiry_data: Vec<FyersExpiry>,
    #[serde(rename = "indiavixData", default)]
    india_vix: Option<FyersLtp>,
}

#[derive(Debug, Deserialize)]
struct FyersChainItem {
    #[serde(default)]
    symbol: String,
    strike_price: f64,
    #[serde(default)]
    option_type: String,
    #[serde(default)]
    ltp: f64,
    #[serde(default)]
    ltpch: Option<f64>,
    #[serde(default)]
    ltpchp: Option<f64>,
    #[serde(default)]
    oi: f64,
    #[serde(default)]
    oich: f64,
    #[serde(default)]
    volume: f64,
    #[serde(default)]
    bid: Option<f64>,
    #[serde(default)]
    ask: Option<f64>,
}

impl FyersChainItem {
    fn into_quote(self) -> Quote {
        Quote {
            ltp: self.ltp,
            oi: self.oi.max(0.0) as u64,
            oi_change: self.oich as i64,
            volume: self.volume.max(0.0) as u64,
            bid: self.bid,
            ask: self.ask,
            ltp_change: self.ltpch,
            symbol: (!self.symbol.is_empty()).then_some(self.symbol),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FyersExpiry {
    date: String,
    expiry: RawTimestamp,
}

#[derive(Debug, Deserialize)]
struct FyersLtp {
    ltp: f64,
}

/// Timestamp sent either as a number or a numeric string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Int(i64),
    Text(String),
}

impl RawTimestamp {
    fn value(&self) -> AnalyticsResult<i64> {
        match self {
            RawTimestamp::Int(v) => Ok(*v),
            RawTimestamp::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| AnalyticsError::data(format!("unparseable expiry timestamp {:?}", s))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FyersHistoryResponse {
    s: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    candles: Vec<Vec<f64>>,
}
