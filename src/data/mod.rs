//! Broker data ingestion
//!
//! Handles:
//! - Fyers option-chain payloads
//! - Fyers daily history candles

pub mod fyers;

pub use fyers::*;
