//! Core data types for chain analytics
//!
//! Defines fundamental types:
//! - OptionType / Moneyness: side of a strike and its ITM/ATM/OTM status
//! - Quote / StrikeRow / ChainSnapshot: one validated chain fetch
//! - Expiry: Unix-seconds expiry and time-to-expiry
//! - Greeks: price sensitivities
//! - Estimate: market-derived vs fallback values

pub mod option;
pub mod quote;
pub mod expiry;
pub mod estimate;
pub mod greeks;
pub mod error;

pub use option::*;
pub use quote::*;
pub use expiry::*;
pub use estimate::*;
pub use greeks::*;
pub use error::*;
