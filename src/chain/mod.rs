//! Chain-level analytics
//!
//! - ATM detection, OI/volume totals, put-call ratio, max pain
//! - Support/resistance from OI walls and volatility bands
//! - Put-call parity deviation
//! - Sentiment summary

pub mod metrics;
pub mod levels;
pub mod parity;
pub mod sentiment;

pub use metrics::*;
pub use levels::*;
pub use parity::*;
pub use sentiment::*;
