//! Volatility analysis
//!
//! - Historical volatility from daily closes
//! - IV/HV skew classification

pub mod historical;
pub mod skew;

pub use historical::*;
pub use skew::*;
