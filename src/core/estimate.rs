//! Tagged estimates
//!
//! A volatility that came from market data and a hard-coded fallback can hold
//! the same number. `Estimate` keeps the two apart so downstream
//! classification can tell "we don't know" from "the market says so".

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "lowercase")]
pub enum Estimate {
    /// Derived from market data
    Market(f64),
    /// Documented default used because inputs were missing or too short
    Fallback(f64),
}

impl Estimate {
    pub fn value(&self) -> f64 {
        match self {
            Estimate::Market(v) | Estimate::Fallback(v) => *v,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Estimate::Fallback(_))
    }

    /// The value only when it is market-derived
    pub fn market(&self) -> Option<f64> {
        match self {
            Estimate::Market(v) => Some(*v),
            Estimate::Fallback(_) => None,
        }
    }
}
