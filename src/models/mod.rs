//! Pricing Models
//!
//! Implements:
//! - Normal distribution kernel
//! - Black-Scholes (closed-form pricing, Greeks, IV bisection)
//! - Heston effective-volatility approximation
//! - Hybrid blending of the two with a correction hook

pub mod normal;
pub mod black_scholes;
pub mod heston;
pub mod blend;

pub use normal::*;
pub use black_scholes::{BlackScholes, ImpliedVol, DEEP_MONEYNESS};
pub use heston::*;
pub use blend::*;
