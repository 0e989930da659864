//! End-to-end chain analysis
//!
//! - [`ChainAnalyzer`]: pure snapshot → [`ChainAnalysis`] composition
//! - [`AnalyticsState`]: latest inputs plus the published bundle

pub mod analyzer;
pub mod state;

pub use analyzer::*;
pub use state::*;
