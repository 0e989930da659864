//! Trading signals
//!
//! - Opportunity ranking across the chain
//! - Price-difference signal and combined recommendation per option

pub mod opportunity;
pub mod recommendation;

pub use opportunity::*;
pub use recommendation::*;

use serde::{Deserialize, Serialize};

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Hold => "HOLD",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_display_pads() {
        assert_eq!(Action::Buy.to_string(), "BUY");
        assert_eq!(format!("{:<4}|", Action::Buy), "BUY |");
        assert_eq!(format!("{:>5}", Action::Sell), " SELL");
    }
}
