//! Option side definitions
//!
//! Call/put side of a strike plus moneyness classification, intrinsic value
//! and time value.

use serde::{Deserialize, Serialize};

/// Option type (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Payoff direction: +1 for call, -1 for put
    pub fn phi(&self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    /// Intrinsic value at given spot
    pub fn intrinsic(&self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }

    /// Exchange suffix used by Indian brokers ("CE" / "PE")
    pub fn exchange_code(&self) -> &'static str {
        match self {
            OptionType::Call => "CE",
            OptionType::Put => "PE",
        }
    }

    /// Parse "CE"/"PE"/"call"/"put" (case-insensitive)
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "CE" | "CALL" | "C" => Some(OptionType::Call),
            "PE" | "PUT" | "P" => Some(OptionType::Put),
            _ => None,
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

/// Moneyness status of one side of a strike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Moneyness {
    #[serde(rename = "ITM")]
    InTheMoney,
    #[serde(rename = "ATM")]
    AtTheMoney,
    #[serde(rename = "OTM")]
    OutOfTheMoney,
}

impl Moneyness {
    /// Classify a side against spot.
    ///
    /// `atm_band` is a fraction of spot: strikes with
    /// `|strike - spot| < spot * atm_band` count as at-the-money.
    pub fn classify(option_type: OptionType, spot: f64, strike: f64, atm_band: f64) -> Self {
        if (strike - spot).abs() < spot * atm_band {
            return Moneyness::AtTheMoney;
        }
        let itm = match option_type {
            OptionType::Call => spot > strike,
            OptionType::Put => spot < strike,
        };
        if itm {
            Moneyness::InTheMoney
        } else {
            Moneyness::OutOfTheMoney
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Moneyness::InTheMoney => "ITM",
            Moneyness::AtTheMoney => "ATM",
            Moneyness::OutOfTheMoney => "OTM",
        }
    }
}

/// Moneyness ratio S/K used by the model blender
pub fn moneyness_ratio(spot: f64, strike: f64) -> f64 {
    spot / strike
}

/// Time value: premium above intrinsic, floored at zero
pub fn time_value(option_type: OptionType, premium: f64, spot: f64, strike: f64) -> f64 {
    (premium - option_type.intrinsic(spot, strike)).max(0.0)
}
