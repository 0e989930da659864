//! What-if analysis for a single option
//!
//! Reprices one option under spot, time and volatility shocks and reports
//! the P&L against the unshocked price:
//! - spot -10%, -5%, +5%, +10%
//! - one week of time decay (only while more than a day remains)
//! - volatility -20% / +20%, floored at 10% vol
//! - an optional custom combined shock

use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;
use crate::core::{Greeks, OptionType};
use crate::models::BlackScholes;

/// Lowest volatility a shocked scenario may use
pub const MIN_SCENARIO_VOL: f64 = 0.1;

const SPOT_SHOCKS: [(f64, &str); 4] = [
    (-10.0, "Bearish (-10%)"),
    (-5.0, "Slight Bearish (-5%)"),
    (5.0, "Slight Bullish (+5%)"),
    (10.0, "Bullish (+10%)"),
];
const VOL_SHOCKS: [(f64, &str); 2] = [
    (-20.0, "Volatility Decrease (-20%)"),
    (20.0, "Volatility Increase (+20%)"),
];
const DECAY_DAYS: f64 = 7.0;

/// Combined user-defined shock
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioShock {
    /// Spot move in percent
    pub spot_change_pct: f64,
    /// Calendar days elapsed
    pub days_elapsed: f64,
    /// Relative volatility change in percent
    pub vol_change_pct: f64,
}

impl ScenarioShock {
    pub fn is_zero(&self) -> bool {
        self.spot_change_pct == 0.0 && self.days_elapsed == 0.0 && self.vol_change_pct == 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub spot: f64,
    pub days_to_expiry: f64,
    pub volatility: f64,
    pub price: f64,
    /// price - base price
    pub pnl: f64,
    pub greeks: Greeks,
}

#[derive(Debug, Clone, Copy)]
pub struct ScenarioAnalyzer {
    pricer: BlackScholes,
    days_per_year: f64,
}

impl Default for ScenarioAnalyzer {
    fn default() -> Self {
        Self::from_config(&PricingConfig::default())
    }
}

impl ScenarioAnalyzer {
    pub fn from_config(config: &PricingConfig) -> Self {
        Self {
            pricer: BlackScholes::from_config(config),
            days_per_year: config.days_per_year,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn scenario(
        &self,
        name: &str,
        option_type: OptionType,
        spot: f64,
        strike: f64,
        days: f64,
        vol: f64,
        base_price: f64,
    ) -> Option<Scenario> {
        let time = days / self.days_per_year;
        let price = self.pricer.price(spot, strike, vol, time, option_type)?;
        let greeks = self.pricer.greeks(spot, strike, vol, time, option_type)?;
        Some(Scenario {
            name: name.to_string(),
            spot,
            days_to_expiry: days,
            volatility: vol,
            price,
            pnl: price - base_price,
            greeks,
        })
    }

    /// Run the standard scenario set plus an optional custom shock.
    ///
    /// `days_to_expiry` is rounded up to whole days with a floor of one.
    /// Returns `None` when the base case cannot be priced.
    pub fn analyze(
        &self,
        option_type: OptionType,
        spot: f64,
        strike: f64,
        days_to_expiry: f64,
        vol: f64,
        custom: Option<ScenarioShock>,
    ) -> Option<Vec<Scenario>> {
        let days = days_to_expiry.ceil().max(1.0);
        let mut base = self.scenario("Current", option_type, spot, strike, days, vol, 0.0)?;
        base.pnl = 0.0;
        let base_price = base.price;
        let mut out = vec![base];

        for (change, name) in SPOT_SHOCKS {
            let shocked = spot * (1.0 + change / 100.0);
            out.extend(self.scenario(name, option_type, shocked, strike, days, vol, base_price));
        }

        if days > 1.0 {
            let decayed = (days - DECAY_DAYS).max(1.0);
            out.extend(self.scenario("Time Decay (1 week)", option_type, spot, strike, decayed, vol, base_price));
        }

        for (change, name) in VOL_SHOCKS {
            let shocked = (vol * (1.0 + change / 100.0)).max(MIN_SCENARIO_VOL);
            out.extend(self.scenario(name, option_type, spot, strike, days, shocked, base_price));
        }

        if let Some(shock) = custom.filter(|s| !s.is_zero()) {
            let shocked_spot = spot * (1.0 + shock.spot_change_pct / 100.0);
            let shocked_days = (days - shock.days_elapsed).max(1.0);
            let shocked_vol = (vol * (1.0 + shock.vol_change_pct / 100.0)).max(MIN_SCENARIO_VOL);
            out.extend(self.scenario(
                "Custom Scenario",
                option_type,
                shocked_spot,
                strike,
                shocked_days,
                shocked_vol,
                base_price,
            ));
        }

        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_set() {
        let scenarios = ScenarioAnalyzer::default()
            .analyze(OptionType::Call, 18000.0, 18000.0, 30.0, 0.2, None)
            .unwrap();

        // base + 4 spot + decay + 2 vol
        assert_eq!(scenarios.len(), 8);
        assert_eq!(scenarios[0].name, "Current");
        assert_eq!(scenarios[0].pnl, 0.0);

        let by_name = |n: &str| scenarios.iter().find(|s| s.name == n).unwrap();
        assert!(by_name("Bullish (+10%)").pnl > 0.0);
        assert!(by_name("Bearish (-10%)").pnl < 0.0);
        assert!(by_name("Time Decay (1 week)").pnl < 0.0);
        assert_eq!(by_name("Time Decay (1 week)").days_to_expiry, 23.0);
        assert!(by_name("Volatility Increase (+20%)").pnl > 0.0);
        assert!((by_name("Volatility Decrease (-20%)").volatility - 0.16).abs() < 1e-12);
    }

    #[test]
    fn test_last_day_skips_decay_and_floors_vol() {
        let scenarios = ScenarioAnalyzer::default()
            .analyze(OptionType::Put, 100.0, 100.0, 0.4, 0.11, None)
            .unwrap();

        assert!(scenarios.iter().all(|s| s.name != "Time Decay (1 week)"));
        assert_eq!(scenarios[0].days_to_expiry, 1.0);
        let down = scenarios.iter().find(|s| s.name.starts_with("Volatility Decrease")).unwrap();
        assert_eq!(down.volatility, MIN_SCENARIO_VOL);
    }

    #[test]
    fn test_custom_shock() {
        let shock = ScenarioShock {
            spot_change_pct: 2.0,
            days_elapsed: 40.0,
            vol_change_pct: 0.0,
        };
        let scenarios = ScenarioAnalyzer::default()
            .analyze(OptionType::Call, 100.0, 100.0, 30.0, 0.25, Some(shock))
            .unwrap();

        let custom = scenarios.last().unwrap();
        assert_eq!(custom.name, "Custom Scenario");
        assert!((custom.spot - 102.0).abs() < 1e-12);
        assert_eq!(custom.days_to_expiry, 1.0);

        let none = ScenarioAnalyzer::default()
            .analyze(OptionType::Call, 100.0, 100.0, 30.0, 0.25, Some(ScenarioShock::default()))
            .unwrap();
        assert_eq!(none.len(), 8);
    }

    #[test]
    fn test_invalid_base() {
        assert!(ScenarioAnalyzer::default()
            .analyze(OptionType::Call, 100.0, 100.0, 30.0, 0.0, None)
            .is_none());
    }
}
