//! Option Greeks
//!
//! First and second order sensitivities for options.

use serde::{Deserialize, Serialize};

/// Option Greeks (sensitivities)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// Delta: dV/dS (sensitivity to spot)
    pub delta: f64,
    /// Gamma: d²V/dS² (sensitivity of delta to spot)
    pub gamma: f64,
    /// Theta: dV/dt per calendar day
    pub theta: f64,
    /// Vega: dV/dσ per 1 vol point
    pub vega: f64,
    /// Rho: dV/dr per 1 rate point
    pub rho: f64,
}

impl Greeks {
    pub fn new(delta: f64, gamma: f64, theta: f64, vega: f64, rho: f64) -> Self {
        Self {
            delta,
            gamma,
            theta,
            vega,
            rho,
        }
    }

    /// Scale Greeks by a factor (e.g., lot size)
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            delta: self.delta * factor,
            gamma: self.gamma * factor,
            theta: self.theta * factor,
            vega: self.vega * factor,
            rho: self.rho * factor,
        }
    }

    pub fn is_finite(&self) -> bool {
        [self.delta, self.gamma, self.theta, self.vega, self.rho]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Component-wise difference `self - base`, used for scenario deltas
    pub fn diff(&self, base: &Greeks) -> Self {
        Self {
            delta: self.delta - base.delta,
            gamma: self.gamma - base.gamma,
            theta: self.theta - base.theta,
            vega: self.vega - base.vega,
            rho: self.rho - base.rho,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_and_diff() {
        let g = Greeks::new(0.5, 0.001, -2.0, 10.0, 3.0);
        let lot = g.scale(50.0);
        assert_eq!(lot.delta, 25.0);
        assert_eq!(lot.theta, -100.0);

        let d = lot.diff(&g);
        assert!((d.vega - 490.0).abs() < 1e-12);
    }
}
