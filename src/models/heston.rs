//! Heston Stochastic Volatility Approximation
//!
//! The Heston model assumes variance follows a mean-reverting square-root process:
//!
//! dS = r * S * dt + √v * S * dW_S
//! dv = κ(θ - v) * dt + σ_v * √v * dW_v
//!
//! where:
//! - S: spot price
//! - v: instantaneous variance
//! - κ: mean reversion speed
//! - θ: long-term variance
//! - σ_v: volatility of volatility (vol-of-vol)
//! - ρ: correlation between spot and variance Brownians
//!
//! This is NOT a characteristic-function Heston price. The expected variance
//! path is averaged over the option's life,
//!
//! v̄(T) = v0 · (1 - e^(-κT)) / (κT) + θ · (1 - (1 - e^(-κT)) / (κT))
//!
//! and the option is priced by Black-Scholes at √v̄. It captures term
//! structure (short options see v0, long ones drift toward θ) but not the
//! smile that σ_v and ρ would produce.

use serde::{Deserialize, Serialize};

use super::black_scholes::BlackScholes;
use crate::core::{AnalyticsError, AnalyticsResult, OptionType};

/// Below this κT the averaging factor is replaced by its limit of 1
const SMALL_KAPPA_T: f64 = 1e-10;

/// Heston model parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HestonParams {
    /// Mean reversion speed (κ)
    pub kappa: f64,
    /// Long-term variance (θ)
    pub theta: f64,
    /// Volatility of volatility (σ_v)
    pub sigma: f64,
    /// Correlation between spot and variance (ρ)
    pub rho: f64,
    /// Initial variance (v0)
    pub v0: f64,
}

impl HestonParams {
    pub fn new(v0: f64, kappa: f64, theta: f64, sigma: f64, rho: f64) -> Self {
        Self {
            kappa,
            theta,
            sigma,
            rho,
            v0,
        }
    }

    /// Index-option defaults: 20% long-run vol, slightly elevated spot variance
    pub fn index_defaults() -> Self {
        Self {
            kappa: 2.0,
            theta: 0.04,
            sigma: 0.3,
            rho: -0.7,
            v0: 0.05,
        }
    }

    /// Check Feller condition: 2κθ > σ² (ensures variance stays positive)
    pub fn feller_condition(&self) -> bool {
        2.0 * self.kappa * self.theta > self.sigma * self.sigma
    }

    pub fn validate(&self) -> AnalyticsResult<()> {
        if !(self.v0.is_finite() && self.v0 > 0.0) {
            return Err(AnalyticsError::invalid_input("v0 must be positive"));
        }
        if !(self.kappa.is_finite() && self.kappa > 0.0) {
            return Err(AnalyticsError::invalid_input("kappa must be positive"));
        }
        if !(self.theta.is_finite() && self.theta > 0.0) {
            return Err(AnalyticsError::invalid_input("theta must be positive"));
        }
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(AnalyticsError::invalid_input("sigma must be positive"));
        }
        if !(-1.0..=1.0).contains(&self.rho) {
            return Err(AnalyticsError::invalid_input("rho must be in [-1, 1]"));
        }
        Ok(())
    }

    pub fn long_term_vol(&self) -> f64 {
        self.theta.sqrt()
    }

    pub fn initial_vol(&self) -> f64 {
        self.v0.sqrt()
    }

    /// Expected variance averaged over [0, T]
    pub fn effective_variance(&self, time: f64) -> f64 {
        let kt = self.kappa * time.max(0.0);
        let weight = if kt < SMALL_KAPPA_T {
            1.0
        } else {
            (1.0 - (-kt).exp()) / kt
        };
        self.v0 * weight + self.theta * (1.0 - weight)
    }

    /// Volatility equivalent of [`effective_variance`](Self::effective_variance)
    pub fn effective_vol(&self, time: f64) -> f64 {
        self.effective_variance(time).max(0.0).sqrt()
    }
}

impl Default for HestonParams {
    fn default() -> Self {
        Self::index_defaults()
    }
}

/// Effective-volatility Heston pricer
#[derive(Debug, Clone, Copy)]
pub struct HestonModel {
    params: HestonParams,
    pricer: BlackScholes,
}

impl HestonModel {
    pub fn new(params: HestonParams, pricer: BlackScholes) -> Self {
        Self { params, pricer }
    }

    pub fn params(&self) -> &HestonParams {
        &self.params
    }

    /// Price a European option at the effective volatility for its tenor
    pub fn price(&self, spot: f64, strike: f64, time: f64, option_type: OptionType) -> Option<f64> {
        let vol = self.params.effective_vol(time);
        self.pricer.price(spot, strike, vol, time, option_type)
    }
}
