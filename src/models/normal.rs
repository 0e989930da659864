//! Standard normal distribution
//!
//! Closed-form pricing leans on the normal CDF thousands of times per chain
//! refresh. The Abramowitz-Stegun 7.1.26 rational approximation (absolute
//! error below 1.5e-7) is exact enough for premiums quoted to the paisa.
//! Negative arguments are reflected as `1 - N(-x)`, so `N(x) + N(-x) == 1`
//! holds exactly, which put-call parity depends on.

use std::f64::consts::{PI, SQRT_2};

const A1: f64 = 0.254829592;
const A2: f64 = -0.284496736;
const A3: f64 = 1.421413741;
const A4: f64 = -1.453152027;
const A5: f64 = 1.061405429;
const P: f64 = 0.3275911;

/// Beyond this the CDF is 0 or 1 to double precision
const SATURATION: f64 = 8.0;

/// Standard normal CDF
pub fn norm_cdf(x: f64) -> f64 {
    if x > SATURATION {
        return 1.0;
    }
    if x < -SATURATION {
        return 0.0;
    }

    if x < 0.0 {
        return 1.0 - norm_cdf(-x);
    }

    let z = x / SQRT_2;
    let t = 1.0 / (1.0 + P * z);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    let erf = 1.0 - poly * (-z * z).exp();

    0.5 * (1.0 + erf)
}

/// Standard normal PDF
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}
