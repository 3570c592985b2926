// src/analytics/bs_analytic.rs
//! Analytical Black-Scholes-Merton formulas for European options and Greeks
//!
//! # Mathematical Foundation
//!
//! Under the risk-neutral measure with continuous dividend yield `q`:
//! ```text
//! dS_t = (r − q) S_t dt + σ S_t dW_t
//! ```
//!
//! ```text
//! d₁ = [ln(S/K) + (r − q + σ²/2)T] / (σ√T)
//! d₂ = d₁ − σ√T
//! C  = S e^(−qT) Φ(d₁) − K e^(−rT) Φ(d₂)
//! P  = K e^(−rT) Φ(−d₂) − S e^(−qT) Φ(−d₁)
//! ```
//!
//! Price and every Greek are read off one [`BsTerms`] value, so a price and
//! the bundle computed for the same parameters share the same `d₁`, `d₂`.

use crate::error::{validation::validate_vol_time, PricingResult};
use crate::greeks::{FirstOrderGreeks, GreekBundle, SecondOrderGreeks};
use crate::math_utils::{norm_cdf, norm_pdf};
use crate::params::{OptionParams, OptionType};
use tracing::debug;

/// Intermediate quantities shared by the price and all Greeks
#[derive(Debug, Clone, Copy)]
pub struct BsTerms {
    option_type: OptionType,
    s: f64,
    k: f64,
    t: f64,
    r: f64,
    q: f64,
    sigma: f64,
    sqrt_t: f64,
    pub d1: f64,
    pub d2: f64,
    /// e^(−qT)
    div_discount: f64,
    /// e^(−rT)
    discount: f64,
    /// φ(d₁)
    pdf_d1: f64,
}

impl BsTerms {
    /// Compute `d₁`, `d₂` and discount factors
    ///
    /// # Errors
    ///
    /// `DegenerateInput` when `σ·√T = 0`.
    pub fn new(params: &OptionParams) -> PricingResult<Self> {
        params.validate()?;
        let s = params.underlying_price();
        let k = params.strike_price();
        let t = params.time_to_expiration();
        let r = params.risk_free_rate();
        let sigma = params.volatility();
        let q = params.dividend_yield();
        validate_vol_time(sigma, t)?;

        let sqrt_t = t.sqrt();
        let vol_sqrt_t = sigma * sqrt_t;
        let d1 = ((s / k).ln() + (r - q + 0.5 * sigma * sigma) * t) / vol_sqrt_t;
        let d2 = d1 - vol_sqrt_t;

        Ok(BsTerms {
            option_type: params.option_type(),
            s,
            k,
            t,
            r,
            q,
            sigma,
            sqrt_t,
            d1,
            d2,
            div_discount: (-q * t).exp(),
            discount: (-r * t).exp(),
            pdf_d1: norm_pdf(d1),
        })
    }

    /// Option value
    pub fn price(&self) -> f64 {
        match self.option_type {
            OptionType::Call => {
                self.s * self.div_discount * norm_cdf(self.d1)
                    - self.k * self.discount * norm_cdf(self.d2)
            }
            OptionType::Put => {
                self.k * self.discount * norm_cdf(-self.d2)
                    - self.s * self.div_discount * norm_cdf(-self.d1)
            }
        }
    }

    /// Delta (∂V/∂S)
    ///
    /// ```text
    /// Δ_call = e^(−qT) Φ(d₁)      ∈ [0, 1]
    /// Δ_put  = −e^(−qT) Φ(−d₁)    ∈ [−1, 0]
    /// ```
    pub fn delta(&self) -> f64 {
        match self.option_type {
            OptionType::Call => self.div_discount * norm_cdf(self.d1),
            OptionType::Put => -self.div_discount * norm_cdf(-self.d1),
        }
    }

    /// Gamma (∂²V/∂S²), identical for calls and puts
    ///
    /// ```text
    /// Γ = e^(−qT) φ(d₁) / (S σ √T)
    /// ```
    pub fn gamma(&self) -> f64 {
        self.div_discount * self.pdf_d1 / (self.s * self.sigma * self.sqrt_t)
    }

    /// Vega (∂V/∂σ), identical for calls and puts
    ///
    /// ```text
    /// ν = S e^(−qT) φ(d₁) √T
    /// ```
    pub fn vega(&self) -> f64 {
        self.s * self.div_discount * self.pdf_d1 * self.sqrt_t
    }

    /// Theta (−∂V/∂T), value lost per year of calendar time
    ///
    /// ```text
    /// Θ_call = −S e^(−qT) φ(d₁) σ/(2√T) − r K e^(−rT) Φ(d₂) + q S e^(−qT) Φ(d₁)
    /// Θ_put  = −S e^(−qT) φ(d₁) σ/(2√T) + r K e^(−rT) Φ(−d₂) − q S e^(−qT) Φ(−d₁)
    /// ```
    pub fn theta(&self) -> f64 {
        let decay = -self.s * self.div_discount * self.pdf_d1 * self.sigma / (2.0 * self.sqrt_t);
        match self.option_type {
            OptionType::Call => {
                decay - self.r * self.k * self.discount * norm_cdf(self.d2)
                    + self.q * self.s * self.div_discount * norm_cdf(self.d1)
            }
            OptionType::Put => {
                decay + self.r * self.k * self.discount * norm_cdf(-self.d2)
                    - self.q * self.s * self.div_discount * norm_cdf(-self.d1)
            }
        }
    }

    /// Rho (∂V/∂r)
    ///
    /// ```text
    /// ρ_call = K T e^(−rT) Φ(d₂)
    /// ρ_put  = −K T e^(−rT) Φ(−d₂)
    /// ```
    pub fn rho(&self) -> f64 {
        match self.option_type {
            OptionType::Call => self.k * self.t * self.discount * norm_cdf(self.d2),
            OptionType::Put => -self.k * self.t * self.discount * norm_cdf(-self.d2),
        }
    }

    /// ∂d₁/∂T = [2(r − q)T − d₂σ√T] / (2Tσ√T)
    fn d1_dt(&self) -> f64 {
        let vol_sqrt_t = self.sigma * self.sqrt_t;
        (2.0 * (self.r - self.q) * self.t - self.d2 * vol_sqrt_t) / (2.0 * self.t * vol_sqrt_t)
    }

    /// Charm (∂Δ/∂T)
    pub fn charm(&self) -> f64 {
        let carry = match self.option_type {
            OptionType::Call => -self.q * self.div_discount * norm_cdf(self.d1),
            OptionType::Put => self.q * self.div_discount * norm_cdf(-self.d1),
        };
        carry + self.div_discount * self.pdf_d1 * self.d1_dt()
    }

    /// Speed (∂Γ/∂S) = −Γ/S · (1 + d₁/(σ√T))
    pub fn speed(&self) -> f64 {
        -self.gamma() / self.s * (1.0 + self.d1 / (self.sigma * self.sqrt_t))
    }

    /// Color (∂Γ/∂T) = Γ · (−q − 1/(2T) − d₁ ∂d₁/∂T)
    pub fn color(&self) -> f64 {
        self.gamma() * (-self.q - 0.5 / self.t - self.d1 * self.d1_dt())
    }

    /// Zomma (∂Γ/∂σ) = Γ (d₁d₂ − 1)/σ
    pub fn zomma(&self) -> f64 {
        self.gamma() * (self.d1 * self.d2 - 1.0) / self.sigma
    }

    /// Veta (∂ν/∂T) = ν · (−q + 1/(2T) − d₁ ∂d₁/∂T)
    pub fn veta(&self) -> f64 {
        self.vega() * (-self.q + 0.5 / self.t - self.d1 * self.d1_dt())
    }

    /// Volga (∂ν/∂σ) = ν d₁d₂/σ
    pub fn volga(&self) -> f64 {
        self.vega() * self.d1 * self.d2 / self.sigma
    }

    pub fn greeks(&self) -> GreekBundle {
        GreekBundle {
            first_order: FirstOrderGreeks {
                delta: self.delta(),
                gamma: self.gamma(),
                theta: self.theta(),
                vega: self.vega(),
                rho: self.rho(),
            },
            second_order: SecondOrderGreeks {
                charm: self.charm(),
                speed: self.speed(),
                color: self.color(),
                zomma: self.zomma(),
                veta: self.veta(),
                volga: self.volga(),
            },
        }
    }
}

/// Black-Scholes-Merton price of a European option
///
/// # Errors
///
/// `InvalidParameter` for an invalid parameter set, `DegenerateInput` when
/// `σ·√T = 0`. No default is substituted for a zero volatility.
pub fn bs_price(params: &OptionParams) -> PricingResult<f64> {
    let terms = BsTerms::new(params)?;
    let price = terms.price();
    debug!(
        option_type = %params.option_type(),
        d1 = terms.d1,
        d2 = terms.d2,
        price,
        "analytic price"
    );
    Ok(price)
}

/// Closed-form Greek bundle, evaluated at the same `d₁`, `d₂` as [`bs_price`]
///
/// # Errors
///
/// Same as [`bs_price`].
pub fn bs_greeks(params: &OptionParams) -> PricingResult<GreekBundle> {
    let terms = BsTerms::new(params)?;
    debug!(option_type = %params.option_type(), d1 = terms.d1, "analytic greeks");
    Ok(terms.greeks())
}

/// Flat-argument form of [`bs_price`]
pub fn black_scholes_price(
    option_type: OptionType,
    s: f64,
    k: f64,
    t: f64,
    r: f64,
    sigma: f64,
    q: f64,
) -> PricingResult<f64> {
    bs_price(&OptionParams::new(option_type, s, k, t, r, sigma, q)?)
}

/// Flat-argument form of [`bs_greeks`]
pub fn black_scholes_greeks(
    option_type: OptionType,
    s: f64,
    k: f64,
    t: f64,
    r: f64,
    sigma: f64,
    q: f64,
) -> PricingResult<GreekBundle> {
    bs_greeks(&OptionParams::new(option_type, s, k, t, r, sigma, q)?)
}
