//! Bump-and-revalue Greeks on top of the Monte Carlo pricer
//!
//! # Common Random Numbers
//!
//! Every revaluation in one bundle reads the same `num_simulations × 365`
//! draw matrix, so trial `i` sees identical deviates in the bumped and the
//! unbumped run. The finite-difference numerator then measures the effect of
//! the bump on each path instead of independent sampling noise:
//! ```text
//! Var[V(x+h) − V(x−h)] << Var[V(x+h)] + Var[V(x−h)]
//! ```
//!
//! # Stencils
//!
//! With `P(i, j, k, l)` the price at `S + i·h_S`, `T + j·h_T`, `σ + k·h_σ`,
//! `r + l·h_r`:
//! ```text
//! first order   (P(+1) − P(−1)) / 2h
//! pure second   (P(+1) − 2P(0) + P(−1)) / h²
//! mixed second  (P(+1,+1) − P(+1,−1) − P(−1,+1) + P(−1,−1)) / 4h₁h₂
//! speed         (P(+2) − 2P(+1) + 2P(−1) − P(−2)) / 2h³
//! color, zomma  central difference of the gamma stencil in T or σ
//! ```

use crate::error::{validation::validate_vol_time, PricingError, PricingResult};
use crate::greeks::{FirstOrderGreeks, GreekBundle, SecondOrderGreeks};
use crate::mc::mc_engine::{simulate, SimulationConfig};
use crate::params::{Field, OptionParams, OptionType};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// Relative finite-difference steps, `h = max(floor, |value|·relative)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BumpSizes {
    pub spot: f64,
    pub time: f64,
    pub volatility: f64,
    pub rate: f64,
    /// Smallest absolute step for any field
    pub floor: f64,
}

impl Default for BumpSizes {
    fn default() -> Self {
        BumpSizes {
            spot: 0.01,
            time: 0.01,
            volatility: 0.05,
            rate: 0.01,
            floor: 1e-4,
        }
    }
}

/// Absolute steps resolved for one parameter set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steps {
    pub spot: f64,
    pub time: f64,
    pub volatility: f64,
    pub rate: f64,
}

impl BumpSizes {
    /// Resolve absolute steps, capped so every stencil point stays valid:
    /// `S − 2h_S > 0`, `T − h_T > 0`, `σ − h_σ > 0`
    pub fn resolve(&self, params: &OptionParams) -> Steps {
        let raw = |value: f64, relative: f64| self.floor.max(value.abs() * relative);
        let capped = |field: Field, step: f64, limit: f64| {
            if step > limit {
                warn!(%field, step, limit, "finite-difference step capped");
                limit
            } else {
                step
            }
        };

        let s = params.underlying_price();
        let t = params.time_to_expiration();
        let sigma = params.volatility();
        Steps {
            spot: capped(Field::UnderlyingPrice, raw(s, self.spot), 0.25 * s),
            time: capped(Field::TimeToExpiration, raw(t, self.time), 0.5 * t),
            volatility: capped(Field::Volatility, raw(sigma, self.volatility), 0.5 * sigma),
            rate: raw(params.risk_free_rate(), self.rate),
        }
    }
}

/// Stencil offsets in units of the resolved steps: spot, time, vol, rate
type Offset = [i8; 4];

/// Memoized revaluations sharing one draw matrix
struct BumpGrid<'a> {
    base: OptionParams,
    cfg: SimulationConfig,
    draws: &'a Array2<f64>,
    steps: Steps,
    cache: HashMap<Offset, f64>,
}

impl<'a> BumpGrid<'a> {
    fn new(base: OptionParams, cfg: SimulationConfig, draws: &'a Array2<f64>, steps: Steps) -> Self {
        BumpGrid {
            base,
            cfg,
            draws,
            steps,
            cache: HashMap::new(),
        }
    }

    fn bumped(&self, offset: Offset) -> PricingResult<OptionParams> {
        let moves = [
            (Field::UnderlyingPrice, self.steps.spot),
            (Field::TimeToExpiration, self.steps.time),
            (Field::Volatility, self.steps.volatility),
            (Field::RiskFreeRate, self.steps.rate),
        ];
        let mut params = self.base;
        for (&n, (field, h)) in offset.iter().zip(moves) {
            if n != 0 {
                params = params.with_field(field, self.base.get(field) + f64::from(n) * h)?;
            }
        }
        Ok(params)
    }

    fn price(&mut self, offset: Offset) -> PricingResult<f64> {
        if let Some(&price) = self.cache.get(&offset) {
            return Ok(price);
        }
        let params = self.bumped(offset)?;
        let price = simulate(&params, &self.cfg, Some(self.draws))?;
        trace!(?offset, price, "revalued");
        self.cache.insert(offset, price);
        Ok(price)
    }

    /// Gamma stencil at a fixed time/vol offset
    fn gamma_at(&mut self, time: i8, vol: i8) -> PricingResult<f64> {
        let hs = self.steps.spot;
        Ok((self.price([1, time, vol, 0])? - 2.0 * self.price([0, time, vol, 0])?
            + self.price([-1, time, vol, 0])?)
            / (hs * hs))
    }

    fn bundle(&mut self) -> PricingResult<GreekBundle> {
        let Steps {
            spot: hs,
            time: ht,
            volatility: hv,
            rate: hr,
        } = self.steps;

        let p0 = self.price([0, 0, 0, 0])?;
        let s_up = self.price([1, 0, 0, 0])?;
        let s_dn = self.price([-1, 0, 0, 0])?;
        let v_up = self.price([0, 0, 1, 0])?;
        let v_dn = self.price([0, 0, -1, 0])?;

        let delta = (s_up - s_dn) / (2.0 * hs);
        let gamma = (s_up - 2.0 * p0 + s_dn) / (hs * hs);
        let theta = -(self.price([0, 1, 0, 0])? - self.price([0, -1, 0, 0])?) / (2.0 * ht);
        let vega = (v_up - v_dn) / (2.0 * hv);
        let rho = (self.price([0, 0, 0, 1])? - self.price([0, 0, 0, -1])?) / (2.0 * hr);

        let charm = (self.price([1, 1, 0, 0])? - self.price([1, -1, 0, 0])?
            - self.price([-1, 1, 0, 0])?
            + self.price([-1, -1, 0, 0])?)
            / (4.0 * hs * ht);
        let speed = (self.price([2, 0, 0, 0])? - 2.0 * s_up + 2.0 * s_dn
            - self.price([-2, 0, 0, 0])?)
            / (2.0 * hs * hs * hs);
        let color = (self.gamma_at(1, 0)? - self.gamma_at(-1, 0)?) / (2.0 * ht);
        let zomma = (self.gamma_at(0, 1)? - self.gamma_at(0, -1)?) / (2.0 * hv);
        let veta = (self.price([0, 1, 1, 0])? - self.price([0, 1, -1, 0])?
            - self.price([0, -1, 1, 0])?
            + self.price([0, -1, -1, 0])?)
            / (4.0 * ht * hv);
        let volga = (v_up - 2.0 * p0 + v_dn) / (hv * hv);

        Ok(GreekBundle {
            first_order: FirstOrderGreeks {
                delta,
                gamma,
                theta,
                vega,
                rho,
            },
            second_order: SecondOrderGreeks {
                charm,
                speed,
                color,
                zomma,
                veta,
                volga,
            },
        })
    }
}

/// Monte Carlo Greeks with a draw matrix generated from `cfg`
///
/// # Errors
///
/// - `InvalidParameter` for invalid parameters or `num_simulations == 0`
/// - `DegenerateInput` when `σ·√T = 0` (the volatility stencil needs σ > 0)
pub fn mc_greeks(params: &OptionParams, cfg: &SimulationConfig) -> PricingResult<GreekBundle> {
    mc_greeks_with_bumps(params, cfg, None, &BumpSizes::default())
}

/// Monte Carlo Greeks reusing a caller-supplied draw matrix
///
/// # Errors
///
/// As [`mc_greeks`], plus `ShapeMismatch` when `draws` is not
/// `num_simulations × 365`.
pub fn mc_greeks_with_draws(
    params: &OptionParams,
    cfg: &SimulationConfig,
    draws: &Array2<f64>,
) -> PricingResult<GreekBundle> {
    mc_greeks_with_bumps(params, cfg, Some(draws), &BumpSizes::default())
}

/// Monte Carlo Greeks with explicit step sizes
pub fn mc_greeks_with_bumps(
    params: &OptionParams,
    cfg: &SimulationConfig,
    draws: Option<&Array2<f64>>,
    bumps: &BumpSizes,
) -> PricingResult<GreekBundle> {
    params.validate()?;
    cfg.validate()?;
    validate_vol_time(params.volatility(), params.time_to_expiration())?;

    let generated;
    let draws = match draws {
        Some(matrix) => {
            let expected = cfg.draw_shape();
            if matrix.dim() != expected {
                return Err(PricingError::ShapeMismatch {
                    expected,
                    actual: matrix.dim(),
                });
            }
            matrix
        }
        None => {
            generated = cfg.draw_matrix();
            &generated
        }
    };

    let steps = bumps.resolve(params);
    debug!(
        option_type = %params.option_type(),
        num_simulations = cfg.num_simulations,
        ?steps,
        "monte carlo greeks"
    );

    let mut grid = BumpGrid::new(*params, *cfg, draws, steps);
    let bundle = grid.bundle()?;
    if !bundle.is_finite() {
        return Err(PricingError::NumericalInstability {
            method: "finite-difference Greeks".to_string(),
            reason: format!("non-finite sensitivity in {:?}", bundle),
        });
    }
    debug!(revaluations = grid.cache.len(), "monte carlo greeks done");
    Ok(bundle)
}

/// Flat-argument form of [`mc_greeks`]
#[allow(clippy::too_many_arguments)]
pub fn monte_carlo_greeks(
    option_type: OptionType,
    s: f64,
    k: f64,
    t: f64,
    r: f64,
    sigma: f64,
    q: f64,
    cfg: &SimulationConfig,
) -> PricingResult<GreekBundle> {
    mc_greeks(&OptionParams::new(option_type, s, k, t, r, sigma, q)?, cfg)
}
