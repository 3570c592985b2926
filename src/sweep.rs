//! Sensitivity sweeps: analytic and Monte Carlo prices across one varying input
//!
//! Each sweep point is an independent pair of calls to [`bs_price`] and
//! [`simulate`] with every other input held fixed. With a seeded
//! [`SimulationConfig`] every point reuses the same base seed, so the
//! Monte Carlo series is a smooth curve rather than a scatter.

use crate::analytics::bs_analytic::bs_price;
use crate::error::PricingResult;
use crate::math_utils::{linspace, pct_difference};
use crate::mc::mc_engine::{simulate, SimulationConfig};
use crate::params::{Field, OptionParams};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use crate::params::Field as SweepField;

/// Points in a default sweep
pub const DEFAULT_SWEEP_POINTS: usize = 10;

impl Field {
    /// Customary sweep range for this input
    ///
    /// - volatility `[0.1, 1.0]`, time `[0.01, 1.0]`, dividend `[0, 0.1]`
    /// - strike `[0.5S, 1.5S]`, spot `[0.5K, 1.5K]`
    /// - rate `[0, 2r]`, or `[0, 0.1]` when `r ≤ 0`
    pub fn default_values(self, params: &OptionParams, n: usize) -> Vec<f64> {
        let (start, end) = match self {
            Field::Volatility => (0.1, 1.0),
            Field::TimeToExpiration => (0.01, 1.0),
            Field::StrikePrice => {
                let s = params.underlying_price();
                (0.5 * s, 1.5 * s)
            }
            Field::UnderlyingPrice => {
                let k = params.strike_price();
                (0.5 * k, 1.5 * k)
            }
            Field::RiskFreeRate => {
                let r = params.risk_free_rate();
                if r > 0.0 {
                    (0.0, 2.0 * r)
                } else {
                    (0.0, 0.1)
                }
            }
            Field::DividendYield => (0.0, 0.1),
        };
        linspace(start, end, n)
    }
}

/// Analytic and Monte Carlo price of one parameter set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceComparison {
    pub analytic: f64,
    pub monte_carlo: f64,
    /// `|analytic − monte_carlo| / |analytic|` in percent
    pub pct_difference: f64,
}

impl PriceComparison {
    pub fn new(analytic: f64, monte_carlo: f64) -> Self {
        PriceComparison {
            analytic,
            monte_carlo,
            pct_difference: pct_difference(analytic, monte_carlo),
        }
    }
}

/// Price one parameter set under both models
pub fn compare_prices(params: &OptionParams, cfg: &SimulationConfig) -> PricingResult<PriceComparison> {
    let analytic = bs_price(params)?;
    let monte_carlo = simulate(params, cfg, None)?;
    Ok(PriceComparison::new(analytic, monte_carlo))
}

/// Two parallel price series over the swept values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSeries {
    pub field: Field,
    pub values: Vec<f64>,
    pub analytic: Vec<f64>,
    pub monte_carlo: Vec<f64>,
}

impl SweepSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Per-point comparison, in sweep order
    pub fn comparisons(&self) -> Vec<PriceComparison> {
        self.analytic
            .iter()
            .zip(&self.monte_carlo)
            .map(|(&a, &m)| PriceComparison::new(a, m))
            .collect()
    }
}

/// Price `params` under both models at every value of `field`
///
/// # Errors
///
/// The first error raised at any point: `InvalidParameter` for a value that
/// breaks the field's constraint, `DegenerateInput` for a zero volatility.
pub fn sweep(
    params: &OptionParams,
    field: Field,
    values: &[f64],
    cfg: &SimulationConfig,
) -> PricingResult<SweepSeries> {
    debug!(%field, points = values.len(), "sensitivity sweep");

    let (analytic, monte_carlo) = values
        .iter()
        .map(|&value| -> PricingResult<(f64, f64)> {
            let point = params.with_field(field, value)?;
            let cmp = compare_prices(&point, cfg)?;
            Ok((cmp.analytic, cmp.monte_carlo))
        })
        .collect::<PricingResult<Vec<(f64, f64)>>>()?
        .into_iter()
        .unzip();

    Ok(SweepSeries {
        field,
        values: values.to_vec(),
        analytic,
        monte_carlo,
    })
}

/// [`sweep`] over [`Field::default_values`] with [`DEFAULT_SWEEP_POINTS`] points
pub fn default_sweep(
    params: &OptionParams,
    field: Field,
    cfg: &SimulationConfig,
) -> PricingResult<SweepSeries> {
    let values = field.default_values(params, DEFAULT_SWEEP_POINTS);
    sweep(params, field, &values, cfg)
}
