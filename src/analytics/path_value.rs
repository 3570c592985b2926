// src/analytics/path_value.rs
//! Analytic option value along one simulated underlying path

use crate::analytics::bs_analytic::BsTerms;
use crate::error::{PricingError, PricingResult};
use crate::mc::mc_engine::STEPS_PER_YEAR;
use crate::mc::payoffs::Payoff;
use crate::params::{Field, OptionParams};
use ndarray::ArrayView1;

/// Option value at every day of a 366-sample path
///
/// Day `j < 365` is priced in closed form at spot `path[j]` with remaining
/// time `(365 − j)·T/365`; day 365 is the exercise payoff. All other inputs
/// come from `params`.
///
/// # Errors
///
/// - `ShapeMismatch` unless the path has exactly 366 samples
/// - `InvalidParameter` for a non-positive path price
/// - `DegenerateInput` when `σ = 0`
pub fn option_value_path(params: &OptionParams, path: ArrayView1<'_, f64>) -> PricingResult<Vec<f64>> {
    if path.len() != STEPS_PER_YEAR + 1 {
        return Err(PricingError::ShapeMismatch {
            expected: (1, STEPS_PER_YEAR + 1),
            actual: (1, path.len()),
        });
    }

    let dt = params.time_to_expiration() / STEPS_PER_YEAR as f64;
    let payoff = Payoff::from_params(params);

    path.iter()
        .enumerate()
        .map(|(day, &s)| -> PricingResult<f64> {
            if day == STEPS_PER_YEAR {
                return Ok(payoff.terminal(s));
            }
            let remaining = (STEPS_PER_YEAR - day) as f64 * dt;
            let point = params
                .with_field(Field::UnderlyingPrice, s)?
                .with_field(Field::TimeToExpiration, remaining)?;
            Ok(BsTerms::new(&point)?.price())
        })
        .collect()
}
