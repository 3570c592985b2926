// src/analytics/surface.rs
//! Analytic Greek surfaces over two parameter axes

use crate::analytics::bs_analytic::BsTerms;
use crate::error::{PricingError, PricingResult};
use crate::greeks::FirstOrderGreek;
use crate::math_utils::linspace;
use crate::params::{Field, OptionParams};
use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Points per axis of a [`default_surface`]
pub const SURFACE_POINTS: usize = 50;

/// One parameter axis of a surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceAxis {
    pub field: Field,
    pub values: Vec<f64>,
}

impl SurfaceAxis {
    pub fn new(field: Field, values: Vec<f64>) -> Self {
        SurfaceAxis { field, values }
    }

    pub fn linspace(field: Field, start: f64, end: f64, n: usize) -> Self {
        SurfaceAxis::new(field, linspace(start, end, n))
    }
}

/// Greek values on a grid; `values[[i, j]]` is taken at `y.values[i]`, `x.values[j]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreekSurface {
    pub greek: FirstOrderGreek,
    pub x: SurfaceAxis,
    pub y: SurfaceAxis,
    pub values: Array2<f64>,
}

/// Evaluate an analytic first-order Greek at every `(x, y)` grid point
///
/// All other inputs are held at `params`.
///
/// # Errors
///
/// The first `InvalidParameter` or `DegenerateInput` raised by any grid point.
pub fn greek_surface(
    params: &OptionParams,
    greek: FirstOrderGreek,
    x: SurfaceAxis,
    y: SurfaceAxis,
) -> PricingResult<GreekSurface> {
    let (nx, ny) = (x.values.len(), y.values.len());
    debug!(%greek, x = %x.field, y = %y.field, nx, ny, "greek surface");

    let flat = (0..nx * ny)
        .into_par_iter()
        .map(|idx| -> PricingResult<f64> {
            let point = params
                .with_field(x.field, x.values[idx % nx])?
                .with_field(y.field, y.values[idx / nx])?;
            Ok(BsTerms::new(&point)?.greeks().first_order.get(greek))
        })
        .collect::<PricingResult<Vec<f64>>>()?;

    let values = Array2::from_shape_vec((ny, nx), flat).map_err(|e| {
        PricingError::NumericalInstability {
            method: "greek surface".to_string(),
            reason: e.to_string(),
        }
    })?;

    Ok(GreekSurface {
        greek,
        x,
        y,
        values,
    })
}

/// Surface on the customary axes for each Greek, 50 × 50 points
///
/// | Greek              | x                          | y               |
/// |--------------------|----------------------------|-----------------|
/// | Delta, Gamma, Vega | spot `[0.5S, 1.5S]`        | vol `[max(0.01, σ/2), 1.5σ]` |
/// | Theta              | time `[0.1, 2T]`           | spot            |
/// | Rho                | rate `[max(0.01, r/2), 1.5r]` | spot         |
pub fn default_surface(params: &OptionParams, greek: FirstOrderGreek) -> PricingResult<GreekSurface> {
    let n = SURFACE_POINTS;
    let s = params.underlying_price();
    let spot = SurfaceAxis::linspace(Field::UnderlyingPrice, 0.5 * s, 1.5 * s, n);

    let (x, y) = match greek {
        FirstOrderGreek::Delta | FirstOrderGreek::Gamma | FirstOrderGreek::Vega => {
            let sigma = params.volatility();
            let vol = SurfaceAxis::linspace(Field::Volatility, (0.5 * sigma).max(0.01), 1.5 * sigma, n);
            (spot, vol)
        }
        FirstOrderGreek::Theta => {
            let t = params.time_to_expiration();
            (SurfaceAxis::linspace(Field::TimeToExpiration, 0.1, 2.0 * t, n), spot)
        }
        FirstOrderGreek::Rho => {
            let r = params.risk_free_rate();
            (SurfaceAxis::linspace(Field::RiskFreeRate, (0.5 * r).max(0.01), 1.5 * r, n), spot)
        }
    };
    greek_surface(params, greek, x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::bs_analytic::bs_greeks;
    use crate::params::OptionType;
    use approx::assert_relative_eq;

    fn call() -> OptionParams {
        OptionParams::new(OptionType::Call, 105.0, 100.0, 1.0, 0.05, 0.2, 0.015).unwrap()
    }

    #[test]
    fn test_grid_orientation() {
        let p = call();
        let x = SurfaceAxis::new(Field::UnderlyingPrice, vec![90.0, 105.0, 120.0]);
        let y = SurfaceAxis::new(Field::Volatility, vec![0.1, 0.2]);
        let surface = greek_surface(&p, FirstOrderGreek::Delta, x, y).unwrap();
        assert_eq!(surface.values.dim(), (2, 3));

        // row 1 is σ = 0.2, column 1 is S = 105: the base parameter set
        let base = bs_greeks(&p).unwrap().first_order.delta;
        assert_relative_eq!(surface.values[[1, 1]], base, max_relative = 1e-14);

        // call delta rises with spot
        let row = surface.values.row(0);
        assert!(row[0] < row[1] && row[1] < row[2]);
    }

    #[test]
    fn test_default_surfaces() {
        let p = call();
        for greek in FirstOrderGreek::ALL {
            let surface = default_surface(&p, greek).unwrap();
            assert_eq!(surface.values.dim(), (SURFACE_POINTS, SURFACE_POINTS));
            assert!(surface.values.iter().all(|v| v.is_finite()));
        }
        let theta = default_surface(&p, FirstOrderGreek::Theta).unwrap();
        assert_eq!(theta.x.field, Field::TimeToExpiration);
        assert_eq!(theta.x.values[0], 0.1);
        assert_eq!(theta.x.values[SURFACE_POINTS - 1], 2.0);
    }

    #[test]
    fn test_invalid_grid_point_fails() {
        let x = SurfaceAxis::new(Field::StrikePrice, vec![100.0, -5.0]);
        let y = SurfaceAxis::new(Field::Volatility, vec![0.2]);
        assert!(matches!(
            greek_surface(&call(), FirstOrderGreek::Gamma, x, y),
            Err(PricingError::InvalidParameter { .. })
        ));
    }
}
