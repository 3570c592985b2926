// src/mc/mc_engine.rs
use crate::error::{validation::*, PricingError, PricingResult};
use crate::mc::payoffs::Payoff;
use crate::models::gbm::Gbm;
use crate::params::{OptionParams, OptionType};
use crate::rng::{self, RngFactory};
use ndarray::{Array2, ArrayView1, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Daily time grid: every path has this many increments whatever `T` is
pub const STEPS_PER_YEAR: usize = 365;

/// Monte Carlo settings
///
/// `seed: None` draws a fresh base seed per call; results then vary run to
/// run with statistical error `O(1/√num_simulations)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub num_simulations: usize,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            num_simulations: 10_000,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn new(num_simulations: usize) -> Self {
        SimulationConfig {
            num_simulations,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the Monte Carlo configuration
    pub fn validate(&self) -> PricingResult<()> {
        validate_num_simulations(self.num_simulations)
    }

    /// Shape every caller-supplied draw matrix must have
    pub fn draw_shape(&self) -> (usize, usize) {
        (self.num_simulations, STEPS_PER_YEAR)
    }

    /// Generate a `num_simulations × 365` random draw matrix from this config's seed
    pub fn draw_matrix(&self) -> Array2<f64> {
        rng::standard_normal_matrix(
            self.num_simulations,
            STEPS_PER_YEAR,
            rng::resolve_seed(self.seed),
        )
    }
}

/// Price estimate with its sampling error
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct McEstimate {
    pub price: f64,
    /// Sample standard deviation of discounted payoffs divided by √n
    pub std_error: f64,
    pub num_simulations: usize,
}

/// Price estimate together with every simulated trajectory
#[derive(Debug, Clone)]
pub struct PathSimulation {
    pub price: f64,
    /// `num_simulations × 366`: column 0 is `S`, column `j` the price after day `j`
    pub paths: Array2<f64>,
}

/// Discounted payoff of every trial with summary statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffDistribution {
    pub payoffs: Vec<f64>,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl PayoffDistribution {
    fn from_payoffs(payoffs: Vec<f64>) -> Self {
        let n = payoffs.len() as f64;
        let mean = payoffs.iter().sum::<f64>() / n;
        let std_dev = (payoffs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt();
        let min = payoffs.iter().copied().fold(f64::INFINITY, f64::min);
        let max = payoffs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        PayoffDistribution {
            payoffs,
            mean,
            std_dev,
            min,
            max,
        }
    }

    /// Linear-interpolated percentile, `p` in `[0, 100]`; NaN when empty
    pub fn percentile(&self, p: f64) -> f64 {
        if self.payoffs.is_empty() {
            return f64::NAN;
        }
        let mut sorted = self.payoffs.clone();
        sorted.sort_by(f64::total_cmp);
        let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
        let lo = rank.floor() as usize;
        let hi = rank.ceil() as usize;
        sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
    }

    /// Counts over `bins` equal-width buckets spanning `[0, upper]`
    ///
    /// Payoffs above `upper` are left out, matching a histogram clipped at a
    /// high percentile.
    pub fn histogram(&self, bins: usize, upper: f64) -> Vec<usize> {
        let mut counts = vec![0; bins];
        if bins == 0 || upper <= 0.0 {
            return counts;
        }
        let width = upper / bins as f64;
        for &x in self.payoffs.iter().filter(|&&x| x <= upper) {
            let idx = ((x / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        counts
    }
}

fn validate_inputs(
    params: &OptionParams,
    cfg: &SimulationConfig,
    draws: Option<&Array2<f64>>,
) -> PricingResult<()> {
    params.validate()?;
    cfg.validate()?;
    if let Some(matrix) = draws {
        let expected = cfg.draw_shape();
        if matrix.dim() != expected {
            return Err(PricingError::ShapeMismatch {
                expected,
                actual: matrix.dim(),
            });
        }
    }
    Ok(())
}

/// Undiscounted payoff of every trial, in trial order
///
/// Trials run in parallel; each reads row `i` of `draws`, or the deviates of
/// generator `(seed, i)`, so the output does not depend on scheduling.
fn trial_payoffs(
    params: &OptionParams,
    cfg: &SimulationConfig,
    draws: Option<&Array2<f64>>,
) -> Vec<f64> {
    let gbm = Gbm::risk_neutral(params);
    let payoff = Payoff::from_params(params);
    let dt = params.time_to_expiration() / STEPS_PER_YEAR as f64;

    match draws {
        Some(matrix) => matrix
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(|row| payoff.terminal(gbm.terminal_price(dt, row)))
            .collect(),
        None => {
            let factory = RngFactory::from_optional_seed(cfg.seed);
            debug!(base_seed = factory.base_seed(), "generating draws on the fly");
            (0..cfg.num_simulations)
                .into_par_iter()
                .map_init(
                    || vec![0.0; STEPS_PER_YEAR],
                    |buf, i| {
                        factory.fill_trial(i as u64, buf);
                        payoff.terminal(gbm.terminal_price(dt, ArrayView1::from(&buf[..])))
                    },
                )
                .collect()
        }
    }
}

fn discount(params: &OptionParams) -> f64 {
    (-params.risk_free_rate() * params.time_to_expiration()).exp()
}

fn ensure_finite(method: &str, value: f64) -> PricingResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PricingError::NumericalInstability {
            method: method.to_string(),
            reason: format!("estimate is not finite: {}", value),
        })
    }
}

/// Monte Carlo price of a European option under geometric Brownian motion
///
/// # Math Framework
///
/// With `dt = T/365` and standard-normal draws `z_1..z_365` per trial:
/// ```text
/// x_t = x_{t−1} + (r − q − σ²/2)·dt + σ·√dt·z_t,   x_0 = 0
/// S_T = S·exp(x_365)
/// V   = e^(−rT) · mean(payoff(S_T))
/// ```
///
/// When `draws` is supplied it is the only source of randomness and must be
/// `num_simulations × 365`; the same parameters and matrix give a
/// bit-identical result.
///
/// # Errors
///
/// - `InvalidParameter` for invalid parameters or `num_simulations == 0`
/// - `ShapeMismatch` when `draws` has the wrong shape
/// - `NumericalInstability` when the estimate is not finite
pub fn simulate(
    params: &OptionParams,
    cfg: &SimulationConfig,
    draws: Option<&Array2<f64>>,
) -> PricingResult<f64> {
    simulate_with_stats(params, cfg, draws).map(|estimate| estimate.price)
}

/// [`simulate`] returning the standard error alongside the price
pub fn simulate_with_stats(
    params: &OptionParams,
    cfg: &SimulationConfig,
    draws: Option<&Array2<f64>>,
) -> PricingResult<McEstimate> {
    validate_inputs(params, cfg, draws)?;
    debug!(
        option_type = %params.option_type(),
        num_simulations = cfg.num_simulations,
        supplied_draws = draws.is_some(),
        "monte carlo price"
    );

    let payoffs = trial_payoffs(params, cfg, draws);
    let n = payoffs.len() as f64;
    let df = discount(params);

    let mean_payoff = payoffs.iter().sum::<f64>() / n;
    let sample_variance = if payoffs.len() > 1 {
        payoffs
            .iter()
            .map(|p| (p - mean_payoff).powi(2))
            .sum::<f64>()
            / (n - 1.0)
    } else {
        0.0
    };

    let price = ensure_finite("Monte Carlo", df * mean_payoff)?;
    let std_error = ensure_finite("Monte Carlo", df * (sample_variance / n).sqrt())?;

    Ok(McEstimate {
        price,
        std_error,
        num_simulations: cfg.num_simulations,
    })
}

/// [`simulate`] that also keeps each trial's full 366-sample trajectory
pub fn simulate_paths(
    params: &OptionParams,
    cfg: &SimulationConfig,
    draws: Option<&Array2<f64>>,
) -> PricingResult<PathSimulation> {
    validate_inputs(params, cfg, draws)?;

    let gbm = Gbm::risk_neutral(params);
    let payoff = Payoff::from_params(params);
    let dt = params.time_to_expiration() / STEPS_PER_YEAR as f64;
    let factory = RngFactory::from_optional_seed(cfg.seed);

    let mut paths = Array2::<f64>::zeros((cfg.num_simulations, STEPS_PER_YEAR + 1));
    paths
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, mut row)| {
            let mut path = vec![0.0; STEPS_PER_YEAR + 1];
            match draws {
                Some(matrix) => gbm.fill_path(dt, matrix.row(i), &mut path),
                None => {
                    let mut z = vec![0.0; STEPS_PER_YEAR];
                    factory.fill_trial(i as u64, &mut z);
                    gbm.fill_path(dt, ArrayView1::from(&z[..]), &mut path);
                }
            }
            row.assign(&ArrayView1::from(&path[..]));
        });

    let mean_payoff = paths
        .column(STEPS_PER_YEAR)
        .iter()
        .map(|&s_t| payoff.terminal(s_t))
        .sum::<f64>()
        / cfg.num_simulations as f64;
    let price = ensure_finite("Monte Carlo paths", discount(params) * mean_payoff)?;

    Ok(PathSimulation { price, paths })
}

/// Discounted payoff of every trial, for distribution analysis
pub fn payoff_distribution(
    params: &OptionParams,
    cfg: &SimulationConfig,
    draws: Option<&Array2<f64>>,
) -> PricingResult<PayoffDistribution> {
    validate_inputs(params, cfg, draws)?;
    let df = discount(params);
    let discounted = trial_payoffs(params, cfg, draws)
        .into_iter()
        .map(|p| df * p)
        .collect();
    Ok(PayoffDistribution::from_payoffs(discounted))
}

/// Flat-argument form of [`simulate`]
#[allow(clippy::too_many_arguments)]
pub fn monte_carlo_price(
    option_type: OptionType,
    s: f64,
    k: f64,
    t: f64,
    r: f64,
    sigma: f64,
    q: f64,
    cfg: &SimulationConfig,
    draws: Option<&Array2<f64>>,
) -> PricingResult<f64> {
    simulate(&OptionParams::new(option_type, s, k, t, r, sigma, q)?, cfg, draws)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn call() -> OptionParams {
        OptionParams::new(OptionType::Call, 105.0, 100.0, 1.0, 0.05, 0.2, 0.015).unwrap()
    }

    #[test]
    fn test_default_config() {
        let cfg = SimulationConfig::default();
        assert_eq!(cfg.num_simulations, 10_000);
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.draw_shape(), (10_000, 365));
    }

    #[test]
    fn test_zero_simulations_rejected() {
        let cfg = SimulationConfig::new(0);
        match simulate(&call(), &cfg, None) {
            Err(PricingError::InvalidParameter { parameter, .. }) => {
                assert_eq!(parameter, "num_simulations")
            }
            other => panic!("expected InvalidParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let cfg = SimulationConfig::new(5);
        let draws = Array2::<f64>::zeros((5, 10));
        let err = simulate(&call(), &cfg, Some(&draws)).unwrap_err();
        assert_eq!(
            err,
            PricingError::ShapeMismatch {
                expected: (5, 365),
                actual: (5, 10)
            }
        );
    }

    #[test]
    fn test_seed_and_matrix_agree_bitwise() {
        let cfg = SimulationConfig::new(2_000).with_seed(11);
        let matrix = cfg.draw_matrix();
        let seeded = simulate(&call(), &cfg, None).unwrap();
        let supplied = simulate(&call(), &cfg, Some(&matrix)).unwrap();
        assert_eq!(seeded.to_bits(), supplied.to_bits());
    }

    #[test]
    fn test_zero_draws_give_deterministic_forward() {
        let p = call();
        let cfg = SimulationConfig::new(3);
        let draws = Array2::<f64>::zeros((3, 365));
        let price = simulate(&p, &cfg, Some(&draws)).unwrap();

        let t: f64 = 1.0;
        let s_t = 105.0 * ((0.05 - 0.015 - 0.5 * 0.04) * t).exp();
        assert_relative_eq!(price, (-0.05f64).exp() * (s_t - 100.0), max_relative = 1e-10);

        let stats = simulate_with_stats(&p, &cfg, Some(&draws)).unwrap();
        assert_eq!(stats.std_error, 0.0);
    }

    #[test]
    fn test_zero_volatility_is_accepted() {
        let p = OptionParams::new(OptionType::Put, 100.0, 110.0, 0.5, 0.02, 0.0, 0.0).unwrap();
        let price = simulate(&p, &SimulationConfig::new(10).with_seed(1), None).unwrap();
        let expected = (-0.01f64).exp() * (110.0 - 100.0 * 0.01f64.exp());
        assert_relative_eq!(price, expected, max_relative = 1e-10);
    }

    #[test]
    fn test_paths_shape_and_price() {
        let cfg = SimulationConfig::new(50).with_seed(3);
        let sim = simulate_paths(&call(), &cfg, None).unwrap();
        assert_eq!(sim.paths.dim(), (50, 366));
        assert!(sim.paths.column(0).iter().all(|&s| s == 105.0));
        assert!(sim.paths.iter().all(|&s| s > 0.0));
        assert_eq!(sim.price.to_bits(), simulate(&call(), &cfg, None).unwrap().to_bits());
    }

    #[test]
    fn test_payoff_distribution() {
        let cfg = SimulationConfig::new(4_000).with_seed(5);
        let dist = payoff_distribution(&call(), &cfg, None).unwrap();
        assert_eq!(dist.payoffs.len(), 4_000);
        assert_relative_eq!(dist.mean, simulate(&call(), &cfg, None).unwrap(), max_relative = 1e-12);
        assert_eq!(dist.min, 0.0);
        assert!(dist.max >= dist.percentile(99.0));
        assert_eq!(dist.percentile(0.0), dist.min);
        assert_eq!(dist.percentile(100.0), dist.max);

        let upper = dist.percentile(99.0);
        let counts = dist.histogram(30, upper);
        assert_eq!(counts.len(), 30);
        let kept = dist.payoffs.iter().filter(|&&x| x <= upper).count();
        assert_eq!(counts.iter().sum::<usize>(), kept);
    }

    #[test]
    fn test_empty_distribution_percentile() {
        let dist: PayoffDistribution = serde_json::from_str(
            r#"{"payoffs": [], "mean": 0.0, "std_dev": 0.0, "min": 0.0, "max": 0.0}"#,
        )
        .unwrap();
        assert!(dist.percentile(50.0).is_nan());
        assert_eq!(dist.histogram(4, 1.0), vec![0; 4]);
    }

    #[test]
    fn test_adjacent_seeds_give_independent_prices() {
        let a = SimulationConfig::new(500).with_seed(42).draw_matrix();
        let b = SimulationConfig::new(500).with_seed(43).draw_matrix();
        assert!(a.rows().into_iter().all(|row| row != b.row(0)));
        assert_ne!(
            simulate(&call(), &SimulationConfig::new(500).with_seed(42), None).unwrap(),
            simulate(&call(), &SimulationConfig::new(500).with_seed(43), None).unwrap()
        );
    }
}
