// src/rng.rs
//! Random Number Generation for Monte Carlo Simulations
//!
//! # Design
//!
//! 1. **Reproducibility**: same seed → same draws, trial by trial
//! 2. **Parallel safety**: every trial owns its generator, keyed by the pair
//!    `(base_seed, trial_index)`, so results do not depend on thread count
//!    and nearby base seeds (42 and 43) share no trial streams
//! 3. **Explicit state**: unseeded runs draw one base seed from the thread
//!    generator per call; nothing reseeds a global generator
//!
//! The same per-trial stream backs both the on-the-fly simulator and
//! [`standard_normal_matrix`], so simulating with seed `s` and simulating
//! with `standard_normal_matrix(n, cols, s)` consume identical deviates.

use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use rayon::prelude::*;

/// RNG factory for reproducible parallel simulations
#[derive(Debug, Clone, Copy)]
pub struct RngFactory {
    base_seed: u64,
}

impl RngFactory {
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    /// Factory seeded from `seed`, or from fresh entropy when `None`
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        Self::new(resolve_seed(seed))
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Create the generator owned by one trial
    ///
    /// The 32-byte key holds `base_seed` and `trial` in separate words, so
    /// distinct pairs never map to the same stream.
    pub fn create_std_rng(&self, trial: u64) -> StdRng {
        let mut key = <StdRng as SeedableRng>::Seed::default();
        key[..8].copy_from_slice(&self.base_seed.to_le_bytes());
        key[8..16].copy_from_slice(&trial.to_le_bytes());
        StdRng::from_seed(key)
    }

    /// Fill `out` with the standard-normal deviates of one trial
    pub fn fill_trial(&self, trial: u64, out: &mut [f64]) {
        let mut rng = self.create_std_rng(trial);
        for z in out.iter_mut() {
            *z = get_normal_draw(&mut rng);
        }
    }
}

/// Use the caller's seed, or draw one from the thread-local generator
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| rand::thread_rng().gen())
}

pub fn get_normal_draw<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    StandardNormal.sample(rng)
}

/// `rows × cols` matrix of standard-normal deviates, row `i` generated by
/// trial `i`'s generator
pub fn standard_normal_matrix(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
    let factory = RngFactory::new(seed);
    let mut matrix = Array2::<f64>::zeros((rows, cols));
    matrix
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, mut row)| {
            let mut rng = factory.create_std_rng(i as u64);
            for z in row.iter_mut() {
                *z = get_normal_draw(&mut rng);
            }
        });
    matrix
}
