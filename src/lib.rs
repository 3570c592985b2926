//! # bsm-crosscheck: European Options Under Two Models
//!
//! Prices a European option in closed form (Black-Scholes-Merton) and by
//! Monte Carlo simulation of geometric Brownian motion, and derives the same
//! Greeks under both models so one can be checked against the other.
//!
//! ## Key Features
//!
//! - **Analytic pricer**: price plus first- and second-order Greeks from one
//!   shared `d₁`, `d₂`
//! - **Path simulator**: 365 daily log-return steps per trial, parallel with
//!   Rayon, seeded or driven by a caller-supplied draw matrix
//! - **Simulation Greeks**: bump-and-revalue with common random numbers
//! - **Sweeps and surfaces**: price series over one input, Greek grids over two
//!
//! ## Quick Start
//!
//! ```rust
//! use bsm_crosscheck::{bs_price, simulate_with_stats, OptionParams, OptionType, SimulationConfig};
//!
//! let params = OptionParams::new(OptionType::Call, 105.0, 100.0, 1.0, 0.05, 0.2, 0.015)?;
//! let analytic = bs_price(&params)?;
//!
//! let cfg = SimulationConfig::new(10_000).with_seed(42);
//! let estimate = simulate_with_stats(&params, &cfg, None)?;
//! println!("BS {:.4}  MC {:.4} ± {:.4}", analytic, estimate.price, estimate.std_error);
//! # Ok::<(), bsm_crosscheck::PricingError>(())
//! ```
//!
//! ## Mathematical Foundation
//!
//! Both models assume `dS = (r − q) S dt + σ S dW` under the risk-neutral
//! measure. The closed form evaluates the expectation exactly; the simulator
//! estimates it as the discounted mean payoff over `num_simulations` paths.

pub mod analytics;
pub mod error;
pub mod greeks;
pub mod math_utils;
pub mod mc;
pub mod models;
pub mod params;
pub mod rng;
pub mod sweep;

pub use analytics::bs_analytic::{black_scholes_greeks, black_scholes_price, bs_greeks, bs_price};
pub use error::{PricingError, PricingResult};
pub use greeks::{GreekBundle, GreekComparison};
pub use mc::fd_greeks::{mc_greeks, mc_greeks_with_draws, monte_carlo_greeks, BumpSizes};
pub use mc::mc_engine::{
    monte_carlo_price, simulate, simulate_with_stats, SimulationConfig, STEPS_PER_YEAR,
};
pub use params::{Field, OptionParams, OptionType};
pub use sweep::{sweep, PriceComparison, SweepSeries};
