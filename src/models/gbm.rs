// src/models/gbm.rs
//! Geometric Brownian motion under the risk-neutral measure
//!
//! ```text
//! dS_t = (r − q) S_t dt + σ S_t dW_t
//! ```
//!
//! Paths are built in log space with the recurrence
//! `x_t = x_{t−1} + (r − q − σ²/2)·dt + σ·√dt·z_t`, `x_0 = 0`,
//! and `S_t = S_0·exp(x_t)`.

use crate::params::OptionParams;
use ndarray::ArrayView1;

#[derive(Debug, Clone, Copy)]
pub struct Gbm {
    pub s0: f64,
    pub mu: f64,
    pub sigma: f64,
}

impl Gbm {
    pub fn new(s0: f64, mu: f64, sigma: f64) -> Self {
        Gbm { s0, mu, sigma }
    }

    /// Risk-neutral dynamics of the underlying: drift `r − q`
    pub fn risk_neutral(params: &OptionParams) -> Self {
        Gbm::new(
            params.underlying_price(),
            params.risk_free_rate() - params.dividend_yield(),
            params.volatility(),
        )
    }

    /// Deterministic part of one log-return step
    #[inline]
    pub fn log_drift(&self, dt: f64) -> f64 {
        (self.mu - 0.5 * self.sigma * self.sigma) * dt
    }

    /// Scale applied to a standard-normal draw in one log-return step
    #[inline]
    pub fn log_diffusion(&self, dt: f64) -> f64 {
        self.sigma * dt.sqrt()
    }

    /// Cumulative log-return after consuming every draw
    pub fn terminal_log_return(&self, dt: f64, draws: ArrayView1<'_, f64>) -> f64 {
        let drift = self.log_drift(dt);
        let diffusion = self.log_diffusion(dt);
        draws
            .iter()
            .fold(0.0, |acc, &z| acc + (drift + diffusion * z))
    }

    /// Terminal price `S_0·exp(x_N)`
    pub fn terminal_price(&self, dt: f64, draws: ArrayView1<'_, f64>) -> f64 {
        self.s0 * self.terminal_log_return(dt, draws).exp()
    }

    /// Write the full trajectory into `out` (`out.len() == draws.len() + 1`)
    pub fn fill_path(&self, dt: f64, draws: ArrayView1<'_, f64>, out: &mut [f64]) {
        debug_assert_eq!(out.len(), draws.len() + 1);
        let drift = self.log_drift(dt);
        let diffusion = self.log_diffusion(dt);
        out[0] = self.s0;
        let mut acc = 0.0;
        for (slot, &z) in out[1..].iter_mut().zip(draws.iter()) {
            acc += drift + diffusion * z;
            *slot = self.s0 * acc.exp();
        }
    }
}
