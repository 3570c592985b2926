//! Greek bundle and model-comparison types.
//!
//! A [`GreekBundle`] is produced whole by either engine; there is no partially
//! populated state. Names follow the usual desk conventions:
//!
//! - First order: Delta ∂V/∂S, Gamma ∂²V/∂S², Theta −∂V/∂T, Vega ∂V/∂σ,
//!   Rho ∂V/∂r
//! - Second order: Charm ∂Δ/∂T, Speed ∂Γ/∂S, Color ∂Γ/∂T, Zomma ∂Γ/∂σ,
//!   Veta ∂ν/∂T, Volga ∂ν/∂σ
//!
//! `T` is time to expiration, so Theta is the decay per year of calendar time
//! while the second-order time sensitivities are taken with respect to `T`.

use crate::math_utils::pct_difference;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FirstOrderGreek {
    Delta,
    Gamma,
    Theta,
    Vega,
    Rho,
}

impl FirstOrderGreek {
    pub const ALL: [FirstOrderGreek; 5] = [
        FirstOrderGreek::Delta,
        FirstOrderGreek::Gamma,
        FirstOrderGreek::Theta,
        FirstOrderGreek::Vega,
        FirstOrderGreek::Rho,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FirstOrderGreek::Delta => "Delta",
            FirstOrderGreek::Gamma => "Gamma",
            FirstOrderGreek::Theta => "Theta",
            FirstOrderGreek::Vega => "Vega",
            FirstOrderGreek::Rho => "Rho",
        }
    }
}

impl fmt::Display for FirstOrderGreek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SecondOrderGreek {
    Charm,
    Speed,
    Color,
    Zomma,
    Veta,
    Volga,
}

impl SecondOrderGreek {
    pub const ALL: [SecondOrderGreek; 6] = [
        SecondOrderGreek::Charm,
        SecondOrderGreek::Speed,
        SecondOrderGreek::Color,
        SecondOrderGreek::Zomma,
        SecondOrderGreek::Veta,
        SecondOrderGreek::Volga,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SecondOrderGreek::Charm => "Charm",
            SecondOrderGreek::Speed => "Speed",
            SecondOrderGreek::Color => "Color",
            SecondOrderGreek::Zomma => "Zomma",
            SecondOrderGreek::Veta => "Veta",
            SecondOrderGreek::Volga => "Volga",
        }
    }
}

impl fmt::Display for SecondOrderGreek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FirstOrderGreeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
}

impl FirstOrderGreeks {
    pub fn get(&self, greek: FirstOrderGreek) -> f64 {
        match greek {
            FirstOrderGreek::Delta => self.delta,
            FirstOrderGreek::Gamma => self.gamma,
            FirstOrderGreek::Theta => self.theta,
            FirstOrderGreek::Vega => self.vega,
            FirstOrderGreek::Rho => self.rho,
        }
    }

    pub fn to_map(&self) -> BTreeMap<FirstOrderGreek, f64> {
        FirstOrderGreek::ALL
            .iter()
            .map(|&g| (g, self.get(g)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecondOrderGreeks {
    pub charm: f64,
    pub speed: f64,
    pub color: f64,
    pub zomma: f64,
    pub veta: f64,
    pub volga: f64,
}

impl SecondOrderGreeks {
    pub fn get(&self, greek: SecondOrderGreek) -> f64 {
        match greek {
            SecondOrderGreek::Charm => self.charm,
            SecondOrderGreek::Speed => self.speed,
            SecondOrderGreek::Color => self.color,
            SecondOrderGreek::Zomma => self.zomma,
            SecondOrderGreek::Veta => self.veta,
            SecondOrderGreek::Volga => self.volga,
        }
    }

    pub fn to_map(&self) -> BTreeMap<SecondOrderGreek, f64> {
        SecondOrderGreek::ALL
            .iter()
            .map(|&g| (g, self.get(g)))
            .collect()
    }
}

/// First- and second-order sensitivities of one model at one parameter set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreekBundle {
    pub first_order: FirstOrderGreeks,
    pub second_order: SecondOrderGreeks,
}

impl GreekBundle {
    /// True when every value is finite
    pub fn is_finite(&self) -> bool {
        FirstOrderGreek::ALL
            .iter()
            .all(|&g| self.first_order.get(g).is_finite())
            && SecondOrderGreek::ALL
                .iter()
                .all(|&g| self.second_order.get(g).is_finite())
    }
}

/// One Greek evaluated under both models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub greek: String,
    pub analytic: f64,
    pub monte_carlo: f64,
    /// `|analytic − monte_carlo| / |analytic|` in percent, 0 when analytic is 0
    pub pct_difference: f64,
}

impl ComparisonRow {
    fn new(greek: &str, analytic: f64, monte_carlo: f64) -> Self {
        ComparisonRow {
            greek: greek.to_string(),
            analytic,
            monte_carlo,
            pct_difference: pct_difference(analytic, monte_carlo),
        }
    }
}

/// Side-by-side table of analytic and simulation Greeks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreekComparison {
    pub first_order: Vec<ComparisonRow>,
    pub second_order: Vec<ComparisonRow>,
}

impl GreekComparison {
    pub fn new(analytic: &GreekBundle, monte_carlo: &GreekBundle) -> Self {
        let first_order = FirstOrderGreek::ALL
            .iter()
            .map(|&g| {
                ComparisonRow::new(
                    g.name(),
                    analytic.first_order.get(g),
                    monte_carlo.first_order.get(g),
                )
            })
            .collect();
        let second_order = SecondOrderGreek::ALL
            .iter()
            .map(|&g| {
                ComparisonRow::new(
                    g.name(),
                    analytic.second_order.get(g),
                    monte_carlo.second_order.get(g),
                )
            })
            .collect();
        GreekComparison {
            first_order,
            second_order,
        }
    }
}

impl fmt::Display for GreekComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<8} {:>14} {:>14} {:>10}", "Greek", "Black-Scholes", "Monte Carlo", "Diff %")?;
        for row in self.first_order.iter().chain(self.second_order.iter()) {
            writeln!(
                f,
                "{:<8} {:>14.4} {:>14.4} {:>10.2}",
                row.greek, row.analytic, row.monte_carlo, row.pct_difference
            )?;
        }
        Ok(())
    }
}
