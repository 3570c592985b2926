//! European Option Payoff Functions
//!
//! - **Call**: max(S_T - K, 0)
//! - **Put**: max(K - S_T, 0)
//!
//! Only the terminal price of a simulated path matters.

use crate::params::{OptionParams, OptionType};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payoff {
    /// European call option: max(S_T - K, 0)
    EuropeanCall { k: f64 },

    /// European put option: max(K - S_T, 0)
    EuropeanPut { k: f64 },
}

impl Payoff {
    pub fn new(option_type: OptionType, k: f64) -> Self {
        match option_type {
            OptionType::Call => Payoff::EuropeanCall { k },
            OptionType::Put => Payoff::EuropeanPut { k },
        }
    }

    pub fn from_params(params: &OptionParams) -> Self {
        Payoff::new(params.option_type(), params.strike_price())
    }

    /// Payoff for a terminal underlying price
    #[inline]
    pub fn terminal(&self, s_t: f64) -> f64 {
        match *self {
            Payoff::EuropeanCall { k } => (s_t - k).max(0.0),
            Payoff::EuropeanPut { k } => (k - s_t).max(0.0),
        }
    }
}
