//! Option and market parameters shared by every engine.
//!
//! An [`OptionParams`] value is validated once on construction and is then
//! passed by value (it is `Copy`) to the analytic pricer, the path simulator
//! and both Greeks engines. Bumped copies for finite differences are produced
//! with [`OptionParams::with_field`], which re-validates the new value.

use crate::error::{validation::*, PricingError, PricingResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// European exercise right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "Call"),
            OptionType::Put => write!(f, "Put"),
        }
    }
}

impl FromStr for OptionType {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" => Ok(OptionType::Call),
            "put" => Ok(OptionType::Put),
            _ => Err(PricingError::InvalidOptionType {
                value: s.to_string(),
            }),
        }
    }
}

/// Numeric input of [`OptionParams`], used to address bumps and sweeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    UnderlyingPrice,
    StrikePrice,
    TimeToExpiration,
    RiskFreeRate,
    Volatility,
    DividendYield,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::UnderlyingPrice,
        Field::StrikePrice,
        Field::TimeToExpiration,
        Field::RiskFreeRate,
        Field::Volatility,
        Field::DividendYield,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::UnderlyingPrice => "underlying_price",
            Field::StrikePrice => "strike_price",
            Field::TimeToExpiration => "time_to_expiration",
            Field::RiskFreeRate => "risk_free_rate",
            Field::Volatility => "volatility",
            Field::DividendYield => "dividend_yield",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validated option/market parameter set
///
/// Invariants: all numeric fields finite, `S, K, T > 0`, `σ ≥ 0`, `q ≥ 0`.
/// Rates and volatilities are decimals (0.05 for 5%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOptionParams")]
pub struct OptionParams {
    option_type: OptionType,
    underlying_price: f64,
    strike_price: f64,
    time_to_expiration: f64,
    risk_free_rate: f64,
    volatility: f64,
    dividend_yield: f64,
}

/// Unvalidated mirror used for deserialization
#[derive(Deserialize)]
struct RawOptionParams {
    option_type: OptionType,
    underlying_price: f64,
    strike_price: f64,
    time_to_expiration: f64,
    risk_free_rate: f64,
    volatility: f64,
    #[serde(default)]
    dividend_yield: f64,
}

impl TryFrom<RawOptionParams> for OptionParams {
    type Error = PricingError;

    fn try_from(raw: RawOptionParams) -> PricingResult<Self> {
        OptionParams::new(
            raw.option_type,
            raw.underlying_price,
            raw.strike_price,
            raw.time_to_expiration,
            raw.risk_free_rate,
            raw.volatility,
            raw.dividend_yield,
        )
    }
}

impl OptionParams {
    /// Build a parameter set, validating every field
    ///
    /// # Errors
    ///
    /// `InvalidParameter` naming the first offending field.
    pub fn new(
        option_type: OptionType,
        underlying_price: f64,
        strike_price: f64,
        time_to_expiration: f64,
        risk_free_rate: f64,
        volatility: f64,
        dividend_yield: f64,
    ) -> PricingResult<Self> {
        let params = OptionParams {
            option_type,
            underlying_price,
            strike_price,
            time_to_expiration,
            risk_free_rate,
            volatility,
            dividend_yield,
        };
        params.validate()?;
        Ok(params)
    }

    /// Re-check the invariants
    pub fn validate(&self) -> PricingResult<()> {
        validate_positive(Field::UnderlyingPrice.name(), self.underlying_price)?;
        validate_positive(Field::StrikePrice.name(), self.strike_price)?;
        validate_positive(Field::TimeToExpiration.name(), self.time_to_expiration)?;
        validate_finite(Field::RiskFreeRate.name(), self.risk_free_rate)?;
        validate_non_negative(Field::Volatility.name(), self.volatility)?;
        validate_non_negative(Field::DividendYield.name(), self.dividend_yield)?;
        Ok(())
    }

    #[inline]
    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// Spot price `S`
    #[inline]
    pub fn underlying_price(&self) -> f64 {
        self.underlying_price
    }

    /// Strike price `K`
    #[inline]
    pub fn strike_price(&self) -> f64 {
        self.strike_price
    }

    /// Time to expiration `T` in years
    #[inline]
    pub fn time_to_expiration(&self) -> f64 {
        self.time_to_expiration
    }

    /// Continuously compounded risk-free rate `r`
    #[inline]
    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// Volatility `σ`
    #[inline]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Continuous dividend yield `q`
    #[inline]
    pub fn dividend_yield(&self) -> f64 {
        self.dividend_yield
    }

    /// Read one numeric field
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::UnderlyingPrice => self.underlying_price,
            Field::StrikePrice => self.strike_price,
            Field::TimeToExpiration => self.time_to_expiration,
            Field::RiskFreeRate => self.risk_free_rate,
            Field::Volatility => self.volatility,
            Field::DividendYield => self.dividend_yield,
        }
    }

    /// Copy with one numeric field replaced
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if the new value breaks the field's constraint.
    pub fn with_field(&self, field: Field, value: f64) -> PricingResult<Self> {
        let mut bumped = *self;
        match field {
            Field::UnderlyingPrice => bumped.underlying_price = value,
            Field::StrikePrice => bumped.strike_price = value,
            Field::TimeToExpiration => bumped.time_to_expiration = value,
            Field::RiskFreeRate => bumped.risk_free_rate = value,
            Field::Volatility => bumped.volatility = value,
            Field::DividendYield => bumped.dividend_yield = value,
        }
        bumped.validate()?;
        Ok(bumped)
    }

    /// Copy with a different exercise right
    pub fn with_option_type(&self, option_type: OptionType) -> Self {
        OptionParams {
            option_type,
            ..*self
        }
    }
}
