// src/error.rs
use thiserror::Error;

/// Error kinds shared by the analytic and simulation engines.
///
/// Both engines validate through the same [`validation`] helpers so the two
/// models never disagree about which inputs are acceptable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    /// Option type outside {Call, Put}
    #[error("Invalid option type '{value}': expected 'Call' or 'Put'")]
    InvalidOptionType { value: String },

    /// A numeric field violates its constraint
    #[error("Invalid parameter '{parameter}' = {value}: {constraint}")]
    InvalidParameter {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Closed-form ratio is undefined (σ·√T = 0)
    #[error("Degenerate input: {reason}")]
    DegenerateInput { reason: String },

    /// Caller-supplied random draw matrix has the wrong shape
    #[error("Random draw matrix has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Estimator produced a non-finite value
    #[error("Numerical instability in {method}: {reason}")]
    NumericalInstability { method: String, reason: String },
}

/// Result type alias for pricing operations
pub type PricingResult<T> = Result<T, PricingError>;

/// Validation utilities
pub mod validation {
    use super::{PricingError, PricingResult};

    /// Validate that a parameter is finite and strictly positive
    pub fn validate_positive(name: &str, value: f64) -> PricingResult<()> {
        validate_finite(name, value)?;
        if value <= 0.0 {
            Err(PricingError::InvalidParameter {
                parameter: name.to_string(),
                value,
                constraint: "must be positive (> 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is finite and non-negative
    pub fn validate_non_negative(name: &str, value: f64) -> PricingResult<()> {
        validate_finite(name, value)?;
        if value < 0.0 {
            Err(PricingError::InvalidParameter {
                parameter: name.to_string(),
                value,
                constraint: "must be non-negative (≥ 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> PricingResult<()> {
        if !value.is_finite() {
            Err(PricingError::InvalidParameter {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate the number of simulated trials
    pub fn validate_num_simulations(num_simulations: usize) -> PricingResult<()> {
        if num_simulations == 0 {
            Err(PricingError::InvalidParameter {
                parameter: "num_simulations".to_string(),
                value: 0.0,
                constraint: "must be a positive integer".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that `σ·√T` is usable as a denominator
    pub fn validate_vol_time(sigma: f64, t: f64) -> PricingResult<()> {
        let vol_sqrt_t = sigma * t.sqrt();
        if vol_sqrt_t <= 0.0 {
            Err(PricingError::DegenerateInput {
                reason: format!(
                    "σ·√T = {} (σ = {}, T = {}); closed-form ratio is undefined",
                    vol_sqrt_t, sigma, t
                ),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("sigma", 0.2).is_ok());
        assert!(validate_positive("sigma", 0.0).is_err());
        assert!(validate_positive("sigma", -0.1).is_err());
        assert!(validate_positive("sigma", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("dividend_yield", 0.0).is_ok());
        assert!(validate_non_negative("dividend_yield", 0.03).is_ok());
        assert!(validate_non_negative("dividend_yield", -0.01).is_err());
        assert!(validate_non_negative("dividend_yield", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_finite() {
        assert!(validate_finite("value", 1.0).is_ok());
        assert!(validate_finite("value", f64::NAN).is_err());
        assert!(validate_finite("value", f64::INFINITY).is_err());
        assert!(validate_finite("value", f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_validate_vol_time() {
        assert!(validate_vol_time(0.2, 1.0).is_ok());
        assert!(matches!(
            validate_vol_time(0.0, 1.0),
            Err(PricingError::DegenerateInput { .. })
        ));
    }

    #[test]
    fn test_error_display() {
        let error = PricingError::InvalidParameter {
            parameter: "strike_price".to_string(),
            value: -5.0,
            constraint: "must be positive".to_string(),
        };

        let display = format!("{}", error);
        assert!(display.contains("strike_price"));
        assert!(display.contains("-5"));
        assert!(display.contains("positive"));
    }

    #[test]
    fn test_shape_mismatch_display() {
        let error = PricingError::ShapeMismatch {
            expected: (5, 365),
            actual: (5, 10),
        };

        let display = format!("{}", error);
        assert!(display.contains("(5, 10)"));
        assert!(display.contains("(5, 365)"));
    }
}
