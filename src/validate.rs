//! Input checks shared by every public entry point.
//!
//! Quotes cross the API in percent and are checked once, here, before any
//! day-count arithmetic. `!is_finite()` covers NaN and both infinities.

use crate::conventions::pct_to_decimal;
use crate::error::{Result, VolTermError};

/// Check a percentage quote (vol or expected move) and return it in decimal form.
///
/// Zero is a valid quote; negative and non-finite values are not.
pub(crate) fn pct_input(pct: f64, name: &str) -> Result<f64> {
    if !pct.is_finite() || pct < 0.0 {
        return Err(VolTermError::ValidationError {
            message: format!("{name} must be a non-negative percentage, got {pct}"),
        });
    }
    Ok(pct_to_decimal(pct))
}

/// Check a model or decomposer parameter that must be strictly positive.
pub(crate) fn positive_param(value: f64, name: &str) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(VolTermError::ValidationError {
            message: format!("{name} must be greater than zero, got {value}"),
        });
    }
    Ok(value)
}
