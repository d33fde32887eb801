//! Market conventions for quoted volatilities.
//!
//! Quotes arrive in percentage form and are annualized on a day-count basis.
//! This module holds the percent/decimal conversions used at every API
//! boundary and the rescaling of a vol between calendar-day and trading-day
//! annualization.

use serde::{Deserialize, Serialize};

use crate::validate::pct_input;

/// Number of days used to annualize a volatility.
///
/// - **Calendar365**: every calendar day carries variance. Matches the
///   unadjusted day-counts used by forward-vol computations in this crate.
/// - **Trading252**: only exchange trading days carry variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DayCountBasis {
    #[default]
    Calendar365,
    Trading252,
}

impl DayCountBasis {
    /// Days per year for this basis.
    pub fn days_per_year(self) -> f64 {
        match self {
            DayCountBasis::Calendar365 => 365.0,
            DayCountBasis::Trading252 => 252.0,
        }
    }
}

/// Rescale an annualized vol (percent) from one day-count basis to another.
///
/// Daily variance is preserved, so `σ_to = σ_from · √(days_to / days_from)`.
///
/// # Examples
/// ```
/// use volterm::conventions::{convert_vol_basis, DayCountBasis};
///
/// let vol = convert_vol_basis(20.0, DayCountBasis::Calendar365, DayCountBasis::Trading252)?;
/// assert!((vol - 20.0 * (252.0_f64 / 365.0).sqrt()).abs() < 1e-12);
/// # Ok::<(), volterm::VolTermError>(())
/// ```
///
/// # Errors
/// Returns [`VolTermError::ValidationError`](crate::VolTermError::ValidationError)
/// if `vol_pct` is negative or not finite.
pub fn convert_vol_basis(vol_pct: f64, from: DayCountBasis, to: DayCountBasis) -> crate::error::Result<f64> {
    let vol = pct_input(vol_pct, "vol")?;
    Ok(decimal_to_pct(vol * (to.days_per_year() / from.days_per_year()).sqrt()))
}

/// Convert a percentage quote (40.0) to decimal form (0.40).
pub fn pct_to_decimal(pct: f64) -> f64 {
    pct / 100.0
}

/// Convert a decimal value (0.40) to percentage form (40.0).
pub fn decimal_to_pct(decimal: f64) -> f64 {
    decimal * 100.0
}

/// Round for display. Only used when producing reports; computations keep
/// full precision.
pub fn round_display(value: f64, places: u32) -> f64 {
    let scale = 10f64.powi(places as i32);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn calendar_to_trading_shrinks_vol() {
        let v = convert_vol_basis(40.0, DayCountBasis::Calendar365, DayCountBasis::Trading252).unwrap();
        assert_abs_diff_eq!(v, 33.2363, epsilon = 1e-4);
    }

    #[test]
    fn basis_round_trip() {
        let v = convert_vol_basis(27.5, DayCountBasis::Trading252, DayCountBasis::Calendar365).unwrap();
        let back = convert_vol_basis(v, DayCountBasis::Calendar365, DayCountBasis::Trading252).unwrap();
        assert_abs_diff_eq!(back, 27.5, epsilon = 1e-12);
    }

    #[test]
    fn same_basis_is_identity() {
        let v = convert_vol_basis(18.0, DayCountBasis::Trading252, DayCountBasis::Trading252).unwrap();
        assert_abs_diff_eq!(v, 18.0, epsilon = 1e-12);
    }

    #[test]
    fn negative_vol_rejected() {
        assert!(convert_vol_basis(-1.0, DayCountBasis::Calendar365, DayCountBasis::Trading252).is_err());
    }

    #[test]
    fn round_display_two_places() {
        assert_eq!(round_display(45.738_388, 2), 45.74);
        assert_eq!(round_display(12.345_1, 1), 12.3);
    }
}
