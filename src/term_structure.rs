//! Forward variance and forward volatility between quoted maturities.
//!
//! Total variance is additive across contiguous periods once weighted by
//! day-count. Given cumulative quotes `σ₁` to `d₁` and `σ₂` to `d₂`, the
//! variance implied for the gap `(d₁, d₂]` solves
//!
//! ```text
//! σ₂² · t₂ = σ₁² · t₁ + σ_f² · (t₂ − t₁)
//! ```
//!
//! where `t` counts calendar days from the trade date. A negative `σ_f²`
//! means the two quotes are mutually inconsistent (a term-structure
//! inversion); it is returned as-is from [`VarianceTermStructure::forward_variance`]
//! and rejected by [`VarianceTermStructure::forward_vol`].

use serde::{Deserialize, Serialize};

use crate::Date;
use crate::dates::{Clock, IntoDate, days_between, format_date};
use crate::error::{Result, VolTermError};
use crate::types::{Variance, Vol};
use crate::validate::pct_input;

/// Variance term structure anchored at a trade date.
///
/// The structure itself holds no quotes; it fixes the date from which
/// day-counts are measured so that every forward computed from it is
/// consistent.
///
/// # Examples
///
/// ```
/// use volterm::term_structure::VarianceTermStructure;
///
/// let ts = VarianceTermStructure::new("2024-03-01")?;
/// let fwd = ts.forward_vol(40.0, "2024-03-21", 42.0, "2024-03-31")?;
/// assert!((fwd.to_pct() - 45.738).abs() < 1e-3);
/// # Ok::<(), volterm::VolTermError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarianceTermStructure {
    trade_date: Date,
}

impl VarianceTermStructure {
    /// Anchor a term structure at `trade_date`.
    ///
    /// # Errors
    /// Returns [`VolTermError::ParseError`] if the date cannot be resolved.
    pub fn new(trade_date: impl IntoDate) -> Result<Self> {
        Ok(Self {
            trade_date: trade_date.into_date()?,
        })
    }

    /// Anchor a term structure at the clock's current date.
    pub fn today(clock: &dyn Clock) -> Self {
        Self {
            trade_date: clock.today(),
        }
    }

    pub fn trade_date(&self) -> Date {
        self.trade_date
    }

    /// Calendar days from the trade date to `date`.
    pub fn days_to(&self, date: Date) -> i64 {
        days_between(self.trade_date, date)
    }

    /// Cumulative variance `σ² × days` from the trade date to `date`.
    ///
    /// A date on the trade date has zero total variance.
    ///
    /// # Errors
    /// [`VolTermError::ValidationError`] for a negative vol,
    /// [`VolTermError::ParseError`] for an unresolvable date,
    /// [`VolTermError::OrderingError`] for a date before the trade date.
    pub fn total_variance(&self, vol_pct: f64, date: impl IntoDate) -> Result<Variance> {
        let vol = pct_input(vol_pct, "vol")?;
        let date = date.into_date()?;
        let days = self.days_to(date);
        if days < 0 {
            return Err(VolTermError::OrderingError {
                message: format!(
                    "expiry {} is before trade date {}",
                    format_date(date),
                    format_date(self.trade_date)
                ),
            });
        }
        Ok(Vol(vol).variance().total(days))
    }

    /// Annualized forward variance between `date1` and `date2`.
    ///
    /// Vols are in percent. The result may be negative when the quotes imply
    /// declining total variance; it is never clamped.
    ///
    /// # Errors
    /// - [`VolTermError::ValidationError`] if either vol is negative or not finite.
    /// - [`VolTermError::ParseError`] if either date cannot be resolved.
    /// - [`VolTermError::OrderingError`] unless `date2` is strictly after
    ///   `date1` measured from the trade date, or if `date1` is not strictly
    ///   after the trade date.
    pub fn forward_variance(
        &self,
        vol1_pct: f64,
        date1: impl IntoDate,
        vol2_pct: f64,
        date2: impl IntoDate,
    ) -> Result<Variance> {
        let vol1 = pct_input(vol1_pct, "vol1")?;
        let vol2 = pct_input(vol2_pct, "vol2")?;
        let date1 = date1.into_date()?;
        let date2 = date2.into_date()?;
        self.forward_variance_decimal(vol1, date1, vol2, date2)
    }

    /// Annualized forward volatility between `date1` and `date2`, in decimal form.
    ///
    /// # Errors
    /// Everything [`forward_variance`](Self::forward_variance) returns, plus
    /// [`VolTermError::DomainError`] when the forward variance is negative.
    pub fn forward_vol(
        &self,
        vol1_pct: f64,
        date1: impl IntoDate,
        vol2_pct: f64,
        date2: impl IntoDate,
    ) -> Result<Vol> {
        let var = self.forward_variance(vol1_pct, date1, vol2_pct, date2)?;
        sqrt_variance(var)
    }

    /// Forward variance on already-resolved decimal inputs.
    pub(crate) fn forward_variance_decimal(
        &self,
        vol1: f64,
        date1: Date,
        vol2: f64,
        date2: Date,
    ) -> Result<Variance> {
        let t1 = self.days_to(date1);
        let t2 = self.days_to(date2);
        if t1 <= 0 {
            return Err(VolTermError::OrderingError {
                message: format!(
                    "first expiry {} must be after trade date {}",
                    format_date(date1),
                    format_date(self.trade_date)
                ),
            });
        }
        if t2 <= t1 {
            return Err(VolTermError::OrderingError {
                message: format!(
                    "second expiry {} ({t2}d) must be after first expiry {} ({t1}d) from trade date {}",
                    format_date(date2),
                    format_date(date1),
                    format_date(self.trade_date)
                ),
            });
        }

        let var1 = Vol(vol1).variance().total(t1);
        let var2 = Vol(vol2).variance().total(t2);
        Ok(Variance((var2.0 - var1.0) / (t2 - t1) as f64))
    }
}

/// Square root of a forward variance, rejecting negative values.
///
/// A zero variance is a valid zero-vol period and returns `Vol(0.0)`.
pub(crate) fn sqrt_variance(var: Variance) -> Result<Vol> {
    if var.0 < 0.0 {
        return Err(VolTermError::DomainError {
            message: format!("forward variance {} is negative; quotes imply a term-structure inversion", var.0),
            variance: Some(var.0),
        });
    }
    Ok(Vol(var.0.sqrt()))
}

/// Forward variance with an explicit trade date.
///
/// Equivalent to `VarianceTermStructure::new(trade_date)?.forward_variance(..)`.
pub fn forward_variance(
    vol1_pct: f64,
    date1: impl IntoDate,
    vol2_pct: f64,
    date2: impl IntoDate,
    trade_date: impl IntoDate,
) -> Result<Variance> {
    VarianceTermStructure::new(trade_date)?.forward_variance(vol1_pct, date1, vol2_pct, date2)
}

/// Forward volatility (decimal) with an explicit trade date.
pub fn forward_vol(
    vol1_pct: f64,
    date1: impl IntoDate,
    vol2_pct: f64,
    date2: impl IntoDate,
    trade_date: impl IntoDate,
) -> Result<Vol> {
    VarianceTermStructure::new(trade_date)?.forward_vol(vol1_pct, date1, vol2_pct, date2)
}
