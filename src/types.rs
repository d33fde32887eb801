//! Core value types for term-structure computations.
//!
//! **Outputs use newtypes**: [`Vol`] and [`Variance`] wrap decimal results so
//! a forward vol cannot be silently passed where a forward variance is
//! expected. **Inputs use bare `f64`** in percentage form (40.0 means 40%),
//! the way quotes arrive from market-data screens.
//!
//! # Why no `Eq` or `Ord`?
//! These types wrap `f64`, which does not implement `Eq` or `Ord` because `NaN`
//! breaks total ordering. We derive `PartialEq` and `PartialOrd` only.

use serde::{Deserialize, Serialize};

use crate::Date;
use crate::conventions::decimal_to_pct;

/// Annualized volatility `σ` in decimal form.
///
/// # Examples
/// ```
/// use volterm::types::Vol;
/// let vol = Vol(0.40);
/// assert!((vol.to_pct() - 40.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Vol(pub f64);

impl Vol {
    /// The volatility in percentage form.
    pub fn to_pct(self) -> f64 {
        decimal_to_pct(self.0)
    }

    /// Square into an annualized variance `σ²`.
    pub fn variance(self) -> Variance {
        Variance(self.0 * self.0)
    }
}

/// Annualized variance `σ²` in decimal form.
///
/// Variance is additive across contiguous periods once weighted by
/// day-count: the total variance to a date `d` is `σ² × days(trade, d)`.
///
/// # Examples
/// ```
/// use volterm::types::Variance;
/// let var = Variance(0.16); // 40% vol
/// assert!((var.total(20).0 - 3.2).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Variance(pub f64);

impl Variance {
    /// Day-count weighted total variance `σ² × days`.
    pub fn total(self, days: i64) -> Variance {
        Variance(self.0 * days as f64)
    }
}

/// A market volatility quote: expiry date and annualized vol in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolQuote {
    /// Expiry date of the quote.
    pub date: Date,
    /// Annualized volatility in percentage form.
    pub vol_pct: f64,
}

impl VolQuote {
    pub fn new(date: Date, vol_pct: f64) -> Self {
        Self { date, vol_pct }
    }
}
