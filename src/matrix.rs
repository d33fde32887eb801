//! Pairwise forward-volatility matrix across a strip of expiries.
//!
//! ```
//! use volterm::matrix::ForwardVolMatrixBuilder;
//!
//! let matrix = ForwardVolMatrixBuilder::new()
//!     .trade_date("2024-03-01")
//!     .add_expiry("2024-03-21", 40.0)
//!     .add_expiry("2024-03-31", 42.0)
//!     .add_expiry("2024-04-30", 44.0)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(matrix.len(), 3);
//! assert!(matrix.get(0, 1).is_some());
//! assert!(matrix.get(1, 0).is_none());
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::Date;
use crate::dates::{Clock, IntoDate, format_date};
use crate::error::{Result, VolTermError};
use crate::term_structure::{VarianceTermStructure, sqrt_variance};
use crate::types::Vol;
use crate::validate::pct_input;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Upper-triangular matrix of forward vols.
///
/// Rows and columns are indexed by expiries sorted ascending. Cell `(i, j)`
/// with `i < j` is the forward vol from expiry `i` to expiry `j`; every other
/// cell is `None`. The matrix is not symmetric: a forward from a later to an
/// earlier expiry has no meaning.
///
/// Deserialization enforces the same shape `build` produces: a square grid,
/// strictly ascending expiries, and `null` on and below the diagonal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ForwardVolMatrixRaw", into = "ForwardVolMatrixRaw")]
pub struct ForwardVolMatrix {
    trade_date: Date,
    expiries: Vec<Date>,
    cells: Vec<Vec<Option<Vol>>>,
}

/// Serde intermediary for [`ForwardVolMatrix`].
#[derive(Serialize, Deserialize)]
struct ForwardVolMatrixRaw {
    trade_date: Date,
    expiries: Vec<Date>,
    cells: Vec<Vec<Option<Vol>>>,
}

impl TryFrom<ForwardVolMatrixRaw> for ForwardVolMatrix {
    type Error = VolTermError;

    fn try_from(raw: ForwardVolMatrixRaw) -> Result<Self> {
        let n = raw.expiries.len();
        if raw.cells.len() != n || raw.cells.iter().any(|row| row.len() != n) {
            return Err(VolTermError::ValidationError {
                message: format!("cells must form a {n}x{n} grid, one row and column per expiry"),
            });
        }
        if let Some(w) = raw.expiries.windows(2).find(|w| w[0] >= w[1]) {
            return Err(VolTermError::ValidationError {
                message: format!(
                    "expiries must be strictly ascending, got {} then {}",
                    format_date(w[0]),
                    format_date(w[1])
                ),
            });
        }
        for (i, row) in raw.cells.iter().enumerate() {
            for (j, cell) in row.iter().enumerate() {
                match cell {
                    Some(_) if i >= j => {
                        return Err(VolTermError::ValidationError {
                            message: format!("cell ({i}, {j}) is on or below the diagonal and must be null"),
                        });
                    }
                    Some(vol) if !vol.0.is_finite() || vol.0 < 0.0 => {
                        return Err(VolTermError::ValidationError {
                            message: format!("cell ({i}, {j}) must be a non-negative finite vol, got {}", vol.0),
                        });
                    }
                    _ => {}
                }
            }
        }
        Ok(Self {
            trade_date: raw.trade_date,
            expiries: raw.expiries,
            cells: raw.cells,
        })
    }
}

impl From<ForwardVolMatrix> for ForwardVolMatrixRaw {
    fn from(m: ForwardVolMatrix) -> Self {
        Self {
            trade_date: m.trade_date,
            expiries: m.expiries,
            cells: m.cells,
        }
    }
}

impl ForwardVolMatrix {
    /// Number of expiries (rows = columns).
    pub fn len(&self) -> usize {
        self.expiries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expiries.is_empty()
    }

    /// Trade date every cell is anchored at.
    pub fn trade_date(&self) -> Date {
        self.trade_date
    }

    /// Expiries in ascending order.
    pub fn expiries(&self) -> &[Date] {
        &self.expiries
    }

    /// Row/column labels as `YYYY-MM-DD` strings.
    pub fn labels(&self) -> Vec<String> {
        self.expiries.iter().map(|&d| format_date(d)).collect()
    }

    /// Forward vol from expiry `i` to expiry `j`.
    ///
    /// `None` for `i >= j` or out-of-range indices.
    pub fn get(&self, i: usize, j: usize) -> Option<Vol> {
        self.cells.get(i).and_then(|row| row.get(j)).copied().flatten()
    }

    /// Forward vol between two expiry dates present in the matrix.
    pub fn get_by_date(&self, from: Date, to: Date) -> Option<Vol> {
        let i = self.expiries.binary_search(&from).ok()?;
        let j = self.expiries.binary_search(&to).ok()?;
        self.get(i, j)
    }

    /// Full rows including undefined cells.
    pub fn rows(&self) -> &[Vec<Option<Vol>>] {
        &self.cells
    }

    /// Defined cells only, as `(i, j, vol)` with `i < j`, row-major.
    pub fn iter_defined(&self) -> impl Iterator<Item = (usize, usize, Vol)> + '_ {
        self.cells.iter().enumerate().flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(j, cell)| cell.map(|v| (i, j, v)))
        })
    }
}

/// Builder for [`ForwardVolMatrix`].
///
/// Every cell shares one trade date: either set explicitly with
/// [`trade_date`](Self::trade_date) or taken from a [`Clock`] at build time.
/// Invalid expiries are reported by [`build`](Self::build), not when added.
///
/// # Examples
///
/// ```
/// use volterm::dates::FixedClock;
/// use volterm::matrix::ForwardVolMatrixBuilder;
/// use volterm::Date;
///
/// let clock = FixedClock(Date::from_ymd_opt(2024, 3, 1).unwrap());
/// let matrix = ForwardVolMatrixBuilder::new()
///     .clock(&clock)
///     // input order is not significant
///     .add_expiry("2024-03-31", 42.0)
///     .add_expiry("2024-03-21", 40.0)
///     .build()?;
///
/// assert_eq!(matrix.labels(), vec!["2024-03-21", "2024-03-31"]);
/// let fwd = matrix.get(0, 1).unwrap();
/// assert!((fwd.to_pct() - 45.738).abs() < 1e-3);
/// # Ok::<(), volterm::VolTermError>(())
/// ```
pub struct ForwardVolMatrixBuilder<'a> {
    trade_date: Option<Result<Date>>,
    clock: Option<&'a dyn Clock>,
    expiries: Vec<(Result<Date>, f64)>,
}

impl std::fmt::Debug for ForwardVolMatrixBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardVolMatrixBuilder")
            .field("trade_date", &self.trade_date)
            .field("has_clock", &self.clock.is_some())
            .field("num_expiries", &self.expiries.len())
            .finish()
    }
}

impl<'a> ForwardVolMatrixBuilder<'a> {
    pub fn new() -> Self {
        Self {
            trade_date: None,
            clock: None,
            expiries: Vec::new(),
        }
    }

    /// Anchor every cell at this trade date. Takes precedence over a clock.
    pub fn trade_date(mut self, date: impl IntoDate) -> Self {
        self.trade_date = Some(date.into_date());
        self
    }

    /// Default the trade date to the clock's current date.
    pub fn clock(mut self, clock: &'a dyn Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Add an expiry with its annualized vol in percent.
    pub fn add_expiry(mut self, date: impl IntoDate, vol_pct: f64) -> Self {
        self.expiries.push((date.into_date(), vol_pct));
        self
    }

    /// Add several `(date, vol%)` expiries.
    pub fn add_expiries<D: IntoDate>(mut self, expiries: impl IntoIterator<Item = (D, f64)>) -> Self {
        for (date, vol_pct) in expiries {
            self.expiries.push((date.into_date(), vol_pct));
        }
        self
    }

    /// Compute every `i < j` forward vol.
    ///
    /// # Errors
    /// - [`VolTermError::ValidationError`] if no expiries were added, no
    ///   trade date or clock was given, a vol is negative, or two expiries
    ///   share a date.
    /// - [`VolTermError::ParseError`] if a date could not be resolved.
    /// - [`VolTermError::OrderingError`] if an expiry is on or before the trade date.
    /// - [`VolTermError::DomainError`] if any pair implies negative forward
    ///   variance. No partial matrix is returned.
    pub fn build(self) -> Result<ForwardVolMatrix> {
        #[cfg(feature = "logging")]
        tracing::debug!(n_expiries = self.expiries.len(), "forward vol matrix build started");

        let trade_date = match (self.trade_date, self.clock) {
            (Some(date), _) => date?,
            (None, Some(clock)) => clock.today(),
            (None, None) => {
                return Err(VolTermError::ValidationError {
                    message: "a trade date or clock is required".into(),
                });
            }
        };

        if self.expiries.is_empty() {
            return Err(VolTermError::ValidationError {
                message: "at least one expiry is required".into(),
            });
        }

        let mut quotes: Vec<(Date, f64)> = Vec::with_capacity(self.expiries.len());
        for (date, vol_pct) in self.expiries {
            let date = date?;
            let vol = pct_input(vol_pct, "vol")?;
            quotes.push((date, vol));
        }

        let mut seen = HashSet::with_capacity(quotes.len());
        for (date, _) in &quotes {
            if !seen.insert(*date) {
                return Err(VolTermError::ValidationError {
                    message: format!("duplicate expiry date {}", format_date(*date)),
                });
            }
        }

        quotes.sort_by_key(|&(date, _)| date);

        let ts = VarianceTermStructure::new(trade_date)?;
        let n = quotes.len();
        let quotes = &quotes;
        let fill_row = |i: usize| -> Result<Vec<Option<Vol>>> {
            let (date_i, vol_i) = quotes[i];
            let mut row = vec![None; n];
            for (j, &(date_j, vol_j)) in quotes.iter().enumerate().skip(i + 1) {
                let var = ts.forward_variance_decimal(vol_i, date_i, vol_j, date_j)?;
                row[j] = Some(sqrt_variance(var)?);
            }
            Ok(row)
        };

        #[cfg(feature = "parallel")]
        let cells = (0..n)
            .into_par_iter()
            .map(fill_row)
            .collect::<Result<Vec<_>>>()?;
        #[cfg(not(feature = "parallel"))]
        let cells = (0..n).map(fill_row).collect::<Result<Vec<_>>>()?;

        #[cfg(feature = "logging")]
        tracing::debug!(n_expiries = n, %trade_date, "forward vol matrix build complete");

        Ok(ForwardVolMatrix {
            trade_date,
            expiries: quotes.iter().map(|&(d, _)| d).collect(),
            cells,
        })
    }
}

impl Default for ForwardVolMatrixBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a forward-vol matrix from `(date, vol%)` pairs and a trade date.
pub fn build_forward_vol_matrix<D: IntoDate>(
    expiries: impl IntoIterator<Item = (D, f64)>,
    trade_date: impl IntoDate,
) -> Result<ForwardVolMatrix> {
    ForwardVolMatrixBuilder::new()
        .trade_date(trade_date)
        .add_expiries(expiries)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::FixedClock;
    use approx::assert_abs_diff_eq;

    fn sample_expiries() -> Vec<(&'static str, f64)> {
        vec![
            ("2024-03-21", 40.0),
            ("2024-03-31", 42.0),
            ("2024-04-30", 44.0),
            ("2024-05-31", 46.0),
        ]
    }

    fn sample_matrix() -> ForwardVolMatrix {
        build_forward_vol_matrix(sample_expiries(), "2024-03-01").unwrap()
    }

    #[test]
    fn only_upper_triangle_is_defined() {
        let m = sample_matrix();
        assert_eq!(m.len(), 4);
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(m.get(i, j).is_some(), i < j, "cell ({i}, {j})");
            }
        }
        assert_eq!(m.iter_defined().count(), 6);
    }

    #[test]
    fn cells_match_pairwise_forward_vol() {
        let m = sample_matrix();
        let ts = VarianceTermStructure::new("2024-03-01").unwrap();
        let expected = ts.forward_vol(42.0, "2024-03-31", 46.0, "2024-05-31").unwrap();
        assert_abs_diff_eq!(m.get(1, 3).unwrap().0, expected.0, epsilon = 1e-15);
        assert_abs_diff_eq!(m.get(0, 1).unwrap().to_pct(), 45.7384, epsilon = 1e-4);
    }

    #[test]
    fn unsorted_input_is_sorted() {
        let mut shuffled = sample_expiries();
        shuffled.reverse();
        let m = build_forward_vol_matrix(shuffled, "2024-03-01").unwrap();
        assert_eq!(m, sample_matrix());
        assert_eq!(m.labels()[0], "2024-03-21");
        assert_eq!(m.labels()[3], "2024-05-31");
    }

    #[test]
    fn not_symmetric() {
        let m = sample_matrix();
        assert_ne!(m.get(0, 2), m.get(2, 0));
        assert!(m.get(2, 0).is_none());
    }

    #[test]
    fn lookup_by_date() {
        let m = sample_matrix();
        let a = Date::from_ymd_opt(2024, 3, 21).unwrap();
        let b = Date::from_ymd_opt(2024, 4, 30).unwrap();
        assert_eq!(m.get_by_date(a, b), m.get(0, 2));
        assert!(m.get_by_date(b, a).is_none());
        let missing = Date::from_ymd_opt(2024, 4, 1).unwrap();
        assert!(m.get_by_date(a, missing).is_none());
    }

    #[test]
    fn single_expiry_is_degenerate_not_error() {
        let m = build_forward_vol_matrix([("2024-03-21", 40.0)], "2024-03-01").unwrap();
        assert_eq!(m.len(), 1);
        assert!(m.get(0, 0).is_none());
        assert_eq!(m.iter_defined().count(), 0);
    }

    #[test]
    fn duplicate_dates_rejected() {
        let res = build_forward_vol_matrix([("2024-03-21", 40.0), ("2024-03-21", 41.0)], "2024-03-01");
        assert!(matches!(res, Err(VolTermError::ValidationError { .. })));
    }

    #[test]
    fn empty_input_rejected() {
        let res = build_forward_vol_matrix(Vec::<(&str, f64)>::new(), "2024-03-01");
        assert!(matches!(res, Err(VolTermError::ValidationError { .. })));
    }

    #[test]
    fn missing_trade_date_and_clock_rejected() {
        let res = ForwardVolMatrixBuilder::new().add_expiry("2024-03-21", 40.0).build();
        assert!(matches!(res, Err(VolTermError::ValidationError { .. })));
    }

    #[test]
    fn bad_expiry_string_is_parse_error() {
        let res = build_forward_vol_matrix([("2024-03-21", 40.0), ("31.03.2024", 42.0)], "2024-03-01");
        assert!(matches!(res, Err(VolTermError::ParseError { .. })));
    }

    #[test]
    fn negative_vol_rejected() {
        let res = build_forward_vol_matrix([("2024-03-21", 40.0), ("2024-03-31", -42.0)], "2024-03-01");
        assert!(matches!(res, Err(VolTermError::ValidationError { .. })));
    }

    #[test]
    fn inverted_pair_fails_whole_build() {
        let res = build_forward_vol_matrix([("2024-03-21", 60.0), ("2024-03-31", 30.0)], "2024-03-01");
        assert!(matches!(res, Err(VolTermError::DomainError { .. })));
    }

    #[test]
    fn explicit_trade_date_overrides_clock() {
        let clock = FixedClock(Date::from_ymd_opt(2024, 1, 1).unwrap());
        let m = ForwardVolMatrixBuilder::new()
            .clock(&clock)
            .trade_date("2024-03-01")
            .add_expiries(sample_expiries())
            .build()
            .unwrap();
        assert_eq!(m, sample_matrix());
    }

    #[test]
    fn clock_supplies_default_trade_date() {
        let clock = FixedClock(Date::from_ymd_opt(2024, 3, 1).unwrap());
        let m = ForwardVolMatrixBuilder::new()
            .clock(&clock)
            .add_expiries(sample_expiries())
            .build()
            .unwrap();
        assert_eq!(m.trade_date(), clock.0);
        assert_eq!(m, sample_matrix());
    }

    #[test]
    fn serializes_with_null_for_undefined_cells() {
        let m = build_forward_vol_matrix([("2024-03-21", 40.0), ("2024-03-31", 42.0)], "2024-03-01").unwrap();
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("null"));
        assert!(json.contains("2024-03-31"));
        let back: ForwardVolMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back.expiries(), m.expiries());
        assert_abs_diff_eq!(back.get(0, 1).unwrap().0, m.get(0, 1).unwrap().0, epsilon = 1e-15);
        assert!(back.get(1, 0).is_none());
    }

    #[test]
    fn expiry_on_trade_date_fails_build() {
        let res = build_forward_vol_matrix([("2024-03-01", 38.0), ("2024-03-21", 40.0)], "2024-03-01");
        assert!(matches!(res, Err(VolTermError::OrderingError { .. })));
    }

    #[test]
    fn deserialize_rejects_lower_triangle_value() {
        let json = r#"{"trade_date":"2024-03-01","expiries":["2024-03-21","2024-03-31"],"cells":[[null,0.45],[0.45,null]]}"#;
        assert!(serde_json::from_str::<ForwardVolMatrix>(json).is_err());
    }

    #[test]
    fn deserialize_rejects_diagonal_value() {
        let json = r#"{"trade_date":"2024-03-01","expiries":["2024-03-21","2024-03-31"],"cells":[[0.4,0.45],[null,null]]}"#;
        assert!(serde_json::from_str::<ForwardVolMatrix>(json).is_err());
    }

    #[test]
    fn deserialize_rejects_unsorted_expiries() {
        let json = r#"{"trade_date":"2024-03-01","expiries":["2024-03-31","2024-03-21"],"cells":[[null,0.45],[null,null]]}"#;
        assert!(serde_json::from_str::<ForwardVolMatrix>(json).is_err());
    }

    #[test]
    fn deserialize_rejects_non_square_cells() {
        let json = r#"{"trade_date":"2024-03-01","expiries":["2024-03-21","2024-03-31"],"cells":[[null,0.45]]}"#;
        assert!(serde_json::from_str::<ForwardVolMatrix>(json).is_err());
        let json = r#"{"trade_date":"2024-03-01","expiries":["2024-03-21","2024-03-31"],"cells":[[null,0.45,0.5],[null,null]]}"#;
        assert!(serde_json::from_str::<ForwardVolMatrix>(json).is_err());
    }

    #[test]
    fn raw_conversion_reports_validation_error() {
        let raw = ForwardVolMatrixRaw {
            trade_date: Date::from_ymd_opt(2024, 3, 1).unwrap(),
            expiries: vec![Date::from_ymd_opt(2024, 3, 21).unwrap()],
            cells: vec![vec![Some(Vol(0.4))]],
        };
        assert!(matches!(
            ForwardVolMatrix::try_from(raw),
            Err(VolTermError::ValidationError { .. })
        ));
    }
}
