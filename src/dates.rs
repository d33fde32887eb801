//! Date normalization and unadjusted day-counts.
//!
//! Public entry points accept dates as [`NaiveDate`], [`NaiveDateTime`] or
//! canonical `YYYY-MM-DD` strings. Each input is resolved exactly once on
//! entry through [`IntoDate`]; only [`Date`] values flow further.
//!
//! Day-counts are plain calendar-day differences. Weekends and holidays are
//! not skipped; callers needing trading-day counts must adjust externally.

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::Date;
use crate::error::{Result, VolTermError};

/// Canonical textual date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Conversion of a date-like value into a canonical [`Date`].
pub trait IntoDate {
    /// Resolve into a calendar date.
    ///
    /// # Errors
    /// Returns [`VolTermError::ParseError`] for strings not in `YYYY-MM-DD` form.
    fn into_date(self) -> Result<Date>;
}

impl IntoDate for NaiveDate {
    fn into_date(self) -> Result<Date> {
        Ok(self)
    }
}

impl IntoDate for &NaiveDate {
    fn into_date(self) -> Result<Date> {
        Ok(*self)
    }
}

impl IntoDate for NaiveDateTime {
    fn into_date(self) -> Result<Date> {
        Ok(self.date())
    }
}

impl IntoDate for &str {
    fn into_date(self) -> Result<Date> {
        parse_date(self)
    }
}

impl IntoDate for String {
    fn into_date(self) -> Result<Date> {
        parse_date(&self)
    }
}

impl IntoDate for &String {
    fn into_date(self) -> Result<Date> {
        parse_date(self)
    }
}

/// Resolve any supported date input to a [`Date`].
///
/// # Examples
/// ```
/// use volterm::dates::resolve;
///
/// let d = resolve("2024-03-21")?;
/// assert_eq!(d, resolve(d)?);
/// assert!(resolve("21/03/2024").is_err());
/// # Ok::<(), volterm::VolTermError>(())
/// ```
pub fn resolve(value: impl IntoDate) -> Result<Date> {
    value.into_date()
}

/// Whole calendar days from `a` to `b` (`b - a`, may be negative).
pub fn days_between(a: Date, b: Date) -> i64 {
    (b - a).num_days()
}

/// Strict `YYYY-MM-DD`: four-digit year, two-digit month and day.
fn parse_date(input: &str) -> Result<Date> {
    let bytes = input.as_bytes();
    let canonical = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !canonical {
        return Err(VolTermError::ParseError {
            input: input.to_string(),
            message: "expected YYYY-MM-DD".into(),
        });
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|e| VolTermError::ParseError {
        input: input.to_string(),
        message: e.to_string(),
    })
}

/// Format a date in canonical `YYYY-MM-DD` form.
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Source of "today" for computations that default their trade date.
///
/// Computations never read the system clock on their own; callers pass a
/// clock (or an explicit trade date) in.
pub trait Clock: Send + Sync {
    fn today(&self) -> Date;
}

/// A clock pinned to one date. Use for tests and reproducible runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}

/// The local calendar date of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        Local::now().date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Date {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn string_and_structured_resolve_to_same_date() {
        let from_str = resolve("2024-03-21").unwrap();
        let from_string = resolve(String::from("2024-03-21")).unwrap();
        let from_date = resolve(ymd(2024, 3, 21)).unwrap();
        let from_datetime = resolve(ymd(2024, 3, 21).and_hms_opt(15, 30, 0).unwrap()).unwrap();
        assert_eq!(from_str, from_date);
        assert_eq!(from_string, from_date);
        assert_eq!(from_datetime, from_date);
    }

    #[test]
    fn non_canonical_strings_are_parse_errors() {
        for bad in ["21/03/2024", "2024-3-21", "2024/03/21", "", "2024-03-21T00:00", " 2024-03-21", "abcd-ef-gh"] {
            assert!(
                matches!(resolve(bad), Err(VolTermError::ParseError { .. })),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn impossible_calendar_date_is_parse_error() {
        assert!(matches!(
            resolve("2023-02-29"),
            Err(VolTermError::ParseError { .. })
        ));
        assert!(resolve("2024-02-29").is_ok());
    }

    #[test]
    fn days_between_is_signed() {
        let a = ymd(2024, 3, 1);
        let b = ymd(2024, 3, 21);
        assert_eq!(days_between(a, b), 20);
        assert_eq!(days_between(b, a), -20);
        assert_eq!(days_between(a, a), 0);
    }

    #[test]
    fn days_between_ignores_weekends() {
        // Friday to Monday
        assert_eq!(days_between(ymd(2024, 3, 1), ymd(2024, 3, 4)), 3);
    }

    #[test]
    fn days_between_crosses_leap_day() {
        assert_eq!(days_between(ymd(2024, 2, 28), ymd(2024, 3, 1)), 2);
    }

    #[test]
    fn fixed_clock_returns_its_date() {
        let clock = FixedClock(ymd(2024, 3, 1));
        assert_eq!(clock.today(), ymd(2024, 3, 1));
    }

    #[test]
    fn format_is_canonical() {
        assert_eq!(format_date(ymd(2024, 3, 1)), "2024-03-01");
    }
}
