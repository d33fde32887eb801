//! Event volatility decomposition.
//!
//! A single whole-period quote to an expiry that spans a known event (an
//! earnings release, a central bank meeting) is split into three marginal
//! vols: diffusive vol before the event, the event day itself, and diffusive
//! vol after it. The split is chosen by a [`WeightingModel`]; whatever the
//! model, the marginal variances must recombine to the quoted total:
//!
//! ```text
//! σ_pre² · d_pre + σ_evt² · 1 + σ_post² · d_post = σ² · T
//! ```
//!
//! [`EventDecomposer`] checks this identity on every decomposition and
//! rejects models that break it.

pub mod models;

pub use models::CalendarModel;

use serde::{Deserialize, Serialize};

use crate::Date;
use crate::conventions::{DayCountBasis, round_display};
use crate::dates::{IntoDate, days_between, format_date};
use crate::error::{Result, VolTermError};
use crate::term_structure::sqrt_variance;
use crate::types::{Variance, Vol};
use crate::validate::{pct_input, positive_param};

/// Decimal places kept in [`EventReport`] percentages.
pub const REPORT_PRECISION: u32 = 2;

/// Default relative tolerance for the variance reconstruction check.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Inputs handed to a [`WeightingModel`], already validated and in decimal form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventInputs {
    /// Whole-period vol from trade date to expiry.
    pub whole_period_vol: Vol,
    /// Expected event-day move as a decimal (0.05 for 5%).
    pub expected_move: f64,
    pub total_days: i64,
    pub days_to_event: i64,
    pub days_after_event: i64,
    /// Basis used to annualize the one-day event move.
    pub basis: DayCountBasis,
}

impl EventInputs {
    /// Total variance `σ² · T` the marginal variances must reconstruct.
    pub fn whole_period_total(&self) -> Variance {
        self.whole_period_vol.variance().total(self.total_days)
    }
}

/// Annualized marginal variances produced by a [`WeightingModel`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginalVariances {
    pub pre_event: Variance,
    pub event: Variance,
    pub post_event: Variance,
}

/// Strategy that splits a whole-period variance around an event day.
///
/// Implementations must satisfy
/// `pre · days_to_event + event + post · days_after_event = σ² · total_days`.
/// [`EventDecomposer`] verifies this and fails with
/// [`VolTermError::DomainError`] otherwise.
pub trait WeightingModel: Send + Sync + std::fmt::Debug {
    /// Short identifier, recorded in [`EventDecomposition::model`].
    fn name(&self) -> &str;

    /// Compute the three marginal variances.
    fn marginal_variances(&self, inputs: &EventInputs) -> Result<MarginalVariances>;
}

/// Result of an event decomposition, at full precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDecomposition {
    pub pre_event_vol: Vol,
    pub event_vol: Vol,
    pub post_event_vol: Vol,
    pub total_days: i64,
    pub days_to_event: i64,
    pub days_after_event: i64,
    /// Name of the weighting model used.
    pub model: String,
}

impl EventDecomposition {
    /// Day-count weighted variance of the three legs recombined.
    pub fn reconstructed_total(&self) -> Variance {
        Variance(
            self.pre_event_vol.variance().total(self.days_to_event).0
                + self.event_vol.variance().0
                + self.post_event_vol.variance().total(self.days_after_event).0,
        )
    }

    /// Display form: percentages rounded to [`REPORT_PRECISION`] places.
    pub fn to_report(&self) -> EventReport {
        EventReport {
            pre_event_vol: round_display(self.pre_event_vol.to_pct(), REPORT_PRECISION),
            event_vol: round_display(self.event_vol.to_pct(), REPORT_PRECISION),
            post_event_vol: round_display(self.post_event_vol.to_pct(), REPORT_PRECISION),
            total_days: self.total_days,
            days_to_event: self.days_to_event,
            days_after_event: self.days_after_event,
        }
    }
}

/// Rounded, percentage-form decomposition for reports and screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventReport {
    pub pre_event_vol: f64,
    pub event_vol: f64,
    pub post_event_vol: f64,
    pub total_days: i64,
    pub days_to_event: i64,
    pub days_after_event: i64,
}

/// Decomposes whole-period vols around event dates.
///
/// # Examples
///
/// ```
/// use volterm::event::{CalendarModel, EventDecomposer};
///
/// let decomposition = EventDecomposer::new().decompose(
///     "2024-03-01", // trade
///     "2024-03-21", // expiry
///     "2024-03-10", // event
///     40.0,         // whole-period vol, %
///     5.0,          // expected event move, %
///     &CalendarModel::ExpectedMove,
/// )?;
///
/// assert_eq!(decomposition.total_days, 20);
/// assert_eq!(decomposition.days_to_event, 9);
/// assert_eq!(decomposition.days_after_event, 11);
/// # Ok::<(), volterm::VolTermError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventDecomposer {
    basis: DayCountBasis,
    tolerance: f64,
}

impl EventDecomposer {
    /// Calendar-365 basis and a `1e-9` relative reconstruction tolerance.
    pub fn new() -> Self {
        Self {
            basis: DayCountBasis::default(),
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Basis used to annualize the event-day move.
    pub fn basis(mut self, basis: DayCountBasis) -> Self {
        self.basis = basis;
        self
    }

    /// Relative tolerance for the variance reconstruction check.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Split `whole_period_vol_pct` into pre-event, event and post-event vols.
    ///
    /// # Errors
    /// - [`VolTermError::ParseError`] if a date cannot be resolved.
    /// - [`VolTermError::OrderingError`] unless `trade < event < expiry`.
    /// - [`VolTermError::ValidationError`] for a negative vol or move, or an
    ///   unusable tolerance.
    /// - [`VolTermError::DomainError`] if the model yields a negative
    ///   marginal variance or fails to reconstruct the whole-period variance.
    pub fn decompose(
        &self,
        trade_date: impl IntoDate,
        expiry_date: impl IntoDate,
        event_date: impl IntoDate,
        whole_period_vol_pct: f64,
        expected_move_pct: f64,
        model: &dyn WeightingModel,
    ) -> Result<EventDecomposition> {
        let trade = trade_date.into_date()?;
        let expiry = expiry_date.into_date()?;
        let event = event_date.into_date()?;
        check_event_ordering(trade, event, expiry)?;

        let vol = pct_input(whole_period_vol_pct, "whole-period vol")?;
        let expected_move = pct_input(expected_move_pct, "expected move")?;
        positive_param(self.tolerance, "tolerance")?;

        let inputs = EventInputs {
            whole_period_vol: Vol(vol),
            expected_move,
            total_days: days_between(trade, expiry),
            days_to_event: days_between(trade, event),
            days_after_event: days_between(event, expiry),
            basis: self.basis,
        };

        #[cfg(feature = "logging")]
        tracing::debug!(
            model = model.name(),
            total_days = inputs.total_days,
            days_to_event = inputs.days_to_event,
            "event decomposition started"
        );

        let marginals = model.marginal_variances(&inputs)?;
        self.check_reconstruction(&inputs, &marginals, model.name())?;

        Ok(EventDecomposition {
            pre_event_vol: sqrt_variance(marginals.pre_event)?,
            event_vol: sqrt_variance(marginals.event)?,
            post_event_vol: sqrt_variance(marginals.post_event)?,
            total_days: inputs.total_days,
            days_to_event: inputs.days_to_event,
            days_after_event: inputs.days_after_event,
            model: model.name().to_string(),
        })
    }

    fn check_reconstruction(&self, inputs: &EventInputs, m: &MarginalVariances, model: &str) -> Result<()> {
        for (leg, var) in [("pre-event", m.pre_event), ("event", m.event), ("post-event", m.post_event)] {
            if !var.0.is_finite() || var.0 < 0.0 {
                return Err(VolTermError::DomainError {
                    message: format!("{model} produced invalid {leg} variance {}", var.0),
                    variance: Some(var.0),
                });
            }
        }

        let target = inputs.whole_period_total().0;
        let recombined = m.pre_event.total(inputs.days_to_event).0
            + m.event.0
            + m.post_event.total(inputs.days_after_event).0;
        let residual = (recombined - target).abs();
        if residual > self.tolerance * target.max(f64::MIN_POSITIVE) {
            return Err(VolTermError::DomainError {
                message: format!(
                    "{model} marginal variances recombine to {recombined}, expected {target} (residual {residual})"
                ),
                variance: Some(recombined),
            });
        }
        Ok(())
    }
}

impl Default for EventDecomposer {
    fn default() -> Self {
        Self::new()
    }
}

/// Decompose with the default [`EventDecomposer`] settings.
pub fn decompose(
    trade_date: impl IntoDate,
    expiry_date: impl IntoDate,
    event_date: impl IntoDate,
    whole_period_vol_pct: f64,
    expected_move_pct: f64,
    model: &dyn WeightingModel,
) -> Result<EventDecomposition> {
    EventDecomposer::new().decompose(
        trade_date,
        expiry_date,
        event_date,
        whole_period_vol_pct,
        expected_move_pct,
        model,
    )
}

fn check_event_ordering(trade: Date, event: Date, expiry: Date) -> Result<()> {
    if trade < event && event < expiry {
        return Ok(());
    }
    Err(VolTermError::OrderingError {
        message: format!(
            "event date {} must be strictly between trade date {} and expiry {}",
            format_date(event),
            format_date(trade),
            format_date(expiry)
        ),
    })
}
