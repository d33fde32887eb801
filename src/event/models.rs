//! Built-in weighting models.
//!
//! Both models treat the expected move as the one-day standard deviation of
//! the event return. Annualized on the decomposer's basis, the event day
//! carries variance `move² · basis_days`. The diffusive remainder
//! `σ² · T − move² · basis_days` is spread over the non-event days.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{EventInputs, MarginalVariances, WeightingModel};
use crate::error::{Result, VolTermError};
use crate::types::Variance;
use crate::validate::positive_param;

/// Selectable event weighting model.
///
/// Parses from its snake-case name:
///
/// ```
/// use volterm::event::CalendarModel;
///
/// let m: CalendarModel = "expected_move".parse()?;
/// assert_eq!(m, CalendarModel::ExpectedMove);
///
/// let s: CalendarModel = "skewed_diffusion:1.25".parse()?;
/// assert_eq!(s, CalendarModel::SkewedDiffusion { post_to_pre_ratio: 1.25 });
/// # Ok::<(), volterm::VolTermError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarModel {
    /// Equal diffusive vol before and after the event.
    #[default]
    ExpectedMove,
    /// Post-event diffusive vol is `post_to_pre_ratio` times the pre-event vol.
    ///
    /// A ratio below 1 models vol crush after the event.
    SkewedDiffusion {
        /// Must be positive and finite.
        post_to_pre_ratio: f64,
    },
}

impl CalendarModel {
    const EXPECTED_MOVE: &'static str = "expected_move";
    const SKEWED_DIFFUSION: &'static str = "skewed_diffusion";
}

impl FromStr for CalendarModel {
    type Err = VolTermError;

    fn from_str(s: &str) -> Result<Self> {
        let (name, arg) = match s.trim().split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s.trim(), None),
        };
        match (name.to_ascii_lowercase().replace('-', "_").as_str(), arg) {
            (Self::EXPECTED_MOVE, None) => Ok(CalendarModel::ExpectedMove),
            (Self::SKEWED_DIFFUSION, None) => Ok(CalendarModel::SkewedDiffusion { post_to_pre_ratio: 1.0 }),
            (Self::SKEWED_DIFFUSION, Some(arg)) => {
                let ratio: f64 = arg.trim().parse().map_err(|_| VolTermError::ValidationError {
                    message: format!("invalid post/pre ratio {arg:?} in calendar model {s:?}"),
                })?;
                positive_param(ratio, "post/pre ratio")?;
                Ok(CalendarModel::SkewedDiffusion { post_to_pre_ratio: ratio })
            }
            _ => Err(VolTermError::ValidationError {
                message: format!("unknown calendar model {s:?}"),
            }),
        }
    }
}

impl WeightingModel for CalendarModel {
    fn name(&self) -> &str {
        match self {
            CalendarModel::ExpectedMove => Self::EXPECTED_MOVE,
            CalendarModel::SkewedDiffusion { .. } => Self::SKEWED_DIFFUSION,
        }
    }

    fn marginal_variances(&self, inputs: &EventInputs) -> Result<MarginalVariances> {
        let ratio = match *self {
            CalendarModel::ExpectedMove => 1.0,
            CalendarModel::SkewedDiffusion { post_to_pre_ratio } => {
                positive_param(post_to_pre_ratio, "post/pre ratio")?
            }
        };
        split_diffusive(inputs, ratio * ratio)
    }
}

/// Event-day variance from the move, remainder split with
/// `post = post_to_pre_var · pre`.
fn split_diffusive(inputs: &EventInputs, post_to_pre_var: f64) -> Result<MarginalVariances> {
    let event = Variance(inputs.expected_move * inputs.expected_move * inputs.basis.days_per_year());
    let diffusive_total = inputs.whole_period_total().0 - event.0;
    if diffusive_total < 0.0 {
        return Err(VolTermError::DomainError {
            message: format!(
                "expected move {:.4} carries more variance than the whole-period quote allows",
                inputs.expected_move
            ),
            variance: Some(diffusive_total),
        });
    }

    let weight = inputs.days_to_event as f64 + post_to_pre_var * inputs.days_after_event as f64;
    let pre = diffusive_total / weight;
    Ok(MarginalVariances {
        pre_event: Variance(pre),
        event,
        post_event: Variance(post_to_pre_var * pre),
    })
}
