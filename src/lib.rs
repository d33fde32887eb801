//! # volterm
//!
//! Volatility term-structure analytics on calendar dates.
//!
//! Takes volatility quotes at future expiries and derives what they imply
//! about the periods in between: forward variance, forward vol matrices
//! across a strip of expiries, and the split of a quote around a known
//! event date.
//!
//! ## Architecture
//!
//! - **`dates`** — Date normalization, unadjusted day-counts, injectable clock
//! - **`term_structure`** — Forward variance / forward vol between two quotes
//! - **`matrix`** — Pairwise forward vol matrix over many expiries
//! - **`event`** — Pre-event / event / post-event vol decomposition
//! - **`conventions`** — Day-count basis conversion and percent handling
//!
//! ## Design
//!
//! - **Percent in, newtypes out.** Vols are passed as percentages (40.0 for
//!   40%); results come back as [`Vol`] and [`Variance`] in decimal form.
//!   Rounding happens only in report types.
//! - **Dates resolved once.** Every entry point accepts `NaiveDate`,
//!   `NaiveDateTime` or `YYYY-MM-DD` strings via [`IntoDate`](dates::IntoDate)
//!   and converts immediately.
//! - **No hidden clock.** Trade dates are passed explicitly or come from a
//!   caller-supplied [`Clock`](dates::Clock).
//! - **No panics.** Every fallible operation returns [`Result`].
//! - **Pure and thread-safe.** Nothing holds mutable state; all public types
//!   are `Send + Sync`.

pub mod conventions;
pub mod dates;
pub mod error;
pub mod event;
pub mod matrix;
pub mod term_structure;
pub mod types;
mod validate;

/// Calendar date used throughout the crate.
pub type Date = chrono::NaiveDate;

#[doc(inline)]
pub use error::{Result, VolTermError};
#[doc(inline)]
pub use event::{CalendarModel, EventDecomposer, EventDecomposition, WeightingModel};
#[doc(inline)]
pub use matrix::{ForwardVolMatrix, ForwardVolMatrixBuilder};
#[doc(inline)]
pub use term_structure::{VarianceTermStructure, forward_variance, forward_vol};
#[doc(inline)]
pub use types::{Variance, Vol, VolQuote};
