//! Error types for the volterm library.
//!
//! Every fallible operation returns `Result<T, VolTermError>`. Errors are
//! raised where they are detected and passed through unchanged; a call either
//! succeeds completely or returns one of these variants.

use thiserror::Error;

/// Convenience type alias for results in this crate.
pub type Result<T> = std::result::Result<T, VolTermError>;

/// Errors that can occur while computing forward vols and event decompositions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VolTermError {
    /// A date input is not in canonical `YYYY-MM-DD` form.
    #[error("cannot parse date {input:?}: {message}")]
    ParseError {
        /// The rejected input, verbatim.
        input: String,
        message: String,
    },

    /// A volatility, move size or model parameter is negative, non-finite,
    /// or otherwise unusable (e.g. duplicate expiries).
    #[error("invalid input: {message}")]
    ValidationError { message: String },

    /// Required date ordering is violated.
    #[error("date ordering violated: {message}")]
    OrderingError { message: String },

    /// A variance is negative where a square root is required, or an event
    /// decomposition fails to reconstruct the whole-period variance.
    #[error("domain error: {message}")]
    DomainError {
        message: String,
        /// The offending variance, if one was computed.
        variance: Option<f64>,
    },
}
