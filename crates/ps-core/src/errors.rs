//! Error types for payschedule.
//!
//! Every failure is detected at a boundary: date construction, configuration
//! load, historical-table parsing, or the working-day stepper's iteration
//! cap. The `ensure!` and `fail!` macros defined here are the shorthand used
//! by the other crates to return these errors.

use thiserror::Error;

/// The top-level error type used throughout payschedule.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A malformed or impossible (year, month, day) triple, or date
    /// arithmetic that leaves the supported range.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// The working-day stepper scanned more calendar days than allowed.
    ///
    /// This only happens with a pathological calendar (an unreasonably long
    /// run of holidays) and is never silently truncated.
    #[error("scanned more than {limit} calendar days from {start} without finding enough working days")]
    ConfigurationOverflow {
        /// The date the walk started from.
        start: String,
        /// The iteration cap that was exceeded.
        limit: u32,
    },

    /// Two configuration entries match the same key.
    #[error("ambiguous override: {0}")]
    AmbiguousOverride(String),

    /// A rule book or holiday set could not be parsed or failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// A historical payment table could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Precondition violated.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),
}

/// Shorthand `Result` type used throughout payschedule.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Return `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use ps_core::{ensure, errors::Error};
/// fn day(d: u8) -> ps_core::errors::Result<u8> {
///     ensure!((1..=31).contains(&d), "day {d} out of range");
///     Ok(d)
/// }
/// assert!(day(12).is_ok());
/// assert!(day(32).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Return `Err(Error::Config(...))` immediately.
///
/// # Example
/// ```
/// use ps_core::{fail, errors::Error};
/// fn reject() -> ps_core::errors::Result<()> {
///     fail!("unknown policy {}", "sideways");
/// }
/// assert_eq!(
///     reject(),
///     Err(Error::Config("unknown policy sideways".into()))
/// );
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Config(format!($($msg)*)))
    };
}
