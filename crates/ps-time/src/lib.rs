//! # ps-time
//!
//! Date, weekday, month, and calendar types, plus the working-day stepper
//! that the payment resolver is built on.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Calendar trait and the weekends-only calendar.
pub mod calendar;

/// Concrete calendar implementations.
pub mod calendars;

/// `Date` type.
pub mod date;

/// `Month` — month of the year.
pub mod month;

/// Working-day walks over a calendar.
pub mod stepper;

/// `Weekday` — day of the week.
pub mod weekday;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use calendar::{Calendar, WeekendsOnly};
pub use calendars::{CompanyCanada, HolidaySet};
pub use date::Date;
pub use month::Month;
pub use stepper::{
    last_working_day_of_month, nearest_working_day_on_or_before, walk_back, walk_forward,
    MAX_SCAN_DAYS,
};
pub use weekday::Weekday;
