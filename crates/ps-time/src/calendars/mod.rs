//! Concrete calendar implementations.

/// The company Canadian holiday calendar.
pub mod company_canada;

/// Calendars backed by an explicit holiday set.
pub mod holiday_set;

pub use company_canada::CompanyCanada;
pub use holiday_set::HolidaySet;
