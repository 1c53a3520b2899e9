//! `Calendar` trait — the calendar-provider contract.
//!
//! A calendar knows which dates are weekend days and which are statutory
//! holidays. Everything downstream only asks whether a date is a working
//! day.

use crate::date::Date;

/// A holiday calendar.
///
/// Implementations must be pure: the same date always gives the same answer.
pub trait Calendar: std::fmt::Debug + Send + Sync {
    /// Human-readable name (e.g. `"Canada (Company)"`).
    fn name(&self) -> &str;

    /// Return `true` if `date` is a statutory holiday.
    ///
    /// Weekend status is reported separately by [`Calendar::is_weekend`].
    fn is_holiday(&self, date: Date) -> bool;

    /// Return `true` if `date` is a Saturday or Sunday.
    fn is_weekend(&self, date: Date) -> bool {
        date.weekday().is_weekend()
    }

    /// Return `true` if `date` is neither a weekend day nor a holiday.
    fn is_working_day(&self, date: Date) -> bool {
        !self.is_weekend(date) && !self.is_holiday(date)
    }

    /// Collect the weekday holidays in the inclusive range `[from, to]`.
    fn holiday_list(&self, from: Date, to: Date) -> Vec<Date> {
        let mut out = Vec::new();
        let mut d = from;
        while d <= to {
            if self.is_holiday(d) && !self.is_weekend(d) {
                out.push(d);
            }
            match d.add_days(1) {
                Ok(next) => d = next,
                Err(_) => break,
            }
        }
        out
    }
}

/// A calendar that treats only Saturdays and Sundays as non-working days.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekendsOnly;

impl Calendar for WeekendsOnly {
    fn name(&self) -> &str {
        "Weekends Only"
    }

    fn is_holiday(&self, _date: Date) -> bool {
        false
    }
}
