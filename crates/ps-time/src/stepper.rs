//! Working-day stepper.
//!
//! Walks a calendar one day at a time, counting only working days. Every
//! walk is capped at [`MAX_SCAN_DAYS`] calendar days so that a pathological
//! calendar (say, one that marks every day a holiday) produces
//! [`Error::ConfigurationOverflow`] instead of looping forever.

use crate::calendar::Calendar;
use crate::date::Date;
use ps_core::errors::{Error, Result};

/// Maximum number of calendar days a single walk may scan.
pub const MAX_SCAN_DAYS: u32 = 64;

/// Walk backward from `start` until `n` working days have been consumed.
///
/// `start` itself is never counted. `n == 0` returns `start`.
pub fn walk_back<C: Calendar + ?Sized>(start: Date, n: u32, calendar: &C) -> Result<Date> {
    walk(start, n, -1, calendar)
}

/// Walk forward from `start` until `n` working days have been consumed.
///
/// `start` itself is never counted. `n == 0` returns `start`.
pub fn walk_forward<C: Calendar + ?Sized>(start: Date, n: u32, calendar: &C) -> Result<Date> {
    walk(start, n, 1, calendar)
}

/// Return `date` if it is a working day, otherwise the closest working day
/// before it.
pub fn nearest_working_day_on_or_before<C: Calendar + ?Sized>(
    date: Date,
    calendar: &C,
) -> Result<Date> {
    if calendar.is_working_day(date) {
        Ok(date)
    } else {
        walk_back(date, 1, calendar)
    }
}

/// Last working day of `year`/`month`.
pub fn last_working_day_of_month<C: Calendar + ?Sized>(
    year: u16,
    month: u8,
    calendar: &C,
) -> Result<Date> {
    let last = Date::from_ymd(year, month, 1)?.end_of_month();
    nearest_working_day_on_or_before(last, calendar)
}

fn walk<C: Calendar + ?Sized>(start: Date, n: u32, step: i32, calendar: &C) -> Result<Date> {
    let mut current = start;
    let mut consumed = 0;
    let mut scanned = 0;
    while consumed < n {
        if scanned == MAX_SCAN_DAYS {
            return Err(Error::ConfigurationOverflow {
                start: start.to_string(),
                limit: MAX_SCAN_DAYS,
            });
        }
        current = current.add_days(step)?;
        scanned += 1;
        if calendar.is_working_day(current) {
            consumed += 1;
        }
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::WeekendsOnly;

    fn date(y: u16, m: u8, d: u8) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn walk_back_skips_weekend() {
        // Monday 2024-06-17 → Friday 14th, Thursday 13th
        let cal = WeekendsOnly;
        assert_eq!(walk_back(date(2024, 6, 17), 1, &cal).unwrap(), date(2024, 6, 14));
        assert_eq!(walk_back(date(2024, 6, 17), 2, &cal).unwrap(), date(2024, 6, 13));
    }

    #[test]
    fn zero_steps_is_identity() {
        let cal = WeekendsOnly;
        let sat = date(2024, 6, 15);
        assert_eq!(walk_back(sat, 0, &cal).unwrap(), sat);
        assert_eq!(walk_forward(sat, 0, &cal).unwrap(), sat);
    }

    #[test]
    fn walk_forward_skips_weekend() {
        let cal = WeekendsOnly;
        assert_eq!(walk_forward(date(2024, 6, 14), 1, &cal).unwrap(), date(2024, 6, 17));
    }

    #[test]
    fn nearest_on_or_before() {
        let cal = WeekendsOnly;
        let fri = date(2024, 6, 14);
        assert_eq!(nearest_working_day_on_or_before(fri, &cal).unwrap(), fri);
        assert_eq!(
            nearest_working_day_on_or_before(date(2024, 6, 16), &cal).unwrap(),
            fri
        );
    }

    #[test]
    fn last_working_day() {
        // 2023-12-31 is a Sunday
        let cal = WeekendsOnly;
        assert_eq!(
            last_working_day_of_month(2023, 12, &cal).unwrap(),
            date(2023, 12, 29)
        );
    }
}
