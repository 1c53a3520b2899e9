//! Canada (Company) calendar.
//!
//! The holiday calendar the benefit-payment tables were produced against.
//! It differs from the usual settlement calendar: fixed-date holidays are
//! not moved off weekends (except Canada Day), Easter Sunday and Easter
//! Monday are both listed, and the National Day for Truth and
//! Reconciliation is observed in every year.

use crate::calendar::Calendar;
use crate::calendars::holiday_set::HolidaySet;
use crate::date::Date;
use crate::weekday::Weekday;
use ps_core::errors::Result;

/// Canada (Company) calendar.
///
/// Weekends and the following holidays are observed:
/// * New Year's Day (Jan 1)
/// * Family Day (3rd Monday of February)
/// * Good Friday, Easter Sunday, Easter Monday
/// * Victoria Day (Monday on or before May 24)
/// * Canada Day (Jul 1; Jul 2 when Jul 1 is a Sunday)
/// * Civic Holiday (1st Monday of August)
/// * Labour Day (1st Monday of September)
/// * National Day for Truth and Reconciliation (Sep 30)
/// * Thanksgiving (2nd Monday of October)
/// * Remembrance Day (Nov 11)
/// * Christmas (Dec 25)
/// * Boxing Day (Dec 26)
#[derive(Debug, Clone, Copy, Default)]
pub struct CompanyCanada;

impl CompanyCanada {
    /// Materialize the holidays of `year` as a [`HolidaySet`].
    pub fn holidays(&self, year: u16) -> Result<HolidaySet> {
        let mut set = HolidaySet::new(format!("{} {year}", self.name()));
        let from = Date::from_ymd(year, 1, 1)?;
        let mut d = from;
        while d.year() == year {
            if self.is_holiday(d) {
                set.insert(d);
            }
            if d.month() == 12 && d.day_of_month() == 31 {
                break;
            }
            d = d.add_days(1)?;
        }
        Ok(set)
    }
}

impl Calendar for CompanyCanada {
    fn name(&self) -> &str {
        "Canada (Company)"
    }

    fn is_holiday(&self, date: Date) -> bool {
        let w = date.weekday();
        let m = date.month();
        let d = date.day_of_month();
        let monday = w == Weekday::Monday;
        let easter_offset = easter_sunday(date.year())
            .map(|easter| easter.days_between(date))
            .unwrap_or(i32::MAX);
        let nth_monday = |n: u8| {
            Date::nth_weekday(n, Weekday::Monday, date.year(), m).map_or(false, |h| h == date)
        };

        // New Year's Day
        (d == 1 && m == 1)
            // Family Day (3rd Monday of February)
            || (m == 2 && nth_monday(3))
            // Good Friday, Easter Sunday, Easter Monday
            || matches!(easter_offset, -2 | 0 | 1)
            // Victoria Day (Monday on or before May 24)
            || (monday && m == 5 && (18..=24).contains(&d))
            // Canada Day (Jul 2 when Jul 1 is a Sunday)
            || (d == 1 && m == 7 && w != Weekday::Sunday)
            || (d == 2 && m == 7 && monday)
            // Civic Holiday, Labour Day (1st Monday of August / September)
            || ((m == 8 || m == 9) && nth_monday(1))
            // National Day for Truth and Reconciliation
            || (d == 30 && m == 9)
            // Thanksgiving (2nd Monday of October)
            || (m == 10 && nth_monday(2))
            // Remembrance Day
            || (d == 11 && m == 11)
            // Christmas, Boxing Day
            || (m == 12 && (d == 25 || d == 26))
    }
}

/// Easter Sunday of `year` (anonymous Gregorian algorithm).
pub fn easter_sunday(year: u16) -> Result<Date> {
    let y = i32::from(year);
    let a = y % 19;
    let b = y / 100;
    let c = y % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    // month is 3 or 4 and day at most 31 for every Gregorian year.
    Date::from_ymd(year, month as u8, day as u8)
}
