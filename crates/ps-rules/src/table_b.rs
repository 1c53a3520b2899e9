//! Table B: a fixed offset from Table A.

use crate::resolver::{AppliedRule, Payment, PaymentResolver};
use ps_core::errors::Result;
use ps_time::{Calendar, Date};

/// Calendar days between a Table A payment and the Table B payment.
pub const TABLE_B_OFFSET_DAYS: i32 = 7;

/// Resolve `run_date` for Table B.
///
/// Run dates December 25–27 pay on January 1 of the following year. All
/// other run dates pay [`TABLE_B_OFFSET_DAYS`] after the Table A payment,
/// which may land in a later month than the run date.
///
/// # Errors
/// As [`PaymentResolver::resolve`], plus [`ps_core::Error::InvalidDate`]
/// for run dates whose payment falls after 2199-12-31.
///
/// # Example
/// ```
/// use ps_rules::{resolve_table_b, PaymentResolver};
/// use ps_time::{CompanyCanada, Date};
///
/// let resolver = PaymentResolver::standard();
/// let run = Date::from_ymd(2024, 12, 26).unwrap();
/// let paid = resolve_table_b(&resolver, run, &CompanyCanada).unwrap();
/// assert_eq!(paid.date(), Date::from_ymd(2025, 1, 1).unwrap());
/// ```
pub fn resolve_table_b<C: Calendar + ?Sized>(
    resolver: &PaymentResolver,
    run_date: Date,
    calendar: &C,
) -> Result<Payment> {
    let table_a = resolver.resolve(run_date, calendar)?;
    if run_date.month() == 12 && (25..=27).contains(&run_date.day_of_month()) {
        let new_year = Date::from_ymd(run_date.year() + 1, 1, 1)?;
        return Ok(table_a.shifted(new_year, AppliedRule::TableBYearEnd));
    }
    let offset = table_a.date().add_days(TABLE_B_OFFSET_DAYS)?;
    Ok(table_a.shifted(offset, AppliedRule::TableBOffset))
}
