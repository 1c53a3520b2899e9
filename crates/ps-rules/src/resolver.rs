//! Payment date resolver.
//!
//! `PaymentResolver::resolve` maps a run date and a holiday calendar to the
//! date a payment is scheduled on. It is a one-shot classify-then-dispatch
//! function with no state between calls:
//!
//! 1. The Christmas window and New Year days 1–3 are calendar-anchored:
//!    their fixed mappings apply to the run date as given.
//! 2. Otherwise a weekend run date moves to the Friday of its week and a
//!    holiday moves to the preceding working day, and classification starts
//!    over on the new date.
//! 3. The working-day run date is classified and its zone rule applied. All
//!    zones fall back to the generic rule: two working days back, with a
//!    gap guard for unusually long same-month gaps.
//!
//! The payment date is never after the run date.

use crate::rulebook::{CrossMonthPolicy, RuleBook};
use crate::zone::{classify, Zone};
use ps_core::errors::{Error, Result};
use ps_time::{last_working_day_of_month, nearest_working_day_on_or_before, walk_back, Calendar, Date};
use tracing::{debug, warn};

/// Working days between run date and payment under the generic rule.
pub const GENERIC_WORKING_DAYS_BACK: u32 = 2;

/// Same-month gaps larger than this many days trigger the gap guard.
pub const GAP_GUARD_THRESHOLD: u8 = 10;

/// The gap guard never places a payment more than this many days before
/// the run day.
pub const GAP_GUARD_CLAMP: u8 = 7;

/// Normalization passes before dispatch: weekend, holiday, dispatch.
const MAX_PASSES: u32 = 3;

/// A day of month in `[1, 31]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PaymentDay(u8);

impl PaymentDay {
    /// Validate a raw day-of-month.
    pub fn new(day: u8) -> Result<Self> {
        ps_core::ensure!((1..=31).contains(&day), "payment day {day} out of range [1, 31]");
        Ok(Self(day))
    }

    /// The day of month.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl From<Date> for PaymentDay {
    fn from(date: Date) -> Self {
        Self(date.day_of_month())
    }
}

impl std::fmt::Display for PaymentDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// Which rule produced a payment date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppliedRule {
    /// Two working days back.
    Generic,
    /// Generic result clamped by the gap guard.
    GapGuard,
    /// Generic result moved one day later for a month-edge Tuesday.
    WeekdayBias,
    /// A cross-month table entry replaced the candidate.
    CrossMonthOverride,
    /// A fixed Christmas-window pair.
    ChristmasFixed,
    /// Last working day on or before the Christmas cutoff.
    ChristmasCutoff,
    /// Second-to-last working day of the previous December.
    NewYearSecondToLast,
    /// Last working day of the previous December.
    NewYearLast,
    /// Table B: seven calendar days after Table A.
    TableBOffset,
    /// Table B: Dec 25–27 pay on the following January 1.
    TableBYearEnd,
}

/// The outcome of resolving one run date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    run_date: Date,
    effective_date: Date,
    zone: Zone,
    date: Date,
    rule: AppliedRule,
    review: Option<String>,
}

impl Payment {
    /// The run date that was resolved.
    pub fn run_date(&self) -> Date {
        self.run_date
    }

    /// The run date after weekend/holiday normalization.
    pub fn effective_date(&self) -> Date {
        self.effective_date
    }

    /// Zone of the effective run date.
    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// The absolute payment date.
    pub fn date(&self) -> Date {
        self.date
    }

    /// The reported payment day.
    pub fn day(&self) -> PaymentDay {
        PaymentDay::from(self.date)
    }

    /// The rule that produced [`Payment::date`].
    pub fn rule(&self) -> AppliedRule {
        self.rule
    }

    /// Note attached when an unresolved override matched.  Such payments
    /// carry the generic candidate and need a manual decision.
    pub fn review_note(&self) -> Option<&str> {
        self.review.as_deref()
    }

    /// Return `true` if the payment date lies in an earlier month than the
    /// effective run date.
    pub fn is_cross_month(&self) -> bool {
        !self.date.same_month(self.effective_date)
    }

    pub(crate) fn shifted(self, date: Date, rule: AppliedRule) -> Self {
        Self { date, rule, ..self }
    }
}

/// Resolves run dates to payment dates using a [`RuleBook`].
///
/// Immutable after construction, so one resolver can be shared across
/// threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentResolver {
    rules: RuleBook,
}

impl PaymentResolver {
    /// Resolver over the given rule book.
    pub fn new(rules: RuleBook) -> Self {
        Self { rules }
    }

    /// Resolver over [`RuleBook::standard`].
    pub fn standard() -> Self {
        Self::new(RuleBook::standard())
    }

    /// The rule book in use.
    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    /// Resolve `run_date` against `calendar`.
    ///
    /// # Errors
    /// [`Error::ConfigurationOverflow`] if the calendar has a holiday run
    /// longer than the stepper's scan cap; [`Error::InvalidDate`] if the
    /// walk leaves the supported date range, which only happens for run
    /// dates 1900-01-01 to 1900-01-03 (the New Year rules read December
    /// 1899).
    pub fn resolve<C: Calendar + ?Sized>(&self, run_date: Date, calendar: &C) -> Result<Payment> {
        let mut date = run_date;
        for _ in 0..MAX_PASSES {
            let zone = classify(date, &self.rules);
            let anchored = match zone {
                Zone::ChristmasWindow => true,
                Zone::NewYearWindow => date.day_of_month() <= 3,
                _ => false,
            };
            if !anchored {
                if calendar.is_weekend(date) {
                    date = date.friday_of_week()?;
                    continue;
                }
                if calendar.is_holiday(date) {
                    date = walk_back(date, 1, calendar)?;
                    continue;
                }
            }
            let payment = self.dispatch(run_date, date, zone, calendar)?;
            debug!(
                run_date = %run_date,
                effective = %date,
                zone = %zone,
                rule = ?payment.rule,
                payment = %payment.date,
                "resolved payment date"
            );
            return Ok(payment);
        }
        // Weekend → Friday → preceding working day always settles in three passes.
        Err(Error::ConfigurationOverflow {
            start: run_date.to_string(),
            limit: MAX_PASSES,
        })
    }

    /// Resolve `run_date` and return only the payment day.
    pub fn payment_day<C: Calendar + ?Sized>(&self, run_date: Date, calendar: &C) -> Result<PaymentDay> {
        self.resolve(run_date, calendar).map(|p| p.day())
    }

    fn dispatch<C: Calendar + ?Sized>(
        &self,
        run_date: Date,
        date: Date,
        zone: Zone,
        calendar: &C,
    ) -> Result<Payment> {
        let payment = |paid: Date, rule: AppliedRule| Payment {
            run_date,
            effective_date: date,
            zone,
            date: paid,
            rule,
            review: None,
        };

        match zone {
            Zone::ChristmasWindow => {
                let christmas = self.rules.christmas();
                match christmas.fixed_payment_day(date.day_of_month()) {
                    Some(day) => Ok(payment(
                        Date::from_ymd(date.year(), 12, day)?,
                        AppliedRule::ChristmasFixed,
                    )),
                    None => {
                        let cutoff = Date::from_ymd(date.year(), 12, christmas.cutoff_day())?;
                        Ok(payment(
                            nearest_working_day_on_or_before(cutoff, calendar)?,
                            AppliedRule::ChristmasCutoff,
                        ))
                    }
                }
            }
            Zone::NewYearWindow if date.day_of_month() <= 3 => {
                let last = last_working_day_of_month(date.year() - 1, 12, calendar)?;
                if date.day_of_month() == 3 {
                    Ok(payment(last, AppliedRule::NewYearLast))
                } else {
                    Ok(payment(walk_back(last, 1, calendar)?, AppliedRule::NewYearSecondToLast))
                }
            }
            Zone::CrossMonthRisk => {
                let (candidate, rule) = generic_rule(date, calendar)?;
                if candidate.same_month(date) {
                    return Ok(payment(candidate, rule));
                }
                let Some(entry) = self.rules.cross_month_override(date) else {
                    return Ok(payment(candidate, rule));
                };
                if !entry.applies_to(candidate) {
                    return Ok(payment(candidate, rule));
                }
                let start = date.start_of_month();
                let paid = match &entry.policy {
                    CrossMonthPolicy::Accept => candidate,
                    CrossMonthPolicy::FirstOfMonth => start,
                    CrossMonthPolicy::LastOfPreviousMonth => start.add_days(-1)?,
                    CrossMonthPolicy::DayOfMonth(day) => Date::from_ymd(date.year(), date.month(), *day)?,
                    CrossMonthPolicy::Unresolved(note) => {
                        warn!(
                            run_date = %run_date,
                            candidate = %candidate,
                            note = %note,
                            "unresolved cross-month override; keeping generic candidate"
                        );
                        return Ok(Payment {
                            review: Some(note.clone()),
                            ..payment(candidate, rule)
                        });
                    }
                };
                Ok(payment(paid, AppliedRule::CrossMonthOverride))
            }
            Zone::WeekdayBiasRisk => {
                let (candidate, rule) = generic_rule(date, calendar)?;
                if !candidate.same_month(date) {
                    return Ok(payment(candidate, rule));
                }
                // A same-month candidate is at least two days before the run
                // date, so the extra day never leaves the month.
                Ok(payment(candidate.add_days(1)?, AppliedRule::WeekdayBias))
            }
            Zone::NewYearWindow | Zone::Normal => {
                let (paid, rule) = generic_rule(date, calendar)?;
                Ok(payment(paid, rule))
            }
        }
    }
}

impl Default for PaymentResolver {
    fn default() -> Self {
        Self::standard()
    }
}

/// Two working days back from `run_date`, with the gap guard applied to
/// same-month results.
pub fn generic_rule<C: Calendar + ?Sized>(run_date: Date, calendar: &C) -> Result<(Date, AppliedRule)> {
    let candidate = walk_back(run_date, GENERIC_WORKING_DAYS_BACK, calendar)?;
    if candidate.same_month(run_date) {
        let run_day = run_date.day_of_month();
        let day = candidate.day_of_month();
        if run_day - day > GAP_GUARD_THRESHOLD {
            let clamped = day.max(run_day - GAP_GUARD_CLAMP);
            return Ok((
                Date::from_ymd(run_date.year(), run_date.month(), clamped)?,
                AppliedRule::GapGuard,
            ));
        }
    }
    Ok((candidate, AppliedRule::Generic))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ps_time::{CompanyCanada, HolidaySet, WeekendsOnly};

    fn date(y: u16, m: u8, d: u8) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn resolve(y: u16, m: u8, d: u8) -> Payment {
        PaymentResolver::standard()
            .resolve(date(y, m, d), &CompanyCanada)
            .unwrap()
    }

    #[test]
    fn payment_day_bounds() {
        assert!(PaymentDay::new(0).is_err());
        assert!(PaymentDay::new(32).is_err());
        assert_eq!(PaymentDay::new(7).unwrap().to_string(), "07");
    }

    #[test]
    fn generic_two_days_back() {
        // Thursday 2024-03-14 → Tuesday 12th
        let p = resolve(2024, 3, 14);
        assert_eq!(p.zone(), Zone::Normal);
        assert_eq!(p.date(), date(2024, 3, 12));
        assert_eq!(p.rule(), AppliedRule::Generic);
    }

    #[test]
    fn weekend_moves_to_friday() {
        let sat = resolve(2024, 6, 15);
        assert_eq!(sat.effective_date(), date(2024, 6, 14));
        assert_eq!(sat.day().get(), 12);
        assert_eq!(resolve(2024, 6, 16).date(), resolve(2024, 6, 14).date());
    }

    #[test]
    fn holiday_moves_to_previous_working_day() {
        // Remembrance Day 2024 is a Monday → Friday 8th → Wednesday 6th
        let p = resolve(2024, 11, 11);
        assert_eq!(p.effective_date(), date(2024, 11, 8));
        assert_eq!(p.date(), date(2024, 11, 6));
    }

    #[test]
    fn weekend_then_holiday() {
        // Sunday 2024-03-31 → Good Friday 29th → Thursday 28th → Tuesday 26th
        let p = resolve(2024, 3, 31);
        assert_eq!(p.effective_date(), date(2024, 3, 28));
        assert_eq!(p.date(), date(2024, 3, 26));
    }

    #[test]
    fn christmas_mapping() {
        for (run, paid) in [(28, 27), (29, 28), (30, 29), (31, 30)] {
            let p = resolve(2024, 12, run);
            assert_eq!(p.zone(), Zone::ChristmasWindow);
            assert_eq!(p.day().get(), paid, "Dec {run}");
            assert_eq!(p.rule(), AppliedRule::ChristmasFixed);
        }
        // 2024-12-22 is a Sunday → Friday 20th
        for run in 23..=27 {
            let p = resolve(2024, 12, run);
            assert_eq!(p.date(), date(2024, 12, 20), "Dec {run}");
            assert_eq!(p.rule(), AppliedRule::ChristmasCutoff);
        }
    }

    #[test]
    fn new_year_window() {
        // December 2023 ends Friday 29th, Thursday 28th
        assert_eq!(resolve(2024, 1, 1).date(), date(2023, 12, 28));
        assert_eq!(resolve(2024, 1, 2).date(), date(2023, 12, 28));
        assert_eq!(resolve(2024, 1, 3).date(), date(2023, 12, 29));
        assert_eq!(resolve(2024, 1, 3).rule(), AppliedRule::NewYearLast);
        // Friday 2024-01-05 → generic → Wednesday 3rd
        assert_eq!(resolve(2024, 1, 5).date(), date(2024, 1, 3));
        // Saturday 2024-01-06 → Friday 5th
        assert_eq!(resolve(2024, 1, 6).date(), date(2024, 1, 3));
        // Saturday 2025-01-04 → Friday 3rd → last working day of 2024
        assert_eq!(resolve(2025, 1, 4).date(), date(2024, 12, 31));
    }

    #[test]
    fn cross_month_first_of_month() {
        // Tuesday 2024-09-03: Labour Day Monday, so generic lands on Aug 29
        let p = resolve(2024, 9, 3);
        assert_eq!(p.zone(), Zone::CrossMonthRisk);
        assert_eq!(p.date(), date(2024, 9, 1));
        assert_eq!(p.rule(), AppliedRule::CrossMonthOverride);
    }

    #[test]
    fn cross_month_min_candidate_day() {
        // Friday 2024-08-02 → generic Jul 31 ≥ 30 → Aug 1
        assert_eq!(resolve(2024, 8, 2).date(), date(2024, 8, 1));
        // Monday 2021-08-02 is Civic Holiday → Friday Jul 30 → Normal zone
        let p = resolve(2021, 8, 2);
        assert_eq!(p.effective_date(), date(2021, 7, 30));
        assert_eq!(p.date(), date(2021, 7, 28));
    }

    #[test]
    fn cross_month_same_month_candidate_untouched() {
        // Friday 2024-07-05 → Wednesday 3rd
        let p = resolve(2024, 7, 5);
        assert_eq!(p.zone(), Zone::CrossMonthRisk);
        assert_eq!(p.date(), date(2024, 7, 3));
        assert_eq!(p.rule(), AppliedRule::Generic);
    }

    #[test]
    fn cross_month_day_policies() {
        // Thursday 2024-04-04: Easter Monday Apr 1 → generic Apr 2
        // same month, so no override
        assert_eq!(resolve(2024, 4, 4).date(), date(2024, 4, 2));
        // Wednesday 2024-04-03 → Apr 2 (1), Apr 1 holiday, Mar 31, 30, 29
        // holiday/weekend, Mar 28 (2) → first of month
        assert_eq!(resolve(2024, 4, 3).date(), date(2024, 4, 1));
        // Tuesday 2023-04-04 → Apr 3 (1), Mar 31 (2) → last of March
        assert_eq!(resolve(2023, 4, 4).date(), date(2023, 3, 31));
        assert_eq!(resolve(2023, 4, 4).rule(), AppliedRule::CrossMonthOverride);
    }

    #[test]
    fn unresolved_override_flags_review() {
        let rules = RuleBook::standard()
            .with_override(
                crate::rulebook::OverrideKey::on(date(2024, 9, 4)),
                crate::rulebook::CrossMonthOverride::new(CrossMonthPolicy::Unresolved(
                    "opposite corrections in adjacent years".into(),
                )),
            )
            .unwrap();
        let resolver = PaymentResolver::new(rules);
        // Wednesday 2024-09-04 → Sep 3 (1), Labour Day, weekend, Aug 30 (2)
        let p = resolver.resolve(date(2024, 9, 4), &CompanyCanada).unwrap();
        assert_eq!(p.date(), date(2024, 8, 30));
        assert_eq!(p.review_note(), Some("opposite corrections in adjacent years"));
        // Other years keep the every-year entry
        let q = resolver.resolve(date(2025, 9, 4), &CompanyCanada).unwrap();
        assert_eq!(q.review_note(), None);
    }

    #[test]
    fn weekday_bias_same_month() {
        // Tuesday 2024-01-30 → Friday 26th + 1
        let p = resolve(2024, 1, 30);
        assert_eq!(p.zone(), Zone::WeekdayBiasRisk);
        assert_eq!(p.date(), date(2024, 1, 27));
        assert_eq!(p.rule(), AppliedRule::WeekdayBias);
    }

    #[test]
    fn weekday_bias_at_month_end() {
        // Tuesday 2024-04-30 → Friday 26th + 1
        let p = resolve(2024, 4, 30);
        assert_eq!(p.zone(), Zone::WeekdayBiasRisk);
        assert_eq!(p.date(), date(2024, 4, 27));
        // Tuesday 2025-09-30 is a holiday → Monday 29th → Thursday 25th
        let q = resolve(2025, 9, 30);
        assert_eq!(q.effective_date(), date(2025, 9, 29));
        assert_eq!(q.date(), date(2025, 9, 25));
        assert_eq!(q.zone(), Zone::Normal);
    }

    #[test]
    fn weekday_bias_cross_month_kept() {
        // Tuesday 2024-07-02: Canada Day Monday → Thursday Jun 27
        let p = resolve(2024, 7, 2);
        assert_eq!(p.zone(), Zone::WeekdayBiasRisk);
        assert_eq!(p.date(), date(2024, 6, 27));
        assert!(p.is_cross_month());
    }

    #[test]
    fn gap_guard_clamps_long_same_month_gaps() {
        // Holidays Thursday 14th .. Wednesday 27th March 2024
        let mut cal = HolidaySet::new("Shutdown");
        let mut d = date(2024, 3, 14);
        while d <= date(2024, 3, 27) {
            cal.insert(d);
            d = d.add_days(1).unwrap();
        }
        // Thursday 28th: generic would be the 12th, 16 days earlier
        let p = PaymentResolver::standard().resolve(date(2024, 3, 28), &cal).unwrap();
        assert_eq!(p.date(), date(2024, 3, 21));
        assert_eq!(p.rule(), AppliedRule::GapGuard);
    }

    #[test]
    fn gap_guard_ignores_cross_month_results() {
        let (paid, rule) = generic_rule(date(2024, 7, 2), &CompanyCanada).unwrap();
        assert_eq!(paid, date(2024, 6, 27));
        assert_eq!(rule, AppliedRule::Generic);
        let (paid, _) = generic_rule(date(2024, 7, 10), &WeekendsOnly).unwrap();
        assert_eq!(paid, date(2024, 7, 8));
    }
}
