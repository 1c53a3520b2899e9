//! The rule book: declarative overrides layered on top of the generic rule.
//!
//! Two tables live here:
//!
//! * the **Christmas mapping** — fixed December run-day → payment-day pairs,
//!   plus the cutoff day that every other Christmas-window run date is
//!   pulled back to;
//! * the **cross-month table** — what to do when the generic rule lands in
//!   the previous month, keyed by (month, day) with optional year-specific
//!   entries that take precedence for that year.
//!
//! [`RuleBook::standard`] builds the shipped tables in code. A rule book can
//! also be loaded from TOML:
//!
//! ```toml
//! version = 1
//!
//! [christmas]
//! cutoff_day = 22
//! fixed = [
//!   { run_day = 28, payment_day = 27 },
//!   { run_day = 29, payment_day = 28 },
//! ]
//!
//! [[cross_month]]
//! month = 8
//! day = 2
//! policy = "first-of-month"
//! min_candidate_day = 30
//!
//! [[cross_month]]
//! year = 2023
//! month = 9
//! day = 2
//! policy = "unresolved"
//! note = "contradicts 2022"
//! ```
//!
//! Two entries with the same key are rejected with
//! [`Error::AmbiguousOverride`]; there is no precedence between them.

use crate::zone::{in_year_end_window, CHRISTMAS_WINDOW_START};
use ps_core::errors::{Error, Result};
use ps_core::fail;
use ps_time::date::days_in_month;
use ps_time::Date;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::info;

/// Rule book format version understood by [`RuleBook::from_toml_str`].
pub const RULEBOOK_VERSION: u32 = 1;

/// Key of a cross-month entry.  `year == None` matches every year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OverrideKey {
    /// Year this entry is restricted to, if any.
    pub year: Option<u16>,
    /// Run-date month (1–12).
    pub month: u8,
    /// Run-date day of month.
    pub day: u8,
}

impl OverrideKey {
    /// Key matching (`month`, `day`) in every year.
    pub fn every_year(month: u8, day: u8) -> Self {
        Self {
            year: None,
            month,
            day,
        }
    }

    /// Key matching a single date.
    pub fn on(date: Date) -> Self {
        Self {
            year: Some(date.year()),
            month: date.month(),
            day: date.day_of_month(),
        }
    }
}

impl std::fmt::Display for OverrideKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.year {
            Some(y) => write!(f, "{y:04}-{:02}-{:02}", self.month, self.day),
            None => write!(f, "*-{:02}-{:02}", self.month, self.day),
        }
    }
}

/// What to do when the generic candidate falls in the previous month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrossMonthPolicy {
    /// Keep the cross-month candidate.
    Accept,
    /// Pay on day 1 of the run month.
    FirstOfMonth,
    /// Pay on the last calendar day of the previous month.
    LastOfPreviousMonth,
    /// Pay on a fixed, earlier day of the run month.
    DayOfMonth(u8),
    /// No agreed answer: keep the candidate and flag the payment for review.
    Unresolved(String),
}

/// A cross-month table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossMonthOverride {
    /// The policy to apply.
    pub policy: CrossMonthPolicy,
    /// Apply only when the candidate's day of month is at least this.
    pub min_candidate_day: Option<u8>,
}

impl CrossMonthOverride {
    /// An entry that always applies `policy` to a cross-month candidate.
    pub fn new(policy: CrossMonthPolicy) -> Self {
        Self {
            policy,
            min_candidate_day: None,
        }
    }

    /// Restrict the entry to candidates on or after `day`.
    pub fn with_min_candidate_day(mut self, day: u8) -> Self {
        self.min_candidate_day = Some(day);
        self
    }

    /// Return `true` if this entry applies to `candidate`.
    pub fn applies_to(&self, candidate: Date) -> bool {
        self.min_candidate_day
            .map_or(true, |min| candidate.day_of_month() >= min)
    }
}

/// Christmas-window mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChristmasRules {
    cutoff_day: u8,
    fixed: BTreeMap<u8, u8>,
}

impl ChristmasRules {
    /// Build Christmas rules from a cutoff day and fixed pairs.
    pub fn new(cutoff_day: u8, fixed: impl IntoIterator<Item = (u8, u8)>) -> Result<Self> {
        if !(1..CHRISTMAS_WINDOW_START).contains(&cutoff_day) {
            fail!("christmas cutoff day {cutoff_day} must be in [1, {}]", CHRISTMAS_WINDOW_START - 1);
        }
        let mut map = BTreeMap::new();
        for (run_day, payment_day) in fixed {
            if !(CHRISTMAS_WINDOW_START..=31).contains(&run_day) {
                fail!("christmas run day {run_day} is outside the window [{CHRISTMAS_WINDOW_START}, 31]");
            }
            if payment_day == 0 || payment_day > run_day {
                fail!("christmas payment day {payment_day} must be in [1, {run_day}]");
            }
            if map.insert(run_day, payment_day).is_some() {
                return Err(Error::AmbiguousOverride(format!(
                    "christmas run day {run_day} mapped twice"
                )));
            }
        }
        Ok(Self {
            cutoff_day,
            fixed: map,
        })
    }

    /// The day every unmapped Christmas-window date is pulled back to.
    pub fn cutoff_day(&self) -> u8 {
        self.cutoff_day
    }

    /// Fixed payment day for December `run_day`, if any.
    pub fn fixed_payment_day(&self, run_day: u8) -> Option<u8> {
        self.fixed.get(&run_day).copied()
    }
}

impl Default for ChristmasRules {
    fn default() -> Self {
        Self {
            cutoff_day: 22,
            fixed: BTreeMap::from([(28, 27), (29, 28), (30, 29), (31, 30)]),
        }
    }
}

/// The complete set of configurable overrides.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleBook {
    christmas: ChristmasRules,
    cross_month: BTreeMap<OverrideKey, CrossMonthOverride>,
}

impl RuleBook {
    /// A rule book with the standard Christmas mapping and no cross-month
    /// entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The shipped rule book.
    ///
    /// Cross-month entries cluster in early April, July, August and
    /// September, where the generic rule tends to land in the previous
    /// month.
    pub fn standard() -> Self {
        use CrossMonthPolicy::*;
        let entries = [
            ((4, 3), CrossMonthOverride::new(FirstOfMonth)),
            ((4, 4), CrossMonthOverride::new(LastOfPreviousMonth)),
            ((4, 5), CrossMonthOverride::new(DayOfMonth(2))),
            ((7, 3), CrossMonthOverride::new(FirstOfMonth)),
            ((7, 4), CrossMonthOverride::new(Accept)),
            ((7, 5), CrossMonthOverride::new(FirstOfMonth).with_min_candidate_day(28)),
            ((8, 2), CrossMonthOverride::new(FirstOfMonth).with_min_candidate_day(30)),
            ((9, 2), CrossMonthOverride::new(FirstOfMonth)),
            ((9, 3), CrossMonthOverride::new(FirstOfMonth)),
            ((9, 4), CrossMonthOverride::new(FirstOfMonth)),
            ((9, 5), CrossMonthOverride::new(FirstOfMonth)),
        ];
        Self {
            christmas: ChristmasRules::default(),
            cross_month: entries
                .into_iter()
                .map(|((m, d), o)| (OverrideKey::every_year(m, d), o))
                .collect(),
        }
    }

    /// Replace the Christmas mapping.
    pub fn with_christmas(mut self, christmas: ChristmasRules) -> Self {
        self.christmas = christmas;
        self
    }

    /// Add a cross-month entry.
    ///
    /// Fails with [`Error::AmbiguousOverride`] if `key` is already present,
    /// or [`Error::Config`] if the entry is invalid.
    pub fn with_override(mut self, key: OverrideKey, entry: CrossMonthOverride) -> Result<Self> {
        validate_entry(&key, &entry)?;
        if self.cross_month.contains_key(&key) {
            return Err(Error::AmbiguousOverride(format!(
                "cross-month entry {key} defined twice"
            )));
        }
        self.cross_month.insert(key, entry);
        Ok(self)
    }

    /// Parse and validate a TOML rule book.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: RawRuleBook =
            toml::from_str(text).map_err(|e| Error::Config(format!("rule book: {e}")))?;
        if raw.version != RULEBOOK_VERSION {
            fail!(
                "rule book version {} is not supported (expected {RULEBOOK_VERSION})",
                raw.version
            );
        }

        let mut book = Self::empty();
        if let Some(c) = raw.christmas {
            book.christmas =
                ChristmasRules::new(c.cutoff_day, c.fixed.iter().map(|f| (f.run_day, f.payment_day)))?;
        }
        for entry in raw.cross_month {
            let (key, value) = entry.into_override()?;
            book = book.with_override(key, value)?;
        }
        info!(
            cross_month_entries = book.cross_month.len(),
            christmas_fixed = book.christmas.fixed.len(),
            "loaded payment rule book"
        );
        Ok(book)
    }

    /// The Christmas mapping.
    pub fn christmas(&self) -> &ChristmasRules {
        &self.christmas
    }

    /// Cross-month entry for `run_date`: a year-specific entry if one
    /// exists, else the every-year entry.
    pub fn cross_month_override(&self, run_date: Date) -> Option<&CrossMonthOverride> {
        let key = OverrideKey::on(run_date);
        self.cross_month.get(&key).or_else(|| {
            self.cross_month
                .get(&OverrideKey::every_year(key.month, key.day))
        })
    }
}

fn validate_entry(key: &OverrideKey, entry: &CrossMonthOverride) -> Result<()> {
    // February 29 is accepted for every-year entries.
    let max_day = match key.year {
        Some(year) => days_in_month(year, key.month),
        None => days_in_month(2000, key.month),
    };
    if max_day == 0 || key.day == 0 || key.day > max_day {
        fail!("cross-month entry {key} is not a valid date");
    }
    if let Some(year) = key.year {
        Date::from_ymd(year, key.month, key.day)
            .map_err(|e| Error::Config(format!("cross-month entry {key}: {e}")))?;
    }
    if in_year_end_window(key.month, key.day) {
        fail!("cross-month entry {key} is shadowed by the Christmas/New Year window");
    }
    if let Some(min) = entry.min_candidate_day {
        if !(1..=31).contains(&min) {
            fail!("cross-month entry {key}: min_candidate_day {min} out of range");
        }
    }
    match &entry.policy {
        CrossMonthPolicy::DayOfMonth(d) if *d == 0 || *d >= key.day => {
            fail!(
                "cross-month entry {key}: payment day {d} must be before run day {}",
                key.day
            );
        }
        CrossMonthPolicy::Unresolved(note) if note.trim().is_empty() => {
            fail!("cross-month entry {key}: unresolved entries need a note");
        }
        _ => Ok(()),
    }
}

// ── TOML shape ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRuleBook {
    version: u32,
    christmas: Option<RawChristmas>,
    #[serde(default)]
    cross_month: Vec<RawCrossMonth>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawChristmas {
    cutoff_day: u8,
    #[serde(default)]
    fixed: Vec<RawFixed>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFixed {
    run_day: u8,
    payment_day: u8,
}

#[derive(Deserialize, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
enum PolicyKind {
    Accept,
    FirstOfMonth,
    LastOfPreviousMonth,
    DayOfMonth,
    Unresolved,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCrossMonth {
    year: Option<u16>,
    month: u8,
    day: u8,
    policy: PolicyKind,
    payment_day: Option<u8>,
    min_candidate_day: Option<u8>,
    note: Option<String>,
}

impl RawCrossMonth {
    fn into_override(self) -> Result<(OverrideKey, CrossMonthOverride)> {
        let key = OverrideKey {
            year: self.year,
            month: self.month,
            day: self.day,
        };
        let policy = match (self.policy, self.payment_day, self.note) {
            (PolicyKind::DayOfMonth, Some(d), _) => CrossMonthPolicy::DayOfMonth(d),
            (PolicyKind::DayOfMonth, None, _) => {
                fail!("cross-month entry {key}: day-of-month needs payment_day")
            }
            (_, Some(_), _) => {
                fail!("cross-month entry {key}: payment_day only applies to day-of-month")
            }
            (PolicyKind::Unresolved, None, note) => {
                CrossMonthPolicy::Unresolved(note.unwrap_or_default())
            }
            (PolicyKind::Accept, None, _) => CrossMonthPolicy::Accept,
            (PolicyKind::FirstOfMonth, None, _) => CrossMonthPolicy::FirstOfMonth,
            (PolicyKind::LastOfPreviousMonth, None, _) => CrossMonthPolicy::LastOfPreviousMonth,
        };
        Ok((
            key,
            CrossMonthOverride {
                policy,
                min_candidate_day: self.min_candidate_day,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: u16, m: u8, d: u8) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn standard_lookup() {
        let book = RuleBook::standard();
        let aug2 = book.cross_month_override(date(2024, 8, 2)).unwrap();
        assert_eq!(aug2.policy, CrossMonthPolicy::FirstOfMonth);
        assert!(aug2.applies_to(date(2024, 7, 31)));
        assert!(!aug2.applies_to(date(2024, 7, 29)));
        assert!(book.cross_month_override(date(2024, 8, 3)).is_none());
    }

    #[test]
    fn year_specific_entry_wins() {
        let book = RuleBook::standard()
            .with_override(
                OverrideKey::on(date(2023, 9, 2)),
                CrossMonthOverride::new(CrossMonthPolicy::Unresolved("contradicts 2022".into())),
            )
            .unwrap();
        assert!(matches!(
            book.cross_month_override(date(2023, 9, 2)).unwrap().policy,
            CrossMonthPolicy::Unresolved(_)
        ));
        assert_eq!(
            book.cross_month_override(date(2022, 9, 2)).unwrap().policy,
            CrossMonthPolicy::FirstOfMonth
        );
    }

    #[test]
    fn duplicate_key_is_ambiguous() {
        let result = RuleBook::standard().with_override(
            OverrideKey::every_year(4, 3),
            CrossMonthOverride::new(CrossMonthPolicy::Accept),
        );
        assert!(matches!(result, Err(Error::AmbiguousOverride(_))));
    }

    #[test]
    fn invalid_entries_rejected() {
        let add = |key, policy| RuleBook::empty().with_override(key, CrossMonthOverride::new(policy));
        assert!(matches!(
            add(OverrideKey::every_year(2, 30), CrossMonthPolicy::Accept),
            Err(Error::Config(_))
        ));
        assert!(add(OverrideKey::every_year(2, 29), CrossMonthPolicy::Accept).is_ok());
        assert!(add(
            OverrideKey { year: Some(2023), month: 2, day: 29 },
            CrossMonthPolicy::Accept
        )
        .is_err());
        // shadowed by the windows
        assert!(add(OverrideKey::every_year(12, 24), CrossMonthPolicy::Accept).is_err());
        assert!(add(OverrideKey::every_year(1, 2), CrossMonthPolicy::Accept).is_err());
        // payment day must precede the run day
        assert!(add(OverrideKey::every_year(4, 5), CrossMonthPolicy::DayOfMonth(5)).is_err());
        assert!(add(OverrideKey::every_year(4, 5), CrossMonthPolicy::DayOfMonth(4)).is_ok());
        assert!(add(OverrideKey::every_year(4, 5), CrossMonthPolicy::Unresolved(" ".into())).is_err());
    }

    #[test]
    fn christmas_rules_validation() {
        assert!(ChristmasRules::new(22, [(28, 27)]).is_ok());
        assert!(ChristmasRules::new(23, []).is_err());
        assert!(ChristmasRules::new(22, [(20, 19)]).is_err());
        assert!(ChristmasRules::new(22, [(28, 29)]).is_err());
        assert!(matches!(
            ChristmasRules::new(22, [(28, 27), (28, 26)]),
            Err(Error::AmbiguousOverride(_))
        ));
    }

    #[test]
    fn toml_policies() {
        let text = r#"
            version = 1

            [[cross_month]]
            month = 4
            day = 5
            policy = "day-of-month"
            payment_day = 2

            [[cross_month]]
            year = 2023
            month = 9
            day = 2
            policy = "unresolved"
            note = "needs business confirmation"
        "#;
        let book = RuleBook::from_toml_str(text).unwrap();
        assert_eq!(book.christmas(), &ChristmasRules::default());
        assert_eq!(
            book.cross_month_override(date(2024, 4, 5)).unwrap().policy,
            CrossMonthPolicy::DayOfMonth(2)
        );
        assert!(book.cross_month_override(date(2024, 9, 2)).is_none());
        assert_eq!(
            book.cross_month_override(date(2023, 9, 2)).unwrap().policy,
            CrossMonthPolicy::Unresolved("needs business confirmation".into())
        );
    }

    #[test]
    fn toml_errors() {
        assert!(matches!(
            RuleBook::from_toml_str("version = 2"),
            Err(Error::Config(_))
        ));
        assert!(RuleBook::from_toml_str("version = 1\nunknown = 3").is_err());
        let missing_day = r#"
            version = 1
            [[cross_month]]
            month = 4
            day = 5
            policy = "day-of-month"
        "#;
        assert!(RuleBook::from_toml_str(missing_day).is_err());
        let stray_day = r#"
            version = 1
            [[cross_month]]
            month = 4
            day = 5
            policy = "accept"
            payment_day = 1
        "#;
        assert!(RuleBook::from_toml_str(stray_day).is_err());
        let unknown_policy = r#"
            version = 1
            [[cross_month]]
            month = 4
            day = 5
            policy = "sideways"
        "#;
        assert!(RuleBook::from_toml_str(unknown_policy).is_err());
        let unresolved_without_note = r#"
            version = 1
            [[cross_month]]
            month = 4
            day = 5
            policy = "unresolved"
        "#;
        assert!(RuleBook::from_toml_str(unresolved_without_note).is_err());
    }

    #[test]
    fn toml_duplicates_are_ambiguous() {
        let text = r#"
            version = 1
            [[cross_month]]
            month = 7
            day = 3
            policy = "accept"

            [[cross_month]]
            month = 7
            day = 3
            policy = "first-of-month"
        "#;
        assert!(matches!(
            RuleBook::from_toml_str(text),
            Err(Error::AmbiguousOverride(_))
        ));
    }
}
