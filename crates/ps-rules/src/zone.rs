//! Boundary classifier.
//!
//! Sorts a run date into the zone that decides which resolution rule
//! applies. Zones are tested in priority order and the first match wins,
//! so they never overlap.

use crate::rulebook::RuleBook;
use ps_time::{Date, Weekday};

/// First December day of the Christmas window.
pub const CHRISTMAS_WINDOW_START: u8 = 23;

/// Last January day of the New Year window.
pub const NEW_YEAR_WINDOW_END: u8 = 6;

/// Classification of a run date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Zone {
    /// No special handling: two working days back.
    Normal,
    /// January 1–6.
    NewYearWindow,
    /// December 23–31.
    ChristmasWindow,
    /// A (month, day) listed in the cross-month override table.
    CrossMonthRisk,
    /// A Tuesday near the start or end of a month.
    WeekdayBiasRisk,
}

impl Zone {
    /// Short name used in logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Zone::Normal => "normal",
            Zone::NewYearWindow => "new-year",
            Zone::ChristmasWindow => "christmas",
            Zone::CrossMonthRisk => "cross-month",
            Zone::WeekdayBiasRisk => "weekday-bias",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Return `true` if (`month`, `day`) lies in the Christmas or New Year
/// window.
pub fn in_year_end_window(month: u8, day: u8) -> bool {
    (month == 12 && day >= CHRISTMAS_WINDOW_START) || (month == 1 && day <= NEW_YEAR_WINDOW_END)
}

/// Classify `run_date` against the cross-month table of `rules`.
pub fn classify(run_date: Date, rules: &RuleBook) -> Zone {
    let month = run_date.month();
    let day = run_date.day_of_month();

    if month == 12 && day >= CHRISTMAS_WINDOW_START {
        Zone::ChristmasWindow
    } else if month == 1 && day <= NEW_YEAR_WINDOW_END {
        Zone::NewYearWindow
    } else if rules.cross_month_override(run_date).is_some() {
        Zone::CrossMonthRisk
    } else if run_date.weekday() == Weekday::Tuesday && (day <= 5 || day >= 26) {
        Zone::WeekdayBiasRisk
    } else {
        Zone::Normal
    }
}
