//! `HolidaySet` — a calendar backed by an explicit set of holiday dates.
//!
//! This is the immutable holiday-set parameter handed to the resolver. It
//! can be built in code, materialized from a rule-based calendar, or loaded
//! from (and saved to) a small TOML document so that users can edit it:
//!
//! ```toml
//! name = "Company 2024"
//! holidays = ["2024-01-01", "2024-02-19", "2024-03-29"]
//! ```

use crate::calendar::Calendar;
use crate::date::Date;
use ps_core::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::RangeInclusive;

/// A calendar whose holidays are an explicit set of dates.
///
/// Weekends are always non-working days and need not be listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidaySet {
    name: String,
    holidays: HashSet<Date>,
}

#[derive(Serialize, Deserialize)]
struct HolidayFile {
    name: String,
    #[serde(default)]
    holidays: Vec<Date>,
}

impl HolidaySet {
    /// Create an empty holiday set with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            holidays: HashSet::new(),
        }
    }

    /// Create a holiday set from a list of dates.  Duplicates collapse.
    pub fn from_dates(name: impl Into<String>, dates: impl IntoIterator<Item = Date>) -> Self {
        Self {
            name: name.into(),
            holidays: dates.into_iter().collect(),
        }
    }

    /// Materialize the weekday holidays of `calendar` for every year in
    /// `years`.
    pub fn from_calendar(calendar: &dyn Calendar, years: RangeInclusive<u16>) -> Result<Self> {
        let mut set = Self::new(calendar.name());
        for year in years {
            let from = Date::from_ymd(year, 1, 1)?;
            let to = Date::from_ymd(year, 12, 31)?;
            set.holidays.extend(calendar.holiday_list(from, to));
        }
        Ok(set)
    }

    /// Parse a TOML holiday document.
    ///
    /// A date listed twice is rejected rather than silently merged.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: HolidayFile =
            toml::from_str(text).map_err(|e| Error::Config(format!("holiday set: {e}")))?;
        let mut set = Self::new(file.name);
        for date in file.holidays {
            if !set.holidays.insert(date) {
                return Err(Error::Config(format!(
                    "holiday set '{}': {date} listed twice",
                    set.name
                )));
            }
        }
        Ok(set)
    }

    /// Render this set as a TOML holiday document, dates in ascending order.
    pub fn to_toml_string(&self) -> Result<String> {
        let file = HolidayFile {
            name: self.name.clone(),
            holidays: self.dates(),
        };
        toml::to_string(&file).map_err(|e| Error::Config(format!("holiday set: {e}")))
    }

    /// Add a holiday.  Returns `false` if it was already present.
    pub fn insert(&mut self, date: Date) -> bool {
        self.holidays.insert(date)
    }

    /// Remove a holiday.  Returns `false` if it was not present.
    pub fn remove(&mut self, date: Date) -> bool {
        self.holidays.remove(&date)
    }

    /// Return `true` if `date` is listed.
    pub fn contains(&self, date: Date) -> bool {
        self.holidays.contains(&date)
    }

    /// Number of listed holidays.
    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    /// Return `true` if no holidays are listed.
    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }

    /// All listed holidays in ascending order.
    pub fn dates(&self) -> Vec<Date> {
        let mut dates: Vec<Date> = self.holidays.iter().copied().collect();
        dates.sort_unstable();
        dates
    }
}

impl Calendar for HolidaySet {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_holiday(&self, date: Date) -> bool {
        self.holidays.contains(&date)
    }
}
