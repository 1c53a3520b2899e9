//! Historical evaluation: score a resolver against published tables.
//!
//! A published table is plain text. Each month starts with a header line
//! `"<MonthName> - <YYYY>"`, followed by rows of `DD : FF   TT` cells
//! (run day, first payment day, last payment day):
//!
//! ```text
//! January - 2024
//!   01 : 28   28     02 : 28   28     03 : 29   29
//!   04 : 02   02     05 : 03   03     06 : 03   03
//! ```
//!
//! The last payment day is taken as the truth.

use crate::resolver::PaymentResolver;
use crate::table::TableKind;
use crate::zone::Zone;
use ps_core::errors::{Error, Result};
use ps_time::{Calendar, Date, Month};
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Mismatches with an absolute day difference above this are reported
/// individually.
pub const MAJOR_MISMATCH_DAYS: u8 = 5;

/// Expected payment days parsed from a published table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalTable {
    year: u16,
    kind: TableKind,
    expected: BTreeMap<Date, u8>,
}

impl HistoricalTable {
    /// Parse a published Table A for `year`.
    ///
    /// Sections under an unrecognised month name are skipped.
    ///
    /// # Errors
    /// [`Error::Parse`] if a header names another year, a cell appears
    /// before any header, a run day does not exist in its month, a payment
    /// day is outside `[1, 31]`, or a run day is listed twice.
    pub fn parse(text: &str, year: u16) -> Result<Self> {
        let header = Regex::new(r"^\s*([A-Za-z]+)\s+-\s+(\d{4})\s*$")
            .map_err(|e| Error::Parse(e.to_string()))?;
        let cell = Regex::new(r"(\d{1,2})\s*:\s*(\d{1,2})\s+(\d{1,2})")
            .map_err(|e| Error::Parse(e.to_string()))?;

        let mut expected = BTreeMap::new();
        // None before the first header, Some(None) inside a skipped section
        let mut section: Option<Option<Month>> = None;

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            if let Some(caps) = header.captures(line) {
                let header_year: u16 = caps[2]
                    .parse()
                    .map_err(|_| Error::Parse(format!("line {line_no}: bad year '{}'", &caps[2])))?;
                if header_year != year {
                    return Err(Error::Parse(format!(
                        "line {line_no}: header year {header_year} does not match table year {year}"
                    )));
                }
                let month = Month::from_name(&caps[1]);
                if month.is_none() {
                    debug!(line = line_no, header = &caps[1], "skipping unknown month section");
                }
                section = Some(month);
                continue;
            }

            for caps in cell.captures_iter(line) {
                let month = match section {
                    None => {
                        return Err(Error::Parse(format!(
                            "line {line_no}: payment cell before any month header"
                        )))
                    }
                    Some(None) => continue,
                    Some(Some(month)) => month,
                };
                let run_day: u8 = parse_day(&caps[1], line_no)?;
                let to: u8 = parse_day(&caps[3], line_no)?;
                let run_date = Date::from_ymd(year, month.number(), run_day).map_err(|_| {
                    Error::Parse(format!("line {line_no}: {month} {run_day} does not exist in {year}"))
                })?;
                if to == 0 || to > 31 {
                    return Err(Error::Parse(format!(
                        "line {line_no}: payment day {to} out of range for {run_date}"
                    )));
                }
                if expected.insert(run_date, to).is_some() {
                    return Err(Error::Parse(format!("line {line_no}: {run_date} listed twice")));
                }
            }
        }

        Ok(Self {
            year,
            kind: TableKind::A,
            expected,
        })
    }

    /// Mark the table as a Table B publication.
    pub fn with_kind(mut self, kind: TableKind) -> Self {
        self.kind = kind;
        self
    }

    /// The table year.
    pub fn year(&self) -> u16 {
        self.year
    }

    /// The table kind the rows were published for.
    pub fn kind(&self) -> TableKind {
        self.kind
    }

    /// Number of run dates with an expected payment day.
    pub fn len(&self) -> usize {
        self.expected.len()
    }

    /// Return `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.expected.is_empty()
    }

    /// Expected payment day for `run_date`.
    pub fn expected(&self, run_date: Date) -> Option<u8> {
        self.expected.get(&run_date).copied()
    }

    /// All (run date, expected payment day) pairs in date order.
    pub fn iter(&self) -> impl Iterator<Item = (Date, u8)> + '_ {
        self.expected.iter().map(|(d, p)| (*d, *p))
    }
}

fn parse_day(text: &str, line_no: usize) -> Result<u8> {
    text.parse()
        .map_err(|_| Error::Parse(format!("line {line_no}: bad day '{text}'")))
}

/// A prediction that is off by more than [`MAJOR_MISMATCH_DAYS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// The run date.
    pub run_date: Date,
    /// Payment day produced by the resolver.
    pub predicted: u8,
    /// Payment day from the published table.
    pub expected: u8,
    /// Zone the effective run date fell in.
    pub zone: Zone,
}

impl Mismatch {
    /// Absolute day-of-month difference.
    pub fn difference(&self) -> u8 {
        self.predicted.abs_diff(self.expected)
    }
}

/// Per-zone counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneStats {
    /// Rows in this zone.
    pub total: usize,
    /// Rows predicted exactly.
    pub exact: usize,
}

/// Accuracy of a resolver against a historical table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccuracyReport {
    /// Rows evaluated.
    pub total: usize,
    /// Exact predictions.
    pub exact: usize,
    /// Predictions one day off.
    pub off_by_one: usize,
    /// Predictions two days off.
    pub off_by_two: usize,
    /// Predictions three or more days off.
    pub beyond_two: usize,
    /// Predictions more than [`MAJOR_MISMATCH_DAYS`] off, in run-date order.
    pub major: Vec<Mismatch>,
    /// Counts per zone.
    pub by_zone: BTreeMap<Zone, ZoneStats>,
}

impl AccuracyReport {
    /// Share of exact predictions, `0.0` for an empty table.
    pub fn exact_ratio(&self) -> f64 {
        ratio(self.exact, self.total)
    }

    /// Share of predictions at most two days off.
    pub fn within_two_ratio(&self) -> f64 {
        ratio(self.exact + self.off_by_one + self.off_by_two, self.total)
    }
}

fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

/// Score `resolver` against `table` on `calendar`.
///
/// Differences are taken between days of month, so a cross-month miss
/// (e.g. 30 vs 1) counts as a large difference.
pub fn evaluate<C: Calendar + ?Sized>(
    resolver: &PaymentResolver,
    calendar: &C,
    table: &HistoricalTable,
) -> Result<AccuracyReport> {
    let mut report = AccuracyReport::default();
    for (run_date, expected) in table.iter() {
        let payment = table.kind().resolve(resolver, run_date, calendar)?;
        let predicted = payment.day().get();
        let zone = payment.zone();

        let stats = report.by_zone.entry(zone).or_default();
        stats.total += 1;
        report.total += 1;

        match predicted.abs_diff(expected) {
            0 => {
                stats.exact += 1;
                report.exact += 1;
            }
            1 => report.off_by_one += 1,
            2 => report.off_by_two += 1,
            diff => {
                report.beyond_two += 1;
                if diff > MAJOR_MISMATCH_DAYS {
                    report.major.push(Mismatch {
                        run_date,
                        predicted,
                        expected,
                        zone,
                    });
                }
            }
        }
    }
    info!(
        year = table.year(),
        total = report.total,
        exact = report.exact,
        major = report.major.len(),
        "evaluated historical table"
    );
    Ok(report)
}
