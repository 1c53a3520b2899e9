//! Table assembler: payment rows for a month or a year.

use crate::resolver::{Payment, PaymentResolver};
use crate::table_b::resolve_table_b;
use ps_core::errors::Result;
use ps_time::date::days_in_month;
use ps_time::{Calendar, Date};

/// Which published table to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    /// Payments resolved directly.
    A,
    /// Table A plus the fixed offset.
    B,
}

impl TableKind {
    /// Resolve a single run date for this table.
    pub fn resolve<C: Calendar + ?Sized>(
        self,
        resolver: &PaymentResolver,
        run_date: Date,
        calendar: &C,
    ) -> Result<Payment> {
        match self {
            TableKind::A => resolver.resolve(run_date, calendar),
            TableKind::B => resolve_table_b(resolver, run_date, calendar),
        }
    }
}

/// One table row. `from` and `to` are the same payment day; the published
/// layout keeps both columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRow {
    /// The run date.
    pub run_date: Date,
    /// First payment day.
    pub from: u8,
    /// Last payment day.
    pub to: u8,
}

/// Rows for every run date of one or more months, in run-date order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentTable {
    kind: TableKind,
    rows: Vec<TableRow>,
}

impl PaymentTable {
    /// Rows for every day of `year`/`month`.
    pub fn month<C: Calendar + ?Sized>(
        resolver: &PaymentResolver,
        calendar: &C,
        kind: TableKind,
        year: u16,
        month: u8,
    ) -> Result<Self> {
        let mut table = Self {
            kind,
            rows: Vec::with_capacity(31),
        };
        table.push_month(resolver, calendar, year, month)?;
        Ok(table)
    }

    /// Rows for every day of `year`.
    pub fn year<C: Calendar + ?Sized>(
        resolver: &PaymentResolver,
        calendar: &C,
        kind: TableKind,
        year: u16,
    ) -> Result<Self> {
        let mut table = Self {
            kind,
            rows: Vec::with_capacity(366),
        };
        for month in 1..=12 {
            table.push_month(resolver, calendar, year, month)?;
        }
        Ok(table)
    }

    fn push_month<C: Calendar + ?Sized>(
        &mut self,
        resolver: &PaymentResolver,
        calendar: &C,
        year: u16,
        month: u8,
    ) -> Result<()> {
        // Validates year and month
        Date::from_ymd(year, month, 1)?;
        for day in 1..=days_in_month(year, month) {
            let run_date = Date::from_ymd(year, month, day)?;
            let paid = self.kind.resolve(resolver, run_date, calendar)?.day().get();
            self.rows.push(TableRow {
                run_date,
                from: paid,
                to: paid,
            });
        }
        Ok(())
    }

    /// The table kind.
    pub fn kind(&self) -> TableKind {
        self.kind
    }

    /// All rows.
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Payment day for `run_date`, if the table covers it.
    pub fn payment_day(&self, run_date: Date) -> Option<u8> {
        self.rows
            .binary_search_by(|row| row.run_date.cmp(&run_date))
            .ok()
            .map(|i| self.rows[i].to)
    }
}
