//! # payschedule
//!
//! Rule-based payment date resolution for benefit-payment schedule tables.
//!
//! This crate is a **façade** that re-exports all public items from the
//! underlying workspace crates. Application code should depend on this
//! crate rather than the individual `ps-*` crates.
//!
//! ## Quick start
//!
//! ```toml
//! [dependencies]
//! payschedule = "0.1"
//! ```
//!
//! ```rust
//! use payschedule::rules::PaymentResolver;
//! use payschedule::time::{CompanyCanada, Date};
//!
//! let resolver = PaymentResolver::standard();
//! let run = Date::from_ymd(2024, 7, 2).unwrap();
//! let payment = resolver.resolve(run, &CompanyCanada).unwrap();
//! assert_eq!(payment.day().get(), 27);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Error definitions and shared aliases.
pub use ps_core as core;

/// Date, calendar, holiday-set, and working-day stepper types.
pub use ps_time as time;

/// Zone classifier, rule book, resolver, tables, and evaluation.
pub use ps_rules as rules;

/// Commonly used items in one import.
pub mod prelude {
    pub use ps_core::{Error, Result};
    pub use ps_rules::{
        evaluate, resolve_table_b, HistoricalTable, Payment, PaymentDay, PaymentResolver,
        PaymentTable, RuleBook, TableKind, Zone,
    };
    pub use ps_time::{Calendar, CompanyCanada, Date, HolidaySet, WeekendsOnly};
}
