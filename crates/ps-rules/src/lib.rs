//! # ps-rules
//!
//! Payment date resolution on top of `ps-time`: the zone classifier, the
//! declarative rule book, the resolver itself, Table B, the table
//! assembler, and scoring against published historical tables.
//!
//! ```
//! use ps_rules::PaymentResolver;
//! use ps_time::{CompanyCanada, Date};
//!
//! let resolver = PaymentResolver::standard();
//! let run = Date::from_ymd(2024, 12, 30).unwrap();
//! assert_eq!(resolver.payment_day(run, &CompanyCanada).unwrap().get(), 29);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Scoring against published tables.
pub mod evaluation;

/// The payment resolver.
pub mod resolver;

/// Christmas mapping and cross-month override configuration.
pub mod rulebook;

/// Month and year payment tables.
pub mod table;

/// Table B offset.
pub mod table_b;

/// Run-date classification.
pub mod zone;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use evaluation::{evaluate, AccuracyReport, HistoricalTable, Mismatch, ZoneStats};
pub use resolver::{generic_rule, AppliedRule, Payment, PaymentDay, PaymentResolver};
pub use rulebook::{ChristmasRules, CrossMonthOverride, CrossMonthPolicy, OverrideKey, RuleBook};
pub use table::{PaymentTable, TableKind, TableRow};
pub use table_b::resolve_table_b;
pub use zone::{classify, Zone};
