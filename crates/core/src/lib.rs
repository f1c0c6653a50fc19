//! Core logic of the deferred expense / revenue report.
//!
//! This crate contains pure report logic with ZERO web or database dependencies.
//! Data arrives through the [`source::ReportDataSource`] seam and leaves through
//! the [`export`] collaborators.
//!
//! # Modules
//!
//! - `calendar` - Month, quarter and year boundaries
//! - `filter` - Immutable filter snapshots and their manager
//! - `domain` - Search domains shared with the ledger's list views
//! - `source` - Data source contract and an in-memory implementation
//! - `aggregation` - Per-account bucket sums and grand totals
//! - `export` - Document and spreadsheet payloads
//! - `navigation` - Drill-down to journal items
//! - `session` - One open report, from load to close

pub mod aggregation;
pub mod calendar;
pub mod domain;
pub mod export;
pub mod filter;
pub mod navigation;
pub mod session;
pub mod source;

pub use aggregation::{AggregationEngine, AggregationResult};
pub use filter::{FilterState, FilterStateManager};
pub use session::{ReportError, ReportSession};
pub use source::{InMemorySource, ReportDataSource, ReportKind};
