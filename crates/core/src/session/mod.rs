//! Report session: one open report from load to close.
//!
//! The session serializes filter changes, tags every query with a
//! generation number and applies only the answer to the latest one. Stale
//! answers and answers arriving after [`ReportSession::close`] are dropped.

pub mod error;
pub mod service;
pub mod types;


pub use error::ReportError;
pub use service::ReportSession;
pub use types::{
    ApplyOutcome, CompletedExport, CompletedQuery, ExportOutcome, PendingExport, PendingQuery,
    ReportView,
};
