//! Export payloads and the collaborators that render them.
//!
//! Two independent outputs exist: a synchronous document action and an
//! asynchronous conversion to a spreadsheet file. Both are built from the
//! same aggregation result and both refuse an empty report.

pub mod error;
pub mod payload;
pub mod sink;


pub use error::ExportError;
pub use payload::{
    AccountSummary, ConversionRequest, DocumentGrandTotal, DocumentRequest, ExportPayload,
    ExportPayloadBuilder, FilterDescriptor, SpreadsheetGrandTotal,
};
pub use sink::{ConversionEndpoint, DocumentSink};
