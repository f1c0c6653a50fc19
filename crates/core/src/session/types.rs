//! Session data types and in-flight operations.

use std::sync::Arc;

use bytes::Bytes;

use crate::aggregation::{AggregationError, AggregationResult};
use crate::export::{ConversionEndpoint, ConversionRequest, ExportError};
use crate::filter::{ExplicitRange, FilterState};
use crate::source::{
    AnalyticCatalog, JournalCatalog, ReportDataSource, ReportQuery, ReportResponse, SourceError,
};

/// The last successfully applied query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportView {
    /// Per-account totals and grand totals.
    pub result: AggregationResult,
    /// Journal catalog returned with the result.
    pub journals: JournalCatalog,
    /// Analytic catalog returned with the result.
    pub analytics: AnalyticCatalog,
    /// Bounds the date filter resolved to.
    pub resolved_range: Option<ExplicitRange>,
    /// Filter snapshot the result was produced under.
    pub filters: Arc<FilterState>,
    /// Query generation that produced this view.
    pub generation: u64,
}

impl ReportView {
    /// Currency conflicts found while aggregating.
    #[must_use]
    pub fn warnings(&self) -> &[AggregationError] {
        &self.result.warnings
    }
}

/// A query issued by a session but not yet run.
///
/// Running it does not borrow the session, so several may be in flight;
/// only the most recently issued one is applied.
#[derive(Debug, Clone)]
pub struct PendingQuery {
    pub(super) session: u64,
    pub(super) generation: u64,
    pub(super) query: ReportQuery,
    pub(super) snapshot: Arc<FilterState>,
    pub(super) title: String,
    pub(super) initial: bool,
}

impl PendingQuery {
    /// Sequence number of this query within its session.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Query sent to the data source.
    #[must_use]
    pub const fn query(&self) -> &ReportQuery {
        &self.query
    }

    /// Runs the query against `source`.
    pub async fn run(self, source: &dyn ReportDataSource) -> CompletedQuery {
        let outcome = if self.initial {
            let query = (*self.snapshot != FilterState::default()).then_some(&self.query);
            source
                .view_report(self.query.report_type, query, &self.title)
                .await
        } else {
            source.get_filter_values(&self.query).await
        };
        CompletedQuery {
            session: self.session,
            generation: self.generation,
            snapshot: self.snapshot,
            outcome,
        }
    }
}

/// A query result waiting to be applied to its session.
#[derive(Debug, Clone)]
pub struct CompletedQuery {
    pub(super) session: u64,
    pub(super) generation: u64,
    pub(super) snapshot: Arc<FilterState>,
    pub(super) outcome: Result<ReportResponse, SourceError>,
}

impl CompletedQuery {
    /// Generation of the query that produced this result.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns true if the data source answered.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// What happened to a completed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The result replaced the current view.
    Applied,
    /// A newer query was issued; the result was dropped.
    Stale,
    /// The session is closed; the result was dropped.
    Discarded,
    /// Another session issued the query; the result was dropped.
    Foreign,
}

/// A spreadsheet conversion ready to be sent.
#[derive(Debug, Clone)]
pub struct PendingExport {
    pub(super) session: u64,
    pub(super) request: ConversionRequest,
}

impl PendingExport {
    /// Form that will be posted.
    #[must_use]
    pub const fn request(&self) -> &ConversionRequest {
        &self.request
    }

    /// Posts the form to `endpoint`.
    pub async fn run(self, endpoint: &dyn ConversionEndpoint) -> CompletedExport {
        let outcome = endpoint.convert(&self.request).await;
        CompletedExport {
            session: self.session,
            report_name: self.request.report_name,
            outcome,
        }
    }
}

/// A conversion answer waiting to be handed back through its session.
#[derive(Debug, Clone)]
pub struct CompletedExport {
    pub(super) session: u64,
    pub(super) report_name: String,
    pub(super) outcome: Result<Bytes, ExportError>,
}

/// What happened to a finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The converted file.
    Delivered(Bytes),
    /// The session is closed, or another session prepared the export; the
    /// file was dropped.
    Discarded,
}
