//! Report data source contract.
//!
//! A data source answers a [`ReportQuery`] (a filter snapshot plus the report
//! kind) with the selectable catalogs and the pre-split line records. It is
//! a pure query with no side effects.

pub mod error;
pub mod memory;
pub mod split;
pub mod types;

use async_trait::async_trait;

pub use error::SourceError;
pub use memory::{Fixture, InMemorySource, MoveState, RawLine};
pub use split::{BucketSplit, split_line};
pub use types::{
    AnalyticCatalog, CatalogEntry, JournalCatalog, ReportKind, ReportQuery, ReportResponse,
};

/// Supplies catalogs and deferred line records for a report.
#[async_trait]
pub trait ReportDataSource: Send + Sync {
    /// Runs a filtered query.
    async fn get_filter_values(&self, query: &ReportQuery) -> Result<ReportResponse, SourceError>;

    /// Initial load when a report opens. Without a query the default filter
    /// state of `kind` is used.
    async fn view_report(
        &self,
        kind: ReportKind,
        query: Option<&ReportQuery>,
        title: &str,
    ) -> Result<ReportResponse, SourceError> {
        tracing::debug!(kind = %kind, title, "Loading report");
        match query {
            Some(query) => self.get_filter_values(query).await,
            None => self.get_filter_values(&ReportQuery::initial(kind)).await,
        }
    }
}
