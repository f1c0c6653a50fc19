//! Report session.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use deferral_shared::types::{AccountId, AnalyticAccountId, JournalId};
use tracing::{debug, error, warn};

use super::error::ReportError;
use super::types::{
    ApplyOutcome, CompletedExport, CompletedQuery, ExportOutcome, PendingExport, PendingQuery,
    ReportView,
};
use crate::aggregation::{AggregationEngine, AggregationResult};
use crate::export::{
    ConversionEndpoint, DocumentRequest, DocumentSink, ExportError, ExportPayloadBuilder,
};
use crate::filter::{
    DateBound, FilterError, FilterState, FilterStateManager, PeriodToken, ReportOption,
};
use crate::navigation::{JournalItemsAction, journal_items_action};
use crate::source::{ReportDataSource, ReportKind, ReportQuery};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// One open report: its filter state, its last result and its in-flight work.
///
/// Every filter change issues exactly one query. Results are applied only if
/// they answer the latest issued query and the session is still open.
pub struct ReportSession {
    id: u64,
    source: Arc<dyn ReportDataSource>,
    kind: ReportKind,
    title: String,
    report_action: String,
    filters: FilterStateManager,
    view: Option<ReportView>,
    issued: u64,
    settled: u64,
    closed: bool,
    notice: Option<ReportError>,
}

impl std::fmt::Debug for ReportSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportSession")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("title", &self.title)
            .field("filters", self.filters.current())
            .field("issued", &self.issued)
            .field("settled", &self.settled)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl ReportSession {
    /// Creates a session with default filters. Nothing is queried until
    /// [`open`](Self::open).
    #[must_use]
    pub fn new(source: Arc<dyn ReportDataSource>, kind: ReportKind) -> Self {
        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            source,
            kind,
            title: kind.default_title().to_string(),
            report_action: kind.default_report_action().to_string(),
            filters: FilterStateManager::new(),
            view: None,
            issued: 0,
            settled: 0,
            closed: false,
            notice: None,
        }
    }

    /// Overrides the report title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Overrides the action identifier sent with spreadsheet exports.
    #[must_use]
    pub fn with_report_action(mut self, action: impl Into<String>) -> Self {
        self.report_action = action.into();
        self
    }

    /// Starts from `state` instead of the defaults.
    #[must_use]
    pub fn with_filters(mut self, state: FilterState) -> Self {
        self.filters = FilterStateManager::with_state(state);
        self
    }

    /// Report kind.
    #[must_use]
    pub const fn kind(&self) -> ReportKind {
        self.kind
    }

    /// Report title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Action identifier sent with spreadsheet exports.
    #[must_use]
    pub fn report_action(&self) -> &str {
        &self.report_action
    }

    /// Current filter state.
    #[must_use]
    pub fn filters(&self) -> &FilterState {
        self.filters.current()
    }

    /// Data source queried by this session.
    #[must_use]
    pub fn source(&self) -> Arc<dyn ReportDataSource> {
        Arc::clone(&self.source)
    }

    /// Last applied view, if any query succeeded yet.
    #[must_use]
    pub const fn view(&self) -> Option<&ReportView> {
        self.view.as_ref()
    }

    /// Aggregation result of the last applied view.
    #[must_use]
    pub fn result(&self) -> Option<&AggregationResult> {
        self.view.as_ref().map(|view| &view.result)
    }

    /// Number of queries issued so far.
    #[must_use]
    pub const fn queries_issued(&self) -> u64 {
        self.issued
    }

    /// Returns true while the latest issued query has not settled.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        !self.closed && self.settled < self.issued
    }

    /// Returns true once the session is torn down.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Non-fatal notice from the last query or export.
    #[must_use]
    pub const fn notice(&self) -> Option<&ReportError> {
        self.notice.as_ref()
    }

    /// Takes the notice, clearing it.
    pub fn take_notice(&mut self) -> Option<ReportError> {
        self.notice.take()
    }

    fn issue(&mut self, initial: bool) -> PendingQuery {
        self.issued += 1;
        let snapshot = self.filters.snapshot();
        let query = ReportQuery::from_filters(&snapshot, self.kind);
        debug!(
            session = self.id,
            generation = self.issued,
            kind = %self.kind,
            initial,
            "Query issued"
        );
        PendingQuery {
            session: self.id,
            generation: self.issued,
            query,
            snapshot,
            title: self.title.clone(),
            initial,
        }
    }

    /// Issues a query for the current filter state without running it.
    pub fn issue_query(&mut self) -> PendingQuery {
        self.issue(false)
    }

    /// Applies several filter changes as one and issues one query.
    ///
    /// # Errors
    ///
    /// [`ReportError::InvalidInput`] if `change` fails; the filter state is
    /// unchanged and nothing is issued.
    pub fn change_filters<F>(&mut self, change: F) -> Result<PendingQuery, ReportError>
    where
        F: FnOnce(FilterState) -> Result<FilterState, FilterError>,
    {
        self.filters.update(change)?;
        Ok(self.issue(false))
    }

    /// Applies a completed query if it answers the latest issued one.
    ///
    /// A successful result replaces the view and collapses every expanded
    /// account. A failed one keeps the previous view and sets a notice.
    ///
    /// # Errors
    ///
    /// [`ReportError::DataSourceUnavailable`] if the latest query failed.
    pub fn apply(&mut self, completed: CompletedQuery) -> Result<ApplyOutcome, ReportError> {
        let CompletedQuery {
            session,
            generation,
            snapshot,
            outcome,
        } = completed;

        if session != self.id {
            debug!(session, own = self.id, generation, "Discarding result of another session");
            return Ok(ApplyOutcome::Foreign);
        }
        if self.closed {
            debug!(generation, "Discarding result for closed session");
            return Ok(ApplyOutcome::Discarded);
        }
        if generation != self.issued {
            debug!(generation, latest = self.issued, "Discarding stale result");
            return Ok(ApplyOutcome::Stale);
        }
        self.settled = generation;

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                let err = ReportError::from(e);
                warn!(generation, error = %err, "Query failed; keeping last result");
                self.notice = Some(err.clone());
                return Err(err);
            }
        };

        let result = AggregationEngine::aggregate(&response.lines, response.as_of);
        self.notice = result.warnings.first().cloned().map(ReportError::from);
        debug!(
            generation,
            accounts = result.accounts.len(),
            lines = response.lines.len(),
            "Query applied"
        );

        self.view = Some(ReportView {
            result,
            journals: response.journal_ids,
            analytics: response.analytic_ids,
            resolved_range: response.resolved_range,
            filters: snapshot,
            generation,
        });
        self.filters.clear_expanded();
        Ok(ApplyOutcome::Applied)
    }

    async fn run_and_apply(&mut self, pending: PendingQuery) -> Result<ApplyOutcome, ReportError> {
        let source = Arc::clone(&self.source);
        let completed = pending.run(source.as_ref()).await;
        self.apply(completed)
    }

    /// Initial load.
    ///
    /// # Errors
    ///
    /// [`ReportError::DataSourceUnavailable`] if the data source fails.
    pub async fn open(&mut self) -> Result<ApplyOutcome, ReportError> {
        let pending = self.issue(true);
        self.run_and_apply(pending).await
    }

    /// Re-runs the query for the current filter state.
    ///
    /// # Errors
    ///
    /// [`ReportError::DataSourceUnavailable`] if the data source fails.
    pub async fn refresh(&mut self) -> Result<ApplyOutcome, ReportError> {
        if self.closed {
            return Ok(ApplyOutcome::Discarded);
        }
        let pending = self.issue_query();
        self.run_and_apply(pending).await
    }

    /// Applies a batch of filter changes and re-queries once.
    ///
    /// # Errors
    ///
    /// [`ReportError::InvalidInput`] before any query, or
    /// [`ReportError::DataSourceUnavailable`] if the query fails.
    pub async fn update<F>(&mut self, change: F) -> Result<ApplyOutcome, ReportError>
    where
        F: FnOnce(FilterState) -> Result<FilterState, FilterError>,
    {
        if self.closed {
            return Ok(ApplyOutcome::Discarded);
        }
        let pending = self.change_filters(change)?;
        self.run_and_apply(pending).await
    }

    /// Flips a journal and re-queries.
    ///
    /// # Errors
    ///
    /// [`ReportError::DataSourceUnavailable`] if the query fails.
    pub async fn toggle_journal(&mut self, id: JournalId) -> Result<ApplyOutcome, ReportError> {
        self.update(|state| Ok(state.with_journal_toggled(id))).await
    }

    /// Flips an analytic account and re-queries.
    ///
    /// # Errors
    ///
    /// [`ReportError::DataSourceUnavailable`] if the query fails.
    pub async fn toggle_analytic(
        &mut self,
        id: AnalyticAccountId,
    ) -> Result<ApplyOutcome, ReportError> {
        self.update(|state| Ok(state.with_analytic_toggled(id))).await
    }

    /// Selects a named period and re-queries.
    ///
    /// # Errors
    ///
    /// [`ReportError::DataSourceUnavailable`] if the query fails.
    pub async fn set_date_range_token(
        &mut self,
        token: PeriodToken,
    ) -> Result<ApplyOutcome, ReportError> {
        self.update(|state| Ok(state.with_date_range_token(token))).await
    }

    /// Parses and sets one explicit bound, then re-queries.
    ///
    /// # Errors
    ///
    /// [`ReportError::InvalidInput`] for an unparseable date (no query is
    /// issued), or [`ReportError::DataSourceUnavailable`].
    pub async fn set_date_bound(
        &mut self,
        which: DateBound,
        value: &str,
    ) -> Result<ApplyOutcome, ReportError> {
        self.update(|state| state.try_with_date_bound(which, value))
            .await
    }

    /// Flips a flag and re-queries.
    ///
    /// # Errors
    ///
    /// [`ReportError::DataSourceUnavailable`] if the query fails.
    pub async fn toggle_option(
        &mut self,
        option: ReportOption,
    ) -> Result<ApplyOutcome, ReportError> {
        self.update(|state| Ok(state.with_option_toggled(option))).await
    }

    /// Shows or hides one account's lines. Never queries.
    pub fn toggle_expanded(&mut self, account_id: AccountId) {
        self.filters.toggle_expanded(account_id);
    }

    /// Collapses every account. Never queries.
    pub fn clear_expanded(&mut self) {
        self.filters.clear_expanded();
    }

    /// Returns true if the account's lines are shown.
    #[must_use]
    pub fn is_expanded(&self, account_id: AccountId) -> bool {
        self.filters.current().is_expanded(account_id)
    }

    /// Action opening the journal items behind an account row.
    #[must_use]
    pub fn journal_items_action(&self, account_id: AccountId) -> JournalItemsAction {
        journal_items_action(self.kind, account_id)
    }

    fn payload_builder(&self) -> Result<ExportPayloadBuilder<'_>, ExportError> {
        let view = self.view.as_ref().ok_or(ExportError::EmptyDataset)?;
        Ok(ExportPayloadBuilder::new(&view.result, &view.filters, &self.title)?
            .with_catalogs(&view.journals, &view.analytics)
            .with_resolved_range(view.resolved_range))
    }

    /// Document action for the current view.
    ///
    /// # Errors
    ///
    /// [`ReportError::EmptyDataset`] when there is nothing to export.
    pub fn document_request(&self) -> Result<DocumentRequest, ReportError> {
        Ok(self
            .payload_builder()?
            .document_request(self.kind, &self.title))
    }

    /// Renders the current view through `sink`.
    ///
    /// # Errors
    ///
    /// [`ReportError::EmptyDataset`] without calling the sink, or
    /// [`ReportError::ExportFailed`] if rendering fails.
    pub fn export_document(&mut self, sink: &dyn DocumentSink) -> Result<(), ReportError> {
        let request = self.document_request()?;
        sink.open(&request).map_err(|e| self.export_failed(e))
    }

    /// Prepares a spreadsheet conversion of the current view.
    ///
    /// # Errors
    ///
    /// [`ReportError::EmptyDataset`] when there is nothing to export.
    pub fn prepare_spreadsheet_export(&self) -> Result<PendingExport, ReportError> {
        let request = self
            .payload_builder()?
            .conversion_request(&self.report_action)?;
        Ok(PendingExport {
            session: self.id,
            request,
        })
    }

    /// Hands back a finished conversion.
    ///
    /// # Errors
    ///
    /// [`ReportError::ExportFailed`] if the conversion failed or produced an
    /// empty file. The current view is left untouched.
    pub fn finish_export(
        &mut self,
        completed: CompletedExport,
    ) -> Result<ExportOutcome, ReportError> {
        if completed.session != self.id {
            debug!(
                session = completed.session,
                own = self.id,
                report_name = %completed.report_name,
                "Discarding export of another session"
            );
            return Ok(ExportOutcome::Discarded);
        }
        if self.closed {
            debug!(report_name = %completed.report_name, "Discarding export for closed session");
            return Ok(ExportOutcome::Discarded);
        }
        match completed.outcome {
            Ok(bytes) if bytes.is_empty() => {
                Err(self.export_failed(ExportError::failed("conversion returned an empty file")))
            }
            Ok(bytes) => {
                debug!(
                    report_name = %completed.report_name,
                    size = bytes.len(),
                    "Export delivered"
                );
                Ok(ExportOutcome::Delivered(bytes))
            }
            Err(e) => Err(self.export_failed(e)),
        }
    }

    /// Converts the current view to a spreadsheet through `endpoint`.
    ///
    /// # Errors
    ///
    /// [`ReportError::EmptyDataset`] without calling the endpoint, or
    /// [`ReportError::ExportFailed`].
    pub async fn export_spreadsheet(
        &mut self,
        endpoint: &dyn ConversionEndpoint,
    ) -> Result<ExportOutcome, ReportError> {
        let pending = self.prepare_spreadsheet_export()?;
        let completed = pending.run(endpoint).await;
        self.finish_export(completed)
    }

    fn export_failed(&mut self, err: ExportError) -> ReportError {
        let err = ReportError::from(err);
        error!(title = %self.title, error = %err, "Export failed");
        self.notice = Some(err.clone());
        err
    }

    /// Tears the session down. Results arriving later are discarded.
    pub fn close(&mut self) {
        if !self.closed {
            debug!(issued = self.issued, settled = self.settled, "Session closed");
            self.closed = true;
        }
    }
}
