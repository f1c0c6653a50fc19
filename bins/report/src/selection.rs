//! Session setup and initial filter selection from configuration.

use std::sync::Arc;

use deferral_core::filter::{DateBound, FilterError, FilterState, PeriodToken, ReportOption};
use deferral_core::{ReportDataSource, ReportKind, ReportSession};
use deferral_shared::AppConfig;
use deferral_shared::config::ReportConfig;
use deferral_shared::types::{AnalyticAccountId, JournalId};

/// Builds an unopened session for `kind` over `source`.
///
/// Title and report action fall back to the kind's own when not configured.
/// The configured selection is installed before opening, so the initial load
/// is the only query.
pub fn build_session(
    config: &AppConfig,
    kind: ReportKind,
    source: Arc<dyn ReportDataSource>,
) -> Result<ReportSession, FilterError> {
    let filters = configured_filters(&config.report)?;
    let mut session = ReportSession::new(source, kind).with_filters(filters);
    if let Some(title) = &config.report.title {
        session = session.with_title(title.clone());
    }
    if let Some(action) = &config.export.report_action {
        session = session.with_report_action(action.clone());
    }
    Ok(session)
}

/// Builds the filter state described by `report`.
///
/// An explicit bound overrides the period token, as it does when set in the
/// report itself.
pub fn configured_filters(report: &ReportConfig) -> Result<FilterState, FilterError> {
    let mut state = FilterState::new();

    for id in &report.journals {
        state = state.with_journal_toggled(JournalId::new(*id));
    }
    for id in &report.analytics {
        state = state.with_analytic_toggled(AnalyticAccountId::new(*id));
    }
    if let Some(token) = &report.date_range {
        state = state.with_date_range_token(token.parse::<PeriodToken>()?);
    }
    if let Some(start) = &report.start_date {
        state = state.try_with_date_bound(DateBound::Start, start)?;
    }
    if let Some(end) = &report.end_date {
        state = state.try_with_date_bound(DateBound::End, end)?;
    }
    if report.include_draft {
        state = state.with_option_toggled(ReportOption::Draft);
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deferral_core::InMemorySource;
    use deferral_core::session::ApplyOutcome;

    fn source() -> Arc<dyn ReportDataSource> {
        Arc::new(InMemorySource::default())
    }

    #[test]
    fn test_revenue_session_uses_revenue_defaults() {
        let config = AppConfig {
            report: ReportConfig {
                kind: "revenue".into(),
                ..ReportConfig::default()
            },
            ..AppConfig::default()
        };

        let session = build_session(&config, ReportKind::Revenue, source()).unwrap();

        assert_eq!(session.title(), "Deferred Revenue Report");
        assert_eq!(session.report_action(), "action_deferred_revenue_report");
    }

    #[test]
    fn test_configured_title_and_action_override_kind_defaults() {
        let mut config = AppConfig::default();
        config.report.title = Some("Prepaid Costs".into());
        config.export.report_action = Some("action_custom".into());

        let session = build_session(&config, ReportKind::Expense, source()).unwrap();

        assert_eq!(session.title(), "Prepaid Costs");
        assert_eq!(session.report_action(), "action_custom");
    }

    #[tokio::test]
    async fn test_configured_selection_opens_with_one_query() {
        let mut config = AppConfig::default();
        config.report.journals = vec![3];
        config.report.include_draft = true;

        let mut session = build_session(&config, ReportKind::Expense, source()).unwrap();
        assert_eq!(session.open().await.unwrap(), ApplyOutcome::Applied);

        assert_eq!(session.queries_issued(), 1);
        assert!(session.filters().selected_journal_ids.contains(&JournalId::new(3)));
        assert!(session.filters().has_option(ReportOption::Draft));
    }

    #[test]
    fn test_default_config_is_default_state() {
        let state = configured_filters(&ReportConfig::default()).unwrap();
        assert_eq!(state, FilterState::default());
    }

    #[test]
    fn test_full_selection() {
        let report = ReportConfig {
            journals: vec![1, 2],
            analytics: vec![9],
            date_range: Some("last-quarter".into()),
            include_draft: true,
            ..ReportConfig::default()
        };

        let state = configured_filters(&report).unwrap();

        assert_eq!(state.selected_journal_ids.len(), 2);
        assert!(state.selected_analytic_ids.contains(&AnalyticAccountId::new(9)));
        assert_eq!(state.date_range.token(), Some(PeriodToken::LastQuarter));
        assert!(state.has_option(ReportOption::Draft));
    }

    #[test]
    fn test_explicit_bound_overrides_token() {
        let report = ReportConfig {
            date_range: Some("year".into()),
            end_date: Some("2026-06-30".into()),
            ..ReportConfig::default()
        };

        let state = configured_filters(&report).unwrap();

        assert_eq!(state.date_range.token(), None);
        let range = state.date_range.explicit().unwrap();
        assert_eq!(range.start_date, None);
        assert_eq!(range.end_date.unwrap().to_string(), "2026-06-30");
    }

    #[test]
    fn test_bad_values_are_rejected() {
        let bad_token = ReportConfig {
            date_range: Some("fortnight".into()),
            ..ReportConfig::default()
        };
        assert!(configured_filters(&bad_token).is_err());

        let bad_date = ReportConfig {
            start_date: Some("18/10/2026".into()),
            ..ReportConfig::default()
        };
        assert!(matches!(
            configured_filters(&bad_date),
            Err(FilterError::InvalidInput { field: "start_date", .. })
        ));
    }
}
