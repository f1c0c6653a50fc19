//! Data source over raw journal lines held in memory.

use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use deferral_shared::types::{AccountId, AnalyticAccountId, CurrencyCode, JournalId, MoveId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::SourceError;
use super::split::split_line;
use super::types::{AnalyticCatalog, JournalCatalog, ReportQuery, ReportResponse};
use super::ReportDataSource;
use crate::aggregation::{LineDetail, LineRecord};
use crate::filter::ExplicitRange;

/// Posting state of a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveState {
    /// Posted to the ledger.
    #[default]
    Posted,
    /// Not yet posted.
    Draft,
    /// Cancelled; never reported.
    Cancel,
}

impl MoveState {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Posted => "posted",
            Self::Draft => "draft",
            Self::Cancel => "cancel",
        }
    }
}

/// A journal item before bucket splitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLine {
    /// Account the line is booked on.
    pub account_id: AccountId,
    /// Account display name.
    pub account_name: String,
    /// Account type, e.g. `expense`.
    pub account_type: String,
    /// Entry type, e.g. `in_invoice`.
    pub move_type: String,
    /// Posting state of the entry.
    #[serde(default)]
    pub state: MoveState,
    /// Journal of the entry.
    pub journal_id: JournalId,
    /// Analytic accounts the line is distributed to.
    #[serde(default)]
    pub analytic_ids: Vec<AnalyticAccountId>,
    /// Accounting date.
    pub date: NaiveDate,
    /// First day of recognition; lines without one are not deferred.
    #[serde(default)]
    pub deferred_start_date: Option<NaiveDate>,
    /// Last day of recognition.
    #[serde(default)]
    pub deferred_end_date: Option<NaiveDate>,
    /// Signed balance.
    pub balance: Decimal,
    /// Already recognized portion.
    #[serde(default)]
    pub recognized: Decimal,
    /// Line currency; the source currency when absent.
    #[serde(default)]
    pub currency_id: Option<CurrencyCode>,
    /// Journal entry.
    #[serde(default)]
    pub move_id: Option<MoveId>,
    /// Journal entry reference.
    #[serde(default)]
    pub move_name: Option<String>,
    /// Line label.
    #[serde(default)]
    pub name: Option<String>,
    /// Partner display name.
    #[serde(default)]
    pub partner_name: Option<String>,
}

impl RawLine {
    fn matches(&self, query: &ReportQuery, range: Option<&ExplicitRange>) -> bool {
        let kind = query.report_type;
        self.deferred_start_date.is_some()
            && self.deferred_end_date.is_some()
            && query.states().contains(&self.state.as_str())
            && kind.move_types().contains(&self.move_type.as_str())
            && kind.account_types().contains(&self.account_type.as_str())
            && (query.selected_journal_ids.is_empty()
                || query.selected_journal_ids.contains(&self.journal_id))
            && (query.selected_analytic_ids.is_empty()
                || self
                    .analytic_ids
                    .iter()
                    .any(|id| query.selected_analytic_ids.contains(id)))
            && range.is_none_or(|r| r.contains(self.date))
    }

    fn to_record(&self, currency: &CurrencyCode, as_of: NaiveDate) -> Option<LineRecord> {
        let start = self.deferred_start_date?;
        let end = self.deferred_end_date?;
        let split = split_line(self.balance, start, end, as_of);
        let recognized = self.recognized.abs();

        Some(LineRecord {
            account_id: self.account_id,
            account_name: self.account_name.clone(),
            currency_id: self.currency_id.clone().unwrap_or_else(|| currency.clone()),
            amount_total: split.total,
            amount_before: split.before,
            amount_current: split.current,
            amount_not_started: split.not_started,
            amount_later: split.later,
            amount_recognized: recognized,
            amount_remaining: split.total - recognized,
            detail: LineDetail {
                move_id: self.move_id,
                move_name: self.move_name.clone(),
                name: self.name.clone(),
                date: Some(self.date),
                partner_name: self.partner_name.clone(),
                journal_id: Some(self.journal_id),
                deferred_start_date: Some(start),
                deferred_end_date: Some(end),
            },
        })
    }
}

/// On-disk shape of an in-memory source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixture {
    /// Company currency.
    pub currency: CurrencyCode,
    /// Journal catalog.
    pub journals: JournalCatalog,
    /// Analytic catalog.
    pub analytics: AnalyticCatalog,
    /// Raw journal items.
    pub lines: Vec<RawLine>,
}

/// [`ReportDataSource`] answering queries from raw lines in memory.
///
/// Buckets split the whole line amount: `before + current + not_started +
/// later` equals `amount_total`, not `amount_total` less the recognized
/// portion. The recognized amount of each raw line is reported next to the
/// buckets in `amount_recognized`, with `amount_remaining` as the difference.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    fixture: Fixture,
    as_of: Option<NaiveDate>,
}

impl InMemorySource {
    /// Creates a source over `fixture`.
    #[must_use]
    pub fn new(fixture: Fixture) -> Self {
        Self {
            fixture,
            as_of: None,
        }
    }

    /// Pins the reference date instead of using the local date.
    #[must_use]
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = Some(as_of);
        self
    }

    /// Parses a fixture from JSON.
    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, SourceError> {
        let fixture: Fixture = serde_json::from_reader(reader)?;
        Ok(Self::new(fixture))
    }

    /// Loads a fixture file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            SourceError::unavailable(format!("cannot open {}: {e}", path.display()))
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Reference date for period resolution and bucket splits.
    #[must_use]
    pub fn as_of(&self) -> NaiveDate {
        self.as_of
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Number of raw lines held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fixture.lines.len()
    }

    /// Returns true if no raw line is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fixture.lines.is_empty()
    }
}

#[async_trait]
impl ReportDataSource for InMemorySource {
    async fn get_filter_values(&self, query: &ReportQuery) -> Result<ReportResponse, SourceError> {
        let as_of = self.as_of();
        let resolved_range = query.date_range.resolve(as_of);

        debug!(
            kind = %query.report_type,
            domain = %serde_json::to_string(&query.domain(as_of)).unwrap_or_default(),
            "Evaluating deferred lines query"
        );

        let mut matching: Vec<&RawLine> = self
            .fixture
            .lines
            .iter()
            .filter(|line| line.matches(query, resolved_range.as_ref()))
            .collect();
        matching.sort_by(|a, b| {
            a.account_name
                .cmp(&b.account_name)
                .then(a.account_id.cmp(&b.account_id))
        });

        let lines: Vec<LineRecord> = matching
            .into_iter()
            .filter_map(|line| line.to_record(&self.fixture.currency, as_of))
            .collect();

        debug!(lines = lines.len(), "Deferred lines matched");

        Ok(ReportResponse {
            journal_ids: self.fixture.journals.clone(),
            analytic_ids: self.fixture.analytics.clone(),
            lines,
            as_of,
            resolved_range,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterState, PeriodToken, ReportOption};
    use crate::source::{CatalogEntry, ReportKind};
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn raw(account: i64, journal: i64, date: NaiveDate, balance: Decimal) -> RawLine {
        RawLine {
            account_id: AccountId::new(account),
            account_name: format!("{account} Prepaid"),
            account_type: "expense".into(),
            move_type: "in_invoice".into(),
            state: MoveState::Posted,
            journal_id: JournalId::new(journal),
            analytic_ids: Vec::new(),
            date,
            deferred_start_date: Some(d(2026, 10, 1)),
            deferred_end_date: Some(d(2026, 12, 31)),
            balance,
            recognized: Decimal::ZERO,
            currency_id: None,
            move_id: None,
            move_name: None,
            name: None,
            partner_name: None,
        }
    }

    fn source(lines: Vec<RawLine>) -> InMemorySource {
        InMemorySource::new(Fixture {
            currency: CurrencyCode::from("USD"),
            journals: vec![
                CatalogEntry::new(JournalId::new(1), "Vendor Bills"),
                CatalogEntry::new(JournalId::new(2), "Miscellaneous"),
            ],
            analytics: vec![CatalogEntry::new(AnalyticAccountId::new(9), "Marketing")],
            lines,
        })
        .with_as_of(d(2026, 10, 18))
    }

    fn query(filters: &FilterState) -> ReportQuery {
        ReportQuery::from_filters(filters, ReportKind::Expense)
    }

    #[tokio::test]
    async fn test_returns_catalogs_and_split_lines() {
        let src = source(vec![raw(1, 1, d(2026, 9, 30), dec!(-92))]);
        let response = src.get_filter_values(&query(&FilterState::new())).await.unwrap();

        assert_eq!(response.journal_ids.len(), 2);
        assert_eq!(response.analytic_ids.len(), 1);
        assert_eq!(response.as_of, d(2026, 10, 18));
        assert_eq!(response.resolved_range, None);
        assert_eq!(response.lines.len(), 1);
        let line = &response.lines[0];
        assert_eq!(line.amount_total, dec!(92));
        assert_eq!(line.amount_current, dec!(92));
        assert_eq!(line.amount_remaining, dec!(92));
        assert_eq!(line.currency_id, CurrencyCode::from("USD"));
        assert_eq!(line.detail.journal_id, Some(JournalId::new(1)));
    }

    #[tokio::test]
    async fn test_buckets_cover_whole_amount_with_recognized_alongside() {
        let mut line = raw(1, 1, d(2026, 9, 30), dec!(-92));
        line.deferred_start_date = Some(d(2026, 9, 1));
        line.recognized = dec!(-30);
        let src = source(vec![line]);

        let response = src.get_filter_values(&query(&FilterState::new())).await.unwrap();

        let record = &response.lines[0];
        assert_eq!(record.amount_total, dec!(92));
        assert_eq!(
            record.amount_before
                + record.amount_current
                + record.amount_not_started
                + record.amount_later,
            record.amount_total
        );
        assert!(record.amount_before > Decimal::ZERO);
        assert_eq!(record.amount_recognized, dec!(30));
        assert_eq!(record.amount_remaining, dec!(62));
    }

    #[tokio::test]
    async fn test_drafts_only_with_option() {
        let mut draft = raw(1, 1, d(2026, 9, 30), dec!(10));
        draft.state = MoveState::Draft;
        let mut cancelled = raw(1, 1, d(2026, 9, 30), dec!(10));
        cancelled.state = MoveState::Cancel;
        let src = source(vec![raw(1, 1, d(2026, 9, 30), dec!(10)), draft, cancelled]);

        let posted = src.get_filter_values(&query(&FilterState::new())).await.unwrap();
        assert_eq!(posted.lines.len(), 1);

        let filters = FilterState::new().with_option_toggled(ReportOption::Draft);
        let with_draft = src.get_filter_values(&query(&filters)).await.unwrap();
        assert_eq!(with_draft.lines.len(), 2);
    }

    #[tokio::test]
    async fn test_kind_selects_move_and_account_types() {
        let mut revenue = raw(2, 1, d(2026, 9, 30), dec!(10));
        revenue.move_type = "out_invoice".into();
        revenue.account_type = "income".into();
        let mut not_deferred = raw(3, 1, d(2026, 9, 30), dec!(10));
        not_deferred.deferred_start_date = None;
        let src = source(vec![raw(1, 1, d(2026, 9, 30), dec!(10)), revenue, not_deferred]);

        let expense = src.get_filter_values(&query(&FilterState::new())).await.unwrap();
        assert_eq!(expense.lines.len(), 1);
        assert_eq!(expense.lines[0].account_id, AccountId::new(1));

        let revenue_query = ReportQuery::from_filters(&FilterState::new(), ReportKind::Revenue);
        let revenue = src.get_filter_values(&revenue_query).await.unwrap();
        assert_eq!(revenue.lines.len(), 1);
        assert_eq!(revenue.lines[0].account_id, AccountId::new(2));
    }

    #[tokio::test]
    async fn test_journal_and_analytic_selection() {
        let mut tagged = raw(2, 2, d(2026, 9, 30), dec!(10));
        tagged.analytic_ids = vec![AnalyticAccountId::new(9)];
        let src = source(vec![raw(1, 1, d(2026, 9, 30), dec!(10)), tagged]);

        let journal = FilterState::new().with_journal_toggled(JournalId::new(1));
        let by_journal = src.get_filter_values(&query(&journal)).await.unwrap();
        assert_eq!(by_journal.lines.len(), 1);
        assert_eq!(by_journal.lines[0].account_id, AccountId::new(1));

        let analytic = FilterState::new().with_analytic_toggled(AnalyticAccountId::new(9));
        let by_analytic = src.get_filter_values(&query(&analytic)).await.unwrap();
        assert_eq!(by_analytic.lines.len(), 1);
        assert_eq!(by_analytic.lines[0].account_id, AccountId::new(2));
    }

    #[tokio::test]
    async fn test_date_range_filters_accounting_date() {
        let src = source(vec![
            raw(1, 1, d(2026, 10, 2), dec!(10)),
            raw(1, 1, d(2026, 9, 30), dec!(10)),
        ]);
        let filters = FilterState::new().with_date_range_token(PeriodToken::Quarter);

        let response = src.get_filter_values(&query(&filters)).await.unwrap();

        assert_eq!(response.lines.len(), 1);
        assert_eq!(response.lines[0].detail.date, Some(d(2026, 10, 2)));
        assert_eq!(
            response.resolved_range,
            Some(ExplicitRange::between(d(2026, 10, 1), d(2026, 12, 31)))
        );
    }

    #[tokio::test]
    async fn test_lines_grouped_by_account() {
        let src = source(vec![
            raw(2, 1, d(2026, 9, 30), dec!(1)),
            raw(1, 1, d(2026, 9, 30), dec!(2)),
            raw(2, 1, d(2026, 9, 29), dec!(3)),
        ]);
        let response = src.get_filter_values(&query(&FilterState::new())).await.unwrap();
        let accounts: Vec<i64> = response.lines.iter().map(|l| l.account_id.0).collect();
        assert_eq!(accounts, vec![1, 2, 2]);
    }

    #[tokio::test]
    async fn test_view_report_without_snapshot_uses_initial_query() {
        let src = source(vec![raw(1, 1, d(2020, 1, 1), dec!(10))]);
        let response = src
            .view_report(ReportKind::Expense, None, "Deferred Expense Report")
            .await
            .unwrap();
        assert_eq!(response.lines.len(), 1);
        assert_eq!(response.resolved_range, None);
    }

    #[test]
    fn test_fixture_from_json() {
        let json = r#"{
            "currency": "EUR",
            "journals": [{"id": 1, "name": "Vendor Bills"}],
            "lines": [{
                "account_id": 12, "account_name": "600000 Rent", "account_type": "expense",
                "move_type": "in_invoice", "journal_id": 1, "date": "2026-09-15",
                "deferred_start_date": "2026-10-01", "deferred_end_date": "2027-09-30",
                "balance": "1200.00", "recognized": "100.00", "move_name": "BILL/2026/0042"
            }]
        }"#;
        let src = InMemorySource::from_reader(json.as_bytes()).unwrap();
        assert_eq!(src.len(), 1);
        assert_eq!(src.fixture.lines[0].state, MoveState::Posted);
        assert_eq!(src.fixture.lines[0].recognized, dec!(100));
    }

    #[test]
    fn test_malformed_fixture() {
        let err = InMemorySource::from_reader("{\"lines\": 3}".as_bytes()).unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
    }

    #[test]
    fn test_missing_fixture_file() {
        let err = InMemorySource::from_json_file("/nonexistent/deferred.json").unwrap_err();
        assert!(matches!(err, SourceError::Unavailable(_)));
    }
}
