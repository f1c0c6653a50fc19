//! Query and response types of the data source contract.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use deferral_shared::types::{AnalyticAccountId, JournalId};
use serde::{Deserialize, Serialize};

use crate::aggregation::LineRecord;
use crate::domain::{Domain, DomainClause, DomainValue, Operator};
use crate::filter::{DateRange, ExplicitRange, FilterState, RecognitionMethod, ReportOption};
use crate::filter::state::presence_map;

/// Which side of deferrals the report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Prepaid expenses recognized over time.
    #[default]
    Expense,
    /// Unearned revenue recognized over time.
    Revenue,
}

impl ReportKind {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Revenue => "revenue",
        }
    }

    /// Journal entry types carrying deferrals of this kind.
    #[must_use]
    pub const fn move_types(self) -> &'static [&'static str] {
        match self {
            Self::Expense => &["in_invoice", "in_refund"],
            Self::Revenue => &["out_invoice", "out_refund"],
        }
    }

    /// Account types the deferred lines are booked on.
    #[must_use]
    pub const fn account_types(self) -> &'static [&'static str] {
        match self {
            Self::Expense => &["expense", "expense_depreciation", "expense_direct_cost"],
            Self::Revenue => &["income", "income_other"],
        }
    }

    /// Default report title.
    #[must_use]
    pub const fn default_title(self) -> &'static str {
        match self {
            Self::Expense => "Deferred Expense Report",
            Self::Revenue => "Deferred Revenue Report",
        }
    }

    /// Action identifier sent with spreadsheet conversions.
    #[must_use]
    pub const fn default_report_action(self) -> &'static str {
        match self {
            Self::Expense => "action_deferred_expense_report",
            Self::Revenue => "action_deferred_revenue_report",
        }
    }

    /// Document template rendering this kind.
    #[must_use]
    pub const fn document_template(self) -> &'static str {
        match self {
            Self::Expense => "dynamic_accounts_report.deferred_expense_report",
            Self::Revenue => "dynamic_accounts_report.deferred_revenue_report",
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Ok(Self::Expense),
            "revenue" => Ok(Self::Revenue),
            _ => Err(format!("Unknown report kind: {s}")),
        }
    }
}

/// Selectable catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry<Id> {
    /// Record id.
    pub id: Id,
    /// Display name.
    pub name: String,
}

impl<Id> CatalogEntry<Id> {
    /// Creates an entry.
    #[must_use]
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Journals the user can select.
pub type JournalCatalog = Vec<CatalogEntry<JournalId>>;

/// Analytic accounts the user can select.
pub type AnalyticCatalog = Vec<CatalogEntry<AnalyticAccountId>>;

/// Everything the data source needs to answer one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportQuery {
    /// Selected journals (empty: all).
    pub selected_journal_ids: Vec<JournalId>,
    /// Period token or explicit bounds.
    pub date_range: DateRange,
    /// Presence flags.
    #[serde(with = "presence_map")]
    pub options: BTreeSet<ReportOption>,
    /// Selected analytic accounts (empty: no restriction).
    pub selected_analytic_ids: Vec<AnalyticAccountId>,
    /// Recognition method.
    pub method: RecognitionMethod,
    /// Report kind.
    pub report_type: ReportKind,
}

impl ReportQuery {
    /// Builds the query for a filter snapshot.
    #[must_use]
    pub fn from_filters(filters: &FilterState, kind: ReportKind) -> Self {
        Self {
            selected_journal_ids: filters.selected_journal_ids.iter().copied().collect(),
            date_range: filters.date_range,
            options: filters.options.clone(),
            selected_analytic_ids: filters.selected_analytic_ids.iter().copied().collect(),
            method: filters.method,
            report_type: kind,
        }
    }

    /// Query of a freshly opened report.
    #[must_use]
    pub fn initial(kind: ReportKind) -> Self {
        Self::from_filters(&FilterState::default(), kind)
    }

    /// Entry states included by the query.
    #[must_use]
    pub fn states(&self) -> &'static [&'static str] {
        if self.options.contains(&ReportOption::Draft) {
            &["posted", "draft"]
        } else {
            &["posted"]
        }
    }

    /// Search domain selecting the query's deferred lines.
    #[must_use]
    pub fn domain(&self, today: NaiveDate) -> Domain {
        let mut domain = vec![
            DomainClause::new("parent_state", Operator::In, DomainValue::texts(self.states())),
            DomainClause::is_set("deferred_start_date"),
            DomainClause::is_set("deferred_end_date"),
            DomainClause::new(
                "move_id.move_type",
                Operator::In,
                DomainValue::texts(self.report_type.move_types()),
            ),
            DomainClause::new(
                "account_id.account_type",
                Operator::In,
                DomainValue::texts(self.report_type.account_types()),
            ),
        ];

        if !self.selected_journal_ids.is_empty() {
            domain.push(DomainClause::new(
                "journal_id",
                Operator::In,
                DomainValue::Ints(self.selected_journal_ids.iter().map(|id| id.0).collect()),
            ));
        }

        if !self.selected_analytic_ids.is_empty() {
            domain.push(DomainClause::new(
                "analytic_line_ids.account_id",
                Operator::In,
                DomainValue::Ints(self.selected_analytic_ids.iter().map(|id| id.0).collect()),
            ));
        }

        if let Some(range) = self.date_range.resolve(today) {
            if let Some(start) = range.start_date {
                domain.push(DomainClause::new("date", Operator::Ge, DomainValue::Date(start)));
            }
            if let Some(end) = range.end_date {
                domain.push(DomainClause::new("date", Operator::Le, DomainValue::Date(end)));
            }
        }

        domain
    }
}

/// Answer to a [`ReportQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportResponse {
    /// Every selectable journal.
    pub journal_ids: JournalCatalog,
    /// Every selectable analytic account.
    pub analytic_ids: AnalyticCatalog,
    /// Deferred lines matching the query, grouped by account.
    pub lines: Vec<LineRecord>,
    /// Reference date the buckets were split against.
    pub as_of: NaiveDate,
    /// Concrete bounds the date filter resolved to, when one was active.
    #[serde(default)]
    pub resolved_range: Option<ExplicitRange>,
}

impl ReportResponse {
    /// Name of a journal, if the catalog knows it.
    #[must_use]
    pub fn journal_name(&self, id: JournalId) -> Option<&str> {
        self.journal_ids
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.name.as_str())
    }

    /// Name of an analytic account, if the catalog knows it.
    #[must_use]
    pub fn analytic_name(&self, id: AnalyticAccountId) -> Option<&str> {
        self.analytic_ids
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.name.as_str())
    }
}
