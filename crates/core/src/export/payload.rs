//! Export payload shaping.
//!
//! Payloads are derived from one aggregation result and the filter snapshot
//! it was produced under. Numbers are copied, never recomputed; only the
//! grand totals are rounded (spreadsheet) or formatted (document).

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use deferral_shared::types::{
    AccountId, AnalyticAccountId, CurrencyCode, JournalId, format_amount, round_for_display,
};
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::ExportError;
use crate::aggregation::{AccountAggregate, AggregationResult, BucketTotals, LineRecord};
use crate::filter::state::presence_map;
use crate::filter::{DateRange, ExplicitRange, FilterState, ReportOption};
use crate::source::{CatalogEntry, ReportKind};

/// Model that converts spreadsheet payloads.
pub const CONVERSION_MODEL: &str = "deferred.report";

/// Output format requested from the conversion endpoint.
pub const SPREADSHEET_FORMAT: &str = "xlsx";

/// Human-readable filter summary printed on exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterDescriptor {
    /// Names of the selected journals.
    pub journal: Vec<String>,
    /// Names of the selected analytic accounts.
    pub analytic: Vec<String>,
    /// Active flags.
    #[serde(with = "presence_map")]
    pub options: BTreeSet<ReportOption>,
    /// Resolved lower bound, `null` when unknown.
    pub start_date: Option<NaiveDate>,
    /// Resolved upper bound, `null` when unknown.
    pub end_date: Option<NaiveDate>,
}

/// Grand totals as formatted strings, for document rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentGrandTotal {
    /// Total deferred amount.
    pub total_deferred: String,
    /// Current period.
    pub total_current: String,
    /// Not yet started.
    pub total_not_started: String,
    /// Before the current period.
    pub total_before: String,
    /// After the current period.
    pub total_later: String,
    /// Report currency, empty when unknown.
    pub currency: String,
}

/// Grand totals as two-decimal numbers, for spreadsheet cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpreadsheetGrandTotal {
    /// Total deferred amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_deferred: Decimal,
    /// Current period.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_current: Decimal,
    /// Not yet started.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_not_started: Decimal,
    /// Before the current period.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_before: Decimal,
    /// After the current period.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_later: Decimal,
    /// Report currency, empty when unknown.
    pub currency: String,
}

/// Per-account totals row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    /// Account.
    pub account_id: AccountId,
    /// Account currency.
    pub currency_id: CurrencyCode,
    /// Total deferred amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// Current period.
    #[serde(with = "rust_decimal::serde::float")]
    pub current: Decimal,
    /// Not yet started.
    #[serde(with = "rust_decimal::serde::float")]
    pub not_started: Decimal,
    /// Before the current period.
    #[serde(with = "rust_decimal::serde::float")]
    pub before: Decimal,
    /// After the current period.
    #[serde(with = "rust_decimal::serde::float")]
    pub later: Decimal,
    /// Already recognized.
    #[serde(with = "rust_decimal::serde::float")]
    pub recognized: Decimal,
    /// Still to recognize.
    #[serde(with = "rust_decimal::serde::float")]
    pub remaining: Decimal,
    /// Lines disagree on currency.
    pub currency_conflict: bool,
}

impl From<&AccountAggregate> for AccountSummary {
    fn from(account: &AccountAggregate) -> Self {
        let BucketTotals {
            total,
            not_started,
            before,
            current,
            later,
            recognized,
            remaining,
        } = account.totals;
        Self {
            account_id: account.account_id,
            currency_id: account.currency_id.clone(),
            total,
            current,
            not_started,
            before,
            later,
            recognized,
            remaining,
            currency_conflict: account.currency_conflict,
        }
    }
}

/// Data handed to an exporter. `G` is the grand total flavour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportPayload<G> {
    /// Account labels in report order.
    pub account: Vec<String>,
    /// Lines per account label.
    pub account_data: BTreeMap<String, Vec<LineRecord>>,
    /// Totals per account label.
    pub total: BTreeMap<String, AccountSummary>,
    /// Report title.
    pub title: String,
    /// Filter summary.
    pub filters: FilterDescriptor,
    /// Grand totals.
    pub grand_total: G,
    /// Name of the invoking action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_name: Option<String>,
}

/// Report action rendering a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRequest {
    /// Action type.
    #[serde(rename = "type")]
    pub action_type: &'static str,
    /// Renderer.
    pub report_type: &'static str,
    /// Template id.
    pub report_name: &'static str,
    /// Template file.
    pub report_file: &'static str,
    /// Payload.
    pub data: ExportPayload<DocumentGrandTotal>,
    /// Title of the rendered document.
    pub display_name: String,
}

/// Form posted to the conversion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionRequest {
    /// Converting model.
    pub model: &'static str,
    /// JSON-encoded [`ExportPayload`] with spreadsheet grand totals.
    pub data: String,
    /// Output format.
    pub output_format: &'static str,
    /// File title.
    pub report_name: String,
    /// Action the report belongs to.
    pub report_action: String,
}

impl ConversionRequest {
    /// Form fields in submission order.
    #[must_use]
    pub fn form_fields(&self) -> [(&'static str, &str); 5] {
        [
            ("model", self.model),
            ("data", self.data.as_str()),
            ("output_format", self.output_format),
            ("report_name", self.report_name.as_str()),
            ("report_action", self.report_action.as_str()),
        ]
    }
}

/// Builds export payloads from a non-empty aggregation result.
#[derive(Debug, Clone)]
pub struct ExportPayloadBuilder<'a> {
    result: &'a AggregationResult,
    filters: &'a FilterState,
    title: &'a str,
    journals: &'a [CatalogEntry<JournalId>],
    analytics: &'a [CatalogEntry<AnalyticAccountId>],
    resolved_range: Option<ExplicitRange>,
}

impl<'a> ExportPayloadBuilder<'a> {
    /// Starts a payload.
    ///
    /// # Errors
    ///
    /// [`ExportError::EmptyDataset`] when the result has no account.
    pub fn new(
        result: &'a AggregationResult,
        filters: &'a FilterState,
        title: &'a str,
    ) -> Result<Self, ExportError> {
        if result.is_empty() {
            return Err(ExportError::EmptyDataset);
        }
        Ok(Self {
            result,
            filters,
            title,
            journals: &[],
            analytics: &[],
            resolved_range: None,
        })
    }

    /// Catalogs used to resolve selected ids to names.
    #[must_use]
    pub fn with_catalogs(
        mut self,
        journals: &'a [CatalogEntry<JournalId>],
        analytics: &'a [CatalogEntry<AnalyticAccountId>],
    ) -> Self {
        self.journals = journals;
        self.analytics = analytics;
        self
    }

    /// Bounds the data source resolved the date filter to.
    #[must_use]
    pub const fn with_resolved_range(mut self, range: Option<ExplicitRange>) -> Self {
        self.resolved_range = range;
        self
    }

    /// Filter summary. Ids missing from the catalogs are dropped.
    #[must_use]
    pub fn filters(&self) -> FilterDescriptor {
        let journal = self
            .filters
            .selected_journal_ids
            .iter()
            .filter_map(|id| self.journals.iter().find(|j| j.id == *id))
            .map(|j| j.name.clone())
            .collect();
        let analytic = self
            .filters
            .selected_analytic_ids
            .iter()
            .filter_map(|id| self.analytics.iter().find(|a| a.id == *id))
            .map(|a| a.name.clone())
            .collect();

        let range = match self.filters.date_range {
            DateRange::Explicit(range) => Some(range),
            DateRange::Period(_) => self.resolved_range,
            DateRange::Unset => None,
        };

        FilterDescriptor {
            journal,
            analytic,
            options: self.filters.options.clone(),
            start_date: range.and_then(|r| r.start_date),
            end_date: range.and_then(|r| r.end_date),
        }
    }

    fn currency(&self) -> String {
        self.result
            .grand_totals
            .currency_id
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Payload key of each account, in report order.
    ///
    /// The display name, suffixed with the account id when another account
    /// in the result carries the same name.
    #[must_use]
    pub fn account_labels(&self) -> Vec<String> {
        let accounts = &self.result.accounts;
        let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
        for account in accounts {
            *seen.entry(account.account_name.as_str()).or_default() += 1;
        }
        accounts
            .iter()
            .map(|a| {
                if seen.get(a.account_name.as_str()).copied().unwrap_or_default() > 1 {
                    format!("{} ({})", a.account_name, a.account_id)
                } else {
                    a.account_name.clone()
                }
            })
            .collect()
    }

    /// Grand totals for a document.
    #[must_use]
    pub fn document_grand_total(&self) -> DocumentGrandTotal {
        let totals = &self.result.grand_totals.totals;
        DocumentGrandTotal {
            total_deferred: format_amount(totals.total),
            total_current: format_amount(totals.current),
            total_not_started: format_amount(totals.not_started),
            total_before: format_amount(totals.before),
            total_later: format_amount(totals.later),
            currency: self.currency(),
        }
    }

    /// Grand totals for a spreadsheet.
    #[must_use]
    pub fn spreadsheet_grand_total(&self) -> SpreadsheetGrandTotal {
        let totals = &self.result.grand_totals.totals;
        SpreadsheetGrandTotal {
            total_deferred: round_for_display(totals.total),
            total_current: round_for_display(totals.current),
            total_not_started: round_for_display(totals.not_started),
            total_before: round_for_display(totals.before),
            total_later: round_for_display(totals.later),
            currency: self.currency(),
        }
    }

    /// Assembles a payload around `grand_total`.
    #[must_use]
    pub fn payload<G>(&self, grand_total: G, report_name: Option<String>) -> ExportPayload<G> {
        let accounts = &self.result.accounts;
        let labels = self.account_labels();
        ExportPayload {
            account_data: accounts
                .iter()
                .zip(&labels)
                .map(|(a, label)| (label.clone(), a.lines.clone()))
                .collect(),
            total: accounts
                .iter()
                .zip(&labels)
                .map(|(a, label)| (label.clone(), AccountSummary::from(a)))
                .collect(),
            account: labels,
            title: self.title.to_string(),
            filters: self.filters(),
            grand_total,
            report_name,
        }
    }

    /// Document action for a report of `kind`.
    #[must_use]
    pub fn document_request(&self, kind: ReportKind, display_name: &str) -> DocumentRequest {
        let template = kind.document_template();
        DocumentRequest {
            action_type: "ir.actions.report",
            report_type: "qweb-pdf",
            report_name: template,
            report_file: template,
            data: self.payload(self.document_grand_total(), Some(display_name.to_string())),
            display_name: display_name.to_string(),
        }
    }

    /// Spreadsheet conversion form.
    ///
    /// # Errors
    ///
    /// [`ExportError::Failed`] when the payload cannot be encoded.
    pub fn conversion_request(
        &self,
        report_action: &str,
    ) -> Result<ConversionRequest, ExportError> {
        let payload = self.payload(self.spreadsheet_grand_total(), None);
        Ok(ConversionRequest {
            model: CONVERSION_MODEL,
            data: serde_json::to_string(&payload)?,
            output_format: SPREADSHEET_FORMAT,
            report_name: self.title.to_string(),
            report_action: report_action.to_string(),
        })
    }
}
