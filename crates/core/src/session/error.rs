//! Session-level errors.

use deferral_shared::AppError;
use deferral_shared::types::{AccountId, CurrencyCode};
use thiserror::Error;

use crate::aggregation::AggregationError;
use crate::export::ExportError;
use crate::filter::FilterError;
use crate::source::SourceError;

/// Every recoverable failure a report session can surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// Rejected filter input; no query was issued.
    #[error(transparent)]
    InvalidInput(#[from] FilterError),

    /// Lines of one account disagree on currency.
    #[error("Account {account_id} mixes currencies {expected} and {found}")]
    InconsistentCurrency {
        /// Flagged account.
        account_id: AccountId,
        /// First-seen currency.
        expected: CurrencyCode,
        /// Conflicting currency.
        found: CurrencyCode,
    },

    /// The data source query failed.
    #[error("Data source unavailable: {0}")]
    DataSourceUnavailable(String),

    /// Rendering or conversion failed.
    #[error("Export failed: {0}")]
    ExportFailed(String),

    /// Export attempted without account data.
    #[error("No data available to export")]
    EmptyDataset,
}

impl ReportError {
    /// Returns the stable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InconsistentCurrency { .. } => "INCONSISTENT_CURRENCY",
            Self::DataSourceUnavailable(_) => "DATA_SOURCE_UNAVAILABLE",
            Self::ExportFailed(_) => "EXPORT_FAILED",
            Self::EmptyDataset => "EMPTY_DATASET",
        }
    }
}

impl From<SourceError> for ReportError {
    fn from(err: SourceError) -> Self {
        Self::DataSourceUnavailable(err.to_string())
    }
}

impl From<ExportError> for ReportError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::EmptyDataset => Self::EmptyDataset,
            ExportError::Failed(reason) => Self::ExportFailed(reason),
        }
    }
}

impl From<AggregationError> for ReportError {
    fn from(err: AggregationError) -> Self {
        match err {
            AggregationError::InconsistentCurrency {
                account_id,
                expected,
                found,
            } => Self::InconsistentCurrency {
                account_id,
                expected,
                found,
            },
        }
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        let message = err.to_string();
        match err {
            ReportError::InvalidInput(_) => Self::Validation(message),
            ReportError::EmptyDataset => Self::NotFound(message),
            ReportError::InconsistentCurrency { .. } => Self::Internal(message),
            ReportError::DataSourceUnavailable(_) | ReportError::ExportFailed(_) => {
                Self::ExternalService(message)
            }
        }
    }
}
