//! Export errors.

use thiserror::Error;

/// Failure to build or deliver an export.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// The report has no account data to export.
    #[error("No data available to export")]
    EmptyDataset,

    /// Rendering or conversion failed.
    #[error("Export failed: {0}")]
    Failed(String),
}

impl ExportError {
    /// Creates an [`ExportError::Failed`].
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Failed(format!("cannot serialize payload: {err}"))
    }
}
