//! Export collaborators.

use async_trait::async_trait;
use bytes::Bytes;

use super::error::ExportError;
use super::payload::{ConversionRequest, DocumentRequest};

/// Renders a document action and hands it to a viewer or printer.
pub trait DocumentSink: Send + Sync {
    /// Opens the rendered document.
    ///
    /// # Errors
    ///
    /// [`ExportError::Failed`] when rendering fails.
    fn open(&self, request: &DocumentRequest) -> Result<(), ExportError>;
}

/// Converts a payload into a binary file.
#[async_trait]
pub trait ConversionEndpoint: Send + Sync {
    /// Posts the conversion form and returns the file bytes.
    ///
    /// # Errors
    ///
    /// [`ExportError::Failed`] on transport or server failure, or when the
    /// endpoint answers with an empty body.
    async fn convert(&self, request: &ConversionRequest) -> Result<Bytes, ExportError>;
}
