//! HTTP client for the spreadsheet conversion endpoint.
//!
//! The endpoint receives the conversion request as an url-encoded form and
//! answers with the file bytes.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use deferral_core::export::{ConversionEndpoint, ConversionRequest, ExportError};
use tracing::{debug, warn};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`ConversionEndpoint`] posting to a URL.
#[derive(Debug, Clone)]
pub struct HttpConversionEndpoint {
    http: reqwest::Client,
    url: String,
}

impl HttpConversionEndpoint {
    /// Creates a client for `url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// [`ExportError::Failed`] if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ExportError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("deferral-report/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ExportError::failed(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    /// Target URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ConversionEndpoint for HttpConversionEndpoint {
    async fn convert(&self, request: &ConversionRequest) -> Result<Bytes, ExportError> {
        debug!(
            url = %self.url,
            report_name = %request.report_name,
            format = request.output_format,
            "Posting conversion request"
        );

        let response = self
            .http
            .post(&self.url)
            .form(&request.form_fields()[..])
            .send()
            .await
            .map_err(|e| {
                warn!(url = %self.url, error = %e, "Conversion request failed");
                ExportError::failed(format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %self.url, status = %status, "Conversion endpoint returned error");
            return Err(ExportError::failed(format!("HTTP {}: {body}", status.as_u16())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ExportError::failed(format!("cannot read response: {e}")))?;
        if bytes.is_empty() {
            return Err(ExportError::failed("conversion endpoint returned an empty file"));
        }

        debug!(size = bytes.len(), "Conversion completed");
        Ok(bytes)
    }
}
