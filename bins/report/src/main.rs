//! Deferral report runner.
//!
//! Loads journal lines from a fixture, applies the configured filters and
//! writes the document and (optionally) spreadsheet exports.

mod selection;
mod sink;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use deferral_core::export::ExportError;
use deferral_core::session::ExportOutcome;
use deferral_core::{InMemorySource, ReportError, ReportKind, ReportSession};
use deferral_http::HttpConversionEndpoint;
use deferral_shared::types::format_amount;
use deferral_shared::{AppConfig, AppError, AppResult};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::selection::build_session;
use crate::sink::{JsonFileSink, write_spreadsheet};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deferral=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    if let Err(e) = run(&config).await {
        error!(code = e.error_code(), error = %e, "Report failed");
        std::process::exit(e.exit_code());
    }
    Ok(())
}

async fn run(config: &AppConfig) -> AppResult<()> {
    let kind: ReportKind = config.report.kind.parse().map_err(AppError::Validation)?;

    let mut source = InMemorySource::from_json_file(&config.source.fixture_path)
        .map_err(|e| AppError::NotFound(e.to_string()))?;
    if let Some(as_of) = config.source.as_of {
        source = source.with_as_of(as_of);
    }
    info!(
        path = %config.source.fixture_path.display(),
        lines = source.len(),
        as_of = %source.as_of(),
        "Fixture loaded"
    );

    let mut session = build_session(config, kind, Arc::new(source)).map_err(ReportError::from)?;
    session.open().await?;

    log_totals(&session);
    if let Some(notice) = session.notice() {
        warn!(code = notice.error_code(), notice = %notice, "Report notice");
    }

    std::fs::create_dir_all(&config.export.output_dir).map_err(|e| {
        AppError::Configuration(format!(
            "cannot create {}: {e}",
            config.export.output_dir.display()
        ))
    })?;
    let sink = JsonFileSink::new(&config.export.output_dir);
    match session.export_document(&sink) {
        Ok(()) => {}
        Err(ReportError::EmptyDataset) => warn!("No data available to export"),
        Err(e) => return Err(e.into()),
    }

    if let Some(url) = &config.export.endpoint_url {
        let timeout = Duration::from_secs(config.export.timeout_secs);
        let endpoint =
            HttpConversionEndpoint::new(url.clone(), timeout).map_err(ReportError::from)?;
        match session.export_spreadsheet(&endpoint).await {
            Ok(ExportOutcome::Delivered(bytes)) => {
                let path = write_spreadsheet(&config.export.output_dir, session.title(), &bytes)
                    .map_err(|e| ReportError::from(ExportError::failed(e.to_string())))?;
                info!(path = %path.display(), size = bytes.len(), "Spreadsheet written");
            }
            Ok(ExportOutcome::Discarded) | Err(ReportError::EmptyDataset) => {}
            Err(e) => return Err(e.into()),
        }
    }

    session.close();
    Ok(())
}

fn log_totals(session: &ReportSession) {
    let Some(result) = session.result() else {
        return;
    };

    for account in &result.accounts {
        info!(
            account_id = %account.account_id,
            account = %account.account_name,
            currency = %account.currency_id,
            total = %format_amount(account.totals.total),
            not_started = %format_amount(account.totals.not_started),
            before = %format_amount(account.totals.before),
            current = %format_amount(account.totals.current),
            later = %format_amount(account.totals.later),
            lines = account.lines.len(),
            "Account"
        );
    }

    let grand = &result.grand_totals;
    info!(
        title = session.title(),
        currency = %grand.currency_id.as_ref().map(ToString::to_string).unwrap_or_default(),
        accounts = result.accounts.len(),
        total = %format_amount(grand.totals.total),
        not_started = %format_amount(grand.totals.not_started),
        before = %format_amount(grand.totals.before),
        current = %format_amount(grand.totals.current),
        later = %format_amount(grand.totals.later),
        "Grand total"
    );
}
