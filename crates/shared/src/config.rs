//! Application configuration management.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Report configuration.
    #[serde(default)]
    pub report: ReportConfig,
    /// Data source configuration.
    #[serde(default)]
    pub source: SourceConfig,
    /// Export configuration.
    #[serde(default)]
    pub export: ExportConfig,
}

/// Report title, kind, and the initial filter selection.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Report title shown on exports; the kind's title when unset.
    #[serde(default)]
    pub title: Option<String>,
    /// Report kind (`expense` or `revenue`).
    #[serde(default = "default_kind")]
    pub kind: String,
    /// Journals selected on open.
    #[serde(default)]
    pub journals: Vec<i64>,
    /// Analytic accounts selected on open.
    #[serde(default)]
    pub analytics: Vec<i64>,
    /// Named period token (`month`, `quarter`, `last-year`, ...).
    #[serde(default)]
    pub date_range: Option<String>,
    /// Explicit start date (`YYYY-MM-DD`).
    #[serde(default)]
    pub start_date: Option<String>,
    /// Explicit end date (`YYYY-MM-DD`).
    #[serde(default)]
    pub end_date: Option<String>,
    /// Whether draft entries are included.
    #[serde(default)]
    pub include_draft: bool,
}

fn default_kind() -> String {
    "expense".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: None,
            kind: default_kind(),
            journals: Vec::new(),
            analytics: Vec::new(),
            date_range: None,
            start_date: None,
            end_date: None,
            include_draft: false,
        }
    }
}

/// In-memory data source configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// JSON file holding the raw journal lines.
    #[serde(default = "default_fixture_path")]
    pub fixture_path: PathBuf,
    /// Reference date for period resolution (defaults to today).
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

fn default_fixture_path() -> PathBuf {
    PathBuf::from("data/deferred_lines.json")
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            fixture_path: default_fixture_path(),
            as_of: None,
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Directory receiving exported files.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Spreadsheet conversion endpoint; spreadsheet export is skipped when unset.
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Conversion request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Report action identifier sent to the conversion endpoint; the kind's
    /// action when unset.
    #[serde(default)]
    pub report_action: Option<String>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            endpoint_url: None,
            timeout_secs: default_timeout_secs(),
            report_action: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("DEFERRAL").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
