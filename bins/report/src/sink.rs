//! Document sink writing the rendered request to disk.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use deferral_core::export::{DocumentRequest, DocumentSink, ExportError};
use tracing::info;

/// Writes each document request as pretty JSON into a directory.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    /// Creates a sink writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File a document titled `title` is written to.
    pub fn path_for(&self, title: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(title)))
    }
}

impl DocumentSink for JsonFileSink {
    fn open(&self, request: &DocumentRequest) -> Result<(), ExportError> {
        let path = self.path_for(&request.display_name);
        let file = File::create(&path)
            .map_err(|e| ExportError::failed(format!("cannot create {}: {e}", path.display())))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, request)?;
        writer
            .flush()
            .map_err(|e| ExportError::failed(format!("cannot write {}: {e}", path.display())))?;
        info!(path = %path.display(), template = request.report_name, "Document written");
        Ok(())
    }
}

/// Lowercase, underscore-separated file stem for a report title.
pub fn file_stem(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if stem.is_empty() { "report".to_string() } else { stem }
}

/// Writes a converted spreadsheet next to the documents.
pub fn write_spreadsheet(dir: &Path, title: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    let path = dir.join(format!("{}.xlsx", file_stem(title)));
    std::fs::write(&path, bytes)?;
    Ok(path)
}
