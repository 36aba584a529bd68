//! Final report persistence

use std::fs;
use std::path::Path;

use crate::log_debug;
use crate::types::SynthesisReport;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write report to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Write the report as pretty-printed JSON, replacing any existing file.
pub fn write_report(report: &SynthesisReport, path: &Path) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).map_err(|source| ReportError::Write {
        path: path.display().to_string(),
        source,
    })?;
    log_debug!("Report written to {}", path.display());
    Ok(())
}
