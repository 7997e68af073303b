//! Persists reports to disk

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use super::report::Report;

/// Failures while persisting a report; always fatal to the run
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("cannot create report directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode report: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("cannot write report {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writes reports as pretty JSON into a directory
#[derive(Debug, Clone)]
pub struct ReportSink {
    dir: PathBuf,
}

impl ReportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `report` to `<dir>/<file_name>` and returns the path
    pub fn persist(&self, report: &Report, file_name: &str) -> Result<PathBuf, SinkError> {
        fs::create_dir_all(&self.dir).map_err(|e| SinkError::CreateDir {
            path: self.dir.clone(),
            source: e,
        })?;

        let path = self.dir.join(file_name);
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&path, json).map_err(|e| SinkError::Write {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "Report saved");
        Ok(path)
    }
}
