use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::error::ReportError;
use crate::report::csv_sink::file_stem;
use crate::report::model::Workbook;
use crate::report::ReportSink;

/// The whole workbook, styles included, as `<root>/<workbook name>.json`.
#[derive(Debug, Clone)]
pub struct JsonSink {
    root: PathBuf,
}

impl JsonSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ReportSink for JsonSink {
    fn write(&self, workbook: &Workbook) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(&self.root).map_err(|source| ReportError::Io {
            path: self.root.clone(),
            source,
        })?;
        let path = self.root.join(format!("{}.json", file_stem(&workbook.name)));
        let payload = serde_json::to_string_pretty(workbook)?;
        fs::write(&path, payload).map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "wrote json report");
        Ok(path)
    }
}
