//! Rendering collaborator: turns an analysed event into a [Workbook] and
//! hands it to a [ReportSink].

pub mod csv_sink;
pub mod json_sink;
pub mod model;
pub mod sheets;

use std::path::PathBuf;

use crate::error::ReportError;

pub use csv_sink::CsvSink;
pub use json_sink::JsonSink;
pub use model::{Cell, CellStyle, CellValue, Sheet, Workbook};
pub use sheets::build_workbook;

/// Destination for a finished workbook.
pub trait ReportSink {
    /// Writes the workbook and returns the path of what was written.
    fn write(&self, workbook: &Workbook) -> Result<PathBuf, ReportError>;
}
