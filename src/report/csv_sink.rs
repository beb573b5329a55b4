use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ReportError;
use crate::report::model::{Sheet, Workbook};
use crate::report::ReportSink;

pub const ANNOTATIONS_FILE: &str = "annotations.csv";

/// One `<sheet>.csv` per sheet under `<root>/<workbook name>/`. Styles that a
/// flat file cannot carry go to `annotations.csv` as `(sheet, row, column,
/// style)`, rows counted from 1 below the header.
#[derive(Debug, Clone)]
pub struct CsvSink {
    root: PathBuf,
}

impl CsvSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// Workbook names carry `:` from the timestamp, which some filesystems reject.
pub fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ':' | '/' | '\\' => '-',
            ' ' => '_',
            other => other,
        })
        .collect()
}

fn csv_error(path: &Path) -> impl FnOnce(csv::Error) -> ReportError + '_ {
    move |source| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

fn write_sheet(dir: &Path, sheet: &Sheet) -> Result<(), ReportError> {
    let path = dir.join(format!("{}.csv", file_stem(&sheet.name)));
    let mut writer = csv::Writer::from_path(&path).map_err(csv_error(&path))?;
    writer.write_record(&sheet.header).map_err(csv_error(&path))?;
    for row in &sheet.rows {
        writer
            .write_record(row.iter().map(|cell| cell.value.render()))
            .map_err(csv_error(&path))?;
    }
    writer.flush().map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })
}

fn write_annotations(dir: &Path, workbook: &Workbook) -> Result<usize, ReportError> {
    let path = dir.join(ANNOTATIONS_FILE);
    let mut writer = csv::Writer::from_path(&path).map_err(csv_error(&path))?;
    writer
        .write_record(["sheet", "row", "column", "style"])
        .map_err(csv_error(&path))?;
    let mut count = 0;
    for sheet in &workbook.sheets {
        for (row_index, row) in sheet.rows.iter().enumerate() {
            for (col_index, cell) in row.iter().enumerate() {
                if !cell.style.is_alert() {
                    continue;
                }
                let column = sheet.header.get(col_index).map(String::as_str).unwrap_or("");
                let row_number = (row_index + 1).to_string();
                writer
                    .write_record([
                        sheet.name.as_str(),
                        row_number.as_str(),
                        column,
                        cell.style.as_str(),
                    ])
                    .map_err(csv_error(&path))?;
                count += 1;
            }
        }
    }
    writer.flush().map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(count)
}

impl ReportSink for CsvSink {
    fn write(&self, workbook: &Workbook) -> Result<PathBuf, ReportError> {
        let dir = self.root.join(file_stem(&workbook.name));
        fs::create_dir_all(&dir).map_err(|source| ReportError::Io {
            path: dir.clone(),
            source,
        })?;
        for sheet in &workbook.sheets {
            write_sheet(&dir, sheet)?;
        }
        let annotations = write_annotations(&dir, workbook)?;
        info!(
            path = %dir.display(),
            sheets = workbook.sheets.len(),
            annotations,
            "wrote csv report"
        );
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_stem_replaces_path_hostile_characters() {
        assert_eq!(file_stem("Asgard-2021-11-22T12:55:52"), "Asgard-2021-11-22T12-55-52");
        assert_eq!(file_stem("Player Summary"), "Player_Summary");
    }
}
