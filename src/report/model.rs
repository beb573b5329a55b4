//! Format-neutral workbook: named sheets of styled cells.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Empty,
    Text(String),
    Integer(i64),
    Number(f64),
}

impl CellValue {
    /// Plain-text rendering used by the flat sinks.
    pub fn render(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(text) => text.clone(),
            CellValue::Integer(value) => value.to_string(),
            CellValue::Number(value) => value.to_string(),
        }
    }
}

/// Annotation a renderer maps to a visual style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStyle {
    #[default]
    Plain,
    Integer,
    Percent,
    /// Expected but notable absence.
    Warning,
    /// Anomaly in an individual cell.
    Error,
}

impl CellStyle {
    pub fn is_alert(self) -> bool {
        matches!(self, CellStyle::Warning | CellStyle::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CellStyle::Plain => "plain",
            CellStyle::Integer => "integer",
            CellStyle::Percent => "percent",
            CellStyle::Warning => "warning",
            CellStyle::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub value: CellValue,
    pub style: CellStyle,
}

impl Cell {
    pub fn empty() -> Self {
        Cell {
            value: CellValue::Empty,
            style: CellStyle::Plain,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Cell {
            value: CellValue::Text(text.into()),
            style: CellStyle::Plain,
        }
    }

    /// Integer cell with integer formatting. Values beyond `i64` saturate.
    pub fn integer(value: impl TryInto<i64>) -> Self {
        Cell {
            value: CellValue::Integer(value.try_into().unwrap_or(i64::MAX)),
            style: CellStyle::Integer,
        }
    }

    pub fn number(value: f64) -> Self {
        Cell {
            value: CellValue::Number(value),
            style: CellStyle::Plain,
        }
    }

    /// `value` is a fraction; `0.3` renders as 30%.
    pub fn percent(value: f64) -> Self {
        Cell {
            value: CellValue::Number(value),
            style: CellStyle::Percent,
        }
    }

    pub fn with_style(mut self, style: CellStyle) -> Self {
        self.style = style;
        self
    }

    pub fn warning(self) -> Self {
        self.with_style(CellStyle::Warning)
    }

    pub fn error(self) -> Self {
        self.with_style(CellStyle::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new<I, S>(name: &str, header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Sheet {
            name: name.to_string(),
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Cell at `row` under the header `column`.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let col = self.column(column)?;
        self.rows.get(row)?.get(col)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workbook {
    pub name: String,
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }
}
