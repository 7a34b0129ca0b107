//! In-memory tabular data read from spreadsheets, CSV or JSON.

use std::fmt;
use std::fs;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::TableError;

/// A single spreadsheet cell, as loosely typed as the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Cell>),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// Text cell, or `Empty` if the text is blank.
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s)
        }
    }

    /// Float cell, or `Empty` for NaN.
    pub fn float(f: f64) -> Self {
        if f.is_nan() {
            Cell::Empty
        } else {
            Cell::Float(f)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Cell::Empty,
            serde_json::Value::Bool(b) => Cell::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => n.as_f64().map(Cell::float).unwrap_or(Cell::Empty),
            },
            serde_json::Value::String(s) => Cell::text(s.as_str()),
            serde_json::Value::Array(items) => Cell::List(items.iter().map(Cell::from_json).collect()),
            other @ serde_json::Value::Object(_) => Cell::Text(other.to_string()),
        }
    }

    fn from_spreadsheet(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::Bool(b) => Cell::Bool(*b),
            Data::Int(i) => Cell::Int(*i),
            Data::Float(f) => Cell::float(*f),
            Data::String(s) => Cell::text(s.as_str()),
            other => Cell::text(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Int(i) => write!(f, "{i}"),
            // Spreadsheets store ids and minutes as floats; print 42.0 as 42.
            Cell::Float(x) if x.fract() == 0.0 && x.abs() < 1e15 => write!(f, "{}", *x as i64),
            Cell::Float(x) => write!(f, "{x}"),
            Cell::Text(s) => f.write_str(s),
            Cell::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Header names plus rows of cells. Rows may be shorter than the header;
/// missing cells read as `Empty`.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    /// Read a table from disk, choosing the reader by file extension.
    ///
    /// Spreadsheets (`xlsx`, `xlsm`, `xlsb`, `xls`, `ods`) use the first
    /// worksheet with the first row as header. `csv`/`tsv` are delimited
    /// text with a header row. `json` is an array of objects.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Self::read_spreadsheet(path),
            "csv" => Self::read_delimited(path, b','),
            "tsv" => Self::read_delimited(path, b'\t'),
            "json" => Self::read_json(&fs::read_to_string(path)?),
            other => Err(TableError::UnsupportedFormat(if other.is_empty() {
                path.display().to_string()
            } else {
                other.to_string()
            })),
        }
    }

    fn read_spreadsheet(path: &Path) -> Result<Self, TableError> {
        let mut workbook =
            open_workbook_auto(path).map_err(|e| TableError::Spreadsheet(e.to_string()))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(TableError::NoWorksheet)?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| TableError::Spreadsheet(e.to_string()))?;

        let mut rows = range.rows();
        let columns = rows
            .next()
            .map(|header| header.iter().map(|d| d.to_string().trim().to_string()).collect())
            .unwrap_or_default();

        let rows = rows
            .map(|row| row.iter().map(Cell::from_spreadsheet).collect::<Vec<_>>())
            .filter(|row| !row.iter().all(Cell::is_empty))
            .collect();

        Ok(Self { columns, rows })
    }

    fn read_delimited(path: &Path, delimiter: u8) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let columns = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let row: Vec<Cell> = record?.iter().map(Cell::text).collect();
            if !row.iter().all(Cell::is_empty) {
                rows.push(row);
            }
        }

        Ok(Self { columns, rows })
    }

    /// Parse a JSON array of objects. Column order is first-seen key order.
    pub fn read_json(source: &str) -> Result<Self, TableError> {
        let value: serde_json::Value =
            serde_json::from_str(source).map_err(|e| TableError::Json(e.to_string()))?;
        let serde_json::Value::Array(records) = value else {
            return Err(TableError::Json("expected an array of objects".to_string()));
        };

        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            let serde_json::Value::Object(fields) = record else {
                return Err(TableError::Json("expected an array of objects".to_string()));
            };
            for key in fields.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .filter_map(|record| record.as_object())
            .map(|fields| {
                columns
                    .iter()
                    .map(|col| fields.get(col).map(Cell::from_json).unwrap_or(Cell::Empty))
                    .collect()
            })
            .collect();

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at (row, column); out-of-range positions read as `Empty`.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY_CELL)
    }
}
