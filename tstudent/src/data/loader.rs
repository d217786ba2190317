use super::table::{Cell, Table};
use crate::{TStudentError, TStudentResult};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use log::info;
use std::{fs, io::Cursor, path::Path};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Spreadsheet,
}

impl DataFormat {
    pub fn from_path(path: &Path) -> TStudentResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(DataFormat::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(DataFormat::Spreadsheet),
            _ => Err(TStudentError::UnsupportedFormat { extension }),
        }
    }
}

/// Reads a file into a table, picking the parser from the file extension.
pub fn load_table(path: &Path) -> TStudentResult<Table> {
    let format = DataFormat::from_path(path)?;
    let bytes = fs::read(path)?;
    let table = load_from_bytes(bytes, format)?;
    info!(
        "Loaded {:?} with {} rows, numeric columns: {:?}",
        path.as_os_str(),
        table.n_rows(),
        table.numeric_columns()
    );
    Ok(table)
}

pub fn load_from_bytes(bytes: Vec<u8>, format: DataFormat) -> TStudentResult<Table> {
    match format {
        DataFormat::Csv => parse_csv(&bytes),
        DataFormat::Spreadsheet => parse_spreadsheet(bytes),
    }
}

fn parse_csv(input: &[u8]) -> TStudentResult<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(Cell::parse).collect());
    }

    Table::from_rows(headers, rows)
}

fn spreadsheet_cell(data: &Data) -> Cell {
    match data {
        Data::Int(v) => Cell::number(*v as f64),
        Data::Float(v) => Cell::number(*v),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => Cell::parse(s),
        Data::Empty => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}

fn parse_spreadsheet(bytes: Vec<u8>) -> TStudentResult<Table> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|err| TStudentError::Spreadsheet {
            issue: err.to_string(),
        })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TStudentError::Spreadsheet {
            issue: "the workbook has no worksheet".to_string(),
        })?
        .map_err(|err| TStudentError::Spreadsheet {
            issue: err.to_string(),
        })?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(|d| d.to_string()).collect(),
        None => {
            return Err(TStudentError::Spreadsheet {
                issue: "the first worksheet is empty".to_string(),
            })
        }
    };

    let rows = rows
        .map(|row| row.iter().map(spreadsheet_cell).collect())
        .collect();

    Table::from_rows(headers, rows)
}
