use crate::{TStudentError, TStudentResult};
use std::collections::HashMap;
use std::fmt::{self, Display};

/// Markers that load as missing cells, compared case-insensitively.
const MISSING_MARKERS: [&str; 15] = [
    "", "#n/a", "#n/a n/a", "#na", "-1.#ind", "-1.#qnan", "-nan", "1.#ind", "1.#qnan", "<na>",
    "n/a", "na", "nan", "null", "none",
];

fn is_missing_marker(field: &str) -> bool {
    let lowered = field.to_lowercase();
    MISSING_MARKERS.contains(&lowered.as_str())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Bool(bool),
    Text(String),
    Empty,
}

impl Cell {
    /// A numeric cell; NaN and infinities load as missing.
    pub fn number(value: f64) -> Self {
        if value.is_finite() {
            Cell::Number(value)
        } else {
            Cell::Empty
        }
    }

    /// Interprets a raw text field.
    pub fn parse(field: &str) -> Self {
        let trimmed = field.trim();
        if is_missing_marker(trimmed) {
            return Cell::Empty;
        }
        if let Ok(number) = trimmed.parse::<f64>() {
            return Cell::number(number);
        }
        match trimmed {
            "true" | "True" | "TRUE" => Cell::Bool(true),
            "false" | "False" | "FALSE" => Cell::Bool(false),
            _ => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Empty => write!(f, "NaN"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    cells: Vec<Cell>,
}

impl Column {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// A column is numeric when it holds at least one number and nothing but numbers or gaps.
    pub fn is_numeric(&self) -> bool {
        let mut has_number = false;
        for cell in self.cells.iter() {
            match cell {
                Cell::Number(_) => has_number = true,
                Cell::Empty => {}
                _ => return false,
            }
        }
        has_number
    }

    /// The values of a numeric column, `None` for missing cells.
    pub fn numbers(&self) -> Vec<Option<f64>> {
        self.cells.iter().map(Cell::as_number).collect()
    }
}

/// An immutable table loaded from a tabular file.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

/// Suffixes repeated headers with `.1`, `.2`, ..., skipping names already taken.
fn unique_headers(headers: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .enumerate()
        .map(|(idx, header)| {
            let header = header.trim().to_string();
            let mut name = if header.is_empty() {
                format!("Unnamed: {}", idx)
            } else {
                header
            };
            let mut count = counts.get(&name).copied().unwrap_or_default();
            while count > 0 {
                counts.insert(name.clone(), count + 1);
                name = format!("{}.{}", name, count);
                count = counts.get(&name).copied().unwrap_or_default();
            }
            counts.insert(name.clone(), 1);
            name
        })
        .collect()
}

impl Table {
    /// Assembles a table from a header row and its data rows.
    /// Short rows are padded with empty cells, surplus cells are dropped.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> TStudentResult<Self> {
        if headers.is_empty() {
            return Err(TStudentError::InvalidSelection {
                issue: "the file has no header row".to_string(),
            });
        }

        let headers = unique_headers(headers);
        let n_rows = rows.len();
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column {
                name,
                cells: Vec::with_capacity(n_rows),
            })
            .collect();

        for mut row in rows.into_iter() {
            row.resize(columns.len(), Cell::Empty);
            for (column, cell) in columns.iter_mut().zip(row) {
                column.cells.push(cell);
            }
        }

        Ok(Self { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Names of the columns holding numeric data, in table order.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_numeric())
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn numeric_values(&self, name: &str) -> TStudentResult<Vec<Option<f64>>> {
        let column = self.column(name).ok_or_else(|| TStudentError::UnknownColumn {
            column: name.to_string(),
        })?;
        if !column.is_numeric() {
            return Err(TStudentError::NonNumericColumn {
                column: name.to_string(),
            });
        }
        Ok(column.numbers())
    }

    /// A view of the first `n_rows` rows.
    pub fn preview(&self, n_rows: usize) -> TablePreview<'_> {
        TablePreview {
            table: self,
            n_rows: n_rows.min(self.n_rows),
        }
    }
}

pub struct TablePreview<'a> {
    table: &'a Table,
    n_rows: usize,
}

impl<'a> Display for TablePreview<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths: Vec<usize> = self
            .table
            .columns
            .iter()
            .map(|column| {
                column.cells[..self.n_rows]
                    .iter()
                    .map(|cell| cell.to_string().chars().count())
                    .chain(std::iter::once(column.name.chars().count()))
                    .max()
                    .unwrap_or_default()
            })
            .collect();

        let header: Vec<String> = self
            .table
            .columns
            .iter()
            .zip(widths.iter())
            .map(|(column, width)| format!("{:>width$}", column.name, width = width))
            .collect();
        writeln!(f, "    | {}", header.join(" | "))?;

        for row in 0..self.n_rows {
            let cells: Vec<String> = self
                .table
                .columns
                .iter()
                .zip(widths.iter())
                .map(|(column, width)| {
                    format!("{:>width$}", column.cells[row].to_string(), width = width)
                })
                .collect();
            writeln!(f, "{:>3} | {}", row, cells.join(" | "))?;
        }
        write!(f, "[{} rows x {} columns]", self.table.n_rows, self.table.columns.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(fields: &[&str]) -> Vec<Cell> {
        fields.iter().map(|f| Cell::parse(f)).collect()
    }

    #[test]
    fn test_cell_parse() {
        assert_eq!(Cell::parse(" 4.5 "), Cell::Number(4.5));
        assert_eq!(Cell::parse("-3"), Cell::Number(-3.0));
        assert_eq!(Cell::parse("NA"), Cell::Empty);
        assert_eq!(Cell::parse(""), Cell::Empty);
        assert_eq!(Cell::parse("True"), Cell::Bool(true));
        assert_eq!(Cell::parse("grupo A"), Cell::Text("grupo A".to_string()));
    }

    #[test]
    fn test_missing_markers() {
        for marker in [
            "NAN", "-nan", "-NaN", "nan", "#N/A", "n/a", "<NA>", "NULL", "none", "1.#QNAN",
        ] {
            assert_eq!(Cell::parse(marker), Cell::Empty, "{}", marker);
        }
        for non_finite in ["inf", "-INF", "infinity"] {
            assert_eq!(Cell::parse(non_finite), Cell::Empty, "{}", non_finite);
        }
        assert_eq!(Cell::number(f64::NAN), Cell::Empty);
        assert_eq!(Cell::number(2.0), Cell::Number(2.0));
    }

    #[test]
    fn test_missing_markers_keep_column_numeric() {
        let rows = ["1", "NAN", "-nan", "3", "#N/A", "5"]
            .iter()
            .map(|v| text_row(&[v]))
            .collect();
        let table = Table::from_rows(vec!["a".into()], rows).unwrap();
        assert_eq!(table.numeric_columns(), vec!["a"]);
        assert_eq!(
            table.numeric_values("a").unwrap(),
            vec![Some(1.0), None, None, Some(3.0), None, Some(5.0)]
        );
    }

    #[test]
    fn test_numeric_columns() {
        let table = Table::from_rows(
            vec!["a".into(), "label".into(), "b".into(), "flag".into()],
            vec![
                text_row(&["1", "x", "2.5", "true"]),
                text_row(&["2", "y", "", "false"]),
                text_row(&["3", "z", "4", "true"]),
            ],
        )
        .unwrap();

        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.numeric_columns(), vec!["a", "b"]);
        assert_eq!(
            table.numeric_values("b").unwrap(),
            vec![Some(2.5), None, Some(4.0)]
        );
        assert!(matches!(
            table.numeric_values("label"),
            Err(TStudentError::NonNumericColumn { .. })
        ));
        assert!(matches!(
            table.numeric_values("missing"),
            Err(TStudentError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_empty_column_is_not_numeric() {
        let table = Table::from_rows(
            vec!["a".into(), "gaps".into()],
            vec![text_row(&["1", ""]), text_row(&["2", "NA"])],
        )
        .unwrap();
        assert_eq!(table.numeric_columns(), vec!["a"]);
    }

    #[test]
    fn test_unique_headers() {
        let table = Table::from_rows(
            vec!["x".into(), "x".into(), "".into(), "x".into()],
            vec![text_row(&["1", "2", "3", "4"])],
        )
        .unwrap();
        assert_eq!(table.column_names(), vec!["x", "x.1", "Unnamed: 2", "x.2"]);

        let table = Table::from_rows(
            vec!["x".into(), "x".into(), "x.1".into()],
            vec![text_row(&["1", "2", "3"])],
        )
        .unwrap();
        assert_eq!(table.column_names(), vec!["x", "x.1", "x.1.1"]);
        assert_eq!(table.numeric_values("x.1.1").unwrap(), vec![Some(3.0)]);
    }

    #[test]
    fn test_ragged_rows() {
        let table = Table::from_rows(
            vec!["a".into(), "b".into()],
            vec![text_row(&["1"]), text_row(&["2", "3", "surplus"])],
        )
        .unwrap();
        assert_eq!(table.numeric_values("b").unwrap(), vec![None, Some(3.0)]);
    }

    #[test]
    fn test_preview() {
        let table = Table::from_rows(
            vec!["a".into(), "b".into()],
            (0..10).map(|i| text_row(&[&i.to_string(), "1"])).collect(),
        )
        .unwrap();
        let rendered = table.preview(5).to_string();
        assert_eq!(rendered.lines().count(), 7);
        assert!(rendered.ends_with("[10 rows x 2 columns]"));
    }
}
