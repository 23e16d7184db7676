use std::fmt;

use serde::Serialize;

use super::error::LoadError;

// ---------------------------------------------------------------------------
// Cell – a single raw value as produced by a format reader
// ---------------------------------------------------------------------------

/// Tokens read as missing, following the Pandas `read_csv` defaults.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A dynamically-typed raw value before the column is classified.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Cell {
    /// Interpret a text field: NA token, integer, float or plain text.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if NA_TOKENS.contains(&trimmed) {
            return Cell::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Cell::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Cell::Float(f);
        }
        Cell::Text(s.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(v) => Some(*v),
            Cell::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Bool(true) => write!(f, "True"),
            Cell::Bool(false) => write!(f, "False"),
            Cell::Null => write!(f, "<null>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Column – one classified, homogeneous column
// ---------------------------------------------------------------------------

/// Inferred column type, decided once when the table is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    Integer,
    Float,
    Categorical,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        !matches!(self, ColumnKind::Categorical)
    }

    /// Pandas-style dtype label.
    pub fn dtype(self) -> &'static str {
        match self {
            ColumnKind::Integer => "int64",
            ColumnKind::Float => "float64",
            ColumnKind::Categorical => "object",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dtype())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: ColumnValues,
}

impl Column {
    /// Classify a sequence of raw cells.
    ///
    /// Numeric when every non-missing cell is a number; integer when, in
    /// addition, all are integers and none is missing. A zero-row column is
    /// categorical.
    pub fn classify(name: String, cells: Vec<Cell>) -> Self {
        let all_numeric = cells
            .iter()
            .all(|c| c.is_null() || c.as_f64().is_some());
        let all_integer = cells.iter().all(|c| matches!(c, Cell::Integer(_)));

        if cells.is_empty() || !all_numeric {
            let values = cells
                .into_iter()
                .map(|c| match c {
                    Cell::Null => None,
                    other => Some(other.to_string()),
                })
                .collect();
            return Column {
                name,
                kind: ColumnKind::Categorical,
                values: ColumnValues::Text(values),
            };
        }

        let kind = if all_integer {
            ColumnKind::Integer
        } else {
            ColumnKind::Float
        };
        let values = cells.iter().map(Cell::as_f64).collect();
        Column {
            name,
            kind,
            values: ColumnValues::Numeric(values),
        }
    }

    pub fn len(&self) -> usize {
        match &self.values {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    pub fn missing_count(&self) -> usize {
        match &self.values {
            ColumnValues::Numeric(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnValues::Text(v) => v.iter().filter(|x| x.is_none()).count(),
        }
    }

    /// Non-missing numeric values, in row order. Empty for text columns.
    pub fn numeric_values(&self) -> Vec<f64> {
        match &self.values {
            ColumnValues::Numeric(v) => v.iter().flatten().copied().collect(),
            ColumnValues::Text(_) => Vec::new(),
        }
    }

    /// Numeric view including missing positions; `None` for text columns.
    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match &self.values {
            ColumnValues::Numeric(v) => Some(v),
            ColumnValues::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&[Option<String>]> {
        match &self.values {
            ColumnValues::Text(v) => Some(v),
            ColumnValues::Numeric(_) => None,
        }
    }

    /// Display string for one cell, used by the preview table.
    pub fn display(&self, row: usize) -> String {
        match &self.values {
            ColumnValues::Numeric(v) => match v[row] {
                None => "NaN".to_string(),
                Some(x) if self.kind == ColumnKind::Integer => format!("{}", x as i64),
                Some(x) => format_float(x),
            },
            ColumnValues::Text(v) => v[row].clone().unwrap_or_else(|| "None".to_string()),
        }
    }
}

/// Compact float formatting: up to 4 decimals, trailing zeros trimmed.
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let s = format!("{x:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Ordered, named columns sharing one row count. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Build a table from already classified columns.
    pub fn new(columns: Vec<Column>) -> Result<Self, LoadError> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.len() != row_count) {
            return Err(LoadError::RaggedColumns {
                column: bad.name.clone(),
                expected: row_count,
                actual: bad.len(),
            });
        }
        Ok(Table { columns, row_count })
    }

    /// Build a table from a header row and row-major raw cells.
    ///
    /// Short rows are padded with missing values; rows wider than the
    /// header are rejected.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, LoadError> {
        let headers = normalize_headers(headers);
        let width = headers.len();
        let mut cells: Vec<Vec<Cell>> = vec![Vec::with_capacity(rows.len()); width];

        for (row_no, row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(LoadError::RowTooWide {
                    row: row_no + 1,
                    expected: width,
                    actual: row.len(),
                });
            }
            let mut row = row.into_iter();
            for col in cells.iter_mut() {
                col.push(row.next().unwrap_or(Cell::Null));
            }
        }

        let columns = headers
            .into_iter()
            .zip(cells)
            .map(|(name, cells)| Column::classify(name, cells))
            .collect();
        Table::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[cfg(test)]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count, self.columns.len())
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.kind.is_numeric())
    }

    pub fn categorical_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.kind.is_numeric())
    }

    /// First `n` rows rendered as display strings.
    pub fn head(&self, n: usize) -> Vec<Vec<String>> {
        (0..n.min(self.row_count))
            .map(|row| self.columns.iter().map(|c| c.display(row)).collect())
            .collect()
    }
}

/// Fill blank headers and de-duplicate repeated ones (`a`, `a.1`, `a.2`).
fn normalize_headers(headers: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(headers.len());
    for (i, h) in headers.into_iter().enumerate() {
        let base = if h.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            h
        };
        let mut name = base.clone();
        let mut suffix = 1;
        while out.contains(&name) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        out.push(name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn parse_recognizes_na_tokens_and_numbers() {
        assert_eq!(Cell::parse(""), Cell::Null);
        assert_eq!(Cell::parse("NA"), Cell::Null);
        assert_eq!(Cell::parse("  nan "), Cell::Null);
        assert_eq!(Cell::parse("42"), Cell::Integer(42));
        assert_eq!(Cell::parse("-3.5"), Cell::Float(-3.5));
        assert_eq!(Cell::parse("1e3"), Cell::Float(1000.0));
        assert_eq!(Cell::parse("abc"), text("abc"));
    }

    #[test]
    fn classify_integer_float_and_categorical() {
        let ints = Column::classify("a".into(), vec![Cell::Integer(1), Cell::Integer(2)]);
        assert_eq!(ints.kind, ColumnKind::Integer);

        let with_missing = Column::classify("b".into(), vec![Cell::Integer(1), Cell::Null]);
        assert_eq!(with_missing.kind, ColumnKind::Float);
        assert_eq!(with_missing.missing_count(), 1);

        let mixed = Column::classify("c".into(), vec![Cell::Integer(1), text("x")]);
        assert_eq!(mixed.kind, ColumnKind::Categorical);
        assert_eq!(mixed.as_text().unwrap()[0].as_deref(), Some("1"));

        let bools = Column::classify("d".into(), vec![Cell::Bool(true), Cell::Bool(false)]);
        assert_eq!(bools.kind, ColumnKind::Categorical);
    }

    #[test]
    fn all_missing_column_is_float_and_empty_column_is_categorical() {
        let missing = Column::classify("m".into(), vec![Cell::Null, Cell::Null]);
        assert_eq!(missing.kind, ColumnKind::Float);
        assert_eq!(missing.missing_count(), 2);

        let empty = Column::classify("e".into(), Vec::new());
        assert_eq!(empty.kind, ColumnKind::Categorical);
        assert_eq!(empty.len(), 0);
    }

    #[test]
    fn table_rejects_columns_of_different_length() {
        let a = Column::classify("a".into(), vec![Cell::Integer(1), Cell::Integer(2)]);
        let b = Column::classify("b".into(), vec![Cell::Integer(1)]);
        let err = Table::new(vec![a, b]).unwrap_err();
        assert!(matches!(err, LoadError::RaggedColumns { ref column, .. } if column == "b"));
    }

    #[test]
    fn from_rows_pads_short_rows_and_rejects_wide_ones() {
        let headers = vec!["x".to_string(), "y".to_string()];
        let table = Table::from_rows(
            headers.clone(),
            vec![vec![Cell::Integer(1), Cell::Integer(2)], vec![Cell::Integer(3)]],
        )
        .unwrap();
        assert_eq!(table.shape(), (2, 2));
        assert_eq!(table.column("y").unwrap().missing_count(), 1);

        let err = Table::from_rows(
            headers,
            vec![vec![Cell::Integer(1), Cell::Integer(2), Cell::Integer(3)]],
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::RowTooWide { row: 1, .. }));
    }

    #[test]
    fn headers_are_filled_and_deduplicated() {
        let headers = vec!["a".into(), "".into(), "a".into(), "a".into()];
        let table = Table::from_rows(headers, Vec::new()).unwrap();
        assert_eq!(table.column_names(), vec!["a", "Unnamed: 1", "a.1", "a.2"]);
    }

    #[test]
    fn head_formats_cells() {
        let table = Table::from_rows(
            vec!["i".into(), "f".into(), "s".into()],
            vec![
                vec![Cell::Integer(7), Cell::Float(2.5), text("x")],
                vec![Cell::Integer(8), Cell::Null, Cell::Null],
                vec![Cell::Integer(9), Cell::Float(1.0), text("z")],
            ],
        )
        .unwrap();
        let head = table.head(2);
        assert_eq!(head.len(), 2);
        assert_eq!(head[0], vec!["7", "2.5", "x"]);
        assert_eq!(head[1], vec!["8", "NaN", "None"]);
    }

    #[test]
    fn format_float_trims_zeros() {
        assert_eq!(format_float(1.0), "1");
        assert_eq!(format_float(0.12346), "0.1235");
        assert_eq!(format_float(f64::NAN), "NaN");
        assert_eq!(format_float(-0.00001), "0");
    }
}
