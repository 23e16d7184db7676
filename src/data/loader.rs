use std::collections::HashSet;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, AsArray, BooleanArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::util::display::array_value_to_string;
use bytes::Bytes;
use calamine::{open_workbook_from_rs, Data, Range, Xlsx};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{Cell, Table};

/// Header row plus row-major cells, as read by a format reader.
type Records = (Vec<String>, Vec<Vec<Cell>>);

// ---------------------------------------------------------------------------
// Formats and inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Json,
    Parquet,
}

impl FileFormat {
    pub const ALL: [FileFormat; 4] = [
        FileFormat::Csv,
        FileFormat::Xlsx,
        FileFormat::Json,
        FileFormat::Parquet,
    ];

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            FileFormat::Csv => &["csv"],
            FileFormat::Xlsx => &["xlsx"],
            FileFormat::Json => &["json"],
            FileFormat::Parquet => &["parquet", "pq"],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FileFormat::Csv => "CSV",
            FileFormat::Xlsx => "Excel",
            FileFormat::Json => "JSON",
            FileFormat::Parquet => "Parquet",
        }
    }

    /// Detect the format from a file name's extension (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())?
            .to_ascii_lowercase();
        FileFormat::ALL
            .into_iter()
            .find(|f| f.extensions().contains(&ext.as_str()))
    }
}

/// An uploaded file: its declared name and raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }
}

/// Result of a load: either a table, or the sheet names of a multi-sheet
/// workbook awaiting a choice.
#[derive(Debug)]
pub enum LoadOutcome {
    Table(Table),
    Sheets(Vec<String>),
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load an uploaded file.  Dispatch by extension among the enabled formats.
pub fn load(file: &UploadedFile, formats: &[FileFormat]) -> Result<LoadOutcome, LoadError> {
    let format = FileFormat::from_name(&file.name)
        .filter(|f| formats.contains(f))
        .ok_or_else(|| unsupported(&file.name, formats))?;

    let outcome = match format {
        FileFormat::Csv => LoadOutcome::Table(into_table("CSV", read_csv(&file.bytes))?),
        FileFormat::Json => LoadOutcome::Table(into_table("JSON", read_json(&file.bytes))?),
        FileFormat::Parquet => {
            LoadOutcome::Table(into_table("Parquet", read_parquet(&file.bytes))?)
        }
        FileFormat::Xlsx => {
            let mut workbook = open_xlsx(&file.bytes)?;
            resolve_sheets(&mut workbook)?
        }
    };

    match &outcome {
        LoadOutcome::Table(t) => log::info!(
            "Loaded '{}' as {}: {} rows x {} columns",
            file.name,
            format.label(),
            t.row_count(),
            t.column_count()
        ),
        LoadOutcome::Sheets(names) => {
            log::info!("'{}' has {} sheets: {names:?}", file.name, names.len())
        }
    }
    Ok(outcome)
}

/// Parse CSV bytes that do not come from a named upload.
pub fn load_csv(bytes: &[u8]) -> Result<Table, LoadError> {
    into_table("CSV", read_csv(bytes))
}

/// Materialize one named sheet of a previously loaded workbook.
pub fn load_sheet(file: &UploadedFile, sheet: &str) -> Result<Table, LoadError> {
    if FileFormat::from_name(&file.name) != Some(FileFormat::Xlsx) {
        return Err(unsupported(&file.name, &[FileFormat::Xlsx]));
    }
    let mut workbook = open_xlsx(&file.bytes)?;
    let table = select_sheet(&mut workbook, sheet)?;
    log::info!(
        "Loaded sheet '{sheet}' of '{}': {} rows x {} columns",
        file.name,
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}

fn unsupported(name: &str, formats: &[FileFormat]) -> LoadError {
    let expected = formats
        .iter()
        .flat_map(|f| f.extensions())
        .map(|e| format!(".{e}"))
        .collect::<Vec<_>>()
        .join(", ");
    LoadError::UnsupportedExtension {
        name: name.to_string(),
        expected,
    }
}

fn into_table(format: &'static str, records: Result<Records>) -> Result<Table, LoadError> {
    let (headers, rows) = records.map_err(|e| LoadError::malformed(format, e))?;
    Table::from_rows(headers, rows)
}

// ---------------------------------------------------------------------------
// Spreadsheets
// ---------------------------------------------------------------------------

/// A workbook whose sheets can be listed and read one at a time.
pub trait SheetSource {
    fn sheet_names(&self) -> Vec<String>;
    fn read_sheet(&mut self, name: &str) -> Result<Table, LoadError>;
}

impl<RS: Read + Seek> SheetSource for Xlsx<RS> {
    fn sheet_names(&self) -> Vec<String> {
        calamine::Reader::sheet_names(self)
    }

    fn read_sheet(&mut self, name: &str) -> Result<Table, LoadError> {
        let range = calamine::Reader::worksheet_range(self, name)
            .with_context(|| format!("reading sheet '{name}'"))
            .map_err(|e| LoadError::malformed("Excel", e))?;
        let (headers, rows) = range_records(&range);
        Table::from_rows(headers, rows)
    }
}

/// One sheet → its table; several → their names, nothing read yet.
pub fn resolve_sheets<S: SheetSource>(source: &mut S) -> Result<LoadOutcome, LoadError> {
    let names = source.sheet_names();
    match names.as_slice() {
        [] => Err(LoadError::NoSheets),
        [only] => Ok(LoadOutcome::Table(source.read_sheet(only)?)),
        _ => Ok(LoadOutcome::Sheets(names)),
    }
}

pub fn select_sheet<S: SheetSource>(source: &mut S, name: &str) -> Result<Table, LoadError> {
    if !source.sheet_names().iter().any(|n| n == name) {
        return Err(LoadError::UnknownSheet(name.to_string()));
    }
    source.read_sheet(name)
}

fn open_xlsx(bytes: &[u8]) -> Result<Xlsx<Cursor<&[u8]>>, LoadError> {
    open_workbook_from_rs(Cursor::new(bytes))
        .context("opening workbook")
        .map_err(|e| LoadError::malformed("Excel", e))
}

/// First row is the header; the rest are records.
fn range_records(range: &Range<Data>) -> Records {
    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|r| {
            r.iter()
                .map(|c| match c {
                    Data::Empty => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();
    let records = rows.map(|r| r.iter().map(sheet_cell).collect()).collect();
    (headers, records)
}

fn sheet_cell(cell: &Data) -> Cell {
    match cell {
        Data::Int(i) => Cell::Integer(*i),
        // Excel stores every number as a double; whole values read back as integers.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Cell::Integer(*f as i64),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => Cell::parse(s),
        Data::Empty | Data::Error(_) => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row with column names, one record per line.
fn read_csv(bytes: &[u8]) -> Result<Records> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.is_empty() {
        anyhow::bail!("no columns to parse from file");
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        rows.push(record.iter().map(Cell::parse).collect());
    }
    Ok((headers, rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "id": 1, "name": "a", "score": 0.5 },
///   { "id": 2, "name": "b" }
/// ]
/// ```
///
/// Columns are the union of keys, in first-seen order.
fn read_json(bytes: &[u8]) -> Result<Records> {
    let root: JsonValue = serde_json::from_slice(bytes).context("parsing JSON")?;
    let records = root
        .as_array()
        .context("expected a top-level JSON array of records")?;

    let mut headers: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("record {i} is not a JSON object"))?;
        for key in obj.keys() {
            if seen.insert(key.as_str()) {
                headers.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .iter()
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_cell).unwrap_or(Cell::Null))
                .collect()
        })
        .collect();
    Ok((headers, rows))
}

fn json_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::parse(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Cell::Bool(*b),
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Every record batch of the file; each schema field becomes a column.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn read_parquet(bytes: &[u8]) -> Result<Records> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(bytes))
        .context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let columns = batch
            .columns()
            .iter()
            .map(widen_numeric)
            .collect::<Result<Vec<_>>>()?;
        for row in 0..batch.num_rows() {
            rows.push(columns.iter().map(|col| arrow_cell(col, row)).collect());
        }
    }
    Ok((headers, rows))
}

/// Cast every integer width (signed or unsigned) to Int64 and every float
/// width to Float64. Unsigned values above `i64::MAX` become null.
fn widen_numeric(col: &ArrayRef) -> Result<ArrayRef> {
    let dt = col.data_type();
    let target = if dt.is_integer() && *dt != DataType::Int64 {
        DataType::Int64
    } else if dt.is_floating() && *dt != DataType::Float64 {
        DataType::Float64
    } else {
        return Ok(Arc::clone(col));
    };
    cast(col, &target).with_context(|| format!("casting {dt} column to {target}"))
}

/// Extract a single value from an Arrow column at a given row.
fn arrow_cell(col: &ArrayRef, row: usize) -> Cell {
    if col.is_null(row) {
        return Cell::Null;
    }
    match col.data_type() {
        DataType::Utf8 => Cell::parse(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => Cell::parse(col.as_string::<i64>().value(row)),
        DataType::Int64 => Cell::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float64 => Cell::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => match col.as_any().downcast_ref::<BooleanArray>() {
            Some(arr) => Cell::Bool(arr.value(row)),
            None => Cell::Null,
        },
        other => array_value_to_string(col, row)
            .map(Cell::Text)
            .unwrap_or_else(|_| Cell::Text(format!("{other:?}"))),
    }
}
