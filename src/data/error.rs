use thiserror::Error;

/// Everything that can go wrong between picking a file and holding a [`Table`].
///
/// [`Table`]: super::model::Table
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file type '{name}' (expected one of: {expected})")]
    UnsupportedExtension { name: String, expected: String },

    #[error("malformed {format} content: {cause}")]
    Malformed { format: &'static str, cause: String },

    #[error("spreadsheet contains no sheets")]
    NoSheets,

    #[error("sheet '{0}' not found in workbook")]
    UnknownSheet(String),

    #[error("row {row} has {actual} fields but the header has {expected}")]
    RowTooWide {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("column '{column}' has {actual} rows, expected {expected}")]
    RaggedColumns {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to fetch {url}: {cause}")]
    Fetch { url: String, cause: String },
}

impl LoadError {
    /// Wrap a reader error chain, keeping every `context` layer in the message.
    pub fn malformed(format: &'static str, err: anyhow::Error) -> Self {
        LoadError::Malformed {
            format,
            cause: format!("{err:#}"),
        }
    }
}
