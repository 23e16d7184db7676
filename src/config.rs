use crate::data::example::EXAMPLE_DATASET_URL;
use crate::data::loader::FileFormat;

/// Categorical columns with more distinct values than this are not charted.
pub const DEFAULT_MAX_CATEGORIES: usize = 25;

/// Tunable defaults for one analysis run, editable from the settings panel.
#[derive(Debug, Clone, PartialEq)]
pub struct EdaConfig {
    pub max_categories: usize,
    /// Rows shown in the input preview.
    pub preview_rows: usize,
    /// Evaluation points of each density curve.
    pub kde_grid_points: usize,
    /// Formats accepted by the loader, in the order offered by the file dialog.
    pub formats: Vec<FileFormat>,
    pub example_url: String,
}

impl Default for EdaConfig {
    fn default() -> Self {
        Self {
            max_categories: DEFAULT_MAX_CATEGORIES,
            preview_rows: 5,
            kde_grid_points: 200,
            formats: vec![FileFormat::Csv, FileFormat::Xlsx],
            example_url: EXAMPLE_DATASET_URL.to_string(),
        }
    }
}

impl EdaConfig {
    pub fn format_enabled(&self, format: FileFormat) -> bool {
        self.formats.contains(&format)
    }

    /// Enable or disable a format, keeping `FileFormat::ALL` order.
    pub fn set_format(&mut self, format: FileFormat, enabled: bool) {
        self.formats = FileFormat::ALL
            .into_iter()
            .filter(|f| if *f == format { enabled } else { self.formats.contains(f) })
            .collect();
    }

    /// All extensions accepted under the current settings.
    pub fn extensions(&self) -> Vec<&'static str> {
        self.formats
            .iter()
            .flat_map(|f| f.extensions().iter().copied())
            .collect()
    }
}
