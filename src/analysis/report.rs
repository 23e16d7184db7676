use serde::Serialize;

use super::correlation::{correlation_matrix, heatmap, CorrelationMatrix, Heatmap};
use super::distribution::{distributions, CategoricalFigure, NumericFigure};
use super::profile::{
    profile_columns, structure_summary, summary_statistics, ColumnProfile, SummaryStatistics,
};
use crate::config::EdaConfig;
use crate::data::model::Table;

/// Report sections, in the order they are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Preview,
    Overview,
    ColumnProfiles,
    Structure,
    Summary,
    NumericDistributions,
    CategoricalDistributions,
    Correlation,
}

impl Section {
    pub const ORDER: [Section; 8] = [
        Section::Preview,
        Section::Overview,
        Section::ColumnProfiles,
        Section::Structure,
        Section::Summary,
        Section::NumericDistributions,
        Section::CategoricalDistributions,
        Section::Correlation,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::Preview => "Input Data",
            Section::Overview => "Basic Dataset Information",
            Section::ColumnProfiles => "Column Types and Missing Values",
            Section::Structure => "Structure",
            Section::Summary => "Summary Statistics",
            Section::NumericDistributions => "Numeric Data Distribution",
            Section::CategoricalDistributions => "Categorical Data Distribution",
            Section::Correlation => "Correlation Matrix",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Everything derived from one table, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub source: String,
    pub preview: Preview,
    pub column_names: Vec<String>,
    /// (rows, columns)
    pub shape: (usize, usize),
    pub profiles: Vec<ColumnProfile>,
    pub structure: String,
    pub summary: SummaryStatistics,
    pub numeric: Vec<NumericFigure>,
    pub categorical: Vec<CategoricalFigure>,
    pub correlation: CorrelationMatrix,
    pub heatmap: Heatmap,
}

/// Run the profiler and both visualizers over `table`.
pub fn build_report(source: &str, table: &Table, config: &EdaConfig) -> Report {
    let (numeric, categorical) =
        distributions(table, config.max_categories, config.kde_grid_points);
    let correlation = correlation_matrix(table);
    let heatmap = heatmap(&correlation);

    let report = Report {
        source: source.to_string(),
        preview: Preview {
            headers: table.column_names(),
            rows: table.head(config.preview_rows),
        },
        column_names: table.column_names(),
        shape: table.shape(),
        profiles: profile_columns(table),
        structure: structure_summary(table),
        summary: summary_statistics(table),
        numeric,
        categorical,
        correlation,
        heatmap,
    };

    log::info!(
        "Report for '{source}': {} numeric figures, {} categorical figures, {}x{} correlation",
        report.numeric.len(),
        report.categorical.len(),
        report.correlation.len(),
        report.correlation.len()
    );
    report
}

impl Report {
    pub fn sections(&self) -> &'static [Section] {
        &Section::ORDER
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
