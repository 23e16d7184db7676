use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;
use statrs::statistics::{Data, OrderStatistics, Statistics};

use crate::data::model::{ColumnKind, Table};

// ---------------------------------------------------------------------------
// Column profiles
// ---------------------------------------------------------------------------

/// Type and missing-value profile for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    pub missing_count: usize,
    /// Missing value percentage (0.0 to 100.0); 0 for an empty table.
    pub missing_pct: f64,
}

/// One profile per column, in table order.
pub fn profile_columns(table: &Table) -> Vec<ColumnProfile> {
    let rows = table.row_count();
    table
        .columns()
        .iter()
        .map(|col| {
            let missing_count = col.missing_count();
            ColumnProfile {
                name: col.name.clone(),
                kind: col.kind,
                missing_count,
                missing_pct: missing_percentage(missing_count, rows),
            }
        })
        .collect()
}

pub fn missing_percentage(missing: usize, rows: usize) -> f64 {
    if rows == 0 {
        0.0
    } else {
        missing as f64 / rows as f64 * 100.0
    }
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// `describe()`-style statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl NumericSummary {
    /// Row labels and values in display order.
    pub fn rows(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.median),
            ("75%", self.q75),
            ("max", self.max),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub columns: Vec<NumericSummary>,
}

/// Statistics over numeric columns only; missing values are skipped.
pub fn summary_statistics(table: &Table) -> SummaryStatistics {
    let columns = table
        .numeric_columns()
        .map(|col| describe(&col.name, &col.numeric_values()))
        .collect();
    SummaryStatistics { columns }
}

pub fn describe(column: &str, values: &[f64]) -> NumericSummary {
    let n = values.len();
    let mut data = Data::new(values.to_vec());
    NumericSummary {
        column: column.to_string(),
        count: n,
        mean: values.iter().mean(),
        std: values.iter().std_dev(),
        min: data.order_statistic(1),
        q25: quantile(&mut data, 0.25),
        median: quantile(&mut data, 0.5),
        q75: quantile(&mut data, 0.75),
        max: data.order_statistic(n),
    }
}

/// Linear-interpolation quantile (pandas' default), built on order
/// statistics; NaN when empty.
pub fn quantile(data: &mut Data<Vec<f64>>, q: f64) -> f64 {
    let n = data.len();
    if n == 0 {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let frac = pos - lo as f64;
    let below = data.order_statistic(lo + 1);
    if frac == 0.0 {
        return below;
    }
    let above = data.order_statistic(lo + 2);
    below + (above - below) * frac
}

// ---------------------------------------------------------------------------
// Structural summary
// ---------------------------------------------------------------------------

/// Text summary in the spirit of `DataFrame.info()`.
pub fn structure_summary(table: &Table) -> String {
    let rows = table.row_count();
    let mut out = String::new();

    let _ = writeln!(out, "Table summary");
    if rows == 0 {
        let _ = writeln!(out, "RangeIndex: 0 entries");
    } else {
        let _ = writeln!(out, "RangeIndex: {rows} entries, 0 to {}", rows - 1);
    }
    let _ = writeln!(
        out,
        "Data columns (total {} columns):",
        table.column_count()
    );

    let name_width = table
        .columns()
        .iter()
        .map(|c| c.name.chars().count())
        .fold("Column".len(), usize::max);
    let _ = writeln!(
        out,
        " {:>3}  {:<name_width$}  {:<14}  Dtype",
        "#", "Column", "Non-Null Count"
    );
    let _ = writeln!(
        out,
        " {:>3}  {:<name_width$}  {:<14}  -----",
        "---",
        "------",
        "--------------"
    );
    for (i, col) in table.columns().iter().enumerate() {
        let non_null = format!("{} non-null", rows - col.missing_count());
        let _ = writeln!(
            out,
            " {i:>3}  {:<name_width$}  {non_null:<14}  {}",
            col.name, col.kind
        );
    }

    let mut tally: BTreeMap<&str, usize> = BTreeMap::new();
    for col in table.columns() {
        *tally.entry(col.kind.dtype()).or_default() += 1;
    }
    let dtypes = tally
        .iter()
        .map(|(dtype, n)| format!("{dtype}({n})"))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = write!(out, "dtypes: {dtypes}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_csv;

    fn table(csv: &str) -> Table {
        load_csv(csv.as_bytes()).unwrap()
    }

    #[test]
    fn one_profile_per_column_with_bounded_missing_ratio() {
        let t = table("a,b,c,d\n1,,x,\n2,3,,\n,4,z,\n");
        let profiles = profile_columns(&t);
        assert_eq!(profiles.len(), t.column_count());

        let (rows, cols) = t.shape();
        let total_missing: usize = profiles.iter().map(|p| p.missing_count).sum();
        let ratio = total_missing as f64 / rows as f64 / cols as f64;
        assert!((0.0..=1.0).contains(&ratio));
        assert_eq!(total_missing, 1 + 1 + 1 + 3);
    }

    #[test]
    fn missing_percentage_extremes() {
        let t = table("full,empty\n1,\n2,\n");
        let profiles = profile_columns(&t);
        assert_eq!(profiles[0].missing_pct, 0.0);
        assert_eq!(profiles[1].missing_pct, 100.0);
        assert_eq!(profiles[1].kind, ColumnKind::Float);
    }

    #[test]
    fn empty_table_has_zero_missing_percentage() {
        let t = table("a,b\n");
        let profiles = profile_columns(&t);
        assert_eq!(profiles.len(), 2);
        assert!(profiles.iter().all(|p| p.missing_pct == 0.0));
        assert!(summary_statistics(&t).columns.is_empty());
        assert_eq!(missing_percentage(0, 0), 0.0);
    }

    #[test]
    fn summary_covers_numeric_columns_only() {
        let t = table("id,name,score\n1,a,1.0\n2,b,2.0\n3,c,\n4,d,4.0\n");
        let stats = summary_statistics(&t);
        let names: Vec<&str> = stats.columns.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(names, vec!["id", "score"]);

        let id = &stats.columns[0];
        assert_eq!(id.count, 4);
        assert!((id.mean - 2.5).abs() < 1e-12);
        assert!((id.std - 1.2909944487358056).abs() < 1e-12);
        assert_eq!(id.min, 1.0);
        assert!((id.q25 - 1.75).abs() < 1e-12);
        assert!((id.median - 2.5).abs() < 1e-12);
        assert!((id.q75 - 3.25).abs() < 1e-12);
        assert_eq!(id.max, 4.0);

        let score = &stats.columns[1];
        assert_eq!(score.count, 3);
        assert_eq!(score.median, 2.0);
    }

    #[test]
    fn describe_degenerate_inputs() {
        let empty = describe("e", &[]);
        assert_eq!(empty.count, 0);
        assert!(empty.mean.is_nan() && empty.min.is_nan() && empty.max.is_nan());

        let single = describe("s", &[7.0]);
        assert_eq!(single.mean, 7.0);
        assert!(single.std.is_nan());
        assert_eq!(single.q25, 7.0);
    }

    #[test]
    fn structure_summary_lists_columns_and_dtypes() {
        let t = table("id,name,score\n1,a,0.5\n2,,1.5\n");
        let info = structure_summary(&t);
        assert!(info.contains("RangeIndex: 2 entries, 0 to 1"));
        assert!(info.contains("Data columns (total 3 columns):"));
        assert!(info.contains("1 non-null"));
        assert!(info.contains("dtypes: float64(1), int64(1), object(1)"));
    }

    #[test]
    fn structure_summary_of_empty_table() {
        let info = structure_summary(&table("a\n"));
        assert!(info.contains("RangeIndex: 0 entries"));
        assert!(info.contains("0 non-null"));
    }
}
