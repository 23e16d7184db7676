use serde::Serialize;
use statrs::statistics::Statistics;

use crate::color::coolwarm;
use crate::data::model::Table;

/// Square Pearson matrix indexed by numeric column names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }
}

/// Pairwise-complete Pearson correlation over every numeric column.
///
/// The diagonal is exactly 1.0 for columns with nonzero variance; undefined
/// entries (fewer than two paired rows, zero variance) are NaN.
pub fn correlation_matrix(table: &Table) -> CorrelationMatrix {
    let columns: Vec<(&str, &[Option<f64>])> = table
        .numeric_columns()
        .filter_map(|c| c.as_numeric().map(|v| (c.name.as_str(), v)))
        .collect();
    let k = columns.len();
    let mut values = vec![vec![f64::NAN; k]; k];

    for i in 0..k {
        for j in i..k {
            let r = pearson(columns[i].1, columns[j].1);
            let r = if i == j && !r.is_nan() { 1.0 } else { r };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        labels: columns.iter().map(|(n, _)| n.to_string()).collect(),
        values,
    }
}

/// Pearson r over rows where both values are present.
pub fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let (xs, ys): (Vec<f64>, Vec<f64>) = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip();
    if xs.len() < 2 {
        return f64::NAN;
    }

    let denom = xs.iter().std_dev() * ys.iter().std_dev();
    if denom == 0.0 || !denom.is_finite() {
        return f64::NAN;
    }
    (xs.iter().covariance(ys.iter()) / denom).clamp(-1.0, 1.0)
}

// ---------------------------------------------------------------------------
// Heatmap description
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub row: usize,
    pub col: usize,
    pub value: f64,
    /// `None` for undefined entries, which are left blank.
    pub fill: Option<[u8; 3]>,
    pub annotation: String,
}

/// Annotated, diverging-colour rendering of a correlation matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub labels: Vec<String>,
    pub cells: Vec<HeatmapCell>,
    pub vmin: f64,
    pub vmax: f64,
}

/// Colour scale spans the finite entries; a flat or empty matrix uses
/// [-1, 1].
pub fn heatmap(matrix: &CorrelationMatrix) -> Heatmap {
    let finite = matrix.values.iter().flatten().copied().filter(|v| v.is_finite());
    let (lo, hi) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let (vmin, vmax) = if lo < hi { (lo, hi) } else { (-1.0, 1.0) };

    let mut cells = Vec::with_capacity(matrix.len() * matrix.len());
    for row in 0..matrix.len() {
        for col in 0..matrix.len() {
            let value = matrix.get(row, col);
            let (fill, annotation) = if value.is_finite() {
                let t = (value - vmin) / (vmax - vmin);
                (Some(coolwarm(t)), format!("{value:.2}"))
            } else {
                (None, String::new())
            };
            cells.push(HeatmapCell {
                row,
                col,
                value,
                fill,
                annotation,
            });
        }
    }

    Heatmap {
        labels: matrix.labels.clone(),
        cells,
        vmin,
        vmax,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_csv;

    fn table(csv: &str) -> Table {
        load_csv(csv.as_bytes()).unwrap()
    }

    #[test]
    fn perfect_positive_and_negative() {
        let t = table("x,y,z,label\n1,2,5,a\n2,4,4,b\n3,6,3,c\n4,8,2,d\n5,10,1,e\n");
        let m = correlation_matrix(&t);
        assert_eq!(m.labels, vec!["x", "y", "z"]);
        assert!((m.get(0, 1) - 1.0).abs() < 1e-12);
        assert!((m.get(0, 2) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn symmetric_with_unit_diagonal() {
        let t = table("a,b,c\n1,3.5,9\n2,1.0,7\n4,2.2,8\n3,5.1,1\n7,0.3,2\n");
        let m = correlation_matrix(&t);
        for i in 0..m.len() {
            assert_eq!(m.get(i, i), 1.0);
            for j in 0..m.len() {
                assert_eq!(m.get(i, j), m.get(j, i));
                assert!((-1.0..=1.0).contains(&m.get(i, j)));
            }
        }
    }

    #[test]
    fn missing_rows_are_excluded_pairwise() {
        let a = [Some(1.0), Some(2.0), None, Some(4.0)];
        let b = [Some(2.0), Some(4.0), Some(100.0), Some(8.0)];
        assert!((pearson(&a, &b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn undefined_entries_are_nan() {
        assert!(pearson(&[Some(1.0)], &[Some(2.0)]).is_nan());
        assert!(pearson(&[Some(1.0), Some(1.0)], &[Some(2.0), Some(3.0)]).is_nan());

        let t = table("flat,x\n3,1\n3,2\n3,4\n");
        let m = correlation_matrix(&t);
        assert!(m.get(0, 0).is_nan());
        assert!(m.get(0, 1).is_nan());
        assert_eq!(m.get(1, 1), 1.0);
    }

    #[test]
    fn degenerate_tables_render() {
        let empty = correlation_matrix(&table("a,b\n"));
        assert!(empty.is_empty());
        let hm = heatmap(&empty);
        assert!(hm.cells.is_empty());
        assert_eq!((hm.vmin, hm.vmax), (-1.0, 1.0));

        let single = correlation_matrix(&table("n,s\n1,a\n2,b\n"));
        assert_eq!(single.len(), 1);
        let hm = heatmap(&single);
        assert_eq!(hm.cells.len(), 1);
        assert_eq!(hm.cells[0].annotation, "1.00");
        assert!(hm.cells[0].fill.is_some());
    }

    #[test]
    fn heatmap_blanks_nan_cells_and_spans_data_range() {
        let m = CorrelationMatrix {
            labels: vec!["a".into(), "b".into()],
            values: vec![vec![1.0, -0.5], vec![-0.5, f64::NAN]],
        };
        let hm = heatmap(&m);
        assert_eq!((hm.vmin, hm.vmax), (-0.5, 1.0));
        assert_eq!(hm.cells.len(), 4);
        assert_eq!(hm.cells[1].annotation, "-0.50");
        assert_eq!(hm.cells[1].fill, Some(coolwarm(0.0)));
        assert!(hm.cells[3].fill.is_none());
        assert!(hm.cells[3].annotation.is_empty());
    }
}
