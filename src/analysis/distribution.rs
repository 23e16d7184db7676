use std::collections::HashMap;

use serde::Serialize;
use statrs::statistics::{Data, OrderStatistics, Statistics};

use super::profile::quantile;
use crate::data::model::{Column, Table};

// ---------------------------------------------------------------------------
// Figure descriptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Histogram with a density overlay, paired with the bare density curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericFigure {
    pub column: String,
    pub bins: Vec<HistogramBin>,
    /// Density scaled to histogram counts (`density · n · bin width`).
    pub overlay: Vec<[f64; 2]>,
    pub density: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyBar {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CategoricalFigure {
    /// Bars ordered by descending count.
    Frequencies {
        column: String,
        bars: Vec<FrequencyBar>,
    },
    TooManyValues {
        column: String,
        distinct: usize,
    },
}

impl CategoricalFigure {
    pub fn column(&self) -> &str {
        match self {
            CategoricalFigure::Frequencies { column, .. }
            | CategoricalFigure::TooManyValues { column, .. } => column,
        }
    }
}

// ---------------------------------------------------------------------------
// Figure builders
// ---------------------------------------------------------------------------

/// Figures for every column, each list in table column order.
pub fn distributions(
    table: &Table,
    max_categories: usize,
    grid_points: usize,
) -> (Vec<NumericFigure>, Vec<CategoricalFigure>) {
    let numeric = table
        .numeric_columns()
        .map(|c| numeric_figure(&c.name, &c.numeric_values(), grid_points))
        .collect();
    let categorical = table
        .categorical_columns()
        .map(|c| categorical_figure(c, max_categories))
        .collect();
    (numeric, categorical)
}

pub fn numeric_figure(column: &str, values: &[f64], grid_points: usize) -> NumericFigure {
    let bins = histogram_bins(values);
    let density = gaussian_kde(values, grid_points);
    let bin_width = bins.first().map(|b| b.end - b.start).unwrap_or(0.0);
    let scale = values.len() as f64 * bin_width;
    let overlay = density.iter().map(|&[x, y]| [x, y * scale]).collect();
    NumericFigure {
        column: column.to_string(),
        bins,
        overlay,
        density,
    }
}

/// Ranked value counts, or a notice when the column has more than
/// `max_categories` distinct values. Missing values are not counted.
pub fn categorical_figure(column: &Column, max_categories: usize) -> CategoricalFigure {
    let counts = value_counts(column.as_text().unwrap_or(&[]));
    if counts.len() > max_categories {
        log::debug!(
            "Skipping chart for '{}': {} distinct values",
            column.name,
            counts.len()
        );
        return CategoricalFigure::TooManyValues {
            column: column.name.clone(),
            distinct: counts.len(),
        };
    }
    CategoricalFigure::Frequencies {
        column: column.name.clone(),
        bars: counts,
    }
}

/// Counts per distinct value, descending; ties keep first-appearance order.
pub fn value_counts(values: &[Option<String>]) -> Vec<FrequencyBar> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut bars: Vec<FrequencyBar> = Vec::new();
    for v in values.iter().flatten() {
        match index.get(v.as_str()) {
            Some(&i) => bars[i].count += 1,
            None => {
                index.insert(v.as_str(), bars.len());
                bars.push(FrequencyBar {
                    label: v.clone(),
                    count: 1,
                });
            }
        }
    }
    bars.sort_by(|a, b| b.count.cmp(&a.count));
    bars
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Upper bound on the Freedman–Diaconis bin count; past it Sturges is used.
const MAX_BINS: usize = 1000;

/// Equal-width bins over `[min, max]`, width chosen like numpy's "auto":
/// the smaller of Freedman–Diaconis and Sturges, Sturges alone when the
/// IQR is zero or when Freedman–Diaconis would exceed [`MAX_BINS`]. The last
/// bin is closed on the right.
pub fn histogram_bins(values: &[f64]) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Vec::new();
    }
    let n = finite.len();
    let mut data = Data::new(finite);
    let min = data.order_statistic(1);
    let max = data.order_statistic(n);

    if max == min {
        return vec![HistogramBin {
            start: min - 0.5,
            end: min + 0.5,
            count: n,
        }];
    }

    let range = max - min;
    let sturges_bins = ((n as f64).log2() + 1.0).ceil() as usize;
    let iqr = quantile(&mut data, 0.75) - quantile(&mut data, 0.25);
    let fd_width = 2.0 * iqr / (n as f64).cbrt();
    let fd_bins = (range / fd_width).ceil();
    let n_bins = if fd_width > 0.0 && fd_bins <= MAX_BINS as f64 {
        (fd_bins as usize).max(sturges_bins)
    } else {
        sturges_bins
    }
    .max(1);

    let step = range / n_bins as f64;
    let mut bins: Vec<HistogramBin> = (0..n_bins)
        .map(|i| HistogramBin {
            start: min + step * i as f64,
            end: if i + 1 == n_bins {
                max
            } else {
                min + step * (i + 1) as f64
            },
            count: 0,
        })
        .collect();
    for v in data.iter() {
        let idx = (((v - min) / range) * n_bins as f64) as usize;
        bins[idx.min(n_bins - 1)].count += 1;
    }
    bins
}

// ---------------------------------------------------------------------------
// Kernel density estimate
// ---------------------------------------------------------------------------

/// Gaussian KDE with Scott's bandwidth, evaluated on an even grid reaching
/// three bandwidths past the data. Empty for fewer than two values or zero
/// variance.
pub fn gaussian_kde(values: &[f64], grid_points: usize) -> Vec<[f64; 2]> {
    let data: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = data.len();
    if n < 2 {
        return Vec::new();
    }
    let sd = data.iter().std_dev();
    if sd.is_nan() || sd <= 0.0 {
        return Vec::new();
    }

    let bw = sd * (n as f64).powf(-0.2);
    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lo = min - 3.0 * bw;
    let hi = max + 3.0 * bw;
    let points = grid_points.max(2);
    let norm = 1.0 / (n as f64 * bw * (2.0 * std::f64::consts::PI).sqrt());

    (0..points)
        .map(|i| {
            let x = lo + (hi - lo) * i as f64 / (points - 1) as f64;
            let sum: f64 = data
                .iter()
                .map(|&xi| {
                    let z = (x - xi) / bw;
                    (-0.5 * z * z).exp()
                })
                .sum();
            [x, sum * norm]
        })
        .collect()
}
