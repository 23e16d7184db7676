/// Data layer: core types, loading, and the example dataset.
///
/// Architecture:
/// ```text
///  .csv / .xlsx (/ .json / .parquet)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse bytes → Table, or sheet names to choose from
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  named columns, each classified numeric or categorical
///   └──────────┘
///
///   example: HTTP fetch → loader → process-wide cache keyed by URL
/// ```

pub mod error;
pub mod example;
pub mod loader;
pub mod model;
