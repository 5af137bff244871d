/// Data layer: core input types, loading, and selection.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SweepBatch
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │  SweepSource  │  fetch(time range) → SweepBatch
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  time-range selection, sentinel classification
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod source;
