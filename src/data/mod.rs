/// Data layer: core types, loading, caching, and filtering.
///
/// Architecture:
/// ```text
///  .db / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read job_listings → RawTable → JobTable (dedup, salary → f64)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  load once per process, share as Arc<JobTable>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterCriteria → filtered indices → FilteredView
///   └──────────┘
/// ```

pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
