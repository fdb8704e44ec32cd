/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  3 × station CSV (HTTP)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  skip preamble, pick columns, tag location → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Observation>, read-only after startup
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  parse "col eq v && col > n" → filtered indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  per-location monthly means
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
