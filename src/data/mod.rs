/// Data layer: core types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///  data/*.csv (one per station)      main_data.csv (fallback)
///        │                                 │
///        ▼                                 ▼
///   ┌──────────┐   discovery fault   ┌──────────┐
///   │ load_dir  │ ──────────────────▶│load_merged│
///   └──────────┘                     └──────────┘
///        │      concat + datetime + fill   │
///        └────────────────┬────────────────┘
///                         ▼
///                  ┌────────────┐
///                  │ AirDataset  │  Vec<Measurement>, station/date index
///                  └────────────┘
///                         ▼
///                  ┌────────────┐
///                  │   filter    │  station + date predicates → indices
///                  └────────────┘
///                         ▼
///                  ┌────────────┐
///                  │  aggregate  │  means, monthly trend, bounded sample
///                  └────────────┘
/// ```
pub mod aggregate;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
