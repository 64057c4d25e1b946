/// Data layer: loading, filtering, aggregation and summary metrics.
///
/// Architecture:
/// ```text
///   <data dir>/*.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse, tag source_file, normalize names, merge (once)
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ SurveyTable  │  unified Arrow RecordBatch, immutable
///   └─────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  source + year range → filtered view
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌───────────┐
///   │   kpi     │   │ aggregate  │  group means, correlation (used by charts)
///   └──────────┘   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod kpi;
pub mod loader;
pub mod model;
