/// Data layer: core table types, loading, and saving.
///
/// Architecture:
/// ```text
///  .csv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → SurveyTable
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ SurveyTable │  Vec<Column>, aligned by row position
///   └─────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  writer  │  SurveyTable → .csv / .parquet
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod writer;
