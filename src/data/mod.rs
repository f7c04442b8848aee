/// Data layer: core types, loading, cleaning and conversion.
///
/// Architecture:
/// ```text
///  .csv / .xlsx upload
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse bytes → Table (column kinds tagged)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  drop duplicates, fill missing with column mean
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  select   │  project onto the chosen columns
///   └──────────┘
///        │
///        ├──────────────► chart   first numeric columns → bar series
///        ▼
///   ┌──────────┐
///   │  export   │  Table → csv / xlsx bytes + file name + MIME
///   └──────────┘
/// ```

pub mod chart;
pub mod clean;
pub mod export;
pub mod loader;
pub mod model;
pub mod select;
pub mod xlsx;
