/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → CustomerTable (churn derived from status)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  source   │  load once, share Arc<CustomerTable> read-only
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSpec (ranges / memberships, AND) → new CustomerTable
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod source;
