// eventstat-core: Gap-filled statistics series between a counting backend and dashboards.

pub mod backend;
pub mod compare;
pub mod config;
pub mod error;
pub mod granularity;
pub mod model;
pub mod request;
pub mod series;
pub mod statistics;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::CountsBackend;
pub use compare::compare_periods;
pub use config::{BackendConfig, TlsVerification};
pub use error::CoreError;
pub use request::{MAX_SERIES_BUCKETS, StatisticsRequest};
pub use series::{empty_series, merge_series, series_total};
pub use statistics::{DESTINATION_STATUSES, SOURCE_STATUSES, StatisticsClient};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    DatePoint, DetailedStatisticsPoint, EventsComparison, TimeBucket, TimeZoneMode,
};

// Wire enums shared with the api layer.
pub use eventstat_api::{EventsCountStatus, EventsNamespace, Granularity};
