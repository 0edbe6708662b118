// ── Domain model ──
//
// Value objects created fresh per request. Nothing here is cached or
// shared across calls.

pub mod bucket;
pub mod comparison;
pub mod point;

pub use bucket::{TimeBucket, TimeZoneMode};
pub use comparison::EventsComparison;
pub use point::{DatePoint, DetailedStatisticsPoint};
