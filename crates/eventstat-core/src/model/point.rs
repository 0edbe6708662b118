// ── Series point types ──

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use eventstat_api::EventsCountStatus;

use super::bucket::TimeBucket;

/// Event count for one bucket of one named metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatePoint {
    pub bucket: TimeBucket,
    pub events: u64,
}

impl DatePoint {
    pub const fn new(bucket: TimeBucket, events: u64) -> Self {
        Self { bucket, events }
    }

    pub const fn zero(bucket: TimeBucket) -> Self {
        Self { bucket, events: 0 }
    }
}

/// One bucket of a combined multi-metric series.
///
/// Serializes flat, e.g. `{ "bucket": ..., "total": 12, "success": 10, "skip": 2 }`.
/// `total` is always the sum of the per-status values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailedStatisticsPoint {
    pub bucket: TimeBucket,
    pub total: u64,
    #[serde(flatten)]
    metrics: BTreeMap<EventsCountStatus, u64>,
}

impl DetailedStatisticsPoint {
    pub(crate) fn empty(bucket: TimeBucket) -> Self {
        Self {
            bucket,
            total: 0,
            metrics: BTreeMap::new(),
        }
    }

    /// Set the value for `status`, replacing any earlier value so `total`
    /// stays the sum of the named fields.
    pub(crate) fn record(&mut self, status: EventsCountStatus, events: u64) {
        if let Some(previous) = self.metrics.insert(status, events) {
            self.total -= previous;
        }
        self.total += events;
    }

    /// Value for one status; `None` if that status was not requested.
    pub fn get(&self, status: EventsCountStatus) -> Option<u64> {
        self.metrics.get(&status).copied()
    }

    /// Per-status values in status order.
    pub fn metrics(&self) -> impl Iterator<Item = (EventsCountStatus, u64)> + '_ {
        self.metrics.iter().map(|(status, events)| (*status, *events))
    }
}
