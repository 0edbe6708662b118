// ── Statistics request ──
//
// Fully-resolved parameters for one statistics call. Ranges are always
// supplied by the caller; nothing here reads the clock.

use chrono::{DateTime, Utc};

use eventstat_api::{EventsCountStatus, EventsNamespace, EventsQuery, Granularity};

use crate::error::CoreError;
use crate::granularity::bucket_count;
use crate::model::{TimeBucket, TimeZoneMode};

/// Largest series a single request may produce (about eleven years hourly).
pub const MAX_SERIES_BUCKETS: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsRequest {
    pub project_id: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub granularity: Granularity,
    pub namespace: Option<EventsNamespace>,
    pub status: Option<EventsCountStatus>,
    pub destination_id: Option<String>,
    /// Label rendering only; never changes which buckets are requested.
    pub time_zone: TimeZoneMode,
}

impl StatisticsRequest {
    pub fn new(
        project_id: impl Into<String>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        granularity: Granularity,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            from,
            to,
            granularity,
            namespace: None,
            status: None,
            destination_id: None,
            time_zone: TimeZoneMode::default(),
        }
    }

    pub fn namespace(mut self, namespace: EventsNamespace) -> Self {
        self.namespace = Some(namespace);
        self
    }

    pub fn status(mut self, status: EventsCountStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn destination_id(mut self, destination_id: impl Into<String>) -> Self {
        self.destination_id = Some(destination_id.into());
        self
    }

    pub fn time_zone(mut self, time_zone: TimeZoneMode) -> Self {
        self.time_zone = time_zone;
        self
    }

    /// Reject ranges whose start lies after their end, and ranges that
    /// would need more than [`MAX_SERIES_BUCKETS`] buckets.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.from > self.to {
            return Err(CoreError::InvalidRange {
                from: self.from,
                to: self.to,
            });
        }
        let buckets = bucket_count(self.from, self.to, self.granularity);
        if buckets > MAX_SERIES_BUCKETS {
            return Err(CoreError::RangeTooLarge {
                buckets,
                limit: MAX_SERIES_BUCKETS,
            });
        }
        Ok(())
    }

    /// The backend query for this request.
    pub fn to_query(&self) -> EventsQuery {
        EventsQuery {
            project_id: self.project_id.clone(),
            start: self.from,
            end: self.to,
            granularity: self.granularity,
            namespace: self.namespace,
            status: self.status,
            destination_id: self.destination_id.clone(),
        }
    }

    /// Display label for `bucket` in this request's granularity and zone.
    pub fn label(&self, bucket: TimeBucket) -> String {
        bucket.label(self.granularity, self.time_zone)
    }
}
