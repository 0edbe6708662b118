// ── Time bucket types ──

use std::fmt;

use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use eventstat_api::Granularity;

/// A point in time truncated to the active granularity, always UTC.
///
/// Ordering is chronological, so a `BTreeMap<TimeBucket, _>` iterates
/// oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeBucket(DateTime<Utc>);

impl TimeBucket {
    /// Wrap an instant that is already aligned to a bucket boundary.
    ///
    /// Use [`crate::granularity::bucket_of`] to align an arbitrary instant.
    pub const fn from_aligned(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    pub const fn instant(self) -> DateTime<Utc> {
        self.0
    }

    /// Render a display label for this bucket.
    ///
    /// Only affects presentation: buckets themselves stay UTC.
    pub fn label(self, granularity: Granularity, zone: TimeZoneMode) -> String {
        let fmt = match granularity {
            Granularity::Hour => "%Y-%m-%d %H:00",
            Granularity::Day => "%Y-%m-%d",
            Granularity::Total => {
                return match zone {
                    TimeZoneMode::Utc => self.0.to_rfc3339_opts(SecondsFormat::Secs, true),
                    TimeZoneMode::Local => self
                        .0
                        .with_timezone(&Local)
                        .to_rfc3339_opts(SecondsFormat::Secs, false),
                };
            }
        };
        match zone {
            TimeZoneMode::Utc => self.0.format(fmt).to_string(),
            TimeZoneMode::Local => self.0.with_timezone(&Local).format(fmt).to_string(),
        }
    }
}

impl From<TimeBucket> for DateTime<Utc> {
    fn from(bucket: TimeBucket) -> Self {
        bucket.0
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

/// Which clock bucket labels are rendered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeZoneMode {
    #[default]
    Utc,
    Local,
}
