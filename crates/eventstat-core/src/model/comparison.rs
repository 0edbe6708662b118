// ── Period-over-period comparison ──

use serde::{Deserialize, Serialize};

use super::bucket::TimeBucket;

/// Trend snapshot: the most recent bucket against the one before it.
///
/// For an empty series both `current` and `previous` are `0`; for a
/// one-bucket series `previous` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsComparison {
    pub current: u64,
    pub previous: Option<u64>,
    pub last_period_bucket: Option<TimeBucket>,
}

impl EventsComparison {
    /// `current - previous`, or `None` without a previous period.
    pub fn delta(&self) -> Option<i128> {
        self.previous
            .map(|previous| i128::from(self.current) - i128::from(previous))
    }

    /// Relative change in percent.
    ///
    /// `None` without a previous period, or when the previous period was
    /// zero (growth from nothing has no meaningful ratio).
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn percent_change(&self) -> Option<f64> {
        match self.previous {
            Some(previous) if previous > 0 => {
                let delta = self.current as f64 - previous as f64;
                Some(delta / previous as f64 * 100.0)
            }
            _ => None,
        }
    }
}
