// ── Granularity & range utilities ──
//
// Map a granularity onto UTC truncation and stepping. Leaf module: no I/O,
// no failure modes.

use chrono::{DateTime, NaiveTime, TimeDelta, Timelike, Utc};

use eventstat_api::Granularity;

use crate::model::TimeBucket;

/// Truncate `instant` down to the start of its granularity unit, in UTC.
///
/// `Day` → midnight UTC, `Hour` → top of the hour UTC. `Total` has no unit:
/// the instant itself is the (single) bucket.
pub fn bucket_of(granularity: Granularity, instant: DateTime<Utc>) -> TimeBucket {
    let midnight = instant.date_naive().and_time(NaiveTime::MIN).and_utc();
    let aligned = match granularity {
        Granularity::Day => midnight,
        Granularity::Hour => midnight + TimeDelta::hours(i64::from(instant.hour())),
        Granularity::Total => instant,
    };
    TimeBucket::from_aligned(aligned)
}

/// Width of one granularity unit. `None` for `Total`.
pub fn step(granularity: Granularity) -> Option<TimeDelta> {
    match granularity {
        Granularity::Hour => Some(TimeDelta::hours(1)),
        Granularity::Day => Some(TimeDelta::days(1)),
        Granularity::Total => None,
    }
}

/// The bucket one unit before `bucket`. `None` for `Total`.
pub fn previous_bucket(granularity: Granularity, bucket: TimeBucket) -> Option<TimeBucket> {
    let width = step(granularity)?;
    bucket
        .instant()
        .checked_sub_signed(width)
        .map(TimeBucket::from_aligned)
}

/// Number of buckets covering `[from, to]` inclusive; `0` when `from > to`.
pub fn bucket_count(from: DateTime<Utc>, to: DateTime<Utc>, granularity: Granularity) -> usize {
    if from > to {
        return 0;
    }
    let Some(width) = step(granularity) else {
        return 1;
    };
    let span = bucket_of(granularity, to).instant() - bucket_of(granularity, from).instant();
    usize::try_from(span.num_seconds() / width.num_seconds())
        .map_or(0, |units| units.saturating_add(1))
}
