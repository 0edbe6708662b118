// ── Series scaffolding and merging ──
//
// The backend reports only buckets that saw events. These helpers build a
// zero-valued calendar grid for the requested range and overlay the sparse
// counts on it, so every bucket is present exactly once.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use eventstat_api::{Granularity, RawCount};

use crate::granularity::{bucket_of, previous_bucket};
use crate::model::{DatePoint, TimeBucket};

/// Zero-valued scaffold covering `[from, to]` at `granularity`.
///
/// Starts at the bucket of `to` and walks backward one unit at a time until
/// the bucket of `from`, inclusive on both ends. Output is **descending**
/// (newest first); [`merge_series`] restores ascending order.
///
/// Returns an empty vector when `from > to`. For `Total` the scaffold is the
/// single bucket of `to`.
pub fn empty_series(
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    granularity: Granularity,
) -> Vec<DatePoint> {
    if from > to {
        return Vec::new();
    }

    let first = bucket_of(granularity, from);
    let mut cursor = bucket_of(granularity, to);
    let mut scaffold = vec![DatePoint::zero(cursor)];

    while let Some(prev) = previous_bucket(granularity, cursor) {
        if prev < first {
            break;
        }
        scaffold.push(DatePoint::zero(prev));
        cursor = prev;
    }

    scaffold
}

/// Overlay `sparse` onto `scaffold`, returning one ascending series.
///
/// Sparse values win on bucket collision; buckets the backend did not
/// report keep the scaffold's value. Merging is idempotent:
/// `merge(merge(s, r), r) == merge(s, r)`.
pub fn merge_series(scaffold: &[DatePoint], sparse: &[DatePoint]) -> Vec<DatePoint> {
    let mut index: BTreeMap<TimeBucket, u64> = scaffold
        .iter()
        .map(|point| (point.bucket, point.events))
        .collect();

    index.extend(sparse.iter().map(|point| (point.bucket, point.events)));

    index
        .into_iter()
        .map(|(bucket, events)| DatePoint::new(bucket, events))
        .collect()
}

/// Align raw backend counts to `granularity` buckets.
///
/// For `Total` every point is keyed at `total_bucket`, the scaffold's single
/// bucket, since the backend's aggregate key is not guaranteed to equal the
/// range end.
pub(crate) fn align_counts(
    raw: &[RawCount],
    granularity: Granularity,
    total_bucket: TimeBucket,
) -> Vec<DatePoint> {
    raw.iter()
        .map(|count| {
            let bucket = match granularity {
                Granularity::Total => total_bucket,
                Granularity::Hour | Granularity::Day => bucket_of(granularity, count.key),
            };
            DatePoint::new(bucket, count.events)
        })
        .collect()
}

/// Sum of all events in a series.
pub fn series_total(series: &[DatePoint]) -> u64 {
    series.iter().map(|point| point.events).sum()
}
