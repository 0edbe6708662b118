// ── Period comparator ──

use crate::model::{DatePoint, EventsComparison};

/// Turn an ascending series into a trend snapshot.
///
/// `current` is the last bucket, `previous` the one before it. No
/// adjacency check is made: series from the statistics client are
/// gap-free, so the two are always one unit apart there.
pub fn compare_periods(series: &[DatePoint]) -> EventsComparison {
    match series {
        [] => EventsComparison {
            current: 0,
            previous: Some(0),
            last_period_bucket: None,
        },
        [.., previous, last] => EventsComparison {
            current: last.events,
            previous: Some(previous.events),
            last_period_bucket: Some(last.bucket),
        },
        [last] => EventsComparison {
            current: last.events,
            previous: None,
            last_period_bucket: Some(last.bucket),
        },
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::model::TimeBucket;

    fn bucket(d: u32) -> TimeBucket {
        TimeBucket::from_aligned(Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap())
    }

    #[test]
    fn empty_series() {
        let cmp = compare_periods(&[]);
        assert_eq!(
            cmp,
            EventsComparison {
                current: 0,
                previous: Some(0),
                last_period_bucket: None,
            }
        );
        assert_eq!(cmp.delta(), Some(0));
        assert_eq!(cmp.percent_change(), None);
    }

    #[test]
    fn single_bucket() {
        let cmp = compare_periods(&[DatePoint::new(bucket(1), 5)]);
        assert_eq!(cmp.current, 5);
        assert_eq!(cmp.previous, None);
        assert_eq!(cmp.last_period_bucket, Some(bucket(1)));
        assert_eq!(cmp.delta(), None);
    }

    #[test]
    fn last_two_buckets() {
        let series = [
            DatePoint::new(bucket(1), 100),
            DatePoint::new(bucket(2), 3),
            DatePoint::new(bucket(3), 7),
        ];
        let cmp = compare_periods(&series);

        assert_eq!(cmp.current, 7);
        assert_eq!(cmp.previous, Some(3));
        assert_eq!(cmp.last_period_bucket, Some(bucket(3)));
        assert_eq!(cmp.delta(), Some(4));
        let pct = cmp.percent_change().unwrap();
        assert!((pct - 133.333).abs() < 0.01, "got {pct}");
    }

    #[test]
    fn decline_is_negative() {
        let series = [DatePoint::new(bucket(1), 10), DatePoint::new(bucket(2), 4)];
        let cmp = compare_periods(&series);
        assert_eq!(cmp.delta(), Some(-6));
        let pct = cmp.percent_change().unwrap();
        assert!((pct + 60.0).abs() < 1e-9, "got {pct}");
    }

    #[test]
    fn serializes_camel_case() {
        let cmp = compare_periods(&[DatePoint::new(bucket(2), 5)]);
        let json = serde_json::to_value(cmp).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "current": 5,
                "previous": null,
                "lastPeriodBucket": "2024-01-02T00:00:00Z",
            })
        );
    }
}
