// ── Statistics client ──
//
// Orchestrates query → backend → scaffold merge for one metric, and the
// fail-fast parallel fan-out that folds several metrics into one
// combined series.

use std::collections::BTreeSet;

use futures_util::future::try_join_all;
use tracing::debug;

use eventstat_api::{CountingClient, EventsCountStatus, EventsNamespace};

use crate::backend::CountsBackend;
use crate::compare::compare_periods;
use crate::config::BackendConfig;
use crate::error::CoreError;
use crate::granularity::bucket_of;
use crate::model::{DatePoint, DetailedStatisticsPoint, EventsComparison};
use crate::request::StatisticsRequest;
use crate::series::{align_counts, empty_series, merge_series};

/// Statuses combined for source and push-source dashboards.
pub const SOURCE_STATUSES: [EventsCountStatus; 2] =
    [EventsCountStatus::Success, EventsCountStatus::Skip];

/// Statuses combined for destination dashboards.
pub const DESTINATION_STATUSES: [EventsCountStatus; 3] = [
    EventsCountStatus::Success,
    EventsCountStatus::Skip,
    EventsCountStatus::Errors,
];

/// Read/transform layer between a counting backend and the display layer.
///
/// Stateless across calls: every method is one or more fresh round trips
/// followed by pure in-memory transforms.
#[derive(Debug, Clone)]
pub struct StatisticsClient<B = CountingClient> {
    backend: B,
}

impl StatisticsClient<CountingClient> {
    /// Build an HTTP-backed client from runtime configuration.
    pub fn connect(config: &BackendConfig) -> Result<Self, CoreError> {
        let backend = CountingClient::new(
            &config.url,
            config.endpoint_path.as_deref(),
            &config.transport(),
        )?;
        Ok(Self::new(backend))
    }
}

impl<B: CountsBackend> StatisticsClient<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Fetch one metric as an ascending, gap-free series.
    ///
    /// Exactly one backend call. A failed call or a non-`"ok"` envelope
    /// surfaces as `CoreError::StatisticsFetch`; there is no retry and no
    /// zero-filled fallback.
    pub async fn fetch_series(
        &self,
        request: &StatisticsRequest,
    ) -> Result<Vec<DatePoint>, CoreError> {
        request.validate()?;

        let raw = self
            .backend
            .fetch_counts(&request.to_query())
            .await
            .map_err(|source| CoreError::StatisticsFetch {
                status: request.status,
                source,
            })?;

        let scaffold = empty_series(request.from, request.to, request.granularity);
        let first = bucket_of(request.granularity, request.from);
        let last = bucket_of(request.granularity, request.to);

        let mut sparse = align_counts(&raw, request.granularity, last);
        let reported = sparse.len();
        sparse.retain(|point| point.bucket >= first && point.bucket <= last);
        if sparse.len() < reported {
            debug!(
                dropped = reported - sparse.len(),
                "ignoring backend points outside the requested range"
            );
        }

        debug!(
            status = ?request.status,
            buckets = scaffold.len(),
            reported,
            "merged statistics series"
        );
        Ok(merge_series(&scaffold, &sparse))
    }

    /// Fetch several statuses concurrently and fold them per bucket.
    ///
    /// All branches share the request's range, granularity, namespace and
    /// destination. A status listed more than once is fetched once. The
    /// first branch to fail aborts the rest and is returned as
    /// `CoreError::Combination`; no partial result is produced.
    pub async fn fetch_detailed(
        &self,
        request: &StatisticsRequest,
        statuses: &[EventsCountStatus],
    ) -> Result<Vec<DetailedStatisticsPoint>, CoreError> {
        request.validate()?;
        let statuses: BTreeSet<EventsCountStatus> = statuses.iter().copied().collect();
        debug!(?statuses, namespace = ?request.namespace, "fetching combined statistics");

        let branches = statuses.into_iter().map(|status| {
            let branch = request.clone().status(status);
            async move {
                match self.fetch_series(&branch).await {
                    Ok(series) => Ok((status, series)),
                    Err(source) => Err(CoreError::Combination {
                        status,
                        source: Box::new(source),
                    }),
                }
            }
        });

        let series = try_join_all(branches).await?;
        combine(&series)
    }

    /// Combined `success` / `skip` series for a source.
    ///
    /// Defaults the namespace to `source` when the request leaves it unset.
    pub async fn fetch_source_statistics(
        &self,
        request: &StatisticsRequest,
    ) -> Result<Vec<DetailedStatisticsPoint>, CoreError> {
        let request = with_default_namespace(request, EventsNamespace::Source);
        self.fetch_detailed(&request, &SOURCE_STATUSES).await
    }

    /// Combined `success` / `skip` / `errors` series for a destination.
    ///
    /// Defaults the namespace to `destination` when the request leaves it unset.
    pub async fn fetch_destination_statistics(
        &self,
        request: &StatisticsRequest,
    ) -> Result<Vec<DetailedStatisticsPoint>, CoreError> {
        let request = with_default_namespace(request, EventsNamespace::Destination);
        self.fetch_detailed(&request, &DESTINATION_STATUSES).await
    }

    /// Fetch one metric and reduce it to a period-over-period snapshot.
    pub async fn fetch_comparison(
        &self,
        request: &StatisticsRequest,
    ) -> Result<EventsComparison, CoreError> {
        let series = self.fetch_series(request).await?;
        Ok(compare_periods(&series))
    }
}

fn with_default_namespace(
    request: &StatisticsRequest,
    namespace: EventsNamespace,
) -> StatisticsRequest {
    let mut request = request.clone();
    if request.namespace.is_none() {
        request.namespace = Some(namespace);
    }
    request
}

/// Zip per-status series by position into combined points.
///
/// Every branch was merged onto the same scaffold, so lengths and bucket
/// order agree; a length mismatch is reported rather than truncated.
fn combine(
    series: &[(EventsCountStatus, Vec<DatePoint>)],
) -> Result<Vec<DetailedStatisticsPoint>, CoreError> {
    let Some((_, first)) = series.first() else {
        return Ok(Vec::new());
    };

    let mut combined: Vec<DetailedStatisticsPoint> = first
        .iter()
        .map(|point| DetailedStatisticsPoint::empty(point.bucket))
        .collect();

    for (status, points) in series {
        if points.len() != combined.len() {
            return Err(CoreError::MisalignedSeries {
                status: *status,
                expected: combined.len(),
                actual: points.len(),
            });
        }
        for (slot, point) in combined.iter_mut().zip(points) {
            slot.record(*status, point.events);
        }
    }

    Ok(combined)
}
