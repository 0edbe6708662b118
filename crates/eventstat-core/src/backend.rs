// ── Counting backend seam ──
//
// The statistics client talks to the backend only through this trait, so
// the host application can swap in its own HTTP stack and tests can run
// against an in-process double.

use std::future::Future;

use eventstat_api::{CountingClient, EventsQuery, RawCount};

/// Source of sparse per-bucket event counts.
///
/// One call is one round trip. Implementations own timeouts and connection
/// pooling; they must not retry on behalf of the caller.
pub trait CountsBackend: Send + Sync {
    fn fetch_counts(
        &self,
        query: &EventsQuery,
    ) -> impl Future<Output = Result<Vec<RawCount>, eventstat_api::Error>> + Send;
}

impl CountsBackend for CountingClient {
    fn fetch_counts(
        &self,
        query: &EventsQuery,
    ) -> impl Future<Output = Result<Vec<RawCount>, eventstat_api::Error>> + Send {
        self.get_event_counts(query)
    }
}
