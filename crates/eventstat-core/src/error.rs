// ── Core error types ──
//
// Errors surfaced to the display layer. An error always means "no data for
// this request", never "zero events": nothing here falls back to a
// zero-filled series.

use chrono::{DateTime, Utc};
use thiserror::Error;

use eventstat_api::EventsCountStatus;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Fetch errors ─────────────────────────────────────────────────
    /// The backend call failed or the backend declared failure.
    ///
    /// The underlying `eventstat_api::Error` keeps the raw response body
    /// for diagnostics (see `eventstat_api::Error::raw_body`).
    #[error("Failed to fetch statistics: {source}")]
    StatisticsFetch {
        status: Option<EventsCountStatus>,
        #[source]
        source: eventstat_api::Error,
    },

    /// One branch of a multi-metric fetch failed; no partial result is kept.
    #[error("Failed to combine statistics: {status} branch failed: {source}")]
    Combination {
        status: EventsCountStatus,
        #[source]
        source: Box<CoreError>,
    },

    // ── Request errors ───────────────────────────────────────────────
    #[error("Invalid range: start {from} is after end {to}")]
    InvalidRange {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    #[error("Range spans {buckets} buckets, more than the limit of {limit}")]
    RangeTooLarge { buckets: usize, limit: usize },

    #[error("Series for {status} has {actual} buckets, expected {expected}")]
    MisalignedSeries {
        status: EventsCountStatus,
        expected: usize,
        actual: usize,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// The api-level error at the root of this failure, if any.
    pub fn api_error(&self) -> Option<&eventstat_api::Error> {
        match self {
            Self::StatisticsFetch { source, .. } => Some(source),
            Self::Combination { source, .. } => source.api_error(),
            _ => None,
        }
    }

    /// Raw backend response attached to this failure, if one was received.
    pub fn raw_response(&self) -> Option<&str> {
        self.api_error().and_then(eventstat_api::Error::raw_body)
    }
}

impl From<eventstat_api::Error> for CoreError {
    fn from(err: eventstat_api::Error) -> Self {
        match err {
            eventstat_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid backend URL: {e}"),
            },
            eventstat_api::Error::Tls(message) => CoreError::Config { message },
            eventstat_api::Error::InvalidToken(reason) => CoreError::Config {
                message: format!("invalid bearer token: {reason}"),
            },
            other => CoreError::StatisticsFetch {
                status: None,
                source: other,
            },
        }
    }
}
