use thiserror::Error;

/// Top-level error type for the `eventstat-api` crate.
///
/// Covers every way a single round trip to the counting backend can fail:
/// transport, HTTP status, envelope decoding, and backend-declared failure.
/// `eventstat-core` wraps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Backend rejected the bearer token (HTTP 401 / 403).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Bearer token contains bytes that cannot go into a header.
    #[error("Invalid bearer token: {0}")]
    InvalidToken(String),

    // ── HTTP ────────────────────────────────────────────────────────
    /// Non-success HTTP status other than an auth rejection.
    #[error("Backend returned HTTP {status}")]
    Http { status: u16, body: String },

    // ── Envelope ────────────────────────────────────────────────────
    /// Backend answered, but the envelope's `status` was not `"ok"`.
    #[error("Backend reported failure (status {status:?}): {message}")]
    Backend {
        status: String,
        message: String,
        /// Raw response body, kept for diagnostics.
        body: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the backend rejected our credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// This crate never retries on its own; the hint is for callers.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// The raw response body, when the backend produced one.
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            Self::Http { body, .. }
            | Self::Backend { body, .. }
            | Self::Deserialization { body, .. } => Some(body),
            _ => None,
        }
    }
}
