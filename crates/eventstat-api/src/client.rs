// Counting backend HTTP client
//
// Wraps `reqwest::Client` with endpoint URL construction and envelope
// unwrapping. One call, one round trip: no retries, no caching.

use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::models::{CountsEnvelope, RawCount};
use crate::query::EventsQuery;
use crate::transport::TransportConfig;

/// Default endpoint path, relative to the backend base URL.
pub const DEFAULT_ENDPOINT: &str = "api/v1/statistics";

/// Raw HTTP client for the event-counting backend.
///
/// Handles the `{ status, data: [...] }` envelope. Methods return the
/// unwrapped sparse `data` payload; the envelope is stripped before the
/// caller sees it.
#[derive(Debug, Clone)]
pub struct CountingClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl CountingClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the backend root (e.g. `https://stats.example.com`);
    /// `endpoint_path` is joined onto it, defaulting to [`DEFAULT_ENDPOINT`].
    pub fn new(
        base_url: &Url,
        endpoint_path: Option<&str>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url, endpoint_path)
    }

    /// Create a client around a pre-built `reqwest::Client`.
    ///
    /// Use this to share a connection pool with the host application.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &Url,
        endpoint_path: Option<&str>,
    ) -> Result<Self, Error> {
        let endpoint = endpoint_url(base_url, endpoint_path.unwrap_or(DEFAULT_ENDPOINT))?;
        Ok(Self { http, endpoint })
    }

    /// The fully-resolved endpoint URL (without query).
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Fetch sparse event counts for one query.
    ///
    /// `GET {endpoint}?project_id=..&start=..&end=..&granularity=..[&namespace=..][&status=..][&destination_id=..]`
    pub async fn get_event_counts(&self, query: &EventsQuery) -> Result<Vec<RawCount>, Error> {
        let mut url = self.endpoint.clone();
        url.set_query(Some(&query.to_query_string()));

        debug!(
            project = %query.project_id,
            granularity = %query.granularity,
            namespace = ?query.namespace,
            status = ?query.status,
            "GET {}",
            self.endpoint
        );

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(Error::Transport)?;

        let points = parse_envelope(resp).await?;
        debug!(points = points.len(), "event counts received");
        Ok(points)
    }
}

/// Join `path` onto `base`, treating `base` as a directory.
fn endpoint_url(base: &Url, path: &str) -> Result<Url, Error> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    Ok(base.join(path.trim_start_matches('/'))?)
}

/// Parse the `{ status, data }` envelope, returning `data` on success
/// or an `Error::Backend` if `status != "ok"`.
async fn parse_envelope(resp: reqwest::Response) -> Result<Vec<RawCount>, Error> {
    let status = resp.status();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(Error::Authentication {
            message: format!("backend rejected credentials (HTTP {})", status.as_u16()),
        });
    }

    let body = resp.text().await.map_err(Error::Transport)?;

    if !status.is_success() {
        return Err(Error::Http {
            status: status.as_u16(),
            body,
        });
    }

    let envelope: CountsEnvelope =
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: body.clone(),
        })?;

    if !envelope.is_ok() {
        warn!(status = %envelope.status, "counting backend reported failure");
        return Err(Error::Backend {
            message: envelope
                .failure_message()
                .unwrap_or_else(|| format!("status={}", envelope.status)),
            status: envelope.status,
            body,
        });
    }

    if envelope.data.is_null() {
        return Ok(Vec::new());
    }

    serde_json::from_value(envelope.data).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}
