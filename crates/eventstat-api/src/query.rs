// Counting backend query builder
//
// Pure formatting: turns a query tuple into the canonical query string.
// Namespace/status compatibility is the caller's concern.

use chrono::{DateTime, SecondsFormat, Utc};
use url::form_urlencoded;

use crate::models::{EventsCountStatus, EventsNamespace, Granularity};

/// Parameters for one counting-backend request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsQuery {
    pub project_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub granularity: Granularity,
    pub namespace: Option<EventsNamespace>,
    pub status: Option<EventsCountStatus>,
    pub destination_id: Option<String>,
}

impl EventsQuery {
    pub fn new(
        project_id: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            start,
            end,
            granularity,
            namespace: None,
            status: None,
            destination_id: None,
        }
    }

    pub fn namespace(mut self, namespace: EventsNamespace) -> Self {
        self.namespace = Some(namespace);
        self
    }

    pub fn status(mut self, status: EventsCountStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn destination_id(mut self, destination_id: impl Into<String>) -> Self {
        self.destination_id = Some(destination_id.into());
        self
    }

    /// Key/value pairs in their fixed wire order, absent optionals omitted.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("project_id", self.project_id.clone()),
            ("start", format_instant(self.start)),
            ("end", format_instant(self.end)),
            ("granularity", self.granularity.to_string()),
        ];
        if let Some(namespace) = self.namespace {
            pairs.push(("namespace", namespace.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(ref destination_id) = self.destination_id {
            pairs.push(("destination_id", destination_id.clone()));
        }
        pairs
    }

    /// Canonical, form-url-encoded query string.
    ///
    /// `project_id, start, end, granularity, namespace, status, destination_id`
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.pairs() {
            serializer.append_pair(key, &value);
        }
        serializer.finish()
    }
}

/// ISO-8601 in UTC with millisecond precision and a `Z` suffix.
fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
