// Counting backend wire types
//
// Query enums with their fixed wire spelling, the `{ status, data }`
// response envelope, and the sparse per-bucket count records it carries.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ── Query enums ──────────────────────────────────────────────────────

/// Aggregation window requested from the backend.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Granularity {
    Hour,
    Day,
    /// Whole range collapsed into a single bucket.
    Total,
}

/// Pipeline stage whose events are being counted.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventsNamespace {
    Source,
    PushSource,
    Destination,
}

/// Outcome counter being requested.
///
/// `Errors` only exists for the destination namespace; callers are
/// responsible for not asking a source namespace for it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventsCountStatus {
    Success,
    Skip,
    Errors,
}

// ── Response envelope ────────────────────────────────────────────────

/// Counting backend response envelope.
///
/// ```json
/// { "status": "ok", "data": [{ "key": "2024-01-01T00:00:00Z", "events": 10 }] }
/// ```
///
/// `data` is kept raw until `status` has been checked, because failure
/// payloads do not promise a well-formed `data` array.
#[derive(Debug, Deserialize)]
pub struct CountsEnvelope {
    pub status: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub message: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl CountsEnvelope {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    /// Human-readable failure reason: `message` first, then `error`.
    ///
    /// Either field may be a plain string or a structured object; objects
    /// are rendered as compact JSON.
    pub fn failure_message(&self) -> Option<String> {
        [&self.message, &self.error]
            .into_iter()
            .flatten()
            .find_map(|value| match value {
                serde_json::Value::Null => None,
                serde_json::Value::String(text) => Some(text.clone()),
                other => Some(other.to_string()),
            })
    }
}

/// One sparse point reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCount {
    #[serde(deserialize_with = "deserialize_bucket_key")]
    pub key: DateTime<Utc>,
    pub events: u64,
}

// ── Bucket key parsing ───────────────────────────────────────────────

/// Parse a backend bucket key into a UTC instant.
///
/// Accepts RFC 3339, ISO-8601 with a compact `+0000` offset, offset-less
/// date-times (read as UTC), and bare dates (midnight UTC).
pub fn parse_bucket_key(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

fn deserialize_bucket_key<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_bucket_key(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognized bucket key {raw:?}")))
}
