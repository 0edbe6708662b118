// eventstat-api: Async Rust client for an event-counting statistics backend

pub mod client;
pub mod error;
pub mod models;
pub mod query;
pub mod transport;

pub use client::{CountingClient, DEFAULT_ENDPOINT};
pub use error::Error;
pub use models::{EventsCountStatus, EventsNamespace, Granularity, RawCount};
pub use query::EventsQuery;
pub use transport::{TlsMode, TransportConfig};
