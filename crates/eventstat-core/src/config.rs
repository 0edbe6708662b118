// ── Runtime backend configuration ──
//
// These types describe *how* to reach the counting backend. They carry
// credential data and connection tuning, but never touch disk.
// `eventstat-config` (or the host application) builds a `BackendConfig`
// and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use eventstat_api::{TlsMode, TransportConfig};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs on self-hosted backends).
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => Self::System,
            TlsVerification::CustomCa(path) => Self::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => Self::DangerAcceptInvalid,
        }
    }
}

/// Configuration for talking to one counting backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Backend root URL (e.g., `https://stats.example.com`).
    pub url: Url,
    /// Endpoint path relative to `url`. `None` uses the API default.
    pub endpoint_path: Option<String>,
    /// Bearer token, if the backend requires one.
    pub token: Option<SecretString>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout, enforced by the HTTP client.
    pub timeout: Duration,
}

impl BackendConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            endpoint_path: None,
            token: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Translate into the api-level transport settings.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: TlsMode::from(&self.tls),
            timeout: self.timeout,
            bearer_token: self.token.clone(),
        }
    }
}
