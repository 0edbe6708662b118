//! Shared configuration for eventstat consumers.
//!
//! TOML profiles, token resolution (env + keyring + plaintext), and
//! translation to `eventstat_core::BackendConfig`. Core never reads files;
//! host applications go through this crate or build the config themselves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use eventstat_core::{BackendConfig, Granularity, StatisticsRequest, TlsVerification};

/// Environment prefix; nested keys use `__` (e.g. `EVENTSTAT_DEFAULTS__TIMEOUT`).
pub const ENV_PREFIX: &str = "EVENTSTAT_";

const KEYRING_SERVICE: &str = "eventstat";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// A named counting-backend profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Backend base URL (e.g., "https://stats.example.com").
    pub backend_url: String,

    /// Endpoint path override (defaults to the API's statistics path).
    pub endpoint_path: Option<String>,

    /// Project whose events are counted.
    pub project_id: Option<String>,

    /// Bearer token (plaintext; keyring or env var preferred).
    pub token: Option<String>,

    /// Environment variable name containing the bearer token.
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "eventstat", "eventstat").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("eventstat");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// A missing file is not an error: defaults and environment still apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile selection ───────────────────────────────────────────────

/// Pick a profile: the explicit name, else `default_profile`, else "default".
pub fn active_profile<'a>(
    cfg: &'a Config,
    name: Option<&'a str>,
) -> Result<(&'a str, &'a Profile), ConfigError> {
    let name = name
        .or(cfg.default_profile.as_deref())
        .unwrap_or("default");

    cfg.profiles
        .get(name)
        .map(|profile| (name, profile))
        .ok_or_else(|| ConfigError::UnknownProfile {
            profile: name.into(),
        })
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the bearer token from the credential chain.
///
/// Order: `token_env` variable, system keyring, plaintext `token`.
/// `Ok(None)` means the profile is configured for an unauthenticated backend.
pub fn resolve_token(
    profile: &Profile,
    profile_name: &str,
) -> Result<Option<SecretString>, ConfigError> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(Some(SecretString::from(val)));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(Some(SecretString::from(secret)));
        }
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.token {
        return Ok(Some(SecretString::from(token.clone())));
    }

    // token_env named but unset is a misconfiguration, not "no auth".
    if let Some(ref env_name) = profile.token_env {
        return Err(ConfigError::Validation {
            field: "token_env".into(),
            reason: format!("environment variable '{env_name}' is not set"),
        });
    }

    Ok(None)
}

/// Build a `BackendConfig` from a profile and global defaults.
pub fn profile_to_backend_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<BackendConfig, ConfigError> {
    let url: url::Url = profile
        .backend_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "backend_url".into(),
            reason: format!("invalid URL: {}", profile.backend_url),
        })?;

    let token = resolve_token(profile, profile_name)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(BackendConfig {
        url,
        endpoint_path: profile.endpoint_path.clone(),
        token,
        tls,
        timeout,
    })
}

/// Start a `StatisticsRequest` scoped to the profile's project.
pub fn profile_request(
    profile: &Profile,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    granularity: Granularity,
) -> Result<StatisticsRequest, ConfigError> {
    let project_id = profile
        .project_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ConfigError::Validation {
            field: "project_id".into(),
            reason: "profile has no project_id".into(),
        })?;

    Ok(StatisticsRequest::new(project_id, from, to, granularity))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::TimeZone;
    use figment::Jail;
    use secrecy::ExposeSecret;

    use super::*;

    fn profile(url: &str) -> Profile {
        Profile {
            backend_url: url.into(),
            ..Profile::default()
        }
    }

    #[test]
    fn loads_file_and_env_overrides() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                default_profile = "prod"

                [defaults]
                timeout = 10

                [profiles.prod]
                backend_url = "https://stats.example.com"
                project_id = "p1"
                "#,
            )?;
            jail.set_env("EVENTSTAT_DEFAULTS__TIMEOUT", "5");

            let cfg = load_config_from(Path::new("config.toml")).map_err(|e| e.to_string())?;

            assert_eq!(cfg.defaults.timeout, 5);
            assert!(!cfg.defaults.insecure);
            let (name, prod) = active_profile(&cfg, None).map_err(|e| e.to_string())?;
            assert_eq!(name, "prod");
            assert_eq!(prod.project_id.as_deref(), Some("p1"));
            Ok(())
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_jail| {
            let cfg = load_config_from(Path::new("absent.toml")).map_err(|e| e.to_string())?;
            assert_eq!(cfg.default_profile.as_deref(), Some("default"));
            assert_eq!(cfg.defaults.timeout, 30);
            assert!(cfg.profiles.is_empty());
            Ok(())
        });
    }

    #[test]
    fn unknown_profile() {
        let cfg = Config::default();
        let err = active_profile(&cfg, Some("staging")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile { profile: ref name } if name == "staging"));
    }

    #[test]
    fn save_round_trips_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles
            .insert("default".into(), profile("https://stats.example.com"));
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(
            loaded.profiles["default"].backend_url,
            "https://stats.example.com"
        );
    }

    #[test]
    fn token_from_named_env_var() {
        Jail::expect_with(|jail| {
            jail.set_env("STATS_TOKEN_FOR_TEST", "from-env");
            let p = Profile {
                token_env: Some("STATS_TOKEN_FOR_TEST".into()),
                token: Some("plaintext".into()),
                ..profile("https://stats.example.com")
            };

            let token = resolve_token(&p, "jail").map_err(|e| e.to_string())?;
            assert_eq!(token.unwrap().expose_secret(), "from-env");
            Ok(())
        });
    }

    #[test]
    fn unset_token_env_is_rejected() {
        let p = Profile {
            token_env: Some("EVENTSTAT_SURELY_UNSET_TOKEN_VAR".into()),
            ..profile("https://stats.example.com")
        };

        let err = resolve_token(&p, "eventstat-test-unset").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "token_env"));
    }

    #[test]
    fn backend_config_applies_overrides() {
        let defaults = Defaults {
            insecure: true,
            timeout: 12,
        };
        let p = Profile {
            endpoint_path: Some("v2/stats".into()),
            timeout: Some(3),
            insecure: Some(false),
            ca_cert: Some(PathBuf::from("/etc/ssl/stats-ca.pem")),
            ..profile("https://stats.example.com")
        };

        let cfg = profile_to_backend_config(&p, "eventstat-test-overrides", &defaults).unwrap();

        assert_eq!(cfg.url.as_str(), "https://stats.example.com/");
        assert_eq!(cfg.endpoint_path.as_deref(), Some("v2/stats"));
        assert_eq!(cfg.timeout, Duration::from_secs(3));
        assert_eq!(
            cfg.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/stats-ca.pem"))
        );
    }

    #[test]
    fn invalid_backend_url() {
        let err = profile_to_backend_config(&profile("not a url"), "x", &Defaults::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "backend_url"));
    }

    #[test]
    fn request_uses_profile_project() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 1, 7, 0, 0, 0).unwrap();
        let p = Profile {
            project_id: Some("p1".into()),
            ..profile("https://stats.example.com")
        };

        let request = profile_request(&p, from, to, Granularity::Day).unwrap();
        assert_eq!(request.project_id, "p1");
        assert_eq!(request.to_query().project_id, "p1");

        let err = profile_request(
            &profile("https://stats.example.com"),
            from,
            to,
            Granularity::Day,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "project_id"));
    }
}
