//! Layered session configuration: defaults, TOML file, environment, flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::session::Session;
use crate::transport::{DEFAULT_TIMEOUT, HttpTransport};
use crate::version::ServerVersion;

pub const ENV_BASE_URI: &str = "PAS_BASE_URI";
pub const ENV_SERVER_VERSION: &str = "PAS_SERVER_VERSION";
pub const ENV_SESSION_TOKEN: &str = "PAS_SESSION_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "PAS_HTTP_TIMEOUT_SECS";
pub const ENV_CA_BUNDLE: &str = "PAS_CA_BUNDLE";
pub const ENV_INSECURE_SKIP_TLS: &str = "PAS_INSECURE_SKIP_TLS";

/// One partial source of configuration. Later layers override earlier ones.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfigLayer {
    pub base_uri: Option<String>,
    pub server_version: Option<ServerVersion>,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
    pub ca_bundle: Option<PathBuf>,
    pub insecure_skip_tls: Option<bool>,
}

impl SessionConfigLayer {
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&data).with_context(|| format!("invalid toml config {}", path.display()))
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the `PAS_*` variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let server_version = lookup(ENV_SERVER_VERSION)
            .filter(|value| !value.trim().is_empty())
            .map(|value| value.parse::<ServerVersion>())
            .transpose()
            .with_context(|| format!("invalid {ENV_SERVER_VERSION}"))?;
        let timeout_secs = lookup(ENV_TIMEOUT_SECS)
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|value| *value > 0);
        let insecure_skip_tls = lookup(ENV_INSECURE_SKIP_TLS)
            .map(|value| matches!(value.trim(), "1" | "true" | "TRUE" | "yes"));

        Ok(Self {
            base_uri: lookup(ENV_BASE_URI).filter(|value| !value.trim().is_empty()),
            server_version,
            token: lookup(ENV_SESSION_TOKEN).filter(|value| !value.is_empty()),
            timeout_secs,
            ca_bundle: lookup(ENV_CA_BUNDLE)
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
            insecure_skip_tls,
        })
    }

    /// Overlays `other` on top of `self`; values set in `other` win.
    pub fn merge(self, other: SessionConfigLayer) -> Self {
        Self {
            base_uri: other.base_uri.or(self.base_uri),
            server_version: other.server_version.or(self.server_version),
            token: other.token.or(self.token),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            ca_bundle: other.ca_bundle.or(self.ca_bundle),
            insecure_skip_tls: other.insecure_skip_tls.or(self.insecure_skip_tls),
        }
    }
}

/// Fully resolved settings for establishing a [`Session`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionConfig {
    pub base_uri: String,
    pub server_version: Option<ServerVersion>,
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub ca_bundle: Option<PathBuf>,
    pub insecure_skip_tls: bool,
}

impl SessionConfig {
    /// Merges `layers` in order over the defaults.
    pub fn resolve(layers: impl IntoIterator<Item = SessionConfigLayer>) -> Result<Self> {
        let merged = layers
            .into_iter()
            .fold(SessionConfigLayer::default(), SessionConfigLayer::merge);
        let base_uri = merged.base_uri.ok_or_else(|| {
            anyhow!("vault base uri not configured; set {ENV_BASE_URI} or pass --base-uri")
        })?;
        Ok(Self {
            base_uri,
            server_version: merged.server_version,
            token: merged.token,
            timeout_secs: merged
                .timeout_secs
                .filter(|value| *value > 0)
                .unwrap_or(DEFAULT_TIMEOUT.as_secs()),
            ca_bundle: merged.ca_bundle,
            insecure_skip_tls: merged.insecure_skip_tls.unwrap_or(false),
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Copy that is safe to print.
    pub fn redacted(&self) -> Self {
        Self {
            token: self.token.as_ref().map(|_| "<redacted>".to_string()),
            ..self.clone()
        }
    }

    pub fn build_session(&self) -> Result<Session> {
        let mut transport = HttpTransport::builder()
            .timeout(self.timeout())
            .insecure_skip_tls(self.insecure_skip_tls);
        if let Some(token) = &self.token {
            transport = transport.token(token.clone());
        }
        if let Some(path) = &self.ca_bundle {
            let bundle = fs::read(path)
                .with_context(|| format!("failed to read ca bundle {}", path.display()))?;
            transport = transport.ca_bundle(bundle);
        }
        let transport = transport.build().context("failed to build vault HTTP client")?;

        let session = Session::new(&self.base_uri, transport)
            .with_context(|| format!("invalid vault base uri {}", self.base_uri))?;
        Ok(match self.server_version {
            Some(version) => session.with_server_version(version),
            None => session,
        })
    }
}
