//! HTTP dispatch for account requests.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Performs a GET and parses the JSON body.
///
/// `None` means the server answered successfully with an empty body. Errors are
/// returned as produced; implementations never retry.
pub trait Transport {
    fn get_json(&self, url: &Url, timeout: Option<Duration>) -> Result<Option<Value>>;
}

/// Builder for [`HttpTransport`] exposing the client options a vault session needs.
#[derive(Clone, Debug, Default)]
pub struct HttpTransportBuilder {
    timeout: Option<Duration>,
    token: Option<String>,
    ca_bundle: Option<Vec<u8>>,
    insecure_skip_tls: bool,
}

impl HttpTransportBuilder {
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Session token sent verbatim in the `Authorization` header.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// PEM or DER encoded certificate to trust in addition to the system roots.
    pub fn ca_bundle(mut self, bundle: Vec<u8>) -> Self {
        self.ca_bundle = Some(bundle);
        self
    }

    pub fn insecure_skip_tls(mut self, on: bool) -> Self {
        self.insecure_skip_tls = on;
        self
    }

    pub fn build(self) -> Result<HttpTransport> {
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let mut builder = Client::builder()
            .use_rustls_tls()
            .cookie_store(true)
            .timeout(timeout)
            .user_agent(concat!("pas-accounts/", env!("CARGO_PKG_VERSION")));
        if let Some(token) = self.token.as_deref() {
            let mut value = HeaderValue::from_str(token)
                .map_err(|_| Error::invalid("token", "contains characters not allowed in a header"))?;
            value.set_sensitive(true);
            let mut headers = HeaderMap::new();
            headers.insert(AUTHORIZATION, value);
            builder = builder.default_headers(headers);
        }
        if let Some(ca) = self.ca_bundle.as_ref() {
            let cert = reqwest::Certificate::from_pem(ca)
                .or_else(|_| reqwest::Certificate::from_der(ca))?;
            builder = builder.add_root_certificate(cert);
        }
        if self.insecure_skip_tls {
            tracing::warn!("TLS certificate validation disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }
        Ok(HttpTransport {
            client: builder.build()?,
        })
    }
}

/// Blocking reqwest transport sharing one cookie store across requests.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }
}

impl Transport for HttpTransport {
    fn get_json(&self, url: &Url, timeout: Option<Duration>) -> Result<Option<Value>> {
        tracing::debug!(%url, ?timeout, "GET");
        let mut request = self.client.get(url.clone());
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Status { status, body });
        }
        let bytes = response.bytes()?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| Error::Decode(format!("response body is not json: {err}")))
    }
}
