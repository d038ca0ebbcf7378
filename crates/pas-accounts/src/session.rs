//! Vault session context: base URI, web root, server version and transport.

use std::fmt;

use url::Url;

use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::version::ServerVersion;

const WEB_ROOT: &str = "PasswordVault/";

/// Connection context for one authenticated vault session.
///
/// Built once when the session is established and passed by reference to every
/// call; nothing in it changes while a call runs.
pub struct Session {
    base_uri: Url,
    web_root: Url,
    server_version: Option<ServerVersion>,
    transport: Box<dyn Transport>,
}

impl Session {
    pub fn new(base_uri: &str, transport: impl Transport + 'static) -> Result<Self> {
        let mut base_uri = Url::parse(base_uri.trim())?;
        if base_uri.cannot_be_a_base() {
            return Err(Error::InvalidUrl(format!("{base_uri} cannot be a base url")));
        }
        if !matches!(base_uri.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "{base_uri} must use http or https"
            )));
        }
        base_uri.set_query(None);
        base_uri.set_fragment(None);
        if !base_uri.path().ends_with('/') {
            let path = format!("{}/", base_uri.path());
            base_uri.set_path(&path);
        }
        let web_root = base_uri.join(WEB_ROOT)?;
        Ok(Self {
            base_uri,
            web_root,
            server_version: None,
            transport: Box::new(transport),
        })
    }

    pub fn with_server_version(mut self, version: ServerVersion) -> Self {
        self.server_version = Some(version);
        self
    }

    pub fn base_uri(&self) -> &Url {
        &self.base_uri
    }

    pub fn server_version(&self) -> Option<&ServerVersion> {
        self.server_version.as_ref()
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// URL of a web-service path below the vault web root, e.g. `api/Accounts`.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.web_root.join(path.trim_start_matches('/'))?)
    }

    /// Resolves a server-supplied continuation link.
    ///
    /// Absolute links are used as-is; relative ones are taken relative to the
    /// web root, the way the server emits them.
    pub fn resolve_link(&self, link: &str) -> Result<Url> {
        Ok(self.web_root.join(link.trim())?)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_uri", &self.base_uri.as_str())
            .field("server_version", &self.server_version)
            .finish_non_exhaustive()
    }
}
