//! Continuation-link walking for the modern collection endpoint.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::session::Session;

/// One page of the modern accounts collection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModernPage {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub value: Vec<Value>,
    #[serde(default, rename = "nextLink")]
    pub next_link: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
}

impl ModernPage {
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|err| Error::Decode(format!("malformed accounts page: {err}")))
    }

    /// The continuation link, if the server supplied a non-empty one.
    pub fn next(&self) -> Option<&str> {
        self.next_link
            .as_deref()
            .map(str::trim)
            .filter(|link| !link.is_empty())
    }
}

/// Treats an explicit `null` array the same as a missing one.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> core::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accumulates `first` and every page reachable through its continuation links.
///
/// Pages are fetched one at a time and appended in server order. Walking stops
/// only when a page carries no link; a page with no results but a link is
/// followed. There is no page limit, so a server that keeps returning links
/// keeps the walk going. Any failed fetch aborts the walk and the partial
/// accumulation is dropped.
pub fn walk_pages(
    session: &Session,
    first: ModernPage,
    timeout: Option<Duration>,
) -> Result<Vec<Value>> {
    let mut next = first.next().map(str::to_owned);
    let mut accounts = first.value;
    let mut page = 1usize;
    tracing::debug!(page, size = accounts.len(), "accounts page");

    while let Some(link) = next.take() {
        let url = session.resolve_link(&link)?;
        let body = session
            .transport()
            .get_json(&url, timeout)?
            .ok_or_else(|| Error::Decode(format!("empty response for page {url}")))?;
        let current = ModernPage::from_value(body)?;
        page += 1;
        next = current.next().map(str::to_owned);
        accounts.extend(current.value);
        tracing::debug!(page, total = accounts.len(), "accounts page");
    }

    Ok(accounts)
}
