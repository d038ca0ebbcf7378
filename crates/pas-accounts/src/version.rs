//! Server version tokens and the gate that checks them.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Oldest server that exposes the modern accounts API.
pub const MINIMUM_MODERN_VERSION: ServerVersion = ServerVersion::from_parts(10, 4);

/// Oldest server that understands the `searchType` option.
pub const SEARCH_TYPE_VERSION: ServerVersion = ServerVersion::from_parts(10, 5);

const MAX_COMPONENTS: usize = 4;

/// Dotted numeric version reported by the vault web service.
///
/// Missing trailing components compare as zero, so `11.1` equals `11.1.0`.
#[derive(Debug, Clone, Copy)]
pub struct ServerVersion {
    parts: [u64; MAX_COMPONENTS],
    len: usize,
}

impl ServerVersion {
    pub const fn from_parts(major: u64, minor: u64) -> Self {
        Self {
            parts: [major, minor, 0, 0],
            len: 2,
        }
    }

    pub fn major(&self) -> u64 {
        self.parts[0]
    }
}

impl FromStr for ServerVersion {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim().trim_start_matches(['v', 'V']);
        if trimmed.is_empty() {
            return Err(Error::invalid("server version", "must not be empty"));
        }
        let mut parts = [0u64; MAX_COMPONENTS];
        let mut len = 0;
        for segment in trimmed.split('.') {
            if len == MAX_COMPONENTS {
                return Err(Error::invalid(
                    "server version",
                    format!("{raw} has more than {MAX_COMPONENTS} components"),
                ));
            }
            parts[len] = segment.parse().map_err(|_| {
                Error::invalid("server version", format!("{raw} is not a dotted number"))
            })?;
            len += 1;
        }
        Ok(Self { parts, len })
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for part in &self.parts[..self.len.max(1)] {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{part}")?;
            first = false;
        }
        Ok(())
    }
}

impl PartialEq for ServerVersion {
    fn eq(&self, other: &Self) -> bool {
        self.parts == other.parts
    }
}

impl Eq for ServerVersion {}

impl PartialOrd for ServerVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ServerVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts.cmp(&other.parts)
    }
}

impl Serialize for ServerVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ServerVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Fails when the known server version is strictly below `required`.
///
/// An unknown version passes; sessions built without a version probe cannot be
/// gated and the server rejects unsupported calls on its own.
pub fn require(actual: Option<&ServerVersion>, required: &ServerVersion) -> Result<()> {
    match actual {
        Some(actual) if actual < required => Err(Error::UnsupportedVersion {
            required: *required,
            actual: *actual,
        }),
        Some(_) => Ok(()),
        None => {
            tracing::debug!(%required, "server version unknown; skipping version check");
            Ok(())
        }
    }
}
