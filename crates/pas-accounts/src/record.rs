//! Tagged account records and their typed accessors.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::normalize::{ACCOUNT_ID_FIELD, INTERNAL_PROPERTIES_FIELD};

/// Which API generation produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordKind {
    #[serde(rename = "Vault.Account.V10")]
    Account,
    #[serde(rename = "Vault.Account")]
    LegacyAccount,
}

impl RecordKind {
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Account => "Vault.Account.V10",
            RecordKind::LegacyAccount => "Vault.Account",
        }
    }

    pub(crate) fn id_field(&self) -> &'static str {
        match self {
            RecordKind::Account => "id",
            RecordKind::LegacyAccount => ACCOUNT_ID_FIELD,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One account as returned by the vault, tagged with its API generation.
///
/// Vendor attributes are open-ended, so they stay in an ordered map rather
/// than fixed fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountRecord {
    #[serde(rename = "recordType")]
    pub kind: RecordKind,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl AccountRecord {
    pub fn new(kind: RecordKind, properties: Map<String, Value>) -> Self {
        Self { kind, properties }
    }

    pub fn id(&self) -> Option<&str> {
        self.str_field(self.kind.id_field())
    }

    pub fn safe_name(&self) -> Option<&str> {
        match self.kind {
            RecordKind::Account => self.str_field("safeName"),
            RecordKind::LegacyAccount => self.str_field("Safe"),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self.kind {
            RecordKind::Account => self.str_field("name"),
            RecordKind::LegacyAccount => self.str_field("Name"),
        }
    }

    /// Legacy records carry system-managed attributes in a nested object.
    pub fn internal_properties(&self) -> Option<&Map<String, Value>> {
        self.properties
            .get(INTERNAL_PROPERTIES_FIELD)
            .and_then(Value::as_object)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}
