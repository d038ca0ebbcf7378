//! Reshapes raw vault responses into [`AccountRecord`] values.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result, Warning};
use crate::paging::null_as_empty;
use crate::record::{AccountRecord, RecordKind};

pub const ACCOUNT_ID_FIELD: &str = "AccountID";
pub const INTERNAL_PROPERTIES_FIELD: &str = "InternalProperties";

/// Tags one modern account object.
pub fn modern_record(value: Value) -> Result<AccountRecord> {
    match value {
        Value::Object(properties) => Ok(AccountRecord::new(RecordKind::Account, properties)),
        other => Err(Error::Decode(format!(
            "expected an account object, got {}",
            kind_of(&other)
        ))),
    }
}

pub fn modern_records(values: Vec<Value>) -> Result<Vec<AccountRecord>> {
    values.into_iter().map(modern_record).collect()
}

/// Result of normalising a legacy search response.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyOutcome {
    pub record: Option<AccountRecord>,
    pub warning: Option<Warning>,
}

#[derive(Debug, Deserialize)]
struct LegacyResponse {
    #[serde(default, alias = "Accounts", deserialize_with = "null_as_empty")]
    accounts: Vec<LegacyAccount>,
    #[serde(default, alias = "Count")]
    count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct LegacyAccount {
    #[serde(rename = "AccountID", alias = "accountID", alias = "AccountId")]
    account_id: String,
    #[serde(
        default,
        rename = "Properties",
        alias = "properties",
        deserialize_with = "null_as_empty"
    )]
    properties: Vec<KeyValue>,
    #[serde(
        default,
        rename = "InternalProperties",
        alias = "internalProperties",
        deserialize_with = "null_as_empty"
    )]
    internal_properties: Vec<KeyValue>,
}

#[derive(Debug, Deserialize)]
struct KeyValue {
    #[serde(rename = "Key", alias = "key")]
    key: String,
    #[serde(default, rename = "Value", alias = "value")]
    value: Value,
}

/// Flattens the first account of a legacy search response.
///
/// External properties become top-level fields and internal ones are nested
/// under `InternalProperties`; a repeated key keeps its last value. The
/// account ID is always the first field and no property can overwrite it.
/// More than one match yields a warning; no match yields no record.
pub fn legacy_record(body: Option<Value>) -> Result<LegacyOutcome> {
    let Some(body) = body else {
        return Ok(LegacyOutcome {
            record: None,
            warning: None,
        });
    };
    let response: LegacyResponse = serde_json::from_value(body)
        .map_err(|err| Error::Decode(format!("malformed legacy accounts response: {err}")))?;

    let count = response.count.unwrap_or(response.accounts.len() as u64);
    let warning = (count > 1).then(|| {
        tracing::debug!(count, "legacy search matched several accounts; using the first");
        Warning::MultipleMatches { count }
    });

    let record = response.accounts.into_iter().next().map(flatten_legacy);
    Ok(LegacyOutcome { record, warning })
}

fn flatten_legacy(account: LegacyAccount) -> AccountRecord {
    let id = Value::String(account.account_id);
    let mut properties = Map::new();
    properties.insert(ACCOUNT_ID_FIELD.to_string(), id.clone());
    for pair in account.properties {
        properties.insert(pair.key, pair.value);
    }
    properties.insert(ACCOUNT_ID_FIELD.to_string(), id);

    let internal: Map<String, Value> = account
        .internal_properties
        .into_iter()
        .map(|pair| (pair.key, pair.value))
        .collect();
    properties.insert(INTERNAL_PROPERTIES_FIELD.to_string(), Value::Object(internal));

    AccountRecord::new(RecordKind::LegacyAccount, properties)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn legacy_body(count: u64) -> Value {
        json!({
            "accounts": [{
                "AccountID": "19_6",
                "properties": [
                    {"key": "UserName", "value": "root"},
                    {"key": "Address", "value": "10.0.0.1"}
                ],
                "InternalProperties": [
                    {"key": "CreationMethod", "value": "PVWA"}
                ]
            }],
            "count": count
        })
    }

    #[test]
    fn flattens_legacy_properties() {
        let outcome = legacy_record(Some(legacy_body(1))).unwrap();
        assert!(outcome.warning.is_none());
        let record = outcome.record.expect("record");
        assert_eq!(record.kind, RecordKind::LegacyAccount);
        assert_eq!(record.get("AccountID"), Some(&json!("19_6")));
        assert_eq!(record.get("UserName"), Some(&json!("root")));
        assert_eq!(record.get("Address"), Some(&json!("10.0.0.1")));
        assert_eq!(
            record.get("InternalProperties"),
            Some(&json!({"CreationMethod": "PVWA"}))
        );
        let keys: Vec<_> = record.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, ["AccountID", "UserName", "Address", "InternalProperties"]);
    }

    #[test]
    fn warns_when_several_accounts_match() {
        let outcome = legacy_record(Some(legacy_body(3))).unwrap();
        assert!(outcome.record.is_some());
        let warning = outcome.warning.expect("warning");
        assert_eq!(warning, Warning::MultipleMatches { count: 3 });
        assert!(warning.to_string().contains('3'));
    }

    #[test]
    fn repeated_keys_keep_last_value_and_id_is_protected() {
        let body = json!({
            "Accounts": [{
                "AccountID": "7_1",
                "Properties": [
                    {"Key": "Safe", "Value": "old"},
                    {"Key": "AccountID", "Value": "spoofed"},
                    {"Key": "Safe", "Value": "new"}
                ],
                "InternalProperties": null
            }],
            "Count": 1
        });
        let record = legacy_record(Some(body)).unwrap().record.unwrap();
        assert_eq!(record.id(), Some("7_1"));
        assert_eq!(record.safe_name(), Some("new"));
        assert_eq!(record.internal_properties(), Some(&Map::new()));
    }

    #[test]
    fn no_matches_yield_no_record() {
        let outcome = legacy_record(Some(json!({"accounts": [], "count": 0}))).unwrap();
        assert!(outcome.record.is_none());
        assert!(outcome.warning.is_none());
        assert!(legacy_record(None).unwrap().record.is_none());
    }

    #[test]
    fn modern_values_pass_through_tagged() {
        let records = modern_records(vec![json!({"id": "1", "safeName": "A"})]).unwrap();
        assert_eq!(records[0].kind, RecordKind::Account);
        let expected = json!({"id": "1", "safeName": "A"});
        assert_eq!(Some(&records[0].properties), expected.as_object());
        assert!(modern_record(json!("nope")).is_err());
    }
}
