//! Text renderings of account records, keyed by record kind.

use serde_json::Value;

use crate::record::{AccountRecord, RecordKind};

const MODERN_COLUMNS: &[&str] = &["id", "name", "userName", "address", "safeName", "platformId"];
const LEGACY_COLUMNS: &[&str] = &[
    "AccountID", "Safe", "Folder", "Name", "UserName", "Address", "PolicyID",
];

/// Default table columns for records of `kind`.
pub fn default_columns(kind: RecordKind) -> &'static [&'static str] {
    match kind {
        RecordKind::Account => MODERN_COLUMNS,
        RecordKind::LegacyAccount => LEGACY_COLUMNS,
    }
}

/// Pretty JSON array of records, each carrying its `recordType` label.
pub fn to_json(records: &[AccountRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}

/// Renders records as an aligned text table.
///
/// Columns come from the kind of the first record; an empty slice renders as
/// an empty string.
pub fn to_table(records: &[AccountRecord]) -> String {
    let Some(first) = records.first() else {
        return String::new();
    };
    let columns = default_columns(first.kind);
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| columns.iter().map(|column| cell(record.get(column))).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            rows.iter()
                .map(|row| row[idx].chars().count())
                .chain(std::iter::once(column.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_row(&mut out, columns.iter().map(|c| c.to_string()), &widths);
    push_row(&mut out, widths.iter().map(|w| "-".repeat(*w)), &widths);
    for row in rows {
        push_row(&mut out, row.into_iter(), &widths);
    }
    out
}

fn push_row(out: &mut String, cells: impl Iterator<Item = String>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}
