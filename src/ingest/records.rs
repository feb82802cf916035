//! JSON record flattening

use indexmap::IndexMap;
use serde_json::Value;

use super::delimited::decode_text;
use super::error::{IngestError, IngestResult};
use super::frame::RawTable;

/// Separator joining nested object keys
const KEY_SEPARATOR: &str = "_";

fn flatten_into(prefix: &str, value: &Value, out: &mut IndexMap<String, Option<String>>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                let name = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}{KEY_SEPARATOR}{key}")
                };
                flatten_into(&name, nested, out);
            }
        }
        Value::Null => {
            out.insert(prefix.to_string(), None);
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), Some(s.clone()));
        }
        Value::Bool(b) => {
            out.insert(prefix.to_string(), Some(b.to_string()));
        }
        Value::Number(n) => {
            out.insert(prefix.to_string(), Some(n.to_string()));
        }
        Value::Array(_) => {
            out.insert(prefix.to_string(), Some(value.to_string()));
        }
    }
}

/// Parse a JSON array of objects (or a single object) into a raw table,
/// flattening nested objects into `parent_child` columns. Arrays are kept
/// as their JSON text.
pub fn parse_records(bytes: &[u8], name: &str) -> IngestResult<RawTable> {
    let text = decode_text(bytes);
    let value: Value = serde_json::from_str(&text)?;

    let records: Vec<&Value> = match &value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![&value],
        other => {
            return Err(IngestError::Read(format!(
                "expected an array of objects, found {}",
                json_kind(other)
            )));
        }
    };

    let mut headers: IndexMap<String, ()> = IndexMap::new();
    let mut flattened = Vec::with_capacity(records.len());
    for record in records {
        if !record.is_object() {
            return Err(IngestError::Read(format!(
                "expected an array of objects, found an array element of type {}",
                json_kind(record)
            )));
        }
        let mut row = IndexMap::new();
        flatten_into("", record, &mut row);
        for key in row.keys() {
            headers.entry(key.clone()).or_insert(());
        }
        flattened.push(row);
    }

    if flattened.is_empty() {
        return Err(IngestError::Read("no records found".to_string()));
    }

    let headers: Vec<String> = headers.into_keys().collect();
    let rows = flattened
        .into_iter()
        .map(|mut row| {
            headers
                .iter()
                .map(|h| row.swap_remove(h).flatten())
                .collect()
        })
        .collect();

    Ok(RawTable::from_rows(name, headers, rows))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
