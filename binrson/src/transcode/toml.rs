//! TOML output.
//!
//! Mapping from RSON to TOML:
//!   - Value::Null    -> error (TOML has no null)
//!   - Value::Bool    -> TOML boolean
//!   - Value::Integer -> TOML integer (if it fits in i64, otherwise error)
//!   - Value::Float   -> TOML float
//!   - Value::Decimal -> TOML float (nearest f64)
//!   - Value::String  -> TOML string
//!   - Value::Array   -> TOML array (objects inside become inline tables)
//!   - Value::Object  -> TOML table
//!
//! TOML keys are strings, so any other key is written as its canonical
//! RSON text (`1`, `["a", 1]`). Keys that end up with the same text are an
//! error. The top-level value must be an object.

use std::collections::HashSet;

use librson::{sorted_entries, string_key, Object, Value};
use num_traits::ToPrimitive;
use toml_edit::{DocumentMut, Formatted, InlineTable, Item, Table};

/// Encode a value as a TOML document.
pub fn encode(value: &Value) -> Result<String, String> {
    match value {
        Value::Object(_) => match value_to_item(value)? {
            Item::Table(table) => {
                let mut doc = DocumentMut::new();
                for (key, item) in table.iter() {
                    doc[key] = item.clone();
                }
                Ok(doc.to_string())
            }
            _ => Err("Internal error: expected table".to_string()),
        },
        _ => Err("TOML requires the top-level value to be an object".to_string()),
    }
}

/// Entries in key order under their TOML key names.
fn toml_entries(obj: &Object) -> Result<Vec<(String, &Value)>, String> {
    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(obj.len());
    for (k, v) in sorted_entries(obj) {
        let name = string_key(k);
        if !seen.insert(name.clone()) {
            return Err(format!("Keys collide as TOML key {:?}", name));
        }
        entries.push((name, v));
    }
    Ok(entries)
}

/// Objects become standard tables; everything else is a plain value.
fn value_to_item(value: &Value) -> Result<Item, String> {
    match value {
        Value::Object(obj) => {
            let mut table = Table::new();
            for (k, v) in toml_entries(obj)? {
                table.insert(&k, value_to_item(v)?);
            }
            Ok(Item::Table(table))
        }
        other => Ok(Item::Value(value_to_toml(other)?)),
    }
}

fn value_to_toml(value: &Value) -> Result<toml_edit::Value, String> {
    match value {
        Value::Null => Err("TOML has no null type".to_string()),
        Value::Bool(b) => Ok(toml_edit::Value::Boolean(Formatted::new(*b))),
        Value::Integer(n) => {
            let i = n
                .to_i64()
                .ok_or_else(|| format!("Integer {} too large for TOML (i64)", n))?;
            Ok(toml_edit::Value::Integer(Formatted::new(i)))
        }
        Value::Float(f) => Ok(toml_edit::Value::Float(Formatted::new(*f))),
        Value::Decimal(d) => {
            let f = d
                .to_f64()
                .ok_or_else(|| format!("Decimal {} has no float equivalent", d))?;
            Ok(toml_edit::Value::Float(Formatted::new(f)))
        }
        Value::String(s) => Ok(toml_edit::Value::String(Formatted::new(s.clone()))),
        Value::Array(arr) => {
            let mut toml_arr = toml_edit::Array::new();
            for v in arr {
                toml_arr.push(value_to_toml(v)?);
            }
            Ok(toml_edit::Value::Array(toml_arr))
        }
        Value::Object(obj) => {
            let mut inline = InlineTable::new();
            for (k, v) in toml_entries(obj)? {
                inline.insert(k, value_to_toml(v)?);
            }
            Ok(toml_edit::Value::InlineTable(inline))
        }
    }
}
