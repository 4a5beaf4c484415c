//! YAML output.
//!
//! Mapping from RSON to YAML:
//!   - Value::Null    -> YAML null
//!   - Value::Bool    -> YAML bool
//!   - Value::Integer -> YAML integer (as a string if it overflows i64/u64)
//!   - Value::Float   -> YAML float (including .nan, .inf, -.inf)
//!   - Value::Decimal -> YAML float (nearest f64)
//!   - Value::String  -> YAML string
//!   - Value::Array   -> YAML sequence
//!   - Value::Object  -> YAML mapping, keys in key order
//!
//! YAML mappings accept any node as a key, so composite keys come out as
//! complex keys (`? [a, 1]`).

use librson::{sorted_entries, Key, Value};
use num_traits::ToPrimitive;

/// Encode a value as a YAML document.
pub fn encode(value: &Value) -> Result<String, String> {
    let yaml_value = value_to_yaml(value)?;
    serde_yaml::to_string(&yaml_value).map_err(|e| format!("YAML encode error: {}", e))
}

fn value_to_yaml(value: &Value) -> Result<serde_yaml::Value, String> {
    match value {
        Value::Null => Ok(serde_yaml::Value::Null),
        Value::Bool(b) => Ok(serde_yaml::Value::Bool(*b)),
        Value::Integer(n) => {
            if let Some(i) = n.to_i64() {
                Ok(serde_yaml::Value::Number(serde_yaml::Number::from(i)))
            } else if let Some(u) = n.to_u64() {
                Ok(serde_yaml::Value::Number(serde_yaml::Number::from(u)))
            } else {
                // No arbitrary-precision integers in YAML.
                Ok(serde_yaml::Value::String(n.to_string()))
            }
        }
        Value::Float(f) => Ok(serde_yaml::Value::Number(serde_yaml::Number::from(*f))),
        Value::Decimal(d) => {
            let f = d
                .to_f64()
                .ok_or_else(|| format!("Decimal {} has no float equivalent", d))?;
            Ok(serde_yaml::Value::Number(serde_yaml::Number::from(f)))
        }
        Value::String(s) => Ok(serde_yaml::Value::String(s.clone())),
        Value::Array(arr) => {
            let items: Result<Vec<serde_yaml::Value>, String> =
                arr.iter().map(value_to_yaml).collect();
            Ok(serde_yaml::Value::Sequence(items?))
        }
        Value::Object(obj) => {
            let mut map = serde_yaml::Mapping::new();
            for (k, v) in sorted_entries(obj) {
                map.insert(key_to_yaml(k)?, value_to_yaml(v)?);
            }
            Ok(serde_yaml::Value::Mapping(map))
        }
    }
}

fn key_to_yaml(key: &Key) -> Result<serde_yaml::Value, String> {
    match key {
        Key::String(s) => Ok(serde_yaml::Value::String(s.clone())),
        other => value_to_yaml(&Value::from(other.clone())),
    }
}
