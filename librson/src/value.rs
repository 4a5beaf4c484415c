//! RSON value representation.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

/// An RSON object: canonical keys mapped to values.
pub type Object = HashMap<Key, Value>;

/// An RSON value.
#[derive(Clone, PartialEq)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Arbitrary-precision integer.
    Integer(BigInt),
    /// 64-bit floating-point number.
    Float(f64),
    /// Arbitrary-precision decimal (when parsing with `use_decimal`).
    Decimal(BigDecimal),
    /// UTF-8 string.
    String(String),
    /// Array of values.
    Array(Vec<Value>),
    /// Object (key-value map).
    Object(Object),
}

impl Value {
    /// Returns `true` if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the boolean value if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns a reference to the integer if this is an `Integer`.
    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Value::Integer(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the float value if this is a `Float`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the decimal value if this is a `Decimal`.
    pub fn as_decimal(&self) -> Option<&BigDecimal> {
        match self {
            Value::Decimal(d) => Some(d),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a reference to the array if this is an `Array`.
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Returns a reference to the object if this is an `Object`.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Look up a string key in an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object()?.get(&Key::String(key.to_string()))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{:?}", n),
            Value::Decimal(d) => write!(f, "{}d", d),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Array(arr) => f.debug_list().entries(arr).finish(),
            Value::Object(obj) => {
                let mut entries: Vec<_> = obj.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                f.debug_map().entries(entries).finish()
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::Integer(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(BigInt::from(n))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<BigDecimal> for Value {
    fn from(d: BigDecimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(arr: Vec<Value>) -> Self {
        Value::Array(arr)
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(obj)
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        match key {
            Key::Null => Value::Null,
            Key::Bool(b) => Value::Bool(b),
            Key::Integer(n) => Value::Integer(n),
            Key::Float(f) => Value::Float(f),
            Key::Decimal(d) => Value::Decimal(d),
            Key::String(s) => Value::String(s),
            Key::Tuple(items) => Value::Array(items.into_iter().map(Value::from).collect()),
        }
    }
}

/// The canonical, hashable and totally ordered form of a value used as an
/// object key.
///
/// Arrays become tuples of their elements. Objects become tuples of
/// `(key, value)` pair tuples sorted by key, so two objects with the same
/// entries produce the same key whatever order they were written in.
#[derive(Clone)]
pub enum Key {
    Null,
    Bool(bool),
    Integer(BigInt),
    Float(f64),
    Decimal(BigDecimal),
    String(String),
    Tuple(Vec<Key>),
}

impl Key {
    /// Canonicalize a value into a key.
    pub fn from_value(value: &Value) -> Key {
        match value {
            Value::Null => Key::Null,
            Value::Bool(b) => Key::Bool(*b),
            Value::Integer(n) => Key::Integer(n.clone()),
            Value::Float(f) => Key::Float(*f),
            Value::Decimal(d) => Key::Decimal(d.clone()),
            Value::String(s) => Key::String(s.clone()),
            Value::Array(items) => Key::Tuple(items.iter().map(Key::from_value).collect()),
            Value::Object(obj) => {
                let mut pairs: Vec<Key> = obj
                    .iter()
                    .map(|(k, v)| Key::Tuple(vec![k.clone(), Key::from_value(v)]))
                    .collect();
                pairs.sort();
                Key::Tuple(pairs)
            }
        }
    }

    /// Returns a reference to the string if this is a `String` key.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::String(s) => Some(s),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Key::Null => 0,
            Key::Bool(_) => 1,
            Key::Integer(_) => 2,
            Key::Float(_) => 3,
            Key::Decimal(_) => 4,
            Key::String(_) => 5,
            Key::Tuple(_) => 6,
        }
    }
}

impl From<Value> for Key {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Key::String(s),
            other => Key::from_value(&other),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::String(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::String(s)
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Integer(BigInt::from(n))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Key::Null, Key::Null) => Ordering::Equal,
            (Key::Bool(a), Key::Bool(b)) => a.cmp(b),
            (Key::Integer(a), Key::Integer(b)) => a.cmp(b),
            (Key::Float(a), Key::Float(b)) => a.total_cmp(b),
            (Key::Decimal(a), Key::Decimal(b)) => a.cmp(b),
            (Key::String(a), Key::String(b)) => a.cmp(b),
            (Key::Tuple(a), Key::Tuple(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Key::Null => {}
            Key::Bool(b) => b.hash(state),
            Key::Integer(n) => n.hash(state),
            Key::Float(f) => f.to_bits().hash(state),
            Key::Decimal(d) => d.hash(state),
            Key::String(s) => s.hash(state),
            Key::Tuple(items) => items.hash(state),
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Null => write!(f, "null"),
            Key::Bool(b) => write!(f, "{}", b),
            Key::Integer(n) => write!(f, "{}", n),
            Key::Float(n) => write!(f, "{:?}", n),
            Key::Decimal(d) => write!(f, "{}d", d),
            Key::String(s) => write!(f, "{:?}", s),
            Key::Tuple(items) => {
                let mut t = f.debug_tuple("");
                for item in items {
                    t.field(item);
                }
                t.finish()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_order_by_kind() {
        let mut keys = vec![
            Key::Tuple(vec![]),
            Key::from("a"),
            Key::from(3),
            Key::Null,
            Key::Bool(false),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                Key::Null,
                Key::Bool(false),
                Key::from(3),
                Key::from("a"),
                Key::Tuple(vec![]),
            ]
        );
    }

    #[test]
    fn test_array_key_is_tuple() {
        let value = Value::Array(vec!["a".into(), "b".into()]);
        assert_eq!(
            Key::from_value(&value),
            Key::Tuple(vec![Key::from("a"), Key::from("b")])
        );
    }

    #[test]
    fn test_object_key_ignores_insertion_order() {
        let first = Object::from([(Key::from("x"), Value::from(1)), (Key::from(0), Value::from(2))]);
        let second =
            Object::from([(Key::from(0), Value::from(2)), (Key::from("x"), Value::from(1))]);
        let key = Key::from_value(&Value::Object(first));
        assert_eq!(key, Key::from_value(&Value::Object(second)));
        assert_eq!(
            key,
            Key::Tuple(vec![
                Key::Tuple(vec![Key::from(0), Key::from(2)]),
                Key::Tuple(vec![Key::from("x"), Key::from(1)]),
            ])
        );
    }

    #[test]
    fn test_keys_hash_consistently() {
        let mut obj = Object::new();
        obj.insert(Key::Tuple(vec![Key::Float(1.5)]), Value::Null);
        assert!(obj.contains_key(&Key::Tuple(vec![Key::Float(1.5)])));
        assert!(!obj.contains_key(&Key::Tuple(vec![Key::Float(2.5)])));
    }

    #[test]
    fn test_key_back_to_value() {
        let key = Key::Tuple(vec![Key::from("a"), Key::Tuple(vec![Key::from(1)])]);
        assert_eq!(
            Value::from(key),
            Value::Array(vec!["a".into(), Value::Array(vec![1.into()])])
        );
    }

    #[test]
    fn test_get() {
        let obj = Value::Object(Object::from([(Key::from("a"), Value::Bool(true))]));
        assert_eq!(obj.get("a"), Some(&Value::Bool(true)));
        assert_eq!(obj.get("b"), None);
        assert_eq!(Value::Null.get("a"), None);
    }

    #[test]
    fn test_debug_format() {
        let v = Value::Array(vec![Value::Null, 1.into(), 1.5.into(), "x".into()]);
        assert_eq!(format!("{:?}", v), r#"[null, 1, 1.5, "x"]"#);
        let k = Key::Tuple(vec![Key::from("a"), Key::from(1)]);
        assert_eq!(format!("{:?}", k), r#"("a", 1)"#);
    }
}
