use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fmt::Formatter;
use std::sync::Arc;

use serde::ser::Serialize;

mod ser;
mod utils;

pub use utils::SerializationFailed;

/// Mappings keep the insertion order of their keys, which is also the order
/// in which they are printed.
pub type Map = indexmap::IndexMap<String, Value>;

#[inline]
pub(crate) fn format_map(map: &Map, f: &mut impl fmt::Write) -> fmt::Result {
    f.write_str("{")?;
    for (idx, (key, value)) in map.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{key:?}: ")?;
        match value {
            Value::String(v) => write!(f, "{v:?}")?,
            _ => value.format(f)?,
        }
    }
    f.write_str("}")
}

/// Everything a template can look up.
///
/// `Undefined` is what a lookup returns when nothing is there: it prints as nothing
/// and is falsy, same as `Null`.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    U64(u64),
    I64(i64),
    F64(f64),
    String(Arc<str>),
    Array(Arc<Vec<Value>>),
    Map(Arc<Map>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.format(f)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(v), Value::Bool(v2)) => v == v2,
            (Value::Array(v), Value::Array(v2)) => v == v2,
            (Value::String(v), Value::String(v2)) => v == v2,
            (Value::Map(v), Value::Map(v2)) => v == v2,
            // If there's a float on either side we compare as floats
            (Value::F64(v), _) => Some(*v) == other.as_f64(),
            (_, Value::F64(v)) => Some(*v) == self.as_f64(),
            (Value::U64(_), _) | (Value::I64(_), _) | (_, Value::U64(_)) | (_, Value::I64(_)) => {
                self.as_i128().is_some() && self.as_i128() == other.as_i128()
            }
            (_, _) => false,
        }
    }
}

impl Value {
    /// Writes the text a variable tag outputs for this value.
    /// `Undefined` and `Null` write nothing.
    pub(crate) fn format(&self, f: &mut impl fmt::Write) -> fmt::Result {
        match self {
            Value::Null | Value::Undefined => Ok(()),
            Value::Bool(v) => f.write_str(if *v { "true" } else { "false" }),
            Value::String(v) => f.write_str(v),
            Value::Array(v) => {
                f.write_str("[")?;

                for (idx, elem) in v.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }

                    match elem {
                        Value::String(v) => write!(f, "{v:?}")?,
                        _ => elem.format(f)?,
                    }
                }
                f.write_str("]")
            }
            Value::Map(v) => format_map(v, f),
            Value::F64(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
        }
    }

    pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> Value {
        Serialize::serialize(value, ser::ValueSerializer).unwrap_or(Value::Undefined)
    }

    /// Same as [`Value::from_serializable`] but reports values serde cannot represent
    /// (eg maps with float keys) instead of turning them into `Undefined`.
    pub fn try_from_serializable<T: Serialize + ?Sized>(
        value: &T,
    ) -> Result<Value, SerializationFailed> {
        Serialize::serialize(value, ser::ValueSerializer)
    }

    pub(crate) fn as_i128(&self) -> Option<i128> {
        match self {
            Value::U64(v) => Some(*v as i128),
            Value::I64(v) => Some(*v as i128),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::U64(v) => Some(*v as f64),
            Value::I64(v) => Some(*v as f64),
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_vec(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_map(self) -> Option<Arc<Map>> {
        match self {
            Value::Map(s) => Some(s),
            _ => None,
        }
    }

    /// When doing `hello.name`, `name` is the attr.
    /// Arrays are indexed by attrs that parse as an unsigned integer.
    pub(crate) fn get_attr(&self, attr: &str) -> Value {
        match self {
            Value::Map(m) => m.get(attr).cloned().unwrap_or(Value::Undefined),
            Value::Array(arr) => attr
                .parse::<usize>()
                .ok()
                .and_then(|idx| arr.get(idx).cloned())
                .unwrap_or(Value::Undefined),
            _ => Value::Undefined,
        }
    }

    /// Returns the Value at the given path, or Undefined if there's nothing there.
    /// Any missing, undefined or null step along the way ends the lookup.
    pub fn get_from_path(&self, path: &str) -> Value {
        let mut res = self.clone();

        for elem in path.split('.') {
            if matches!(res, Value::Undefined | Value::Null) {
                return Value::Undefined;
            }
            res = res.get_attr(elem);
        }

        res
    }

    /// Falsy values are `undefined`, `null`, `false`, zero, NaN, the empty string
    /// and the empty array. Everything else, including every map, is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined => false,
            Value::Null => false,
            Value::Bool(v) => *v,
            Value::U64(v) => *v != 0,
            Value::I64(v) => *v != 0,
            Value::F64(v) => *v != 0.0 && !v.is_nan(),
            Value::Array(v) => !v.is_empty(),
            Value::String(v) => !v.is_empty(),
            Value::Map(_) => true,
        }
    }

    /// Returns a string name for the current enum member.
    pub fn name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::U64(_) => "u64",
            Value::I64(_) => "i64",
            Value::F64(_) => "f64",
            Value::Array(_) => "array",
            Value::String(_) => "string",
            Value::Map(_) => "map/struct",
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(Arc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(Arc::from(value))
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::U64(value as u64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::U64(value as u64)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::U64(value)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::U64(value as u64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::I64(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<&[Value]> for Value {
    fn from(value: &[Value]) -> Self {
        Value::Array(Arc::new(value.to_vec()))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(Arc::new(value.into_iter().map(|v| v.into()).collect()))
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Map(Arc::new(value))
    }
}

impl<K: Into<String>, T: Into<Value>> From<HashMap<K, T>> for Value {
    fn from(input: HashMap<K, T>) -> Self {
        // Sorted so that the printed order doesn't depend on the hasher
        let mut entries: Vec<(String, Value)> = input
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Value::Map(Arc::new(entries.into_iter().collect()))
    }
}

impl<K: Into<String>, T: Into<Value>> From<BTreeMap<K, T>> for Value {
    fn from(input: BTreeMap<K, T>) -> Self {
        let mut map = Map::with_capacity(input.len());
        for (key, value) in input {
            map.insert(key.into(), value.into());
        }
        Value::Map(Arc::new(map))
    }
}
