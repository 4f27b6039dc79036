use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::value::Value;

/// The struct that holds the context of a template rendering.
///
/// Light wrapper around a `BTreeMap` for easier insertions of Serializable
/// values
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Context {
    pub(crate) data: BTreeMap<Cow<'static, str>, Value>,
}

impl Context {
    /// Initializes an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes something that implements Serialize and creates a context with it.
    /// Meant to be used if you have a hashmap or a struct and don't want to insert values
    /// one by one in the context.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> crate::BraceResult<Self> {
        let val = Value::try_from_serializable(value)
            .map_err(|e| crate::Error::chain("Failed to serialize the context", e))?;
        let type_name = val.name();

        match val.into_map() {
            Some(map) => {
                let map = Arc::try_unwrap(map).unwrap_or_else(|shared| (*shared).clone());
                let data = map
                    .into_iter()
                    .map(|(key, value)| (Cow::Owned(key), value))
                    .collect();
                Ok(Context { data })
            }
            None => Err(crate::Error::message(format!(
                "from_serialize requires a struct or map, got {type_name}"
            ))),
        }
    }

    /// Converts the `val` parameter to `Value` and insert it into the context.
    ///
    /// ```rust
    /// # use brace::Context;
    /// let mut context = brace::Context::new();
    /// context.insert("number_users", &42);
    /// ```
    pub fn insert<S: Into<Cow<'static, str>>, T: Serialize + ?Sized>(&mut self, key: S, val: &T) {
        self.data.insert(key.into(), Value::from_serializable(val));
    }

    /// In case you already have a `Value` you want to insert
    pub fn insert_value<S: Into<Cow<'static, str>>>(&mut self, key: S, val: Value) {
        self.data.insert(key.into(), val);
    }

    /// Remove a key from the context, returning the value at the key if the key was previously inserted into the context.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Appends the data of the `source` parameter to `self`, overwriting existing keys.
    /// The source context will be dropped.
    pub fn extend(&mut self, mut source: Context) {
        self.data.append(&mut source.data);
    }

    /// Checks if a value exists for given key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns the value at the given key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Resolves a dot path such as `site.nav.0.title` against the top level keys.
    /// Returns `Value::Undefined` when anything along the path is missing.
    pub fn get_from_path(&self, path: &str) -> Value {
        let (start, rest) = match path.split_once('.') {
            Some((start, rest)) => (start, Some(rest)),
            None => (path, None),
        };

        match (self.data.get(start), rest) {
            (Some(value), Some(rest)) => value.get_from_path(rest),
            (Some(value), None) => value.clone(),
            (None, _) => Value::Undefined,
        }
    }

    /// Iterates over the top level keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(|k| k.as_ref())
    }
}

/// Creates a context from key value pairs
///
/// Example:
/// ```rust
/// let ctx = context! {
///     name => "Brian",
///     age => &24
/// };
/// ```
#[macro_export]
macro_rules! context {
    (
        $(
            $key:ident $(=> $value:expr)? $(,)*
        )*
    ) => {
        {
            let mut context = $crate::Context::new();
            $(
                context.insert(stringify!($key), $($value)?);
            )*
            context
        }
    };
}
