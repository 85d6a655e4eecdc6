//! The serialized data model.
//!
//! A [`Value`] is a self-describing tree: null, boolean, number, string,
//! ordered array or ordered string-keyed map. Map nodes may carry the
//! reserved keys listed in [`envelope`].

// -----------------------------------------------------------------------------
// Modules

pub mod envelope;
mod serde_impl;

// -----------------------------------------------------------------------------
// Exports

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use indexmap::IndexMap;
use vc_utils::hash::FixedHashState;

/// An insertion-ordered map of serialized values.
pub type Map = IndexMap<String, Value, FixedHashState>;

/// Creates an empty [`Map`].
#[inline]
pub fn new_map() -> Map {
    IndexMap::with_hasher(FixedHashState)
}

// -----------------------------------------------------------------------------
// Number

/// A serialized number.
///
/// Integers and floats are kept apart so that ids, counters and 64 bit
/// integers survive a round trip exactly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Returns the value as `i64` if it is an integer,
    /// or a float without fractional part that fits.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Number::Int(v) => Some(v),
            Number::Float(v) => {
                if v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
                    Some(v as i64)
                } else {
                    None
                }
            }
        }
    }

    /// Returns the value as `f64`, integers are converted.
    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => fmt::Display::fmt(v, f),
            Number::Float(v) => fmt::Debug::fmt(v, f),
        }
    }
}

// -----------------------------------------------------------------------------
// Value

/// A node of the serialized tree.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Map(Map),
}

impl Value {
    /// Creates an empty map node.
    #[inline]
    pub fn map() -> Self {
        Value::Map(new_map())
    }

    /// Creates an integer node.
    #[inline]
    pub const fn int(v: i64) -> Self {
        Value::Number(Number::Int(v))
    }

    /// Creates a float node.
    #[inline]
    pub const fn float(v: f64) -> Self {
        Value::Number(Number::Float(v))
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub const fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Looks up `key` if this is a map.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?.get(key)
    }

    /// Short name of the node kind, used in messages.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }

    /// Counts the map nodes holding `key`, at any depth.
    pub fn count_key(&self, key: &str) -> usize {
        match self {
            Value::Array(items) => items.iter().map(|v| v.count_key(key)).sum(),
            Value::Map(map) => {
                let own = usize::from(map.contains_key(key));
                own + map.values().map(|v| v.count_key(key)).sum::<usize>()
            }
            _ => 0,
        }
    }
}

// -----------------------------------------------------------------------------
// Conversions

impl From<bool> for Value {
    #[inline]
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(v: i64) -> Self {
        Value::int(v)
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(v: f64) -> Self {
        Value::float(v)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(v: &str) -> Self {
        Value::String(v.into())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    #[inline]
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<Map> for Value {
    #[inline]
    fn from(v: Map) -> Self {
        Value::Map(v)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut map = new_map();
        map.extend(iter.into_iter().map(|(k, v)| (k.into(), v)));
        Value::Map(map)
    }
}

// -----------------------------------------------------------------------------
// Json

#[cfg(feature = "json")]
impl Value {
    /// Renders the tree as compact JSON text.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses JSON text into a tree.
    pub fn from_json_str(text: &str) -> Result<Value, serde_json::Error> {
        serde_json::from_str(text)
    }
}

// -----------------------------------------------------------------------------
// Tests
