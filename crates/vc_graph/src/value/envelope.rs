//! Reserved keys layered on top of plain map nodes.
//!
//! | Key | Meaning |
//! |---|---|
//! | `$ref` | id of an object defined elsewhere in the same document |
//! | `$id` | id this object definition is registered under |
//! | `$type` | type path overriding the declared type |
//! | `$version` | number of previous schema versions already migrated away from |
//! | `$content` | payload of a wrapped non-map value |
//!
//! Real members never use these names.

use alloc::string::String;

use super::{Map, Value, new_map};

pub const REF_KEY: &str = "$ref";
pub const ID_KEY: &str = "$id";
pub const TYPE_KEY: &str = "$type";
pub const VERSION_KEY: &str = "$version";
pub const CONTENT_KEY: &str = "$content";

/// All reserved keys.
pub const RESERVED_KEYS: [&str; 5] = [REF_KEY, ID_KEY, TYPE_KEY, VERSION_KEY, CONTENT_KEY];

/// Returns `true` if `key` is one of the reserved envelope keys.
#[inline]
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// A reserved key holding a value of the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedKey {
    pub key: &'static str,
    pub found: &'static str,
}

impl MalformedKey {
    pub fn message(&self) -> String {
        alloc::format!("`{}` must not be a {}, entry skipped", self.key, self.found)
    }
}

fn read_int(map: &Map, key: &'static str) -> Result<Option<i64>, MalformedKey> {
    match map.get(key) {
        None => Ok(None),
        Some(v) => v.as_i64().map(Some).ok_or(MalformedKey {
            key,
            found: v.kind_name(),
        }),
    }
}

/// Reads `$ref`.
#[inline]
pub fn ref_id(map: &Map) -> Result<Option<i64>, MalformedKey> {
    read_int(map, REF_KEY)
}

/// Reads `$id`.
#[inline]
pub fn def_id(map: &Map) -> Result<Option<i64>, MalformedKey> {
    read_int(map, ID_KEY)
}

/// Reads `$version`.
#[inline]
pub fn version(map: &Map) -> Result<Option<i64>, MalformedKey> {
    read_int(map, VERSION_KEY)
}

/// Reads `$type`.
pub fn type_name(map: &Map) -> Result<Option<&str>, MalformedKey> {
    match map.get(TYPE_KEY) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(v) => Err(MalformedKey {
            key: TYPE_KEY,
            found: v.kind_name(),
        }),
    }
}

/// Builds a `{"$ref": id}` token.
pub fn reference(id: i64) -> Value {
    let mut map = new_map();
    map.insert(REF_KEY.into(), Value::int(id));
    Value::Map(map)
}

/// Returns the payload of a wrapper node.
///
/// A map whose keys are all reserved and which holds `$content` is a
/// wrapper; anything else is returned unchanged.
pub fn content(value: &Value) -> &Value {
    if let Value::Map(map) = value
        && let Some(inner) = map.get(CONTENT_KEY)
        && map.keys().all(|k| is_reserved(k))
    {
        return inner;
    }
    value
}

/// Sets a reserved key on `value`.
///
/// Maps receive the key in place, in front of their members. Other values
/// are wrapped as `{key: .., "$content": value}` first.
pub fn stamp(value: &mut Value, key: &'static str, tag: Value) {
    match value {
        Value::Map(map) => {
            map.shift_insert(0, key.into(), tag);
        }
        other => {
            let payload = core::mem::take(other);
            let mut map = new_map();
            map.insert(key.into(), tag);
            map.insert(CONTENT_KEY.into(), payload);
            *other = Value::Map(map);
        }
    }
}

/// Removes `$id` from a node, unwrapping `{"$id", "$content"}` wrappers
/// that no longer carry anything else.
pub fn strip_id(value: &mut Value) {
    let Value::Map(map) = value else {
        return;
    };
    map.shift_remove(ID_KEY);
    if map.len() == 1
        && let Some(inner) = map.shift_remove(CONTENT_KEY)
    {
        *value = inner;
    }
}

// -----------------------------------------------------------------------------
// Tests
