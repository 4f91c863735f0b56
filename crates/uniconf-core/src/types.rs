//! The configuration tree.
//!
//! Every loaded source ends up as part of one [`ConfigValue`] tree whose root is an
//! object. The model is deliberately small:
//!
//! - `Null`: an untyped placeholder. The first structural write decides whether it
//!   becomes an `Object` (named child) or an `Array` (unnamed child); the other kind
//!   of write is rejected from then on.
//! - `String` and `Number` (always `f64`) leaves. Booleans from JSON/TOML sources are
//!   stored as `1`/`0`.
//! - `Array` and `Object` containers. Objects keep insertion order (`IndexMap`) for
//!   printing, but equality and lookup ignore it.

use crate::error::{Result, UniconfError};
use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

/// Ordered key → value mapping used for `Object` nodes.
pub type ObjectMap = IndexMap<String, ConfigValue>;

/// A node in the configuration tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConfigValue {
    #[default]
    Null,
    String(String),
    Number(f64),
    Array(Vec<ConfigValue>),
    Object(ObjectMap),
}

/// The type tag of a [`ConfigValue`], used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Null,
    String,
    Number,
    Array,
    Object,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Null => "null",
            Kind::String => "string",
            Kind::Number => "number",
            Kind::Array => "array",
            Kind::Object => "object",
        };
        f.write_str(name)
    }
}

impl ConfigValue {
    /// An empty object, the shape of every fresh root and branch.
    pub fn object() -> Self {
        ConfigValue::Object(ObjectMap::new())
    }

    pub fn kind(&self) -> Kind {
        match self {
            ConfigValue::Null => Kind::Null,
            ConfigValue::String(_) => Kind::String,
            ConfigValue::Number(_) => Kind::Number,
            ConfigValue::Array(_) => Kind::Array,
            ConfigValue::Object(_) => Kind::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    /// True for `Null`, `Array` and `Object`: nodes that can still receive
    /// structural writes.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            ConfigValue::Null | ConfigValue::Array(_) | ConfigValue::Object(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<ConfigValue>> {
        match self {
            ConfigValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectMap> {
        match self {
            ConfigValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Number of members of a container; `None` for leaves and placeholders.
    pub fn member_count(&self) -> Option<usize> {
        match self {
            ConfigValue::Array(items) => Some(items.len()),
            ConfigValue::Object(map) => Some(map.len()),
            _ => None,
        }
    }

    /// Named child of an object node. Case-sensitive.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.as_object()?.get(key)
    }

    /// Object view of this node, typing a `Null` placeholder as an object first.
    ///
    /// Fails with [`UniconfError::TypeClash`] when the node is already an array
    /// or a leaf.
    pub fn as_object_mut_or_init(&mut self) -> Result<&mut ObjectMap> {
        if self.is_null() {
            *self = ConfigValue::object();
        }
        match self {
            ConfigValue::Object(map) => Ok(map),
            other => Err(UniconfError::TypeClash {
                attempted: Kind::Object,
                found: other.kind(),
            }),
        }
    }

    /// Array view of this node, typing a `Null` placeholder as an array first.
    pub fn as_array_mut_or_init(&mut self) -> Result<&mut Vec<ConfigValue>> {
        if self.is_null() {
            *self = ConfigValue::Array(Vec::new());
        }
        match self {
            ConfigValue::Array(items) => Ok(items),
            other => Err(UniconfError::TypeClash {
                attempted: Kind::Array,
                found: other.kind(),
            }),
        }
    }

    /// Text form of a leaf: strings as-is, numbers rounded to an integer.
    pub fn to_text(&self) -> Option<String> {
        match self {
            ConfigValue::String(s) => Some(s.clone()),
            ConfigValue::Number(n) => Some(integer_text(*n)),
            _ => None,
        }
    }

    /// Integer form of a leaf. Numbers are truncated; strings must hold a number.
    pub fn to_integer(&self) -> Option<i64> {
        match self {
            ConfigValue::Number(n) => Some(n.trunc() as i64),
            ConfigValue::String(s) => s
                .trim()
                .parse::<i64>()
                .ok()
                .or_else(|| parse_number(s).map(|n| n.trunc() as i64)),
            _ => None,
        }
    }

    /// Truth value of a node.
    ///
    /// `true`/`on`/`yes` and `false`/`off`/`no` are recognised in any case. Numbers
    /// and numeric strings are true when their integer part is non-zero, containers
    /// when they have members. Anything else has no truth value.
    pub fn to_boolean(&self) -> Option<bool> {
        match self {
            ConfigValue::Number(n) => Some(n.trunc() != 0.0),
            ConfigValue::String(s) => {
                let s = s.trim();
                if ["true", "on", "yes"].iter().any(|w| s.eq_ignore_ascii_case(w)) {
                    Some(true)
                } else if ["false", "off", "no"].iter().any(|w| s.eq_ignore_ascii_case(w)) {
                    Some(false)
                } else {
                    parse_number(s).map(|n| n.trunc() != 0.0)
                }
            }
            ConfigValue::Array(items) => Some(!items.is_empty()),
            ConfigValue::Object(map) => Some(!map.is_empty()),
            ConfigValue::Null => None,
        }
    }

    /// Convert into a `serde_json::Value` for printing or comparison.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            ConfigValue::Null => Value::Null,
            ConfigValue::String(s) => Value::String(s.clone()),
            ConfigValue::Number(n) => number_to_json(*n),
            ConfigValue::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            ConfigValue::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Render a number the way references and string accessors splice it:
/// rounded, no fractional part.
pub fn integer_text(n: f64) -> String {
    format!("{:.0}", n)
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Whether `n` can be printed as an integer without losing information.
fn is_exact_integer(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0
}

fn number_to_json(n: f64) -> serde_json::Value {
    if is_exact_integer(n) {
        return serde_json::Value::Number((n as i64).into());
    }
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

impl Serialize for ConfigValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ConfigValue::Null => serializer.serialize_unit(),
            ConfigValue::String(s) => serializer.serialize_str(s),
            ConfigValue::Number(n) if is_exact_integer(*n) => serializer.serialize_i64(*n as i64),
            ConfigValue::Number(n) => serializer.serialize_f64(*n),
            ConfigValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ConfigValue::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Number(value)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(value: Vec<ConfigValue>) -> Self {
        ConfigValue::Array(value)
    }
}

impl From<ObjectMap> for ConfigValue {
    fn from(value: ObjectMap) -> Self {
        ConfigValue::Object(value)
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => ConfigValue::Null,
            Value::Bool(b) => ConfigValue::Number(if b { 1.0 } else { 0.0 }),
            Value::Number(n) => ConfigValue::Number(n.as_f64().unwrap_or_default()),
            Value::String(s) => ConfigValue::String(s),
            Value::Array(items) => {
                ConfigValue::Array(items.into_iter().map(ConfigValue::from).collect())
            }
            Value::Object(map) => ConfigValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, ConfigValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<toml::Value> for ConfigValue {
    fn from(value: toml::Value) -> Self {
        use toml::Value;
        match value {
            Value::String(s) => ConfigValue::String(s),
            Value::Integer(i) => ConfigValue::Number(i as f64),
            Value::Float(f) => ConfigValue::Number(f),
            Value::Boolean(b) => ConfigValue::Number(if b { 1.0 } else { 0.0 }),
            Value::Datetime(dt) => ConfigValue::String(dt.to_string()),
            Value::Array(items) => {
                ConfigValue::Array(items.into_iter().map(ConfigValue::from).collect())
            }
            Value::Table(table) => ConfigValue::from(table),
        }
    }
}

impl From<toml::Table> for ConfigValue {
    fn from(table: toml::Table) -> Self {
        ConfigValue::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, ConfigValue::from(v)))
                .collect(),
        )
    }
}
