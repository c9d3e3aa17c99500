//! Record mapping: templates, reference wrappers and the flat data model.
//!
//! # Responsibility
//! - Collapse reference wrappers into scalars (`sanitize`).
//! - Project raw records onto a template's key shape (`filter`).
//! - Wrap one record in a validated, flat `DataModel`.
//!
//! # Invariants
//! - A reference wrapper is a mapping whose key set is exactly `{value}` or
//!   `{value, id}` for the active [`ReferenceShape`].
//! - Projection never introduces keys absent from the target template.

pub mod data_model;
pub mod filter;
pub mod sanitize;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Nested template describing one payload/response shape.
///
/// Leaves are strings (`""` or a type name), single composites are nested
/// maps and repeatable composites are one-element lists.
pub type ModelTemplate = Map<String, Value>;

/// Raw nested mapping as produced by a remote call.
pub type RawRecord = Map<String, Value>;

/// Key pair of a reference wrapper: a scalar plus its optional identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceShape {
    pub value_key: String,
    pub id_key: String,
}

impl Default for ReferenceShape {
    fn default() -> Self {
        Self {
            value_key: "value".to_string(),
            id_key: "id".to_string(),
        }
    }
}

impl ReferenceShape {
    /// The `_value_1` / `uuid` pair emitted by SOAP toolkits for foreign keys.
    pub fn zeep() -> Self {
        Self {
            value_key: "_value_1".to_string(),
            id_key: "uuid".to_string(),
        }
    }

    /// Returns whether `map` has exactly the wrapper key set.
    pub fn matches(&self, map: &Map<String, Value>) -> bool {
        match map.len() {
            1 => map.contains_key(&self.value_key),
            2 => map.contains_key(&self.value_key) && map.contains_key(&self.id_key),
            _ => false,
        }
    }

    /// Returns whether `value` is a wrapper-shaped mapping.
    pub fn matches_value(&self, value: &Value) -> bool {
        value.as_object().is_some_and(|map| self.matches(map))
    }
}

/// Truthiness used when deciding whether a nested value is worth projecting.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
