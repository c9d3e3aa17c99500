//! Reference-wrapper collapsing.
//!
//! Replaces every `{value, id}` / `{value}` wrapper with its scalar value,
//! which is what callers want when consuming `get`/`list` data rather than
//! re-submitting it. The identifier half of the wrapper is dropped.
//!
//! Example: `{"callingSearchSpaceName": {"value": "CSS1", "id": "u1"}}`
//! becomes `{"callingSearchSpaceName": "CSS1"}`.
//!
//! # Invariants
//! - `sanitize(sanitize(x)) == sanitize(x)`: a collapsed wrapper value is
//!   itself sanitized, so no wrapper survives a single pass.
//! - Non-wrapper mappings keep their keys and key order.

use crate::model::ReferenceShape;
use serde_json::{Map, Value};

/// Sanitizes with the default `value`/`id` wrapper shape.
pub fn sanitize(value: Value) -> Value {
    sanitize_with(value, &ReferenceShape::default())
}

/// Sanitizes with an explicit wrapper shape.
pub fn sanitize_with(value: Value, shape: &ReferenceShape) -> Value {
    match value {
        Value::Object(map) if shape.matches(&map) => {
            let inner = map
                .into_iter()
                .find_map(|(key, inner)| (key == shape.value_key).then_some(inner))
                .unwrap_or(Value::Null);
            sanitize_with(inner, shape)
        }
        Value::Object(map) => Value::Object(sanitize_map(map, shape)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| sanitize_with(item, shape))
                .collect(),
        ),
        scalar => scalar,
    }
}

/// Sanitizes every value of a top-level record.
///
/// The record itself is never collapsed, even if its own key set looks like
/// a wrapper: a record stays a record.
pub fn sanitize_map(map: Map<String, Value>, shape: &ReferenceShape) -> Map<String, Value> {
    map.into_iter()
        .map(|(key, inner)| (key, sanitize_with(inner, shape)))
        .collect()
}
