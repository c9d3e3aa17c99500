//! Schema introspection into request/response templates.
//!
//! # Invariants
//! - Templates mirror the declared field order of the walked node.
//! - A repeatable composite is always a one-element list: it marks
//!   "repeatable", not a concrete count.
//! - Walking is pure; the depth guard bounds pathological nesting.

use crate::error::{AxlError, AxlResult};
use crate::model::ModelTemplate;
use crate::schema::{FieldKind, SchemaNode};
use serde_json::Value;

/// Deepest nesting accepted while building a template.
pub const MAX_TEMPLATE_DEPTH: usize = 32;

const SEARCH_CRITERIA_FIELD: &str = "searchCriteria";

/// Builds the empty template for one remote type.
///
/// Leaf fields map to `""`, or to the declared type name when
/// `include_types` is set (e.g. `"hostName": "String128"`), which is handy
/// for checking what an endpoint expects without reading the schema itself.
/// Some leaves may really be a sub-type of the reported name; the walk does
/// not resolve that level of detail.
pub fn build_template(node: &SchemaNode, include_types: bool) -> AxlResult<ModelTemplate> {
    build_level(node, include_types, 0)
}

fn build_level(node: &SchemaNode, include_types: bool, depth: usize) -> AxlResult<ModelTemplate> {
    if depth >= MAX_TEMPLATE_DEPTH {
        return Err(AxlError::SchemaTooDeep {
            type_name: node.name.clone(),
            max_depth: MAX_TEMPLATE_DEPTH,
        });
    }

    let mut template = ModelTemplate::new();
    for field in &node.fields {
        let value = match &field.kind {
            FieldKind::Leaf { type_name } => {
                if include_types {
                    Value::String(type_name.clone())
                } else {
                    Value::String(String::new())
                }
            }
            FieldKind::Composite {
                node: child,
                repeatable: false,
            } => Value::Object(build_level(child, include_types, depth + 1)?),
            FieldKind::Composite {
                node: child,
                repeatable: true,
            } => Value::Array(vec![Value::Object(build_level(
                child,
                include_types,
                depth + 1,
            )?)]),
        };
        template.insert(field.name.clone(), value);
    }
    Ok(template)
}

/// Returns the first declared search-criteria field of a list request.
///
/// Prefers a composite field named `searchCriteria` and otherwise falls back
/// to the request's first field. This is presumptive and may not pick the
/// natural key for every endpoint.
pub fn first_search_field(list_request: &SchemaNode) -> Option<&str> {
    let criteria = list_request
        .field(SEARCH_CRITERIA_FIELD)
        .or_else(|| list_request.fields.first())?;
    match &criteria.kind {
        FieldKind::Composite { node, .. } => node.fields.first().map(|field| field.name.as_str()),
        FieldKind::Leaf { .. } => None,
    }
}
