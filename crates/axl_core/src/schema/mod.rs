//! Remote type schema descriptions and lookup contracts.
//!
//! # Responsibility
//! - Describe one remote type as an ordered set of leaf/composite fields.
//! - Define the narrow lookup contract consumed by endpoint dispatch.
//!
//! # Invariants
//! - Field order is the declared order and is preserved by templating.
//! - Schema trees are owned values, so they are acyclic by construction.

pub mod introspect;

use crate::error::{AxlError, AxlResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Description of one remote type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Declared remote type name, e.g. `XRoutePartition`.
    pub name: String,
    #[serde(default)]
    pub fields: Vec<SchemaField>,
}

impl SchemaNode {
    pub fn new(name: impl Into<String>, fields: Vec<SchemaField>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Returns one field by name.
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// One named field of a [`SchemaNode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl SchemaField {
    /// Scalar field with its declared type name.
    pub fn leaf(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Leaf {
                type_name: type_name.into(),
            },
        }
    }

    /// Single-valued nested type.
    pub fn composite(name: impl Into<String>, node: SchemaNode) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Composite {
                node,
                repeatable: false,
            },
        }
    }

    /// Repeatable nested type.
    pub fn repeated(name: impl Into<String>, node: SchemaNode) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Composite {
                node,
                repeatable: true,
            },
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, FieldKind::Leaf { .. })
    }
}

/// Leaf or composite field shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Leaf {
        type_name: String,
    },
    Composite {
        node: SchemaNode,
        #[serde(default)]
        repeatable: bool,
    },
}

/// Schema lookup collaborator.
pub trait SchemaLookup {
    /// Resolves one remote type by name.
    ///
    /// Unknown names fail with [`AxlError::SchemaLookup`].
    fn get_type(&self, name: &str) -> AxlResult<SchemaNode>;
}

/// In-memory schema keyed by type name.
///
/// Used for offline tooling and tests where no live service description is
/// available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticSchema {
    types: BTreeMap<String, SchemaNode>,
}

impl StaticSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one type under its declared name, replacing any previous one.
    pub fn insert(&mut self, node: SchemaNode) {
        self.types.insert(node.name.clone(), node);
    }

    /// Builder-style variant of [`StaticSchema::insert`].
    pub fn with_type(mut self, node: SchemaNode) -> Self {
        self.insert(node);
        self
    }

    /// Parses a `{type_name: node}` JSON document.
    pub fn from_json_str(json: &str) -> AxlResult<Self> {
        let schema: Self = serde_json::from_str(json)
            .map_err(|err| AxlError::Config(format!("invalid schema document: {err}")))?;
        for (key, node) in &schema.types {
            if key != &node.name {
                return Err(AxlError::Config(format!(
                    "schema key `{key}` does not match type name `{}`",
                    node.name
                )));
            }
        }
        Ok(schema)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }
}

impl SchemaLookup for StaticSchema {
    fn get_type(&self, name: &str) -> AxlResult<SchemaNode> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| AxlError::SchemaLookup {
                type_name: name.to_string(),
            })
    }
}
