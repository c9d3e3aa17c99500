//! Declarative endpoint definition (one row of the endpoint data table).
//!
//! # Responsibility
//! - Hold per-endpoint configuration: verbs, identifier rules, defaults and
//!   naming overrides.
//! - Derive remote operation and type names by the fixed naming convention.
//!
//! # Invariants
//! - Canonical names are PascalCase ASCII (`RoutePartition`).
//! - Remote operation names are `verb + Name` unless overridden.
//! - Identifier-requiring verbs need a non-empty identifier spec.

use crate::endpoint::identifiers::IdentifierChoiceSpec;
use crate::endpoint::operation::Operation;
use crate::error::{AxlError, AxlResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

static ENDPOINT_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z0-9]*$").expect("valid endpoint name regex"));
static OPERATION_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("valid operation name regex"));

/// Per-endpoint configuration row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointDefinition {
    /// Canonical PascalCase name, e.g. `RoutePartition`.
    pub name: String,
    #[serde(default = "Operation::simple_set")]
    pub supported_operations: BTreeSet<Operation>,
    #[serde(default = "IdentifierChoiceSpec::uuid_or_name")]
    pub identifier_choices: IdentifierChoiceSpec,
    /// Field defaults merged under caller-supplied fields in `add`.
    #[serde(default)]
    pub defaults: Map<String, Value>,
    /// Singular key wrapping payloads and responses; defaults to `routePartition`-style.
    #[serde(default)]
    pub return_name: Option<String>,
    /// Remote operation names replacing `verb + Name`.
    #[serde(default)]
    pub operation_overrides: BTreeMap<Operation, String>,
    #[serde(default)]
    pub type_overrides: TypeOverrides,
}

/// Optional replacements for convention-derived type names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeOverrides {
    pub add_type: Option<String>,
    pub get_request_type: Option<String>,
    pub list_request_type: Option<String>,
    pub list_type: Option<String>,
}

/// Remote type names used by one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeNames {
    /// `X{Name}`: add payload, also the `model`/`create` template.
    pub add_type: String,
    /// `Get{Name}Req`: get request.
    pub get_request_type: String,
    /// `List{Name}Req`: list request with its search criteria.
    pub list_request_type: String,
    /// `L{Name}`: default list returned tags.
    pub list_type: String,
}

/// Eagerly built verb -> remote operation name table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationNames {
    names: BTreeMap<Operation, String>,
}

impl OperationNames {
    pub fn get(&self, operation: Operation) -> Option<&str> {
        self.names.get(&operation).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Operation, &str)> {
        self.names
            .iter()
            .map(|(operation, name)| (*operation, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl EndpointDefinition {
    /// Simple-verb endpoint addressed by `uuid` or `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supported_operations: Operation::simple_set(),
            identifier_choices: IdentifierChoiceSpec::uuid_or_name(),
            defaults: Map::new(),
            return_name: None,
            operation_overrides: BTreeMap::new(),
            type_overrides: TypeOverrides::default(),
        }
    }

    /// Device endpoint: simple verbs plus apply/restart/reset.
    pub fn device(name: impl Into<String>) -> Self {
        Self::new(name).with_operations(Operation::device_set())
    }

    pub fn with_operations(mut self, operations: impl IntoIterator<Item = Operation>) -> Self {
        self.supported_operations = operations.into_iter().collect();
        self
    }

    pub fn with_identifiers(mut self, identifiers: IdentifierChoiceSpec) -> Self {
        self.identifier_choices = identifiers;
        self
    }

    pub fn with_default(mut self, field: impl Into<String>, value: Value) -> Self {
        self.defaults.insert(field.into(), value);
        self
    }

    pub fn with_return_name(mut self, return_name: impl Into<String>) -> Self {
        self.return_name = Some(return_name.into());
        self
    }

    pub fn with_operation_override(
        mut self,
        operation: Operation,
        remote_name: impl Into<String>,
    ) -> Self {
        self.operation_overrides
            .insert(operation, remote_name.into());
        self
    }

    pub fn with_type_overrides(mut self, overrides: TypeOverrides) -> Self {
        self.type_overrides = overrides;
        self
    }

    pub fn supports(&self, operation: Operation) -> bool {
        self.supported_operations.contains(&operation)
    }

    /// Checks declaration-level invariants; no collaborator is consulted.
    pub fn validate(&self) -> AxlResult<()> {
        if !ENDPOINT_NAME_RE.is_match(&self.name) {
            return Err(self.invalid(format!(
                "name `{}` must be PascalCase ASCII",
                self.name
            )));
        }
        if self.supported_operations.is_empty() {
            return Err(self.invalid("no supported operations declared"));
        }
        if self
            .supported_operations
            .iter()
            .any(|operation| operation.requires_identifiers())
            && self.identifier_choices.is_empty()
        {
            return Err(self.invalid("identifier choices required for get/update/remove verbs"));
        }
        if let Some(return_name) = &self.return_name {
            if return_name.trim().is_empty() {
                return Err(self.invalid("return_name must not be empty"));
            }
        }
        for (operation, remote_name) in &self.operation_overrides {
            if !operation.is_remote() {
                return Err(self.invalid(format!(
                    "'{operation}' is answered locally and cannot be renamed"
                )));
            }
            if !OPERATION_NAME_RE.is_match(remote_name) {
                return Err(self.invalid(format!(
                    "override for '{operation}' is not a valid operation name: `{remote_name}`"
                )));
            }
        }
        Ok(())
    }

    /// Singular key under which payloads and responses are nested.
    pub fn return_name(&self) -> String {
        self.return_name
            .clone()
            .unwrap_or_else(|| downcase_first(&self.name))
    }

    /// snake_case alias, e.g. `route_partition`.
    pub fn alias(&self) -> String {
        let mut alias = String::with_capacity(self.name.len() + 4);
        for (index, ch) in self.name.chars().enumerate() {
            if ch.is_ascii_uppercase() {
                if index > 0 {
                    alias.push('_');
                }
                alias.push(ch.to_ascii_lowercase());
            } else {
                alias.push(ch);
            }
        }
        alias
    }

    pub fn type_names(&self) -> TypeNames {
        let overrides = &self.type_overrides;
        TypeNames {
            add_type: overrides
                .add_type
                .clone()
                .unwrap_or_else(|| format!("X{}", self.name)),
            get_request_type: overrides
                .get_request_type
                .clone()
                .unwrap_or_else(|| format!("Get{}Req", self.name)),
            list_request_type: overrides
                .list_request_type
                .clone()
                .unwrap_or_else(|| format!("List{}Req", self.name)),
            list_type: overrides
                .list_type
                .clone()
                .unwrap_or_else(|| format!("L{}", self.name)),
        }
    }

    /// Remote operation names for every declared remote verb.
    pub fn operation_names(&self) -> OperationNames {
        let names = self
            .supported_operations
            .iter()
            .filter(|operation| operation.is_remote())
            .map(|operation| {
                let name = self
                    .operation_overrides
                    .get(operation)
                    .cloned()
                    .unwrap_or_else(|| match operation {
                        Operation::Options => format!("get{}Options", self.name),
                        _ => format!("{}{}", operation.as_str(), self.name),
                    });
                (*operation, name)
            })
            .collect();
        OperationNames { names }
    }

    fn invalid(&self, reason: impl Into<String>) -> AxlError {
        AxlError::EndpointDefinition {
            endpoint: self.name.clone(),
            reason: reason.into(),
        }
    }
}

/// Lower-cases the first character: `RoutePartition` -> `routePartition`.
pub fn downcase_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
