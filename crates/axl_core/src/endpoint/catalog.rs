//! Endpoint data table.
//!
//! # Responsibility
//! - Hold one validated `EndpointDefinition` per endpoint name.
//! - Load rows from JSON and ship a builtin table of common endpoints.
//!
//! # Invariants
//! - Names are unique; snake_case aliases are unique too.
//! - Every stored row passed `EndpointDefinition::validate`.

use crate::endpoint::definition::EndpointDefinition;
use crate::error::{AxlError, AxlResult};
use std::collections::BTreeMap;

const BUILTIN_CATALOG_JSON: &str = include_str!("builtin_catalog.json");

/// Ordered endpoint table keyed by canonical name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointCatalog {
    definitions: BTreeMap<String, EndpointDefinition>,
    aliases: BTreeMap<String, String>,
}

impl EndpointCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builtin table of commonly used endpoints.
    pub fn builtin() -> AxlResult<Self> {
        Self::from_json_str(BUILTIN_CATALOG_JSON)
    }

    /// Parses a JSON array of endpoint rows.
    pub fn from_json_str(json: &str) -> AxlResult<Self> {
        let rows: Vec<EndpointDefinition> = serde_json::from_str(json)
            .map_err(|err| AxlError::Config(format!("invalid endpoint catalog: {err}")))?;
        let mut catalog = Self::new();
        for row in rows {
            catalog.register(row)?;
        }
        Ok(catalog)
    }

    /// Registers one validated row.
    pub fn register(&mut self, definition: EndpointDefinition) -> AxlResult<()> {
        definition.validate()?;
        let alias = definition.alias();
        if self.definitions.contains_key(&definition.name) || self.aliases.contains_key(&alias) {
            return Err(AxlError::EndpointDefinition {
                endpoint: definition.name.clone(),
                reason: "endpoint already registered".to_string(),
            });
        }
        self.aliases.insert(alias, definition.name.clone());
        self.definitions.insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Looks a row up by canonical name or snake_case alias.
    pub fn get(&self, name: &str) -> Option<&EndpointDefinition> {
        let name = name.trim();
        self.definitions.get(name).or_else(|| {
            self.aliases
                .get(name)
                .and_then(|canonical| self.definitions.get(canonical))
        })
    }

    pub fn names(&self) -> Vec<String> {
        self.definitions.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EndpointDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::EndpointCatalog;
    use crate::endpoint::definition::EndpointDefinition;
    use crate::endpoint::operation::Operation;
    use crate::error::AxlError;
    use serde_json::json;

    #[test]
    fn builtin_catalog_parses_and_validates() {
        let catalog = EndpointCatalog::builtin().expect("builtin catalog");
        assert!(catalog.len() >= 10);

        let line = catalog.get("Line").expect("Line row");
        assert!(line.supports(Operation::Reset));
        assert_eq!(line.defaults["usage"], json!("Device"));

        let partition = catalog.get("route_partition").expect("alias lookup");
        assert_eq!(partition.name, "RoutePartition");
        assert!(!partition.supports(Operation::Reset));
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut catalog = EndpointCatalog::new();
        catalog
            .register(EndpointDefinition::new("Css"))
            .expect("first registration");
        let err = catalog.register(EndpointDefinition::new("Css")).unwrap_err();
        assert!(matches!(err, AxlError::EndpointDefinition { .. }));
    }

    #[test]
    fn rejects_invalid_rows_and_malformed_json() {
        let err = EndpointCatalog::from_json_str(r#"[{"name": "bad name"}]"#).unwrap_err();
        assert!(matches!(err, AxlError::EndpointDefinition { .. }));

        let err = EndpointCatalog::from_json_str(r#"[{"name": "Css", "bogus": 1}]"#).unwrap_err();
        assert!(matches!(err, AxlError::Config(_)));
    }

    #[test]
    fn names_are_sorted() {
        let catalog = EndpointCatalog::from_json_str(r#"[{"name": "Region"}, {"name": "Css"}]"#)
            .expect("catalog");
        assert_eq!(catalog.names(), vec!["Css".to_string(), "Region".to_string()]);
    }
}
