//! Identifier-choice rules for record-addressing verbs.
//!
//! # Invariants
//! - A spec is satisfied when any one choice is satisfied.
//! - A compound choice is satisfied only when all of its fields are present.

use crate::error::{AxlError, AxlResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One acceptable way to address a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdentifierChoice {
    /// A single field, e.g. `uuid`.
    Field(String),
    /// Fields that must all be supplied together, e.g. `pattern` + `routePartitionName`.
    AllOf(Vec<String>),
}

impl IdentifierChoice {
    pub fn is_satisfied_by(&self, supplied: &Map<String, Value>) -> bool {
        match self {
            Self::Field(name) => supplied.contains_key(name),
            Self::AllOf(names) => {
                !names.is_empty() && names.iter().all(|name| supplied.contains_key(name))
            }
        }
    }

    /// Field names referenced by this choice.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Self::Field(name) => vec![name.as_str()],
            Self::AllOf(names) => names.iter().map(String::as_str).collect(),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Field(name) => name.clone(),
            Self::AllOf(names) => format!("({})", names.join(" + ")),
        }
    }
}

/// Ordered set of identifier choices for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentifierChoiceSpec {
    choices: Vec<IdentifierChoice>,
}

impl IdentifierChoiceSpec {
    pub fn new(choices: Vec<IdentifierChoice>) -> Self {
        Self { choices }
    }

    /// `uuid` or `name`, the most common addressing rule.
    pub fn uuid_or_name() -> Self {
        Self::new(vec![
            IdentifierChoice::Field("uuid".to_string()),
            IdentifierChoice::Field("name".to_string()),
        ])
    }

    /// Builds a spec from field groups; one-element groups become single choices.
    pub fn from_groups<I, G, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let choices = groups
            .into_iter()
            .map(|group| {
                let mut names: Vec<String> = group.into_iter().map(Into::into).collect();
                if names.len() == 1 {
                    IdentifierChoice::Field(names.remove(0))
                } else {
                    IdentifierChoice::AllOf(names)
                }
            })
            .collect();
        Self::new(choices)
    }

    pub fn choices(&self) -> &[IdentifierChoice] {
        &self.choices
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn is_satisfied_by(&self, supplied: &Map<String, Value>) -> bool {
        self.choices
            .iter()
            .any(|choice| choice.is_satisfied_by(supplied))
    }

    /// Fails with [`AxlError::IdentifierValidation`] when no choice is satisfied.
    pub fn validate(&self, endpoint: &str, supplied: &Map<String, Value>) -> AxlResult<()> {
        if self.is_satisfied_by(supplied) {
            return Ok(());
        }
        Err(AxlError::IdentifierValidation {
            endpoint: endpoint.to_string(),
            choices: self.describe(),
        })
    }

    /// Human-readable form, e.g. `[uuid | name | (pattern + routePartitionName)]`.
    pub fn describe(&self) -> String {
        let parts: Vec<String> = self.choices.iter().map(IdentifierChoice::describe).collect();
        format!("[{}]", parts.join(" | "))
    }
}
