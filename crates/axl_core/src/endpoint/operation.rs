//! Endpoint verb set.

use crate::error::AxlError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One verb an endpoint may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Model,
    Create,
    Add,
    Get,
    Update,
    List,
    Remove,
    Apply,
    Restart,
    Reset,
    /// Choice lists of one record; remote name is `get{Name}Options`.
    Options,
}

impl Operation {
    pub const ALL: [Operation; 11] = [
        Operation::Model,
        Operation::Create,
        Operation::Add,
        Operation::Get,
        Operation::Update,
        Operation::List,
        Operation::Remove,
        Operation::Apply,
        Operation::Restart,
        Operation::Reset,
        Operation::Options,
    ];

    /// Stable verb string, also the remote operation prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Create => "create",
            Self::Add => "add",
            Self::Get => "get",
            Self::Update => "update",
            Self::List => "list",
            Self::Remove => "remove",
            Self::Apply => "apply",
            Self::Restart => "restart",
            Self::Reset => "reset",
            Self::Options => "options",
        }
    }

    /// Whether this verb issues a remote call.
    ///
    /// `model` and `create` are answered locally.
    pub fn is_remote(self) -> bool {
        !matches!(self, Self::Model | Self::Create)
    }

    /// Whether this verb addresses one record through identifier choices.
    pub fn requires_identifiers(self) -> bool {
        matches!(
            self,
            Self::Get | Self::Update | Self::Remove | Self::Apply | Self::Restart | Self::Reset
        )
    }

    /// Verb set of plain configuration records.
    pub fn simple_set() -> BTreeSet<Operation> {
        [
            Self::Model,
            Self::Create,
            Self::Add,
            Self::Get,
            Self::Update,
            Self::List,
            Self::Remove,
        ]
        .into_iter()
        .collect()
    }

    /// Verb set of devices: simple verbs plus apply/restart/reset.
    pub fn device_set() -> BTreeSet<Operation> {
        let mut set = Self::simple_set();
        set.extend([Self::Apply, Self::Restart, Self::Reset]);
        set
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Operation {
    type Err = AxlError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|operation| operation.as_str() == normalized)
            .ok_or_else(|| AxlError::Config(format!("unsupported operation verb: {normalized}")))
    }
}
