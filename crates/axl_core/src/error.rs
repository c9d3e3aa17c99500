//! Error taxonomy for schema mapping and endpoint dispatch.
//!
//! # Invariants
//! - Local/structural errors are raised strictly before any remote call.
//! - `RemoteFault` keeps the remote-supplied message verbatim.

use thiserror::Error;

pub type AxlResult<T> = Result<T, AxlError>;

/// Crate-wide error for templating, projection, data models and dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AxlError {
    #[error("remote type `{type_name}` does not resolve in schema")]
    SchemaLookup { type_name: String },

    #[error("schema type `{type_name}` nests deeper than {max_depth} levels (cyclic schema?)")]
    SchemaTooDeep { type_name: String, max_depth: usize },

    #[error("supplied identifiers not supported for {endpoint}; expected one of {choices}")]
    IdentifierValidation { endpoint: String, choices: String },

    #[error("{endpoint} API does not support '{operation}' operation")]
    UnsupportedOperation { endpoint: String, operation: String },

    #[error("unknown attribute for {endpoint}: {field}")]
    UnknownField { endpoint: String, field: String },

    #[error("unable to project record onto target template: {reason}")]
    ShapeProjection { reason: String },

    #[error("invalid {endpoint} data model: {reason}")]
    ModelConstruction { endpoint: String, reason: String },

    #[error("remote fault in {operation}: {message}")]
    RemoteFault { operation: String, message: String },

    #[error("unexpected response from {operation}: {reason}")]
    UnexpectedResponse { operation: String, reason: String },

    #[error("invalid endpoint definition for {endpoint}: {reason}")]
    EndpointDefinition { endpoint: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("illegal SQL statement: {message}")]
    IllegalSqlStatement { message: String },

    #[error("export failed: {0}")]
    Export(String),
}

impl AxlError {
    /// Stable code used in `event=... code=...` log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SchemaLookup { .. } => "AXL-E001",
            Self::SchemaTooDeep { .. } => "AXL-E002",
            Self::IdentifierValidation { .. } => "AXL-E003",
            Self::UnsupportedOperation { .. } => "AXL-E004",
            Self::UnknownField { .. } => "AXL-E005",
            Self::ShapeProjection { .. } => "AXL-E006",
            Self::ModelConstruction { .. } => "AXL-E007",
            Self::RemoteFault { .. } => "AXL-E008",
            Self::UnexpectedResponse { .. } => "AXL-E009",
            Self::EndpointDefinition { .. } => "AXL-E010",
            Self::Config(_) => "AXL-E011",
            Self::IllegalSqlStatement { .. } => "AXL-E012",
            Self::Export(_) => "AXL-E013",
        }
    }

    /// Returns whether the error was produced by the remote side.
    ///
    /// Everything else is detected locally, before any network interaction.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::RemoteFault { .. }
                | Self::UnexpectedResponse { .. }
                | Self::IllegalSqlStatement { .. }
        )
    }

    pub(crate) fn projection(reason: impl Into<String>) -> Self {
        Self::ShapeProjection {
            reason: reason.into(),
        }
    }
}
