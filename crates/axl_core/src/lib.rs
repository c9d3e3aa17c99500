//! Schema-driven object mapping and dispatch for a remote configuration
//! service.
//!
//! Remote records are generic nested maps. This crate derives blank
//! templates from the remote type schema, collapses reference wrappers,
//! projects records onto templates, and routes CRUD verbs through one
//! table-driven `EndpointApi` instead of per-endpoint code. The thin SQL
//! surface, device login and CSV export sit beside it on the same transport.

pub mod config;
pub mod connector;
pub mod device_login;
pub mod endpoint;
pub mod error;
pub mod export;
pub mod helpers;
pub mod logging;
pub mod model;
pub mod schema;
pub mod sql;
pub mod transport;

pub use config::{ConnectionSettings, ConnectorConfig, LoggingConfig};
pub use connector::AxlConnector;
pub use device_login::DeviceLoginApi;
pub use endpoint::api::{DispatchOptions, EndpointApi, ListRequest, ReturnedTags};
pub use endpoint::catalog::EndpointCatalog;
pub use endpoint::definition::{EndpointDefinition, TypeNames, TypeOverrides};
pub use endpoint::identifiers::{IdentifierChoice, IdentifierChoiceSpec};
pub use endpoint::operation::Operation;
pub use error::{AxlError, AxlResult};
pub use export::{to_csv, write_csv};
pub use logging::{default_log_level, init_logging};
pub use model::data_model::DataModel;
pub use model::filter::{project, project_with};
pub use model::sanitize::{sanitize, sanitize_with};
pub use model::{ModelTemplate, RawRecord, ReferenceShape};
pub use schema::introspect::build_template;
pub use schema::{FieldKind, SchemaField, SchemaLookup, SchemaNode, StaticSchema};
pub use sql::SqlApi;
pub use transport::{Collaborators, LocalFactory, RemoteFault, RemoteTransport};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
