//! Narrow collaborator contracts consumed by endpoint dispatch.
//!
//! # Responsibility
//! - Define the remote-call and local-factory interfaces.
//! - Unwrap the fixed `return` response convention.
//!
//! # Invariants
//! - Transport, session, authentication and retry behavior live behind
//!   `RemoteTransport`; this crate never retries a call.
//! - Shared collaborators carry no thread-safety promise of their own.

use crate::error::{AxlError, AxlResult};
use crate::schema::SchemaLookup;
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Key carrying the payload of every remote response.
pub const RETURN_KEY: &str = "return";

/// Failure reported by the remote side of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFault {
    pub message: String,
}

impl RemoteFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for RemoteFault {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RemoteFault {}

/// Remote call dispatch by constructed operation name.
pub trait RemoteTransport {
    /// Issues one blocking call, e.g. `invoke("addRoutePartition", args)`.
    fn invoke(&self, operation: &str, args: Map<String, Value>) -> Result<Value, RemoteFault>;

    /// Whether the remote service exposes `operation`.
    fn has_operation(&self, operation: &str) -> bool;
}

/// Local payload factory; performs no network I/O.
pub trait LocalFactory {
    /// Builds a populated local payload of `type_name` from `fields`.
    fn build_local(&self, type_name: &str, fields: Map<String, Value>) -> AxlResult<Value>;
}

/// Collaborators shared by every endpoint of one connector.
#[derive(Clone)]
pub struct Collaborators {
    pub schema: Arc<dyn SchemaLookup>,
    pub transport: Arc<dyn RemoteTransport>,
    pub factory: Arc<dyn LocalFactory>,
}

impl Collaborators {
    pub fn new(
        schema: Arc<dyn SchemaLookup>,
        transport: Arc<dyn RemoteTransport>,
        factory: Arc<dyn LocalFactory>,
    ) -> Self {
        Self {
            schema,
            transport,
            factory,
        }
    }
}

/// Returns `response["return"]`, or `None` when absent.
pub fn unwrap_return(response: &Value) -> Option<&Value> {
    response.get(RETURN_KEY)
}

/// Returns `response["return"][return_name]`, or `None` when absent.
pub fn unwrap_named<'a>(response: &'a Value, return_name: &str) -> Option<&'a Value> {
    unwrap_return(response).and_then(|inner| inner.get(return_name))
}

/// Extracts the opaque record identifier returned by write verbs.
pub fn unwrap_identifier(operation: &str, response: &Value) -> AxlResult<String> {
    match unwrap_return(response) {
        Some(Value::String(identifier)) => Ok(identifier.clone()),
        Some(other) => Err(AxlError::UnexpectedResponse {
            operation: operation.to_string(),
            reason: format!("expected an identifier string under `{RETURN_KEY}`, found {other}"),
        }),
        None => Err(AxlError::UnexpectedResponse {
            operation: operation.to_string(),
            reason: format!("response has no `{RETURN_KEY}` payload"),
        }),
    }
}
