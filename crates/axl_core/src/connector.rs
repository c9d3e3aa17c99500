//! Connector facade.
//!
//! # Responsibility
//! - Build one validated `EndpointApi` per catalog row at startup.
//! - Look endpoints up by canonical name or snake_case alias.
//! - Hand out the SQL and device-login surfaces on the same transport.
//!
//! # Invariants
//! - Construction fails on the first row that does not resolve; no
//!   partially built connector is ever returned.
//! - Every endpoint shares one set of collaborators and dispatch options.

use crate::config::ConnectorConfig;
use crate::device_login::DeviceLoginApi;
use crate::endpoint::api::EndpointApi;
use crate::endpoint::catalog::EndpointCatalog;
use crate::error::AxlResult;
use crate::logging::init_logging;
use crate::sql::SqlApi;
use crate::transport::{Collaborators, RemoteTransport};
use log::{error, info};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct AxlConnector {
    config: ConnectorConfig,
    endpoints: BTreeMap<String, EndpointApi>,
    aliases: BTreeMap<String, String>,
    transport: Arc<dyn RemoteTransport>,
}

impl std::fmt::Debug for AxlConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AxlConnector")
            .field("schema_version", &self.config.schema_version)
            .field("endpoints", &self.endpoints.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl AxlConnector {
    /// Starts logging when configured, then resolves every catalog row.
    ///
    /// # Errors
    /// - `Config` when logging cannot start.
    /// - Any construction error of `EndpointApi::new` for the first failing row.
    pub fn new(
        config: ConnectorConfig,
        catalog: EndpointCatalog,
        collaborators: Collaborators,
    ) -> AxlResult<Self> {
        if let Some(logging) = &config.logging {
            init_logging(logging)?;
        }

        let options = config.dispatch_options();
        let mut endpoints = BTreeMap::new();
        let mut aliases = BTreeMap::new();
        for definition in catalog.iter() {
            let name = definition.name.clone();
            let api = EndpointApi::new(definition.clone(), collaborators.clone(), options.clone())
                .map_err(|err| {
                    error!(
                        "event=connector_init module=connector status=error endpoint={} code={}",
                        name,
                        err.code()
                    );
                    err
                })?;
            aliases.insert(definition.alias(), name.clone());
            endpoints.insert(name, api);
        }

        info!(
            "event=connector_init module=connector status=ok endpoints={} schema_version={}",
            endpoints.len(),
            config.schema_version.as_deref().unwrap_or("unspecified")
        );

        Ok(Self {
            config,
            endpoints,
            aliases,
            transport: collaborators.transport,
        })
    }

    /// Endpoint by canonical name (`RoutePartition`) or alias (`route_partition`).
    pub fn endpoint(&self, name: &str) -> Option<&EndpointApi> {
        let name = name.trim();
        self.endpoints.get(name).or_else(|| {
            self.aliases
                .get(name)
                .and_then(|canonical| self.endpoints.get(canonical))
        })
    }

    /// Canonical endpoint names in sorted order.
    pub fn endpoint_names(&self) -> Vec<&str> {
        self.endpoints.keys().map(String::as_str).collect()
    }

    /// Thin SQL surface; fails when the service exposes no SQL operations.
    pub fn sql(&self) -> AxlResult<SqlApi> {
        SqlApi::new(self.transport.clone())
    }

    pub fn device_login(&self) -> AxlResult<DeviceLoginApi> {
        DeviceLoginApi::new(self.transport.clone())
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }
}
