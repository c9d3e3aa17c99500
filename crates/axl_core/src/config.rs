//! Connector configuration.
//!
//! # Responsibility
//! - Carry logging, dispatch and connection settings as one explicit value
//!   handed to collaborators at startup.
//! - Resolve connection settings from environment variables with explicit
//!   values taking precedence.
//!
//! # Invariants
//! - Passwords never appear in `Debug` output or logs.
//! - Nothing here performs network I/O.

use crate::endpoint::api::DispatchOptions;
use crate::error::{AxlError, AxlResult};
use crate::logging::default_log_level;
use crate::model::ReferenceShape;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};

pub const ENV_USERNAME: &str = "AXL_USERNAME";
pub const ENV_PASSWORD: &str = "AXL_PASSWORD";
pub const ENV_FQDN: &str = "AXL_FQDN";
pub const ENV_WSDL: &str = "AXL_WSDL_URL";

const AXL_PORT: u16 = 8443;

/// Logging setup for `init_logging`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`.
    #[serde(default = "default_level_string")]
    pub level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: String,
}

impl LoggingConfig {
    pub fn new(level: impl Into<String>, log_dir: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            log_dir: log_dir.into(),
        }
    }
}

fn default_level_string() -> String {
    default_log_level().to_string()
}

/// Connection parameters handed to the transport collaborator.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub fqdn: Option<String>,
    pub wsdl: Option<String>,
}

impl Debug for ConnectionSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("fqdn", &self.fqdn)
            .field("wsdl", &self.wsdl)
            .finish()
    }
}

impl ConnectionSettings {
    /// Fills unset fields from the process environment.
    pub fn resolve(self) -> Self {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Fills unset fields from `lookup`; explicit values win.
    pub fn resolve_with(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            username: self.username.or_else(|| lookup(ENV_USERNAME)),
            password: self.password.or_else(|| lookup(ENV_PASSWORD)),
            fqdn: self.fqdn.or_else(|| lookup(ENV_FQDN)),
            wsdl: self.wsdl.or_else(|| lookup(ENV_WSDL)),
        }
    }

    /// Service address, e.g. `https://cucm.example.com:8443/axl/`.
    pub fn address(&self) -> AxlResult<String> {
        let fqdn = self
            .fqdn
            .as_deref()
            .map(str::trim)
            .filter(|fqdn| !fqdn.is_empty())
            .ok_or_else(|| AxlError::Config(format!("missing fqdn (set {ENV_FQDN})")))?;
        Ok(format!("https://{fqdn}:{AXL_PORT}/axl/"))
    }

    /// Checks that every parameter the transport needs is present.
    pub fn validate(&self) -> AxlResult<()> {
        let missing: Vec<&str> = [
            (ENV_USERNAME, self.username.is_none()),
            (ENV_PASSWORD, self.password.is_none()),
            (ENV_FQDN, self.fqdn.is_none()),
            (ENV_WSDL, self.wsdl.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AxlError::Config(format!(
                "incomplete connection settings; missing {}",
                missing.join(", ")
            )))
        }
    }
}

/// Top-level configuration passed explicitly to `AxlConnector::new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Remote schema version the endpoint table targets, e.g. `12.5`.
    #[serde(default)]
    pub schema_version: Option<String>,
    /// Memoize templates for the connector lifetime.
    #[serde(default = "default_true")]
    pub cache_templates: bool,
    #[serde(default)]
    pub reference_shape: ReferenceShape,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub connection: ConnectionSettings,
}

fn default_true() -> bool {
    true
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            schema_version: None,
            cache_templates: true,
            reference_shape: ReferenceShape::default(),
            logging: None,
            connection: ConnectionSettings::default(),
        }
    }
}

impl ConnectorConfig {
    /// Parses a JSON configuration document.
    pub fn from_json_str(json: &str) -> AxlResult<Self> {
        serde_json::from_str(json)
            .map_err(|err| AxlError::Config(format!("invalid connector config: {err}")))
    }

    pub fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            reference_shape: self.reference_shape.clone(),
            cache_templates: self.cache_templates,
        }
    }
}
