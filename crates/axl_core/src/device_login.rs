//! Extension-mobility login/logout (`doDeviceLogin` / `doDeviceLogout`).
//!
//! # Invariants
//! - A blank device name is rejected before any remote call.

use crate::error::{AxlError, AxlResult};
use crate::transport::{unwrap_identifier, RemoteTransport};
use log::{debug, error};
use serde_json::{Map, Value};
use std::sync::Arc;

pub const DEVICE_LOGIN_ENDPOINT: &str = "DeviceLogin";

const LOGIN_OPERATION: &str = "doDeviceLogin";
const LOGOUT_OPERATION: &str = "doDeviceLogout";

#[derive(Clone)]
pub struct DeviceLoginApi {
    transport: Arc<dyn RemoteTransport>,
}

impl std::fmt::Debug for DeviceLoginApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceLoginApi").finish_non_exhaustive()
    }
}

impl DeviceLoginApi {
    pub fn new(transport: Arc<dyn RemoteTransport>) -> AxlResult<Self> {
        for operation in [LOGIN_OPERATION, LOGOUT_OPERATION] {
            if !transport.has_operation(operation) {
                return Err(AxlError::EndpointDefinition {
                    endpoint: DEVICE_LOGIN_ENDPOINT.to_string(),
                    reason: format!("remote service does not expose `{operation}`"),
                });
            }
        }
        Ok(Self { transport })
    }

    /// Logs `user_id` into `device_name` with a device profile.
    ///
    /// `login_duration` is in minutes; `0` keeps the login until logout.
    pub fn login(
        &self,
        device_name: &str,
        profile_name: &str,
        user_id: &str,
        login_duration: u32,
    ) -> AxlResult<String> {
        let device_name = checked_device_name(device_name)?;
        let mut args = Map::new();
        args.insert("deviceName".to_string(), Value::String(device_name.to_string()));
        args.insert("profileName".to_string(), Value::String(profile_name.to_string()));
        args.insert("userId".to_string(), Value::String(user_id.to_string()));
        args.insert("loginDuration".to_string(), Value::from(login_duration));
        self.call(LOGIN_OPERATION, args)
    }

    pub fn logout(&self, device_name: &str) -> AxlResult<String> {
        let device_name = checked_device_name(device_name)?;
        let mut args = Map::new();
        args.insert("deviceName".to_string(), Value::String(device_name.to_string()));
        self.call(LOGOUT_OPERATION, args)
    }

    fn call(&self, operation: &str, args: Map<String, Value>) -> AxlResult<String> {
        debug!(
            "event=device_login module=device_login status=start operation={}",
            operation
        );
        let response = self.transport.invoke(operation, args).map_err(|fault| {
            error!(
                "event=device_login module=device_login status=error operation={} code=AXL-E008",
                operation
            );
            AxlError::RemoteFault {
                operation: operation.to_string(),
                message: fault.message,
            }
        })?;
        unwrap_identifier(operation, &response)
    }
}

fn checked_device_name(device_name: &str) -> AxlResult<&str> {
    let trimmed = device_name.trim();
    if trimmed.is_empty() {
        return Err(AxlError::IdentifierValidation {
            endpoint: DEVICE_LOGIN_ENDPOINT.to_string(),
            choices: "[deviceName]".to_string(),
        });
    }
    Ok(trimmed)
}
