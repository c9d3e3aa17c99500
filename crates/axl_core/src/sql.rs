//! Thin SQL surface over `executeSQLQuery` / `executeSQLUpdate`.
//!
//! # Responsibility
//! - Send one statement per call and normalize the row payload.
//!
//! # Invariants
//! - A remote fault surfaces as `IllegalSqlStatement` with the message verbatim.
//! - Rows are flat: every column value is a scalar or `null`.
//! - Statement text never reaches the logs; only its length does.

use crate::error::{AxlError, AxlResult};
use crate::model::data_model::DataModel;
use crate::transport::{unwrap_return, RemoteTransport};
use log::{debug, error};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Endpoint name carried by query rows.
pub const SQL_ENDPOINT: &str = "sql";

const QUERY_OPERATION: &str = "executeSQLQuery";
const UPDATE_OPERATION: &str = "executeSQLUpdate";
const SQL_KEY: &str = "sql";
const ROWS_KEY: &str = "rows";
const ROW_KEY: &str = "row";
const ROWS_UPDATED_KEY: &str = "rowsUpdated";

#[derive(Clone)]
pub struct SqlApi {
    transport: Arc<dyn RemoteTransport>,
}

impl std::fmt::Debug for SqlApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlApi").finish_non_exhaustive()
    }
}

impl SqlApi {
    /// Fails with `EndpointDefinition` when the service lacks either SQL operation.
    pub fn new(transport: Arc<dyn RemoteTransport>) -> AxlResult<Self> {
        for operation in [QUERY_OPERATION, UPDATE_OPERATION] {
            if !transport.has_operation(operation) {
                return Err(AxlError::EndpointDefinition {
                    endpoint: SQL_ENDPOINT.to_string(),
                    reason: format!("remote service does not expose `{operation}`"),
                });
            }
        }
        Ok(Self { transport })
    }

    /// Runs a read statement; one flat model per returned row.
    ///
    /// A `null` payload means the statement matched no rows.
    pub fn query(&self, statement: &str) -> AxlResult<Vec<DataModel>> {
        let response = self.execute(QUERY_OPERATION, statement)?;
        let payload = unwrap_return(&response).ok_or_else(|| AxlError::UnexpectedResponse {
            operation: QUERY_OPERATION.to_string(),
            reason: "response has no `return` payload".to_string(),
        })?;

        let rows: Vec<&Value> = match payload.get(ROWS_KEY).or_else(|| payload.get(ROW_KEY)) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().collect(),
            Some(single @ Value::Object(_)) => vec![single],
            Some(other) => {
                return Err(AxlError::UnexpectedResponse {
                    operation: QUERY_OPERATION.to_string(),
                    reason: format!("rows must be a list of mappings, found {other}"),
                })
            }
        };

        let models = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| row_model(index, row))
            .collect::<AxlResult<Vec<_>>>()?;
        debug!("event=sql_query module=sql status=ok rows={}", models.len());
        Ok(models)
    }

    /// Runs a write statement and returns the number of rows it touched.
    pub fn update(&self, statement: &str) -> AxlResult<u64> {
        let response = self.execute(UPDATE_OPERATION, statement)?;
        let count = unwrap_return(&response).and_then(|payload| payload.get(ROWS_UPDATED_KEY));
        let rows_updated = match count {
            Some(Value::Number(number)) => number.as_u64(),
            Some(Value::String(text)) => text.trim().parse::<u64>().ok(),
            _ => None,
        };
        rows_updated.ok_or_else(|| AxlError::UnexpectedResponse {
            operation: UPDATE_OPERATION.to_string(),
            reason: format!("response has no numeric `return.{ROWS_UPDATED_KEY}`"),
        })
    }

    fn execute(&self, operation: &str, statement: &str) -> AxlResult<Value> {
        debug!(
            "event=sql_call module=sql status=start operation={} statement_len={}",
            operation,
            statement.len()
        );
        let mut args = Map::new();
        args.insert(SQL_KEY.to_string(), Value::String(statement.to_string()));
        self.transport.invoke(operation, args).map_err(|fault| {
            error!(
                "event=sql_call module=sql status=error operation={} code=AXL-E012",
                operation
            );
            AxlError::IllegalSqlStatement {
                message: fault.message,
            }
        })
    }
}

fn row_model(index: usize, row: &Value) -> AxlResult<DataModel> {
    let Value::Object(columns) = row else {
        return Err(AxlError::UnexpectedResponse {
            operation: QUERY_OPERATION.to_string(),
            reason: format!("row {index} is not a mapping"),
        });
    };
    if let Some((column, _)) = columns
        .iter()
        .find(|(_, value)| matches!(value, Value::Object(_) | Value::Array(_)))
    {
        return Err(AxlError::UnexpectedResponse {
            operation: QUERY_OPERATION.to_string(),
            reason: format!("row {index} column `{column}` is not a scalar"),
        });
    }
    DataModel::new(SQL_ENDPOINT, row.clone())
}

#[cfg(test)]
mod tests {
    use super::row_model;
    use crate::error::AxlError;
    use serde_json::json;

    #[test]
    fn rows_keep_column_order() {
        let model = row_model(0, &json!({"pkid": "p1", "name": "SEP1", "tkclass": "1"}))
            .expect("row");
        assert_eq!(model.endpoint(), "sql");
        assert_eq!(model.keys().collect::<Vec<_>>(), vec!["pkid", "name", "tkclass"]);
    }

    #[test]
    fn rows_reject_nested_columns() {
        let err = row_model(2, &json!({"pkid": {"value": "p1"}})).unwrap_err();
        match err {
            AxlError::UnexpectedResponse { reason, .. } => {
                assert!(reason.contains("row 2 column `pkid`"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(row_model(0, &json!("p1")).is_err());
    }
}
