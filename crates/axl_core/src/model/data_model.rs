//! Flat record value object.
//!
//! # Responsibility
//! - Own exactly one record and expose it through an explicit mapping API.
//! - Compose sanitize/filter as chainable in-place transformations.
//!
//! # Invariants
//! - No value is a bare nested mapping. Permitted values are scalars,
//!   `null`, reference wrappers and lists whose mapping elements are flat
//!   records themselves.
//! - The invariant is checked at construction and on every write; a failed
//!   write or transformation leaves the record untouched.
//! - Key lookups are the only validation point; there is no schema
//!   re-validation on access.

use crate::error::{AxlError, AxlResult};
use crate::model::filter::project_map;
use crate::model::sanitize::sanitize_map;
use crate::model::{ModelTemplate, RawRecord, ReferenceShape};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// One endpoint record with flat-only values.
#[derive(Debug, Clone, PartialEq)]
pub struct DataModel {
    endpoint: String,
    shape: ReferenceShape,
    record: RawRecord,
}

impl DataModel {
    /// Wraps a raw value returned by a remote call or a local factory.
    ///
    /// Fails with [`AxlError::ModelConstruction`] if `raw` is not a mapping or
    /// holds a bare nested mapping.
    pub fn new(endpoint: impl Into<String>, raw: Value) -> AxlResult<Self> {
        Self::with_shape(endpoint, raw, ReferenceShape::default())
    }

    /// Like [`DataModel::new`], with an explicit reference-wrapper shape.
    pub fn with_shape(
        endpoint: impl Into<String>,
        raw: Value,
        shape: ReferenceShape,
    ) -> AxlResult<Self> {
        let endpoint = endpoint.into();
        let Value::Object(record) = raw else {
            return Err(AxlError::ModelConstruction {
                endpoint,
                reason: "model data must be a mapping".to_string(),
            });
        };
        validate_record(&endpoint, &shape, &record, "")?;
        Ok(Self {
            endpoint,
            shape,
            record,
        })
    }

    /// Empty model for local pre-staging.
    pub fn empty(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            shape: ReferenceShape::default(),
            record: RawRecord::new(),
        }
    }

    /// Endpoint type this record belongs to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn len(&self) -> usize {
        self.record.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.record.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.record.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.record.contains_key(key)
    }

    /// Reads one field.
    pub fn get(&self, key: &str) -> AxlResult<&Value> {
        self.record.get(key).ok_or_else(|| self.unknown(key))
    }

    /// Overwrites an existing field.
    ///
    /// Absent keys fail with [`AxlError::UnknownField`]; use
    /// [`DataModel::insert`] to add a field.
    pub fn set(&mut self, key: &str, value: Value) -> AxlResult<()> {
        if !self.record.contains_key(key) {
            return Err(self.unknown(key));
        }
        self.insert(key, value)?;
        Ok(())
    }

    /// Adds or replaces a field, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> AxlResult<Option<Value>> {
        let key = key.into();
        validate_value(&self.endpoint, &self.shape, &key, &value)?;
        Ok(self.record.insert(key, value))
    }

    /// Removes a field, returning its value.
    pub fn remove(&mut self, key: &str) -> AxlResult<Value> {
        match self.record.shift_remove(key) {
            Some(value) => Ok(value),
            None => Err(self.unknown(key)),
        }
    }

    /// Collapses reference wrappers into their scalar values.
    pub fn sanitize(&mut self) -> &mut Self {
        let record = std::mem::take(&mut self.record);
        self.record = sanitize_map(record, &self.shape);
        self
    }

    /// Restricts the record to the key shape of `template`.
    pub fn filter(&mut self, template: &ModelTemplate) -> AxlResult<&mut Self> {
        let projected = project_map(&self.record, template, &self.shape)?;
        validate_record(&self.endpoint, &self.shape, &projected, "")?;
        self.record = projected;
        Ok(self)
    }

    /// Owned copy of the wrapped record.
    pub fn record(&self) -> RawRecord {
        self.record.clone()
    }

    pub fn into_record(self) -> RawRecord {
        self.record
    }

    /// Record as a JSON value, e.g. for an `add` payload.
    pub fn to_value(&self) -> Value {
        Value::Object(self.record.clone())
    }

    fn unknown(&self, key: &str) -> AxlError {
        AxlError::UnknownField {
            endpoint: self.endpoint.clone(),
            field: key.to_string(),
        }
    }
}

impl Display for DataModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.endpoint, Value::Object(self.record.clone()))
    }
}

impl Serialize for DataModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.record.serialize(serializer)
    }
}

fn validate_record(
    endpoint: &str,
    shape: &ReferenceShape,
    record: &RawRecord,
    prefix: &str,
) -> AxlResult<()> {
    for (key, value) in record {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        validate_value(endpoint, shape, &path, value)?;
    }
    Ok(())
}

fn validate_value(
    endpoint: &str,
    shape: &ReferenceShape,
    path: &str,
    value: &Value,
) -> AxlResult<()> {
    match value {
        // A wrapper collapses to its value on sanitize, so the value must be flat too.
        Value::Object(map) if shape.matches(map) => match map.get(&shape.value_key) {
            Some(inner) => {
                let inner_path = format!("{path}.{}", shape.value_key);
                validate_value(endpoint, shape, &inner_path, inner)
            }
            None => Ok(()),
        },
        Value::Object(_) => Err(AxlError::ModelConstruction {
            endpoint: endpoint.to_string(),
            reason: format!("`{path}` holds a nested mapping; only flat values are supported"),
        }),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                let item_path = format!("{path}[{index}]");
                match item {
                    Value::Object(map) if !shape.matches(map) => {
                        validate_record(endpoint, shape, map, &item_path)?;
                    }
                    other => validate_value(endpoint, shape, &item_path, other)?,
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
