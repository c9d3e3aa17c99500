//! Generic endpoint dispatcher.
//!
//! # Responsibility
//! - Turn verb + endpoint definition + identifier rules into one remote call.
//! - Wrap raw results into `DataModel` values or opaque identifiers.
//!
//! # Invariants
//! - Call order is gate -> identifier validation -> remote call -> wrap.
//! - Every local error is raised before the transport is touched.
//! - Every declared operation and required type name is resolved at
//!   construction, never lazily on first use.
//! - At most one remote call per operation; faults are surfaced, not retried.

use crate::endpoint::definition::{EndpointDefinition, OperationNames, TypeNames};
use crate::endpoint::operation::Operation;
use crate::error::{AxlError, AxlResult};
use crate::helpers::returned_tags_from_names;
use crate::model::data_model::DataModel;
use crate::model::sanitize::sanitize_map;
use crate::model::{ModelTemplate, RawRecord, ReferenceShape};
use crate::schema::introspect::{build_template, first_search_field};
use crate::schema::SchemaNode;
use crate::transport::{unwrap_identifier, unwrap_named, Collaborators};
use log::{debug, error, info};
use once_cell::sync::OnceCell;
use serde_json::{Map, Value};

const RETURNED_TAGS_KEY: &str = "returnedTags";
const RETURNED_CHOICES_KEY: &str = "returnedChoices";
const UUID_KEY: &str = "uuid";
const SEARCH_CRITERIA_KEY: &str = "searchCriteria";
const SKIP_KEY: &str = "skip";
const FIRST_KEY: &str = "first";
const WILDCARD: &str = "%";

/// Dispatch behavior shared by every endpoint of one connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOptions {
    pub reference_shape: ReferenceShape,
    /// Memoize templates for the dispatcher lifetime; assumes the remote
    /// schema does not change mid-session.
    pub cache_templates: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            reference_shape: ReferenceShape::default(),
            cache_templates: true,
        }
    }
}

/// Fields requested back from `get`/`list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnedTags {
    /// Field names; each becomes `{name: ""}` (include, no value filter).
    Names(Vec<String>),
    /// Explicit nested returned-tags mapping.
    Template(Map<String, Value>),
}

impl ReturnedTags {
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Names(names.into_iter().map(Into::into).collect())
    }

    pub fn into_map(self) -> Map<String, Value> {
        match self {
            Self::Names(names) => returned_tags_from_names(names),
            Self::Template(map) => map,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Names(names) => names.is_empty(),
            Self::Template(map) => map.is_empty(),
        }
    }
}

impl From<Map<String, Value>> for ReturnedTags {
    fn from(value: Map<String, Value>) -> Self {
        Self::Template(value)
    }
}

impl From<Vec<String>> for ReturnedTags {
    fn from(value: Vec<String>) -> Self {
        Self::Names(value)
    }
}

impl From<Vec<&str>> for ReturnedTags {
    fn from(value: Vec<&str>) -> Self {
        Self::names(value)
    }
}

/// Arguments of a `list` call.
///
/// Omitting `search_criteria` or `returned_tags` may produce very large
/// responses for big data sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    pub search_criteria: Option<Map<String, Value>>,
    pub returned_tags: Option<ReturnedTags>,
    pub skip: Option<u64>,
    pub first: Option<u64>,
}

impl ListRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, field: impl Into<String>, pattern: impl Into<Value>) -> Self {
        self.search_criteria
            .get_or_insert_with(Map::new)
            .insert(field.into(), pattern.into());
        self
    }

    pub fn returned_tags(mut self, tags: impl Into<ReturnedTags>) -> Self {
        self.returned_tags = Some(tags.into());
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn first(mut self, first: u64) -> Self {
        self.first = Some(first);
        self
    }
}

/// Schema nodes resolved once at construction.
struct ResolvedSchema {
    add: Option<SchemaNode>,
    list: Option<SchemaNode>,
    default_search_field: Option<String>,
}

/// Generic CRUD dispatcher for one endpoint.
pub struct EndpointApi {
    definition: EndpointDefinition,
    return_name: String,
    type_names: TypeNames,
    operations: OperationNames,
    collaborators: Collaborators,
    options: DispatchOptions,
    schema: ResolvedSchema,
    add_template: OnceCell<ModelTemplate>,
    add_typed_template: OnceCell<ModelTemplate>,
    list_template: OnceCell<ModelTemplate>,
}

impl std::fmt::Debug for EndpointApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointApi")
            .field("name", &self.definition.name)
            .field("return_name", &self.return_name)
            .field("operations", &self.operations)
            .finish_non_exhaustive()
    }
}

impl EndpointApi {
    /// Validates `definition` and resolves it against the collaborators.
    ///
    /// # Errors
    /// - `EndpointDefinition` for invalid rows, operations the transport does
    ///   not expose, or list requests without search criteria.
    /// - `SchemaLookup` when a required type name does not resolve.
    pub fn new(
        definition: EndpointDefinition,
        collaborators: Collaborators,
        options: DispatchOptions,
    ) -> AxlResult<Self> {
        definition.validate()?;
        let operations = definition.operation_names();
        for (operation, remote_name) in operations.iter() {
            if !collaborators.transport.has_operation(remote_name) {
                return Err(AxlError::EndpointDefinition {
                    endpoint: definition.name.clone(),
                    reason: format!(
                        "remote operation `{remote_name}` for '{operation}' is not exposed \
                         by the service"
                    ),
                });
            }
        }

        let type_names = definition.type_names();
        let schema = resolve_schema(&definition, &type_names, &collaborators)?;

        debug!(
            "event=endpoint_init module=endpoint status=ok endpoint={} operations={}",
            definition.name,
            operations.len()
        );

        Ok(Self {
            return_name: definition.return_name(),
            definition,
            type_names,
            operations,
            collaborators,
            options,
            schema,
            add_template: OnceCell::new(),
            add_typed_template: OnceCell::new(),
            list_template: OnceCell::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &EndpointDefinition {
        &self.definition
    }

    pub fn return_name(&self) -> &str {
        &self.return_name
    }

    pub fn type_names(&self) -> &TypeNames {
        &self.type_names
    }

    pub fn supports(&self, operation: Operation) -> bool {
        self.definition.supports(operation)
    }

    /// Remote operation name bound to `operation`, if it issues a call.
    pub fn operation_name(&self, operation: Operation) -> Option<&str> {
        self.operations.get(operation)
    }

    /// Empty `add` template for this endpoint. No remote call.
    ///
    /// `sanitized` collapses reference-wrapper sub-templates into a single
    /// leaf; `include_types` reports declared leaf type names.
    pub fn model(&self, sanitized: bool, include_types: bool) -> AxlResult<ModelTemplate> {
        self.gate(Operation::Model)?;
        let template = self.add_template(include_types)?;
        if sanitized {
            Ok(sanitize_map(template, &self.options.reference_shape))
        } else {
            Ok(template)
        }
    }

    /// Builds a local-only payload for pre-staging before `add`.
    pub fn create(&self, fields: Map<String, Value>) -> AxlResult<DataModel> {
        self.gate(Operation::Create)?;
        let payload = self
            .collaborators
            .factory
            .build_local(&self.type_names.add_type, fields)?;
        self.wrap(payload)
    }

    /// Adds one record; returns its opaque identifier.
    ///
    /// Declared defaults are merged under `fields`. Field completeness is
    /// left to the remote side.
    pub fn add(&self, fields: Map<String, Value>) -> AxlResult<String> {
        self.gate(Operation::Add)?;
        let mut payload = self.definition.defaults.clone();
        payload.extend(fields);

        let mut args = Map::new();
        args.insert(self.return_name.clone(), Value::Object(payload));
        self.identifier_call(Operation::Add, args)
    }

    /// Fetches one record addressed by `identifiers`.
    pub fn get(
        &self,
        identifiers: Map<String, Value>,
        returned_tags: Option<ReturnedTags>,
    ) -> AxlResult<DataModel> {
        self.gate(Operation::Get)?;
        self.validate_identifiers(&identifiers)?;

        let mut args = identifiers;
        if let Some(tags) = returned_tags {
            args.insert(RETURNED_TAGS_KEY.to_string(), Value::Object(tags.into_map()));
        }

        let (operation, response) = self.call(Operation::Get, args)?;
        match unwrap_named(&response, &self.return_name) {
            Some(record) => self.wrap(record.clone()),
            None => Err(AxlError::UnexpectedResponse {
                operation: operation.to_string(),
                reason: format!("response has no `return.{}` record", self.return_name),
            }),
        }
    }

    /// Updates one record; `fields` carries identifiers and new values.
    pub fn update(&self, fields: Map<String, Value>) -> AxlResult<String> {
        self.gate(Operation::Update)?;
        self.validate_identifiers(&fields)?;
        self.identifier_call(Operation::Update, fields)
    }

    /// Lists records matching `request`.
    ///
    /// Without search criteria, the first declared search field is matched
    /// against `%`; that pick is presumptive and may not be the natural key
    /// of every endpoint. An absent or non-list result collection yields an
    /// empty list: "no results" and "empty response" are not distinguished.
    pub fn list(&self, request: ListRequest) -> AxlResult<Vec<DataModel>> {
        self.gate(Operation::List)?;

        let search_criteria = match request.search_criteria {
            Some(criteria) if !criteria.is_empty() => criteria,
            _ => self.default_search_criteria()?,
        };
        let returned_tags = match request.returned_tags {
            Some(tags) if !tags.is_empty() => tags.into_map(),
            _ => self.list_template()?,
        };

        let mut args = Map::new();
        args.insert(SEARCH_CRITERIA_KEY.to_string(), Value::Object(search_criteria));
        args.insert(RETURNED_TAGS_KEY.to_string(), Value::Object(returned_tags));
        if let Some(skip) = request.skip {
            args.insert(SKIP_KEY.to_string(), Value::from(skip));
        }
        if let Some(first) = request.first {
            args.insert(FIRST_KEY.to_string(), Value::from(first));
        }

        let (operation, response) = self.call(Operation::List, args)?;
        match unwrap_named(&response, &self.return_name) {
            Some(Value::Array(records)) => records
                .iter()
                .map(|record| self.wrap(record.clone()))
                .collect(),
            _ => {
                info!(
                    "event=list_empty module=endpoint status=ok endpoint={} operation={}",
                    self.definition.name, operation
                );
                Ok(Vec::new())
            }
        }
    }

    /// Removes one record; returns its identifier.
    pub fn remove(&self, identifiers: Map<String, Value>) -> AxlResult<String> {
        self.device_verb(Operation::Remove, identifiers)
    }

    /// Applies pending configuration to a device.
    pub fn apply(&self, identifiers: Map<String, Value>) -> AxlResult<String> {
        self.device_verb(Operation::Apply, identifiers)
    }

    /// Restarts a device.
    pub fn restart(&self, identifiers: Map<String, Value>) -> AxlResult<String> {
        self.device_verb(Operation::Restart, identifiers)
    }

    /// Resets a device.
    pub fn reset(&self, identifiers: Map<String, Value>) -> AxlResult<String> {
        self.device_verb(Operation::Reset, identifiers)
    }

    /// Choice lists offered for one record, e.g. the valid values of a new
    /// line appearance on a phone.
    ///
    /// The response is returned as a raw record; option payloads nest
    /// freely and are not subject to the flat `DataModel` rule.
    pub fn options(
        &self,
        uuid: &str,
        returned_choices: Option<ReturnedTags>,
    ) -> AxlResult<RawRecord> {
        self.gate(Operation::Options)?;

        let mut args = Map::new();
        args.insert(UUID_KEY.to_string(), Value::String(uuid.to_string()));
        if let Some(choices) = returned_choices {
            args.insert(
                RETURNED_CHOICES_KEY.to_string(),
                Value::Object(choices.into_map()),
            );
        }

        let (operation, response) = self.call(Operation::Options, args)?;
        match unwrap_named(&response, &self.return_name) {
            Some(Value::Object(record)) => Ok(record.clone()),
            _ => Err(AxlError::UnexpectedResponse {
                operation: operation.to_string(),
                reason: format!("response has no `return.{}` options record", self.return_name),
            }),
        }
    }

    /// Default `list` search criteria: `{first_search_field: "%"}`.
    pub fn default_search_criteria(&self) -> AxlResult<Map<String, Value>> {
        let field = self.schema.default_search_field.as_deref().ok_or_else(|| {
            AxlError::UnsupportedOperation {
                endpoint: self.definition.name.clone(),
                operation: Operation::List.to_string(),
            }
        })?;
        let mut criteria = Map::new();
        criteria.insert(field.to_string(), Value::String(WILDCARD.to_string()));
        Ok(criteria)
    }

    fn device_verb(
        &self,
        operation: Operation,
        identifiers: Map<String, Value>,
    ) -> AxlResult<String> {
        self.gate(operation)?;
        self.validate_identifiers(&identifiers)?;
        self.identifier_call(operation, identifiers)
    }

    fn gate(&self, operation: Operation) -> AxlResult<()> {
        if self.definition.supports(operation) {
            return Ok(());
        }
        Err(AxlError::UnsupportedOperation {
            endpoint: self.definition.name.clone(),
            operation: operation.to_string(),
        })
    }

    fn validate_identifiers(&self, supplied: &Map<String, Value>) -> AxlResult<()> {
        self.definition
            .identifier_choices
            .validate(&self.definition.name, supplied)
    }

    fn identifier_call(&self, operation: Operation, args: Map<String, Value>) -> AxlResult<String> {
        let (remote_name, response) = self.call(operation, args)?;
        unwrap_identifier(remote_name, &response)
    }

    fn call(&self, operation: Operation, args: Map<String, Value>) -> AxlResult<(&str, Value)> {
        let remote_name =
            self.operations
                .get(operation)
                .ok_or_else(|| AxlError::UnsupportedOperation {
                    endpoint: self.definition.name.clone(),
                    operation: operation.to_string(),
                })?;

        debug!(
            "event=endpoint_call module=endpoint status=start endpoint={} operation={} arg_keys={}",
            self.definition.name,
            remote_name,
            args.len()
        );
        match self.collaborators.transport.invoke(remote_name, args) {
            Ok(response) => Ok((remote_name, response)),
            Err(fault) => {
                error!(
                    "event=endpoint_call module=endpoint status=error endpoint={} operation={} \
                     code=AXL-E008",
                    self.definition.name,
                    remote_name
                );
                Err(AxlError::RemoteFault {
                    operation: remote_name.to_string(),
                    message: fault.message,
                })
            }
        }
    }

    fn wrap(&self, record: Value) -> AxlResult<DataModel> {
        DataModel::with_shape(
            self.definition.name.clone(),
            record,
            self.options.reference_shape.clone(),
        )
    }

    fn add_template(&self, include_types: bool) -> AxlResult<ModelTemplate> {
        let node = self.schema.add.as_ref().ok_or_else(|| AxlError::UnsupportedOperation {
            endpoint: self.definition.name.clone(),
            operation: Operation::Model.to_string(),
        })?;
        let cell = if include_types {
            &self.add_typed_template
        } else {
            &self.add_template
        };
        self.memoized(cell, node, include_types)
    }

    fn list_template(&self) -> AxlResult<ModelTemplate> {
        let node = self.schema.list.as_ref().ok_or_else(|| AxlError::UnsupportedOperation {
            endpoint: self.definition.name.clone(),
            operation: Operation::List.to_string(),
        })?;
        self.memoized(&self.list_template, node, false)
    }

    fn memoized(
        &self,
        cell: &OnceCell<ModelTemplate>,
        node: &SchemaNode,
        include_types: bool,
    ) -> AxlResult<ModelTemplate> {
        if !self.options.cache_templates {
            return build_template(node, include_types);
        }
        cell.get_or_try_init(|| build_template(node, include_types))
            .cloned()
    }
}

fn resolve_schema(
    definition: &EndpointDefinition,
    type_names: &TypeNames,
    collaborators: &Collaborators,
) -> AxlResult<ResolvedSchema> {
    let schema = &collaborators.schema;

    let add = if definition.supports(Operation::Model) || definition.supports(Operation::Create) {
        Some(schema.get_type(&type_names.add_type)?)
    } else {
        None
    };

    // Get arguments come from caller identifiers; the request type is only
    // checked for existence.
    if definition.supports(Operation::Get) {
        schema.get_type(&type_names.get_request_type)?;
    }

    let (list, default_search_field) = if definition.supports(Operation::List) {
        let request = schema.get_type(&type_names.list_request_type)?;
        let field = first_search_field(&request).ok_or_else(|| AxlError::EndpointDefinition {
            endpoint: definition.name.clone(),
            reason: format!(
                "`{}` declares no search criteria fields",
                type_names.list_request_type
            ),
        })?;
        (
            Some(schema.get_type(&type_names.list_type)?),
            Some(field.to_string()),
        )
    } else {
        (None, None)
    };

    Ok(ResolvedSchema {
        add,
        list,
        default_search_field,
    })
}
