#![allow(dead_code)]

use axl_core::{
    AxlResult, Collaborators, LocalFactory, RemoteFault, RemoteTransport, SchemaField, SchemaNode,
    StaticSchema,
};
use serde_json::{json, Map, Value};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

pub const RECORD_ID: &str = "{AB6F7A34-2D2B-4B05-9E0E-6C1B2F0C1A11}";

pub fn args(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("test args must be an object")
}

fn reference_node() -> SchemaNode {
    SchemaNode::new(
        "XFkType",
        vec![
            SchemaField::leaf("value", "String50"),
            SchemaField::leaf("id", "XUUID"),
        ],
    )
}

/// Registers `X{name}`, `Get{name}Req`, `List{name}Req` and `L{name}` for
/// each endpoint.
pub fn schema_for(names: &[&str]) -> StaticSchema {
    schema_without(names, &[])
}

/// Like [`schema_for`], leaving out the types named in `missing`.
pub fn schema_without(names: &[&str], missing: &[&str]) -> StaticSchema {
    let mut schema = StaticSchema::new();
    for name in names {
        let nodes = [
            SchemaNode::new(
                format!("X{name}"),
                vec![
                    SchemaField::leaf("name", "String50"),
                    SchemaField::leaf("description", "String100"),
                    SchemaField::composite("ownerName", reference_node()),
                    SchemaField::repeated(
                        "members",
                        SchemaNode::new(
                            "XMember",
                            vec![
                                SchemaField::composite("memberName", reference_node()),
                                SchemaField::leaf("priority", "UnsignedInt"),
                            ],
                        ),
                    ),
                ],
            ),
            SchemaNode::new(
                format!("Get{name}Req"),
                vec![
                    SchemaField::leaf("uuid", "XUUID"),
                    SchemaField::leaf("name", "String50"),
                    SchemaField::composite(
                        "returnedTags",
                        SchemaNode::new(format!("R{name}"), Vec::new()),
                    ),
                ],
            ),
            SchemaNode::new(
                format!("List{name}Req"),
                vec![
                    SchemaField::composite(
                        "searchCriteria",
                        SchemaNode::new(
                            format!("List{name}ReqSearchCriteria"),
                            vec![
                                SchemaField::leaf("name", "String50"),
                                SchemaField::leaf("description", "String100"),
                            ],
                        ),
                    ),
                    SchemaField::composite(
                        "returnedTags",
                        SchemaNode::new(format!("L{name}"), Vec::new()),
                    ),
                ],
            ),
            SchemaNode::new(
                format!("L{name}"),
                vec![
                    SchemaField::leaf("name", "String50"),
                    SchemaField::leaf("description", "String100"),
                ],
            ),
        ];
        for node in nodes {
            if !missing.contains(&node.name.as_str()) {
                schema.insert(node);
            }
        }
    }
    schema
}

/// Transport fake that records every call and replays canned responses.
#[derive(Default)]
pub struct RecordingTransport {
    calls: RefCell<Vec<(String, Map<String, Value>)>>,
    responses: RefCell<BTreeMap<String, Value>>,
    faults: RefCell<BTreeMap<String, String>>,
    hidden: BTreeSet<String>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport that does not expose `operation`.
    pub fn without_operation(mut self, operation: &str) -> Self {
        self.hidden.insert(operation.to_string());
        self
    }

    pub fn respond(&self, operation: &str, response: Value) {
        self.responses
            .borrow_mut()
            .insert(operation.to_string(), response);
    }

    pub fn fail(&self, operation: &str, message: &str) {
        self.faults
            .borrow_mut()
            .insert(operation.to_string(), message.to_string());
    }

    pub fn calls(&self) -> Vec<(String, Map<String, Value>)> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn last_call(&self) -> (String, Map<String, Value>) {
        self.calls
            .borrow()
            .last()
            .cloned()
            .expect("at least one recorded call")
    }
}

impl RemoteTransport for RecordingTransport {
    fn invoke(&self, operation: &str, args: Map<String, Value>) -> Result<Value, RemoteFault> {
        self.calls.borrow_mut().push((operation.to_string(), args));
        if let Some(message) = self.faults.borrow().get(operation) {
            return Err(RemoteFault::new(message.clone()));
        }
        Ok(self
            .responses
            .borrow()
            .get(operation)
            .cloned()
            .unwrap_or_else(|| json!({ "return": RECORD_ID })))
    }

    fn has_operation(&self, operation: &str) -> bool {
        !self.hidden.contains(operation)
    }
}

/// Local factory that echoes the supplied fields and records the type name.
#[derive(Default)]
pub struct EchoFactory {
    built: RefCell<Vec<String>>,
}

impl EchoFactory {
    pub fn built(&self) -> Vec<String> {
        self.built.borrow().clone()
    }
}

impl LocalFactory for EchoFactory {
    fn build_local(&self, type_name: &str, fields: Map<String, Value>) -> AxlResult<Value> {
        self.built.borrow_mut().push(type_name.to_string());
        Ok(Value::Object(fields))
    }
}

pub struct Fixture {
    pub transport: Arc<RecordingTransport>,
    pub factory: Arc<EchoFactory>,
    pub collaborators: Collaborators,
}

pub fn fixture(names: &[&str]) -> Fixture {
    fixture_with(names, RecordingTransport::new())
}

pub fn fixture_with(names: &[&str], transport: RecordingTransport) -> Fixture {
    fixture_from(schema_for(names), transport)
}

pub fn fixture_from(schema: StaticSchema, transport: RecordingTransport) -> Fixture {
    let transport = Arc::new(transport);
    let factory = Arc::new(EchoFactory::default());
    let collaborators = Collaborators::new(
        Arc::new(schema),
        transport.clone(),
        factory.clone(),
    );
    Fixture {
        transport,
        factory,
        collaborators,
    }
}
