//! Generic endpoint dispatch.
//!
//! One `EndpointApi` type driven by a data table of `EndpointDefinition`
//! rows replaces hand-written per-endpoint CRUD code.
//!
//! # Invariants
//! - The supported-operation gate runs before identifier validation.
//! - Identifier validation runs before any remote call.

pub mod api;
pub mod catalog;
pub mod definition;
pub mod identifiers;
pub mod operation;
