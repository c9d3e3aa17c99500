//! Small record and identifier helpers.

use crate::error::{AxlError, AxlResult};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Converts field names into a returned-tags mapping of `{name: ""}`.
pub fn returned_tags_from_names<I, S>(names: I) -> Map<String, Value>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names
        .into_iter()
        .map(|name| (name.into(), Value::String(String::new())))
        .collect()
}

/// Strips the brace encapsulation of a remote identifier.
///
/// `{ABC-123}` becomes `ABC-123`; unbraced input is returned as-is. The
/// identifier format itself is not validated.
pub fn extract_pkid(identifier: &str) -> String {
    identifier.replace(['{', '}'], "")
}

/// Parses a braced or bare remote identifier into a UUID.
pub fn parse_record_uuid(identifier: &str) -> AxlResult<Uuid> {
    Uuid::parse_str(&extract_pkid(identifier.trim())).map_err(|err| {
        AxlError::UnexpectedResponse {
            operation: "parse_record_uuid".to_string(),
            reason: format!("`{identifier}` is not a record uuid: {err}"),
        }
    })
}

/// Builds a `Map` from `(key, value)` pairs.
///
/// Convenience for identifier arguments, e.g. `fields([("name", "PT1".into())])`.
pub fn fields<I, K>(pairs: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value))
        .collect()
}
