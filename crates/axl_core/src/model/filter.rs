//! Shape projection of raw records onto target templates.
//!
//! Typical use is re-purposing a `get`/`list` response for an `add` request,
//! e.g. projecting an `RPhone` record onto the `XPhone` template.
//!
//! # Invariants
//! - Output keys are a subset of the template keys, in template order.
//! - List values are projected element-wise; output length follows the
//!   source list, not the one-element template list.
//! - Wrapper-shaped source/template pairs pass through untouched.

use crate::error::{AxlError, AxlResult};
use crate::model::{is_truthy, ModelTemplate, ReferenceShape};
use serde_json::{Map, Value};

/// Projects `source` onto `template` with the default wrapper shape.
pub fn project(source: &Value, template: &ModelTemplate) -> AxlResult<Value> {
    project_with(source, template, &ReferenceShape::default())
}

/// Projects `source` onto `template` with an explicit wrapper shape.
///
/// Fails with [`AxlError::ShapeProjection`] when `source` is not a mapping,
/// or when a nested source value cannot be projected onto the template
/// shape at the same key.
pub fn project_with(
    source: &Value,
    template: &ModelTemplate,
    shape: &ReferenceShape,
) -> AxlResult<Value> {
    let Value::Object(map) = source else {
        return Err(AxlError::projection(format!(
            "source must be a mapping, found {}",
            value_kind(source)
        )));
    };
    project_map(map, template, shape).map(Value::Object)
}

/// Map-level projection used by `DataModel::filter`.
pub fn project_map(
    source: &Map<String, Value>,
    template: &ModelTemplate,
    shape: &ReferenceShape,
) -> AxlResult<Map<String, Value>> {
    if shape.matches(source) && shape.matches(template) {
        return Ok(source.clone());
    }

    let mut filtered = Map::new();
    for (key, template_value) in template {
        let Some(source_value) = source.get(key) else {
            continue;
        };
        let projected = match template_value {
            Value::Array(items) if is_record_list_template(items) && is_truthy(source_value) => {
                project_list(key, source_value, &items[0], shape)?
            }
            Value::Object(nested) if is_truthy(source_value) => {
                project_nested(key, source_value, nested, shape)?
            }
            _ => source_value.clone(),
        };
        filtered.insert(key.clone(), projected);
    }
    Ok(filtered)
}

fn is_record_list_template(items: &[Value]) -> bool {
    items.len() == 1 && items[0].is_object()
}

fn project_list(
    key: &str,
    source_value: &Value,
    element_template: &Value,
    shape: &ReferenceShape,
) -> AxlResult<Value> {
    let Value::Array(elements) = source_value else {
        return Err(AxlError::projection(format!(
            "`{key}` is a list in the template but {} in the source",
            value_kind(source_value)
        )));
    };
    let Value::Object(element_template) = element_template else {
        return Err(AxlError::projection(format!(
            "`{key}` template element is not a mapping"
        )));
    };

    elements
        .iter()
        .map(|element| project_nested(key, element, element_template, shape))
        .collect::<AxlResult<Vec<_>>>()
        .map(Value::Array)
}

fn project_nested(
    key: &str,
    source_value: &Value,
    template: &ModelTemplate,
    shape: &ReferenceShape,
) -> AxlResult<Value> {
    match source_value {
        Value::Object(map) => project_map(map, template, shape).map(Value::Object),
        other => Err(AxlError::projection(format!(
            "`{key}` is a mapping in the template but {} in the source",
            value_kind(other)
        ))),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::{project, project_with};
    use crate::error::AxlError;
    use crate::model::{ModelTemplate, ReferenceShape};
    use proptest::prelude::*;
    use proptest::test_runner::TestCaseError;
    use serde_json::{json, Map, Value};

    fn template(value: Value) -> ModelTemplate {
        match value {
            Value::Object(map) => map,
            other => panic!("template fixture must be a mapping, got {other}"),
        }
    }

    #[test]
    fn drops_keys_absent_from_template_inside_lists() {
        let target = template(json!({
            "name": "",
            "members": [{"priority": "", "callManagerName": ""}]
        }));
        let record = json!({
            "name": "G1",
            "members": [{"priority": 1, "callManagerName": "cm1", "extra": "x"}]
        });

        assert_eq!(
            project(&record, &target).expect("projection"),
            json!({"name": "G1", "members": [{"priority": 1, "callManagerName": "cm1"}]})
        );
    }

    #[test]
    fn list_output_length_follows_source() {
        let target = template(json!({"members": [{"index": ""}]}));
        let record = json!({"members": [{"index": 1, "x": 0}, {"index": 2}, {"index": 3}]});

        let projected = project(&record, &target).expect("projection");
        assert_eq!(projected["members"], json!([{"index": 1}, {"index": 2}, {"index": 3}]));
    }

    #[test]
    fn keeps_only_template_keys_in_template_order() {
        let target = template(json!({"b": "", "a": "", "missing": ""}));
        let record = json!({"a": 1, "z": 26, "b": 2});

        let projected = project(&record, &target).expect("projection");
        let keys: Vec<&str> = projected
            .as_object()
            .expect("mapping")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn recurses_into_truthy_nested_mappings() {
        let target = template(json!({
            "lines": {"line": [{"index": "", "dirn": {"pattern": ""}}]}
        }));
        let record = json!({
            "lines": {"line": [{
                "index": 1,
                "label": "x",
                "dirn": {"pattern": "1000", "uuid": "u"}
            }]}
        });

        assert_eq!(
            project(&record, &target).expect("projection"),
            json!({"lines": {"line": [{"index": 1, "dirn": {"pattern": "1000"}}]}})
        );
    }

    #[test]
    fn carries_falsy_nested_values_through_unprojected() {
        let target = template(json!({"lines": {"line": [{"index": ""}]}, "members": [{"a": ""}]}));
        let record = json!({"lines": null, "members": []});

        assert_eq!(
            project(&record, &target).expect("projection"),
            json!({"lines": null, "members": []})
        );
    }

    #[test]
    fn reference_wrapper_pairs_pass_through() {
        let target = template(json!({"value": "", "id": ""}));
        let record = json!({"value": "CSS1", "id": "{u1}"});
        assert_eq!(project(&record, &target).expect("projection"), record);

        let nested_target = template(json!({"callingSearchSpaceName": {"value": "", "id": ""}}));
        let nested = json!({"callingSearchSpaceName": {"value": "CSS1"}});
        assert_eq!(project(&nested, &nested_target).expect("projection"), nested);
    }

    #[test]
    fn alternate_wrapper_shape_passes_through() {
        let target = template(json!({"_value_1": "", "uuid": ""}));
        let record = json!({"_value_1": "PT1", "uuid": "{u}"});
        assert_eq!(
            project_with(&record, &target, &ReferenceShape::zeep()).expect("projection"),
            record
        );
    }

    #[test]
    fn rejects_non_mapping_source() {
        let target = template(json!({"name": ""}));
        let err = project(&json!(["not", "a", "map"]), &target).unwrap_err();
        assert!(matches!(err, AxlError::ShapeProjection { .. }));
    }

    #[test]
    fn rejects_inconsistent_list_pairing() {
        let target = template(json!({"members": [{"index": ""}]}));
        let err = project(&json!({"members": "oops"}), &target).unwrap_err();
        assert!(matches!(err, AxlError::ShapeProjection { .. }));

        let err = project(&json!({"members": [1, 2]}), &target).unwrap_err();
        assert!(matches!(err, AxlError::ShapeProjection { .. }));
    }

    #[test]
    fn scalar_template_values_copy_source_verbatim() {
        let target = template(json!({"name": "", "tags": ["x"]}));
        let record = json!({"name": {"odd": true}, "tags": [1, 2]});
        assert_eq!(project(&record, &target).expect("projection"), record);
    }

    fn arb_record() -> impl Strategy<Value = Map<String, Value>> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-z0-9 ]{0,8}".prop_map(Value::String),
        ];
        let value = leaf.prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("k[a-z]{0,4}", inner, 0..4)
                    .prop_map(|map| Value::Object(map.into_iter().collect())),
            ]
        });
        prop::collection::btree_map("k[a-z]{0,4}", value, 0..6)
            .prop_map(|map| map.into_iter().collect())
    }

    /// Template over a mask-selected subset of `record`'s keys, nested maps
    /// becoming nested templates.
    fn template_from(record: &Map<String, Value>, mask: u64) -> ModelTemplate {
        record
            .iter()
            .enumerate()
            .filter(|(index, _)| mask & (1 << (index % 64)) != 0)
            .map(|(_, (key, value))| {
                let shape = match value {
                    Value::Object(nested) => {
                        Value::Object(template_from(nested, mask.rotate_left(7)))
                    }
                    _ => Value::String(String::new()),
                };
                (key.clone(), shape)
            })
            .collect()
    }

    fn check_projection(
        projected: &Map<String, Value>,
        record: &Map<String, Value>,
        target: &ModelTemplate,
    ) -> Result<(), TestCaseError> {
        let projected_keys: Vec<&String> = projected.keys().collect();
        let target_keys: Vec<&String> = target.keys().collect();
        prop_assert_eq!(projected_keys, target_keys);

        for (key, template_value) in target {
            match (template_value, &record[key], &projected[key]) {
                (Value::Object(nested), Value::Object(source), Value::Object(out))
                    if !source.is_empty() =>
                {
                    check_projection(out, source, nested)?;
                }
                (_, source, out) => prop_assert_eq!(out, source),
            }
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn projection_keeps_exactly_template_keys(
            record in arb_record(),
            mask in any::<u64>(),
        ) {
            let target = template_from(&record, mask);
            let projected = project(&Value::Object(record.clone()), &target)
                .expect("superset records always project");
            let Value::Object(projected) = projected else {
                return Err(TestCaseError::fail("projection must yield a mapping"));
            };
            check_projection(&projected, &record, &target)?;
        }
    }
}
