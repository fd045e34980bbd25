mod common;

use helm_form::{value_path, FormEngine, FormError};
use serde_json::json;

#[test]
fn test_add_array_item_picks_index_aligned_default() {
    let engine = FormEngine::default();
    let schema = common::schema(
        &engine,
        &json!({
            "type": "object",
            "properties": {
                "r": {
                    "type": "array",
                    "items": { "type": "number" },
                    "x-onyxia": { "overwriteDefaultWith": "a.b.c" }
                }
            }
        }),
    );
    let context = json!({ "a": { "b": { "c": [0, 0, 0, 4] } } });
    let mut values = json!({ "r": [1, 2, 3] });

    engine
        .add_array_item(&mut values, &schema, &context, None, &value_path!["r"])
        .unwrap();
    assert_eq!(values, json!({ "r": [1, 2, 3, 4] }));

    // Past the end of the default, the first element is reused
    engine
        .add_array_item(&mut values, &schema, &context, None, &value_path!["r"])
        .unwrap();
    assert_eq!(values, json!({ "r": [1, 2, 3, 4, 0] }));
}

#[test]
fn test_add_array_item_falls_back_to_previous_values() {
    let engine = FormEngine::default();
    let schema = common::schema(
        &engine,
        &json!({
            "type": "object",
            "properties": {
                "hosts": { "type": "array", "items": { "type": "string" } }
            }
        }),
    );
    let previous = json!({ "hosts": ["a.example.org", "b.example.org"] });
    let mut values = json!({ "hosts": ["x.example.org"] });

    engine
        .add_array_item(&mut values, &schema, &json!({}), Some(&previous), &value_path!["hosts"])
        .unwrap();
    assert_eq!(values["hosts"], json!(["x.example.org", "b.example.org"]));
}

#[test]
fn test_add_array_item_of_objects() {
    let engine = FormEngine::default();
    let schema = common::schema(
        &engine,
        &json!({
            "type": "object",
            "properties": {
                "volumes": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string", "default": "data" },
                            "size": { "type": "string", "default": "10Gi" }
                        }
                    }
                }
            }
        }),
    );
    let mut values = json!({ "volumes": [] });

    engine
        .add_array_item(&mut values, &schema, &json!({}), None, &value_path!["volumes"])
        .unwrap();
    assert_eq!(values["volumes"], json!([{ "name": "data", "size": "10Gi" }]));
}

#[test]
fn test_add_array_item_on_non_array_is_fatal() {
    let engine = FormEngine::default();
    let schema = common::schema(
        &engine,
        &json!({
            "type": "object",
            "properties": { "hosts": { "type": "array", "items": { "type": "string", "default": "h" } } }
        }),
    );
    let mut values = json!({ "hosts": "oops" });

    let err = engine
        .add_array_item(&mut values, &schema, &json!({}), None, &value_path!["hosts"])
        .unwrap_err();
    assert!(matches!(err, FormError::ValueTypeMismatch { expected: "array", .. }));
}

#[test]
fn test_remove_array_item() {
    let engine = FormEngine::default();
    let mut values = json!({ "r": [1, 2, 3] });

    engine.remove_array_item(&mut values, &value_path!["r", 0usize]).unwrap();
    assert_eq!(values, json!({ "r": [2, 3] }));

    let mut scalar = json!({ "r": 1 });
    assert!(matches!(
        engine.remove_array_item(&mut scalar, &value_path!["r", 0usize]),
        Err(FormError::ValueTypeMismatch { .. })
    ));
}
