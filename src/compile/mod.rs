//! Values compilation
//!
//! Resolves every leaf of a chart schema into a concrete value. For each node
//! the first tier that yields a value wins:
//!
//! 1. `const`, which must satisfy its own schema;
//! 2. `x-onyxia.overwriteDefaultWith` resolved against the context (arrays of
//!    objects are mapped element by element through the item schema);
//! 3. the node's own `default`;
//! 4. the previous values document at the same location;
//! 5. for arrays with `minItems > 0`, that many copies of the item default.
//!
//! Objects with declared properties that are not settled by tiers 1-3 are
//! compiled property by property. A node that no tier settles aborts the
//! compilation.

pub mod editor;
pub mod legacy;

use serde_json::{Map, Value};

use crate::context::{AccessTracker, ContextView};
use crate::error::{FormError, Result};
use crate::path::ValuePath;
use crate::schema::{SchemaNode, SchemaType};
use crate::template::resolve_expression;
use crate::validation::{validate, Validation};

/// Upper bound on the elements synthesised from `minItems`
const MAX_SYNTHESIZED_ITEMS: u64 = 10_000;

/// How the previous values document participates in compilation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompileMode {
    /// Previous values only fill leaves that have no better source
    #[default]
    Strict,
    /// Additionally copy over every previous key the schema does not produce
    IncludeLegacyDefaults,
}

/// Output of [`compute_helm_values`]
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledValues {
    /// The concrete values document
    pub values: Value,
    /// The schema with resolved defaults and options, for strict validation
    pub editor_schema: Value,
    /// Whether the reserved context key was read while compiling `values`
    pub uses_reserved_context_key: bool,
}

/// Compile a values document from a schema, a previous document and a context
pub fn compute_helm_values(
    schema: &SchemaNode,
    legacy_values: Option<&Value>,
    context: &Value,
    mode: CompileMode,
    reserved_context_key: &str,
) -> Result<CompiledValues> {
    let tracker = AccessTracker::new();
    let view = ContextView::new(context, &tracker);
    let mut values = compile_node(schema, legacy_values, &view, &ValuePath::root())?;
    let uses_reserved_context_key = tracker.was_touched(reserved_context_key);

    // Reads made while building the editor schema are not part of the contract
    let editor_tracker = AccessTracker::new();
    let editor_schema = editor::build_editor_schema(
        schema,
        &ContextView::new(context, &editor_tracker),
        &ValuePath::root(),
    );

    if mode == CompileMode::IncludeLegacyDefaults {
        if let Some(legacy_values) = legacy_values {
            legacy::backfill_legacy_values(&mut values, legacy_values);
        }
    }

    Ok(CompiledValues {
        values,
        editor_schema,
        uses_reserved_context_key,
    })
}

/// Compile one schema node
///
/// Fails with [`FormError::UnresolvableValue`] when no tier applies.
pub(crate) fn compile_node(
    node: &SchemaNode,
    legacy: Option<&Value>,
    context: &ContextView<'_>,
    path: &ValuePath,
) -> Result<Value> {
    if let Some(const_value) = &node.const_value {
        if !validate(node, const_value, context, path)?.is_valid() {
            return Err(FormError::ConstViolatesSchema { path: path.clone() });
        }
        return Ok(const_value.clone());
    }

    if let Some(value) = resolve_override_default(node, context, path)? {
        return Ok(value);
    }

    if let Some(default) = &node.default {
        if validate(node, default, context, path)?.is_valid() {
            return Ok(default.clone());
        }
        tracing::debug!("default of '{}' does not satisfy its schema, skipping", path);
    }

    if node.resolved_type() == Some(SchemaType::Object) && node.has_properties() {
        return compile_properties(node, legacy, context, path);
    }

    match legacy {
        Some(Value::Null) | None => {}
        Some(previous) => {
            return match validate(node, previous, context, path)? {
                Validation::Valid => Ok(previous.clone()),
                Validation::Invalid {
                    approximation: Some(approximation),
                } => Ok(approximation),
                Validation::Invalid { approximation: None } => {
                    Err(FormError::LegacyValueInvalid { path: path.clone() })
                }
            };
        }
    }

    if node.resolved_type() == Some(SchemaType::Array) {
        if let (Some(min_items), Some(items)) = (node.min_items.filter(|n| *n > 0), node.items.as_deref()) {
            let limit = node.max_items.map_or(MAX_SYNTHESIZED_ITEMS, |max| max.min(MAX_SYNTHESIZED_ITEMS));
            if min_items > limit {
                return Err(FormError::InvalidSchema {
                    path: path.clone(),
                    reason: format!("minItems {} exceeds the limit of {} items", min_items, limit),
                });
            }
            let item = compile_node(items, None, context, &path.push_index(0))?;
            return Ok(Value::Array(vec![item; min_items as usize]));
        }
    }

    Err(FormError::UnresolvableValue { path: path.clone() })
}

fn compile_properties(
    node: &SchemaNode,
    legacy: Option<&Value>,
    context: &ContextView<'_>,
    path: &ValuePath,
) -> Result<Value> {
    let mut fields = Map::new();
    for (name, property) in node.properties.iter().flatten() {
        let previous = legacy.and_then(|l| l.get(name));
        let value = compile_node(property, previous, context, &path.push_key(name))?;
        fields.insert(name.clone(), value);
    }
    Ok(Value::Object(fields))
}

/// Tier 2: the context-driven default, validated (or approximated)
pub(crate) fn resolve_override_default(
    node: &SchemaNode,
    context: &ContextView<'_>,
    path: &ValuePath,
) -> Result<Option<Value>> {
    let Some(expression) = node.overwrite_default_with() else {
        return Ok(None);
    };
    let Some(resolved) = resolve_expression(expression, context) else {
        tracing::debug!("overwriteDefaultWith of '{}' did not resolve", path);
        return Ok(None);
    };

    match (node.resolved_type(), node.items.as_deref(), resolved) {
        (Some(SchemaType::Array), Some(items), Value::Array(elements))
            if !elements.is_empty() && elements.iter().all(Value::is_object) =>
        {
            // Elements were validated in their own scope; only the length is left
            let mapped = map_array_elements(items, &elements, context, path);
            let len = mapped.len() as u64;
            if node.min_items.is_some_and(|min| len < min) || node.max_items.is_some_and(|max| len > max) {
                tracing::debug!("overwriteDefaultWith of '{}' yields {} items, out of bounds", path, len);
                return Ok(None);
            }
            Ok(Some(Value::Array(mapped)))
        }
        (_, _, resolved) => Ok(validate(node, &resolved, context, path)?.usable(resolved)),
    }
}

/// Compile each element through the item schema with its fields in scope
fn map_array_elements(
    items: &SchemaNode,
    elements: &[Value],
    context: &ContextView<'_>,
    path: &ValuePath,
) -> Vec<Value> {
    elements
        .iter()
        .enumerate()
        .filter_map(|(i, element)| {
            let fields = element.as_object()?;
            let scoped = context.with_overrides(fields);
            match compile_node(items, None, &scoped, &path.push_index(i)) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!("discarding element {} of '{}': {}", i, path, e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile(schema: Value, legacy: Option<Value>, context: Value) -> Result<CompiledValues> {
        let node = SchemaNode::from_value(&schema).unwrap();
        compute_helm_values(&node, legacy.as_ref(), &context, CompileMode::Strict, "s3")
    }

    #[test]
    fn test_const_wins_over_everything() {
        let out = compile(
            json!({
                "type": "object",
                "const": { "r": "const" },
                "default": { "r": "default" },
                "x-onyxia": { "overwriteDefaultWith": "{{x}}" }
            }),
            Some(json!({ "r": "legacy" })),
            json!({ "x": { "r": "context" } }),
        )
        .unwrap();
        assert_eq!(out.values, json!({ "r": "const" }));
    }

    #[test]
    fn test_const_violating_schema_is_fatal() {
        let err = compile(json!({ "type": "integer", "const": "abc" }), None, json!({})).unwrap_err();
        assert!(matches!(err, FormError::ConstViolatesSchema { .. }));
    }

    #[test]
    fn test_override_then_default_then_legacy() {
        let schema = json!({
            "type": "object",
            "properties": {
                "a": { "type": "string", "default": "d", "x-onyxia": { "overwriteDefaultWith": "user.idep" } },
                "b": { "type": "string", "default": "d", "x-onyxia": { "overwriteDefaultWith": "user.nope" } },
                "c": { "type": "string" },
                "d": { "type": "integer", "x-onyxia": { "overwriteDefaultWith": "{{user.uid}}" } }
            }
        });
        let out = compile(
            schema,
            Some(json!({ "a": "old", "b": "old", "c": "old" })),
            json!({ "user": { "idep": "jdoe", "uid": "1001" } }),
        )
        .unwrap();
        assert_eq!(out.values, json!({ "a": "jdoe", "b": "d", "c": "old", "d": 1001 }));
    }

    #[test]
    fn test_unresolvable_leaf_is_fatal() {
        let schema = json!({ "type": "object", "properties": { "c": { "type": "string" } } });
        match compile(schema, None, json!({})) {
            Err(FormError::UnresolvableValue { path }) => assert_eq!(path.to_string(), "c"),
            other => panic!("expected unresolvable value, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_legacy_value_is_fatal() {
        let schema = json!({ "type": "object", "properties": { "n": { "type": "integer" } } });
        let err = compile(schema.clone(), Some(json!({ "n": "many" })), json!({})).unwrap_err();
        assert!(matches!(err, FormError::LegacyValueInvalid { .. }));

        let out = compile(schema, Some(json!({ "n": "12" })), json!({})).unwrap();
        assert_eq!(out.values, json!({ "n": 12 }));
    }

    #[test]
    fn test_min_items_synthesis() {
        let out = compile(
            json!({ "type": "array", "minItems": 3, "items": { "type": "string", "default": "a" } }),
            None,
            json!({}),
        )
        .unwrap();
        assert_eq!(out.values, json!(["a", "a", "a"]));

        let err = compile(
            json!({ "type": "array", "minItems": 1, "items": { "type": "string" } }),
            None,
            json!({}),
        )
        .unwrap_err();
        assert!(matches!(err, FormError::UnresolvableValue { .. }));
    }

    #[test]
    fn test_array_override_maps_elements() {
        let schema = json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "name": { "type": "string", "x-onyxia": { "overwriteDefaultWith": "{{name}}" } },
                    "owner": { "type": "string", "x-onyxia": { "overwriteDefaultWith": "{{user.idep}}" } },
                    "size": { "type": "integer", "x-onyxia": { "overwriteDefaultWith": "{{size}}" } }
                }
            },
            "x-onyxia": { "overwriteDefaultWith": "{{volumes}}" }
        });
        let context = json!({
            "user": { "idep": "jdoe" },
            "volumes": [
                { "name": "data", "size": 10 },
                { "name": "broken" },
                { "name": "scratch", "size": "5" }
            ]
        });
        let out = compile(schema, None, context).unwrap();
        assert_eq!(
            out.values,
            json!([
                { "name": "data", "owner": "jdoe", "size": 10 },
                { "name": "scratch", "owner": "jdoe", "size": 5 }
            ])
        );
    }

    #[test]
    fn test_reserved_key_flag_tracks_reads() {
        let schema = json!({
            "type": "object",
            "properties": {
                "user": { "type": "string", "x-onyxia": { "overwriteDefaultWith": "user.idep" } },
                "bucket": { "type": "string", "const": "fixed", "x-onyxia": { "overwriteDefaultWith": "s3.bucket" } }
            }
        });
        let context = json!({ "user": { "idep": "jdoe" }, "s3": { "bucket": "b" } });
        let out = compile(schema, None, context.clone()).unwrap();
        // The const short-circuits before the s3 expression is read
        assert!(!out.uses_reserved_context_key);

        let schema = json!({
            "type": "object",
            "properties": {
                "bucket": { "type": "string", "default": "x", "x-onyxia": { "overwriteDefaultWith": "s3.missing" } }
            }
        });
        let out = compile(schema, None, context).unwrap();
        assert!(out.uses_reserved_context_key);
        assert_eq!(out.values, json!({ "bucket": "x" }));
    }

    #[test]
    fn test_min_items_beyond_limit_is_rejected() {
        let err = compile(
            json!({ "type": "array", "minItems": 3, "maxItems": 2, "items": { "type": "string", "default": "a" } }),
            None,
            json!({}),
        )
        .unwrap_err();
        assert!(matches!(err, FormError::InvalidSchema { .. }));

        let err = compile(
            json!({ "type": "array", "minItems": u64::MAX, "items": { "type": "string", "default": "a" } }),
            None,
            json!({}),
        )
        .unwrap_err();
        assert!(matches!(err, FormError::InvalidSchema { .. }));
    }

    #[test]
    fn test_element_scoped_options_do_not_break_the_editor_schema() {
        let schema = json!({
            "type": "array",
            "x-onyxia": { "overwriteDefaultWith": "{{volumes}}" },
            "items": {
                "type": "object",
                "properties": {
                    "name": { "type": "string", "x-onyxia": { "overwriteDefaultWith": "{{name}}" } },
                    "size": {
                        "type": "string",
                        "render": "list",
                        "x-onyxia": {
                            "overwriteDefaultWith": "{{size}}",
                            "overwriteListEnumWith": "{{sizes}}"
                        }
                    }
                }
            }
        });
        let context = json!({ "volumes": [{ "name": "data", "size": "s", "sizes": ["s", "m"] }] });

        let out = compile(schema, None, context).unwrap();
        assert_eq!(out.values, json!([{ "name": "data", "size": "s" }]));
        assert!(out.editor_schema["items"]["properties"]["size"].get("enum").is_none());
    }

    #[test]
    fn test_element_field_shadowing_reserved_key_is_not_a_read() {
        let schema = json!({
            "type": "array",
            "x-onyxia": { "overwriteDefaultWith": "{{buckets}}" },
            "items": {
                "type": "object",
                "properties": {
                    "bucket": { "type": "string", "x-onyxia": { "overwriteDefaultWith": "{{s3}}" } }
                }
            }
        });
        let context = json!({ "buckets": [{ "s3": "data" }], "s3": { "bucket": "b" } });

        let out = compile(schema, None, context).unwrap();
        assert_eq!(out.values, json!([{ "bucket": "data" }]));
        assert!(!out.uses_reserved_context_key);
    }
}
