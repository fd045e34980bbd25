//! Editor schema generation
//!
//! Produces a plain JSON schema a text editor can validate a values document
//! against: context-resolved defaults and options are inlined, presentation
//! keywords (`render`, `listEnum`, `hidden`, `x-onyxia`) are stripped and every
//! object with declared properties becomes closed and fully required.
//!
//! The pass never fails. Item schemas are visited once, outside the scope of
//! any particular element, so an override or option list that only resolves
//! per element is simply left out.

use serde_json::{Map, Value};

use super::resolve_override_default;
use crate::context::ContextView;
use crate::enum_options::resolve_enum;
use crate::path::ValuePath;
use crate::schema::SchemaNode;

pub(crate) fn build_editor_schema(node: &SchemaNode, context: &ContextView<'_>, path: &ValuePath) -> Value {
    let mut out = Map::new();

    if let Some(schema_type) = node.schema_type {
        out.insert("type".into(), Value::from(schema_type.as_str()));
    }
    if let Some(title) = &node.title {
        out.insert("title".into(), Value::from(title.as_str()));
    }
    if let Some(description) = &node.description {
        out.insert("description".into(), Value::from(description.as_str()));
    }
    if let Some(const_value) = &node.const_value {
        out.insert("const".into(), const_value.clone());
    }

    let resolved_default = resolve_override_default(node, context, path).unwrap_or_else(|e| {
        tracing::debug!("editor schema: no context default for '{}': {}", path, e);
        None
    });
    if let Some(default) = resolved_default.or_else(|| node.default.clone()) {
        out.insert("default".into(), default);
    }

    match resolve_enum(node, context, path) {
        Ok(Some(options)) => {
            out.insert("enum".into(), Value::Array(options));
        }
        Ok(None) => {}
        Err(e) => tracing::debug!("editor schema: no options for '{}': {}", path, e),
    }

    if let Some(pattern) = &node.pattern {
        out.insert("pattern".into(), Value::from(pattern.as_str()));
    }
    if let Some(min_items) = node.min_items {
        out.insert("minItems".into(), Value::from(min_items));
    }
    if let Some(max_items) = node.max_items {
        out.insert("maxItems".into(), Value::from(max_items));
    }
    for (keyword, value) in &node.presentation {
        out.insert(keyword.clone(), value.clone());
    }

    if let Some(items) = node.items.as_deref() {
        out.insert(
            "items".into(),
            build_editor_schema(items, context, &path.push_index(0)),
        );
    }

    if let Some(properties) = &node.properties {
        let mut schemas = Map::new();
        for (name, property) in properties {
            schemas.insert(
                name.clone(),
                build_editor_schema(property, context, &path.push_key(name)),
            );
        }
        if !properties.is_empty() {
            let required = properties.iter().map(|(name, _)| Value::from(name.as_str())).collect();
            out.insert("properties".into(), Value::Object(schemas));
            out.insert("required".into(), Value::Array(required));
            out.insert("additionalProperties".into(), Value::Bool(false));
        } else {
            out.insert("properties".into(), Value::Object(schemas));
        }
    }

    for (keyword, value) in &node.extra {
        out.entry(keyword.clone()).or_insert_with(|| value.clone());
    }

    Value::Object(out)
}
