//! JSON schema parsing
//!
//! Turns a `serde_json::Value` holding a chart values schema into a
//! [`SchemaNode`] tree, keeping property declaration order.

use serde_json::{Map, Value};

use super::{Hidden, OnyxiaExtension, Pattern, RenderHint, SchemaNode, SchemaType, SliderExtremity, SliderHints};
use crate::error::{FormError, Result};
use crate::path::ValuePath;

/// Nesting limit used when no settings are supplied
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Keywords interpreted by the engine; anything else lands in `extra`
const KNOWN_KEYWORDS: &[&str] = &[
    "type",
    "title",
    "description",
    "const",
    "default",
    "enum",
    "listEnum",
    "pattern",
    "items",
    "properties",
    "minItems",
    "maxItems",
    "minimum",
    "sliderMin",
    "sliderMax",
    "sliderStep",
    "sliderUnit",
    "sliderExtremity",
    "sliderExtremitySemantic",
    "sliderRangeId",
    "render",
    "hidden",
    "x-onyxia",
];

/// Keywords mirrored unchanged into the editor schema
const PRESENTATION_KEYWORDS: &[&str] = &[
    "minimum",
    "sliderMin",
    "sliderMax",
    "sliderStep",
    "sliderUnit",
    "sliderExtremity",
    "sliderExtremitySemantic",
    "sliderRangeId",
];

impl SchemaNode {
    /// Parse a schema with the default nesting limit
    pub fn from_value(schema: &Value) -> Result<Self> {
        resolve_schema(schema, DEFAULT_MAX_DEPTH)
    }
}

/// Parse a JSON schema value into a SchemaNode tree
pub fn resolve_schema(schema: &Value, max_depth: usize) -> Result<SchemaNode> {
    resolve_node(schema, &ValuePath::root(), 0, max_depth)
}

fn resolve_node(schema: &Value, path: &ValuePath, depth: usize, max_depth: usize) -> Result<SchemaNode> {
    if depth > max_depth {
        return Err(FormError::DepthExceeded {
            path: path.clone(),
            max_depth,
        });
    }

    let obj = schema.as_object().ok_or_else(|| invalid(path, "schema node must be an object"))?;

    let schema_type = match obj.get("type") {
        None => None,
        Some(Value::String(s)) => {
            Some(SchemaType::parse(s).ok_or_else(|| invalid(path, format!("unsupported type '{}'", s)))?)
        }
        // ["string", "null"] style unions: the first non-null member wins
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null")
            .map(|t| SchemaType::parse(t).ok_or_else(|| invalid(path, format!("unsupported type '{}'", t))))
            .transpose()?,
        Some(_) => return Err(invalid(path, "'type' must be a string")),
    };

    let items = match obj.get("items") {
        None => None,
        Some(items @ Value::Object(_)) => {
            Some(Box::new(resolve_node(items, &path.push_index(0), depth + 1, max_depth)?))
        }
        Some(_) => return Err(invalid(path, "'items' must be a single schema")),
    };

    let properties = match obj.get("properties") {
        None => None,
        Some(Value::Object(props)) => {
            let mut properties = Vec::with_capacity(props.len());
            for (name, prop_schema) in props {
                let resolved = resolve_node(prop_schema, &path.push_key(name), depth + 1, max_depth)?;
                properties.push((name.clone(), resolved));
            }
            Some(properties)
        }
        Some(_) => return Err(invalid(path, "'properties' must be an object")),
    };

    let pattern = match obj.get("pattern").and_then(Value::as_str) {
        None => None,
        Some(source) => Some(Pattern::new(source).map_err(|source_error| FormError::InvalidPattern {
            pattern: source.to_string(),
            source: source_error,
        })?),
    };

    let presentation: Map<String, Value> = PRESENTATION_KEYWORDS
        .iter()
        .filter_map(|key| obj.get(*key).map(|value| (key.to_string(), value.clone())))
        .collect();

    let extra: Map<String, Value> = obj
        .iter()
        .filter(|(key, _)| !KNOWN_KEYWORDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(SchemaNode {
        schema_type,
        title: string_of(obj, "title"),
        description: string_of(obj, "description"),
        const_value: obj.get("const").cloned(),
        default: obj.get("default").cloned(),
        enum_values: array_of(obj, "enum"),
        list_enum: array_of(obj, "listEnum"),
        pattern,
        items,
        properties,
        min_items: obj.get("minItems").and_then(Value::as_u64),
        max_items: obj.get("maxItems").and_then(Value::as_u64),
        minimum: obj.get("minimum").and_then(Value::as_f64),
        slider: extract_slider_hints(obj),
        presentation,
        render: obj.get("render").and_then(Value::as_str).and_then(RenderHint::parse),
        hidden: extract_hidden(obj.get("hidden")),
        x_onyxia: obj.get("x-onyxia").and_then(Value::as_object).map(extract_onyxia_extension),
        extra,
    })
}

fn invalid(path: &ValuePath, reason: impl Into<String>) -> FormError {
    FormError::InvalidSchema {
        path: path.clone(),
        reason: reason.into(),
    }
}

fn string_of(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(String::from)
}

fn array_of(obj: &Map<String, Value>, key: &str) -> Option<Vec<Value>> {
    obj.get(key).and_then(Value::as_array).cloned()
}

/// Numbers may be written as strings (`sliderMin: "0"`) in hand-written charts
fn number_of(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    match obj.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn extract_slider_hints(obj: &Map<String, Value>) -> SliderHints {
    SliderHints {
        min: number_of(obj, "sliderMin"),
        max: number_of(obj, "sliderMax"),
        step: number_of(obj, "sliderStep"),
        unit: string_of(obj, "sliderUnit"),
        extremity: match obj.get("sliderExtremity").and_then(Value::as_str) {
            Some("down") => Some(SliderExtremity::Down),
            Some("up") => Some(SliderExtremity::Up),
            _ => None,
        },
        extremity_semantic: string_of(obj, "sliderExtremitySemantic"),
        range_id: string_of(obj, "sliderRangeId"),
    }
}

fn extract_hidden(hidden: Option<&Value>) -> Option<Hidden> {
    match hidden? {
        Value::Bool(flag) => Some(Hidden::Flag(*flag)),
        Value::Object(rule) => {
            let path = rule.get("path").and_then(Value::as_str)?;
            Some(Hidden::When {
                value: rule.get("value").cloned().unwrap_or(Value::Null),
                path: ValuePath::parse(path),
                is_path_relative: rule.get("isPathRelative").and_then(Value::as_bool).unwrap_or(false),
            })
        }
        _ => None,
    }
}

fn extract_onyxia_extension(obj: &Map<String, Value>) -> OnyxiaExtension {
    OnyxiaExtension {
        overwrite_default_with: obj.get("overwriteDefaultWith").cloned(),
        overwrite_list_enum_with: obj.get("overwriteListEnumWith").cloned(),
        hidden: obj.get("hidden").and_then(Value::as_bool),
        readonly: obj.get("readonly").and_then(Value::as_bool),
    }
}
