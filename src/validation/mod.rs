//! Value validation against a schema node
//!
//! Validation never fails on an ordinary mismatch: it reports
//! [`Validation::Invalid`], optionally carrying a reasonable approximation (a
//! coerced value that does satisfy the node). Errors are reserved for schema
//! defects such as a list-rendered field without options.

pub mod coerce;

use serde_json::{Map, Number, Value};

use crate::context::ContextView;
use crate::enum_options::resolve_enum;
use crate::error::Result;
use crate::path::ValuePath;
use crate::schema::{SchemaNode, SchemaType};
use coerce::{coerce, format_f64, number_value, parse_number};

/// Outcome of validating one value
#[derive(Clone, Debug, PartialEq)]
pub enum Validation {
    Valid,
    Invalid {
        /// Coerced value that satisfies the node, when one exists
        approximation: Option<Value>,
    },
}

impl Validation {
    fn rejected() -> Self {
        Validation::Invalid { approximation: None }
    }

    fn approximated(value: Value) -> Self {
        Validation::Invalid {
            approximation: Some(value),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }

    pub fn approximation(&self) -> Option<&Value> {
        match self {
            Validation::Invalid { approximation } => approximation.as_ref(),
            Validation::Valid => None,
        }
    }

    /// The value to use: `value` itself when valid, else the approximation
    pub fn usable(self, value: Value) -> Option<Value> {
        match self {
            Validation::Valid => Some(value),
            Validation::Invalid { approximation } => approximation,
        }
    }
}

/// Validate `value` against `node`, including `const` and option membership
pub fn validate(node: &SchemaNode, value: &Value, context: &ContextView<'_>, path: &ValuePath) -> Result<Validation> {
    let structural = validate_structure(node, value, context, path)?;

    let candidate = match &structural {
        Validation::Valid => value,
        Validation::Invalid {
            approximation: Some(approximation),
        } => approximation,
        Validation::Invalid { approximation: None } => return Ok(structural),
    };

    if let Some(const_value) = &node.const_value {
        if candidate != const_value {
            return Ok(Validation::rejected());
        }
    }

    if let Some(options) = resolve_enum(node, context, path)? {
        if !options.contains(candidate) {
            return Ok(Validation::rejected());
        }
    }

    Ok(structural)
}

/// Validate type and refinements, ignoring `const` and options of `node`
///
/// Children of arrays and objects are validated in full.
pub(crate) fn validate_structure(
    node: &SchemaNode,
    value: &Value,
    context: &ContextView<'_>,
    path: &ValuePath,
) -> Result<Validation> {
    let Some(schema_type) = node.resolved_type() else {
        return Ok(Validation::Valid);
    };

    match (schema_type, value) {
        (SchemaType::String, Value::String(s)) => Ok(check_string(node, s)),
        (SchemaType::Boolean, Value::Bool(_)) => Ok(Validation::Valid),
        (SchemaType::Integer | SchemaType::Number, Value::Number(n)) => Ok(check_number(node, schema_type, n)),
        (SchemaType::Array, Value::Array(elements)) => check_array(node, elements, context, path),
        (SchemaType::Object, Value::Object(fields)) => check_object(node, fields, context, path),
        (SchemaType::Array | SchemaType::Object, _) => Ok(Validation::rejected()),
        (_, mismatched) => {
            let Some(coerced) = coerce(mismatched, schema_type) else {
                return Ok(Validation::rejected());
            };
            Ok(match validate_structure(node, &coerced, context, path)? {
                Validation::Valid => Validation::approximated(coerced),
                other => other,
            })
        }
    }
}

fn check_string(node: &SchemaNode, s: &str) -> Validation {
    if let Some(pattern) = &node.pattern {
        if !pattern.is_match(s) {
            return Validation::rejected();
        }
    }

    if !node.is_slider() {
        return Validation::Valid;
    }

    let magnitude = match node.slider.unit() {
        Some(unit) => match s.trim().strip_suffix(unit) {
            Some(stripped) => parse_number(stripped),
            None => {
                // "2" for a slider in "Gi": offer "2Gi"
                let Some(n) = parse_number(s) else {
                    return Validation::rejected();
                };
                let candidate = format!("{}{}", format_f64(n), unit);
                return match check_string(node, &candidate) {
                    Validation::Valid => Validation::approximated(Value::String(candidate)),
                    _ => Validation::rejected(),
                };
            }
        },
        None => parse_number(s),
    };

    match magnitude {
        Some(n) if within_slider_bounds(node, n) => Validation::Valid,
        _ => Validation::rejected(),
    }
}

fn within_slider_bounds(node: &SchemaNode, n: f64) -> bool {
    node.slider.min.map_or(true, |min| n >= min) && node.slider.max.map_or(true, |max| n <= max)
}

fn check_number(node: &SchemaNode, schema_type: SchemaType, n: &Number) -> Validation {
    let Some(f) = n.as_f64() else {
        return Validation::rejected();
    };

    if schema_type == SchemaType::Integer && f.fract() != 0.0 {
        return match number_value(f.round()) {
            Some(Value::Number(rounded)) if check_number(node, schema_type, &rounded).is_valid() => {
                Validation::approximated(Value::Number(rounded))
            }
            _ => Validation::rejected(),
        };
    }

    if node.minimum.is_some_and(|min| f < min) {
        return Validation::rejected();
    }

    if node.is_slider() && !within_slider_bounds(node, f) {
        return Validation::rejected();
    }

    Validation::Valid
}

fn check_array(
    node: &SchemaNode,
    elements: &[Value],
    context: &ContextView<'_>,
    path: &ValuePath,
) -> Result<Validation> {
    let len = elements.len() as u64;
    if node.min_items.is_some_and(|min| len < min) || node.max_items.is_some_and(|max| len > max) {
        return Ok(Validation::rejected());
    }

    let Some(items) = node.items.as_deref() else {
        return Ok(Validation::Valid);
    };

    let mut coerced: Option<Vec<Value>> = None;
    for (i, element) in elements.iter().enumerate() {
        match validate(items, element, context, &path.push_index(i))? {
            Validation::Valid => {
                if let Some(coerced) = coerced.as_mut() {
                    coerced.push(element.clone());
                }
            }
            Validation::Invalid {
                approximation: Some(approximation),
            } => coerced
                .get_or_insert_with(|| elements[..i].to_vec())
                .push(approximation),
            Validation::Invalid { approximation: None } => return Ok(Validation::rejected()),
        }
    }

    Ok(coerced.map_or(Validation::Valid, |c| Validation::approximated(Value::Array(c))))
}

fn check_object(
    node: &SchemaNode,
    fields: &Map<String, Value>,
    context: &ContextView<'_>,
    path: &ValuePath,
) -> Result<Validation> {
    let Some(properties) = node.properties.as_ref().filter(|p| !p.is_empty()) else {
        return Ok(Validation::Valid);
    };

    let same_keys = fields.len() == properties.len()
        && properties.iter().all(|(name, _)| fields.contains_key(name));
    if !same_keys {
        return Ok(Validation::rejected());
    }

    let mut coerced: Option<Map<String, Value>> = None;
    for (name, property) in properties {
        let Some(field) = fields.get(name) else {
            return Ok(Validation::rejected());
        };
        match validate(property, field, context, &path.push_key(name))? {
            Validation::Valid => {}
            Validation::Invalid {
                approximation: Some(approximation),
            } => {
                coerced
                    .get_or_insert_with(|| fields.clone())
                    .insert(name.clone(), approximation);
            }
            Validation::Invalid { approximation: None } => return Ok(Validation::rejected()),
        }
    }

    Ok(coerced.map_or(Validation::Valid, |c| Validation::approximated(Value::Object(c))))
}
