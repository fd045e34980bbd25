//! Canonical cross-type conversions between scalars

use serde_json::{Number, Value};

use crate::schema::SchemaType;

/// Render a number the way a user would type it: `4`, `1.5`, never `4.0`
pub fn format_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if !(n.is_i64() || n.is_u64()) && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

pub fn format_f64(f: f64) -> String {
    Number::from_f64(f).map(|n| format_number(&n)).unwrap_or_default()
}

/// JSON number for `f`, integral when `f` has no fractional part
pub fn number_value(f: f64) -> Option<Value> {
    if f.fract() == 0.0 && f.abs() < 9.0e15 {
        Some(Value::from(f as i64))
    } else {
        Number::from_f64(f).map(Value::Number)
    }
}

pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// Name of the runtime type of a value, for diagnostics
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Convert a scalar to `target`, if a canonical conversion exists
///
/// Arrays and objects never convert, in either direction. The result is not
/// checked against any refinement of the target type.
pub fn coerce(value: &Value, target: SchemaType) -> Option<Value> {
    match (target, value) {
        (SchemaType::Array | SchemaType::Object, _) => None,
        (_, Value::Array(_) | Value::Object(_)) => None,

        (SchemaType::String, Value::Number(n)) => Some(Value::String(format_number(n))),
        (SchemaType::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
        (SchemaType::String, _) => None,

        (SchemaType::Integer | SchemaType::Number, Value::String(s)) => {
            parse_number(s).and_then(number_value)
        }
        (SchemaType::Integer | SchemaType::Number, Value::Bool(b)) => Some(Value::from(u8::from(*b))),
        (SchemaType::Integer | SchemaType::Number, _) => None,

        (SchemaType::Boolean, Value::String(s)) => parse_bool(s).map(Value::Bool),
        (SchemaType::Boolean, Value::Number(n)) => match n.as_f64() {
            Some(f) if f == 1.0 => Some(Value::Bool(true)),
            Some(f) if f == 0.0 => Some(Value::Bool(false)),
            _ => None,
        },
        (SchemaType::Boolean, Value::Null) => Some(Value::Bool(false)),
        (SchemaType::Boolean, _) => None,
    }
}
