//! Value references against the context
//!
//! `x-onyxia` expressions point into the context. A string expression is
//! - exactly one `{{path}}`: the raw value at `path`, whatever its type;
//! - text mixing literals and `{{path}}` fragments: every fragment must be a
//!   string, number or boolean and the fragments are interpolated;
//! - a bare `path`, read like `{{path}}`.
//!
//! Arrays and objects are resolved element-wise. Resolution is strict: one
//! unresolvable placeholder anywhere makes the whole expression unresolvable.

use serde_json::{Map, Value};

use crate::context::ContextView;
use crate::path::ValuePath;
use crate::validation::coerce::format_number;

#[derive(Debug, PartialEq)]
enum Fragment<'s> {
    Literal(&'s str),
    Placeholder(&'s str),
}

fn split_fragments(s: &str) -> Vec<Fragment<'_>> {
    let mut fragments = Vec::new();
    let mut rest = s;
    while let Some(open) = rest.find("{{") {
        let Some(close) = rest[open + 2..].find("}}") else {
            break;
        };
        if open > 0 {
            fragments.push(Fragment::Literal(&rest[..open]));
        }
        fragments.push(Fragment::Placeholder(rest[open + 2..open + 2 + close].trim()));
        rest = &rest[open + 2 + close + 2..];
    }
    if !rest.is_empty() {
        fragments.push(Fragment::Literal(rest));
    }
    fragments
}

/// Resolve an expression; `None` when any reference cannot be resolved
pub fn resolve_expression(expression: &Value, context: &ContextView<'_>) -> Option<Value> {
    match expression {
        Value::String(s) => resolve_string(s, context),
        Value::Array(elements) => elements
            .iter()
            .map(|element| resolve_expression(element, context))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        Value::Object(fields) => fields
            .iter()
            .map(|(key, field)| resolve_expression(field, context).map(|v| (key.clone(), v)))
            .collect::<Option<Map<_, _>>>()
            .map(Value::Object),
        literal => Some(literal.clone()),
    }
}

fn resolve_path(path: &str, context: &ContextView<'_>) -> Option<Value> {
    if path.is_empty() {
        return None;
    }
    context.get(&ValuePath::parse(path)).cloned()
}

fn resolve_string(s: &str, context: &ContextView<'_>) -> Option<Value> {
    let trimmed = s.trim();
    let fragments = split_fragments(trimmed);

    match fragments.as_slice() {
        [] => None,
        [Fragment::Placeholder(path)] => resolve_path(path, context),
        [Fragment::Literal(path)] => resolve_path(path, context),
        _ => {
            let mut out = String::new();
            for fragment in &fragments {
                match fragment {
                    Fragment::Literal(text) => out.push_str(text),
                    Fragment::Placeholder(path) => match resolve_path(path, context)? {
                        Value::String(v) => out.push_str(&v),
                        Value::Number(n) => out.push_str(&format_number(&n)),
                        Value::Bool(b) => out.push_str(if b { "true" } else { "false" }),
                        _ => return None,
                    },
                }
            }
            Some(Value::String(out))
        }
    }
}
