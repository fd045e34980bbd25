//! Selectable options of a schema node
//!
//! Options come from, in order:
//! 1. `x-onyxia.overwriteListEnumWith` resolved against the context, keeping
//!    each element that is valid (or coercible) for the node and dropping the
//!    others;
//! 2. the static `listEnum`, then `enum`, each accepted only when every
//!    element is valid or coercible;
//! 3. nothing, which is an authoring defect for a `render: list` node.

use serde_json::Value;

use crate::context::ContextView;
use crate::error::{FormError, Result};
use crate::path::ValuePath;
use crate::schema::{RenderHint, SchemaNode};
use crate::template::resolve_expression;
use crate::validation::{validate_structure, Validation};

/// Compute the ordered option list of `node`, if it has one
pub fn resolve_enum(node: &SchemaNode, context: &ContextView<'_>, path: &ValuePath) -> Result<Option<Vec<Value>>> {
    if let Some(expression) = node.overwrite_list_enum_with() {
        if let Some(Value::Array(candidates)) = resolve_expression(expression, context) {
            let mut options = Vec::with_capacity(candidates.len());
            for candidate in candidates {
                match validate_structure(node, &candidate, context, path)? {
                    Validation::Valid => options.push(candidate),
                    Validation::Invalid {
                        approximation: Some(approximation),
                    } => options.push(approximation),
                    Validation::Invalid { approximation: None } => {
                        tracing::debug!("dropping option {} for '{}': not valid for the field", candidate, path);
                    }
                }
            }
            if !options.is_empty() {
                return Ok(Some(options));
            }
        }
    }

    for static_options in [&node.list_enum, &node.enum_values].into_iter().flatten() {
        if let Some(options) = accept_all(node, static_options, context, path)? {
            return Ok(Some(options));
        }
    }

    if node.render == Some(RenderHint::List) {
        return Err(FormError::MissingEnumOptions { path: path.clone() });
    }

    Ok(None)
}

fn accept_all(
    node: &SchemaNode,
    candidates: &[Value],
    context: &ContextView<'_>,
    path: &ValuePath,
) -> Result<Option<Vec<Value>>> {
    if candidates.is_empty() {
        return Ok(None);
    }
    let mut options = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match validate_structure(node, candidate, context, path)?.usable(candidate.clone()) {
            Some(option) => options.push(option),
            None => return Ok(None),
        }
    }
    Ok(Some(options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AccessTracker;
    use serde_json::json;

    fn options(schema: Value) -> Result<Option<Vec<Value>>> {
        let node = SchemaNode::from_value(&schema).unwrap();
        let ctx = json!({
            "sizes": ["small", 3, "large", ["nested"]],
            "nothing": [],
            "single": "eu-west"
        });
        let tracker = AccessTracker::new();
        resolve_enum(&node, &ContextView::new(&ctx, &tracker), &ValuePath::root())
    }

    #[test]
    fn test_context_override_keeps_valid_elements() {
        let result = options(json!({
            "type": "string",
            "enum": ["x"],
            "x-onyxia": { "overwriteListEnumWith": "{{sizes}}" }
        }))
        .unwrap();
        assert_eq!(result, Some(vec![json!("small"), json!("3"), json!("large")]));
    }

    #[test]
    fn test_empty_override_falls_through() {
        let result = options(json!({
            "type": "string",
            "listEnum": ["a", "b"],
            "x-onyxia": { "overwriteListEnumWith": "{{nothing}}" }
        }))
        .unwrap();
        assert_eq!(result, Some(vec![json!("a"), json!("b")]));

        // A non-array resolution is ignored as well
        let result = options(json!({
            "type": "string",
            "enum": ["a"],
            "x-onyxia": { "overwriteListEnumWith": "{{single}}" }
        }))
        .unwrap();
        assert_eq!(result, Some(vec![json!("a")]));
    }

    #[test]
    fn test_static_lists_need_every_element_valid() {
        let result = options(json!({
            "type": "integer",
            "listEnum": [1, "two"],
            "enum": [1, "2"]
        }))
        .unwrap();
        assert_eq!(result, Some(vec![json!(1), json!(2)]));

        let result = options(json!({ "type": "integer", "enum": [1, "two"] })).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_list_render_requires_options() {
        assert!(matches!(
            options(json!({ "type": "string", "render": "list" })),
            Err(FormError::MissingEnumOptions { .. })
        ));
        assert_eq!(options(json!({ "type": "string" })).unwrap(), None);
    }
}
