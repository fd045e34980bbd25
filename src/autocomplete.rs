//! Suggestions for one slot of a context-driven array of objects
//!
//! An array whose schema carries `x-onyxia.overwriteDefaultWith` is initially
//! filled from a context array. When the user edits a field of one element,
//! the other candidates of that context array that are not already in the
//! live array are offered as replacements for the whole element.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::compile::compile_node;
use crate::context::{AccessTracker, ContextView};
use crate::path::{PathSegment, ValuePath};
use crate::schema::{SchemaNode, SchemaType};
use crate::template::resolve_expression;

/// Replacement of a whole array element
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Overwrite {
    /// Path of the array element
    pub path: ValuePath,
    pub subtree: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteOption {
    /// Value the suggestion puts in the edited field
    pub option_value: Value,
    pub overwrite: Overwrite,
}

/// Compute the suggestions for the field at `path` (`<array>[i].<key>`)
///
/// Returns nothing when `path` does not address a field of an element of a
/// context-driven array of objects.
pub fn compute_autocomplete_options(
    schema: &SchemaNode,
    values: &Value,
    context: &Value,
    source_context: &Value,
    path: &ValuePath,
) -> Vec<AutocompleteOption> {
    let [array_segments @ .., PathSegment::Index(index), PathSegment::Key(field_key)] = path.segments() else {
        return Vec::new();
    };
    let array_path = ValuePath::from_segments(array_segments.to_vec());

    let Some(array_schema) = schema.schema_at(&array_path) else {
        return Vec::new();
    };
    let (Some(expression), Some(items)) = (array_schema.overwrite_default_with(), array_schema.items.as_deref()) else {
        return Vec::new();
    };
    if array_schema.resolved_type() != Some(SchemaType::Array) {
        return Vec::new();
    }

    let source_tracker = AccessTracker::new();
    let Some(Value::Array(candidates)) =
        resolve_expression(expression, &ContextView::new(source_context, &source_tracker))
    else {
        return Vec::new();
    };

    let live: &[Value] = match array_path.get(values) {
        Some(Value::Array(elements)) => elements,
        _ => &[],
    };

    let tracker = AccessTracker::new();
    let ambient = ContextView::new(context, &tracker);
    let element_path = array_path.push_index(*index);

    let mut options: Vec<AutocompleteOption> = Vec::new();
    for candidate in &candidates {
        let Some(fields) = candidate.as_object() else {
            continue;
        };
        let compiled = match compile_node(items, None, &ambient.with_overrides(fields), &element_path) {
            Ok(compiled) => compiled,
            Err(e) => {
                tracing::debug!("skipping suggestion for '{}': {}", path, e);
                continue;
            }
        };
        let Some(option_value) = compiled.get(field_key.as_str()).cloned() else {
            continue;
        };
        if live.contains(&compiled) || options.iter().any(|o| o.option_value == option_value) {
            continue;
        }
        options.push(AutocompleteOption {
            option_value,
            overwrite: Overwrite {
                path: element_path.clone(),
                subtree: compiled,
            },
        });
    }
    options
}
