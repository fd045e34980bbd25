//! Applying user edits to a values document
//!
//! Edits come back from the rendering layer as [`FormFieldValue`]s. Plain
//! fields are written as-is; selects and sliders consult the [`RootForm`] they
//! were rendered from to recover the option value or the unit suffix.

use serde_json::Value;

use crate::compile::compile_node;
use crate::context::{AccessTracker, ContextView};
use crate::error::{FormError, Result};
use crate::form::{FieldKind, FormFieldValue, RootForm};
use crate::path::{PathSegment, ValuePath};
use crate::schema::SchemaNode;
use crate::validation::coerce::{format_f64, kind_of, number_value};

/// Apply one edit to `values`
pub fn update(values: &mut Value, root_form: &RootForm, edit: &FormFieldValue) -> Result<()> {
    match edit {
        FormFieldValue::Checkbox { path, value } => path.set(values, Value::Bool(*value)),
        FormFieldValue::Text { path, value } => path.set(values, Value::String(value.clone())),
        FormFieldValue::YamlCodeBlock { path, value } => path.set(values, value.clone()),
        FormFieldValue::Number { path, value } => {
            let number = number_value(*value).ok_or_else(|| FormError::ValueTypeMismatch {
                path: path.clone(),
                expected: "number",
                found: "non-finite number",
            })?;
            path.set(values, number)
        }
        FormFieldValue::Select {
            path,
            selected_option_index,
        } => {
            let field = root_form.find_field(path);
            let Some(FieldKind::Select { options, .. }) = field.map(|f| &f.kind) else {
                return Err(FormError::FieldNotFound {
                    path: path.clone(),
                    kind: "select",
                });
            };
            let option = options
                .get(*selected_option_index)
                .ok_or_else(|| FormError::OptionIndexOutOfRange {
                    path: path.clone(),
                    index: *selected_option_index,
                })?;
            path.set(values, option.clone())
        }
        FormFieldValue::Slider { path, value } => {
            let field = root_form.find_field(path);
            let Some(FieldKind::Slider { unit, .. }) = field.map(|f| &f.kind) else {
                return Err(FormError::FieldNotFound {
                    path: path.clone(),
                    kind: "slider",
                });
            };
            set_slider_value(values, path, *value, unit.as_deref())
        }
        FormFieldValue::RangeSlider {
            low_end_range,
            high_end_range,
        } => {
            let field = root_form.find_range_slider(&low_end_range.path, &high_end_range.path);
            let Some(FieldKind::RangeSlider { unit, .. }) = field.map(|f| &f.kind) else {
                return Err(FormError::FieldNotFound {
                    path: low_end_range.path.clone(),
                    kind: "range-slider",
                });
            };
            set_slider_value(values, &low_end_range.path, low_end_range.value, unit.as_deref())?;
            set_slider_value(values, &high_end_range.path, high_end_range.value, unit.as_deref())
        }
    }
}

/// Write a slider position, suffixed with its unit or typed like the old value
fn set_slider_value(values: &mut Value, path: &ValuePath, value: f64, unit: Option<&str>) -> Result<()> {
    let formatted = match unit.filter(|u| !u.is_empty()) {
        Some(unit) => Value::String(format!("{}{}", format_f64(value), unit)),
        None => match path.get(values) {
            Some(Value::String(_)) => Value::String(format_f64(value)),
            _ => number_value(value).ok_or_else(|| FormError::ValueTypeMismatch {
                path: path.clone(),
                expected: "number",
                found: "non-finite number",
            })?,
        },
    };
    path.set(values, formatted)
}

/// Append a default element to the array at `path`
///
/// The element is the item schema's own default when one can be compiled,
/// otherwise the element of the array's default at the new index (or its first
/// element when the default is shorter).
pub fn add_array_item(
    values: &mut Value,
    schema: &SchemaNode,
    context: &Value,
    legacy_values: Option<&Value>,
    path: &ValuePath,
) -> Result<()> {
    let array_schema = schema.schema_at(path).ok_or_else(|| FormError::InvalidSchema {
        path: path.clone(),
        reason: "no schema for this array".to_string(),
    })?;
    let items = array_schema.items.as_deref().ok_or_else(|| FormError::InvalidSchema {
        path: path.clone(),
        reason: "array schema without items".to_string(),
    })?;
    let len = match path.get(values) {
        Some(Value::Array(elements)) => elements.len(),
        Some(other) => {
            return Err(FormError::ValueTypeMismatch {
                path: path.clone(),
                expected: "array",
                found: kind_of(other),
            })
        }
        None => return Err(FormError::PathNotFound { path: path.clone() }),
    };

    let tracker = AccessTracker::new();
    let view = ContextView::new(context, &tracker);

    let item = match compile_node(items, None, &view, &path.push_index(len)) {
        Ok(item) => item,
        Err(FormError::UnresolvableValue { .. }) => {
            tracing::debug!("no item default for '{}', using the array default", path);
            array_default_item(array_schema, legacy_values.and_then(|l| path.get(l)), &view, path, len)?
        }
        Err(e) => return Err(e),
    };

    if let Some(Value::Array(elements)) = path.get_mut(values) {
        elements.push(item);
    }
    Ok(())
}

fn array_default_item(
    array_schema: &SchemaNode,
    legacy: Option<&Value>,
    context: &ContextView<'_>,
    path: &ValuePath,
    index: usize,
) -> Result<Value> {
    let default = match compile_node(array_schema, legacy, context, path) {
        Ok(default) => default,
        Err(FormError::UnresolvableValue { .. }) => {
            return Err(FormError::NoArrayItemDefault { path: path.clone() });
        }
        Err(e) => return Err(e),
    };
    match default {
        Value::Array(elements) => elements
            .get(index)
            .or_else(|| elements.first())
            .cloned()
            .ok_or_else(|| FormError::NoArrayItemDefault { path: path.clone() }),
        _ => Err(FormError::NoArrayItemDefault { path: path.clone() }),
    }
}

/// Remove the array element addressed by `path`
pub fn remove_array_item(values: &mut Value, path: &ValuePath) -> Result<()> {
    let Some(PathSegment::Index(index)) = path.last() else {
        return Err(FormError::PathNotFound { path: path.clone() });
    };
    let index = *index;
    match path.parent().get_mut(values) {
        Some(Value::Array(elements)) if index < elements.len() => {
            elements.remove(index);
            Ok(())
        }
        Some(Value::Array(_)) | None => Err(FormError::PathNotFound { path: path.clone() }),
        Some(other) => Err(FormError::ValueTypeMismatch {
            path: path.parent(),
            expected: "array",
            found: kind_of(other),
        }),
    }
}
