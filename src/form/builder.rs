//! Form-tree construction
//!
//! Walks a schema alongside the values document and emits one [`FormNode`]
//! per visible node. Widget selection, first match wins:
//!
//! 1. objects without `properties` and arrays without `items` become a YAML
//!    code block holding the raw sub-value;
//! 2. nodes with resolvable options become a select;
//! 3. `render: slider` nodes become a slider, or a pending range-slider half
//!    when they declare a `sliderExtremity`;
//! 4. otherwise objects and arrays become groups, booleans checkboxes,
//!    strings text fields and numbers number fields.

use serde_json::Value;

use super::types::{FieldKind, FormField, FormFieldGroup, FormNode, RangeSliderHalf};
use crate::config::EngineSettings;
use crate::context::ContextView;
use crate::enum_options::resolve_enum;
use crate::error::{FormError, Result};
use crate::path::{PathSegment, ValuePath};
use crate::schema::{Hidden, RenderHint, SchemaNode, SchemaType};
use crate::validation::coerce::{coerce, kind_of, parse_number};

pub(crate) struct FormBuilder<'a> {
    /// Whole values document, for `hidden` rules pointing elsewhere
    values: &'a Value,
    context: &'a ContextView<'a>,
    settings: &'a EngineSettings,
}

impl<'a> FormBuilder<'a> {
    pub(crate) fn new(values: &'a Value, context: &'a ContextView<'a>, settings: &'a EngineSettings) -> Self {
        Self {
            values,
            context,
            settings,
        }
    }

    /// Build the root group; a non-object root becomes its only node
    pub(crate) fn build_root(&self, schema: &SchemaNode) -> Result<FormFieldGroup> {
        let root = ValuePath::root();
        match self.build_node(schema, self.values, &root, None)? {
            Some(FormNode::Group(group)) => Ok(group),
            other => Ok(FormFieldGroup {
                path: root,
                title: self.settings.root_title.clone(),
                description: schema.description.clone(),
                nodes: other.into_iter().collect(),
                can_add: false,
                can_remove: false,
            }),
        }
    }

    fn build_node(
        &self,
        node: &SchemaNode,
        value: &Value,
        path: &ValuePath,
        parent_title: Option<&str>,
    ) -> Result<Option<FormNode>> {
        if self.is_hidden(node, path)? {
            tracing::debug!("'{}' is hidden", path);
            return Ok(None);
        }
        let Some(schema_type) = node.resolved_type().or_else(|| SchemaType::infer(value)) else {
            tracing::debug!("no type for '{}', skipping", path);
            return Ok(None);
        };

        let title = self.title(node, path, parent_title);
        let field = |kind: FieldKind| {
            Some(FormNode::Field(FormField {
                title: title.clone(),
                path: path.clone(),
                description: node.description.clone(),
                is_readonly: node.is_readonly(),
                kind,
            }))
        };

        let free_form = match schema_type {
            SchemaType::Object => !node.has_properties(),
            SchemaType::Array => node.items.is_none(),
            _ => false,
        };
        if free_form {
            return Ok(field(FieldKind::YamlCodeBlock { value: value.clone() }));
        }

        if let Some(options) = resolve_enum(node, self.context, path)? {
            let selected_option_index = match options.iter().position(|option| option == value) {
                Some(index) => index,
                None => {
                    tracing::warn!("value {} of '{}' is not among its options", value, path);
                    0
                }
            };
            return Ok(field(FieldKind::Select {
                options,
                selected_option_index,
            }));
        }

        if node.is_slider() {
            return Ok(field(self.slider_kind(node, value, path)?));
        }

        let kind = match schema_type {
            SchemaType::Object => return self.object_group(node, value, path, title).map(Some),
            SchemaType::Array => return self.array_group(node, value, path, title).map(Some),
            SchemaType::Boolean => FieldKind::Checkbox {
                value: as_bool(value, path)?,
            },
            SchemaType::String => FieldKind::Text {
                value: as_text(value, path)?,
                pattern: node.pattern.as_ref().map(|p| p.as_str().to_string()),
                is_text_area: node.render == Some(RenderHint::TextArea),
                is_sensitive: node.render == Some(RenderHint::Password),
            },
            SchemaType::Integer | SchemaType::Number => FieldKind::Number {
                value: as_f64(value, path)?,
                is_integer: schema_type == SchemaType::Integer,
                minimum: node.minimum,
            },
        };
        Ok(field(kind))
    }

    fn object_group(&self, node: &SchemaNode, value: &Value, path: &ValuePath, title: String) -> Result<FormNode> {
        let Value::Object(fields) = value else {
            return Err(mismatch(path, "object", value));
        };
        let mut nodes = Vec::new();
        for (name, property) in node.properties.iter().flatten() {
            let child_path = path.push_key(name);
            let Some(child) = fields.get(name) else {
                tracing::debug!("'{}' is absent from the values document", child_path);
                continue;
            };
            if let Some(built) = self.build_node(property, child, &child_path, Some(&title))? {
                nodes.push(built);
            }
        }
        Ok(FormNode::Group(FormFieldGroup {
            path: path.clone(),
            title,
            description: node.description.clone(),
            nodes,
            can_add: false,
            can_remove: false,
        }))
    }

    fn array_group(&self, node: &SchemaNode, value: &Value, path: &ValuePath, title: String) -> Result<FormNode> {
        let Value::Array(elements) = value else {
            return Err(mismatch(path, "array", value));
        };
        let mut nodes = Vec::new();
        if let Some(items) = node.items.as_deref() {
            for (i, element) in elements.iter().enumerate() {
                if let Some(built) = self.build_node(items, element, &path.push_index(i), Some(&title))? {
                    nodes.push(built);
                }
            }
        }
        let len = elements.len() as u64;
        Ok(FormNode::Group(FormFieldGroup {
            path: path.clone(),
            title,
            description: node.description.clone(),
            nodes,
            can_add: node.max_items.map_or(true, |max| len < max),
            can_remove: len > node.min_items.unwrap_or(0),
        }))
    }

    fn slider_kind(&self, node: &SchemaNode, value: &Value, path: &ValuePath) -> Result<FieldKind> {
        let hints = &node.slider;
        let min = hints.min.ok_or_else(|| FormError::SliderBounds {
            path: path.clone(),
            what: "sliderMin",
        })?;
        let max = hints.max.ok_or_else(|| FormError::SliderBounds {
            path: path.clone(),
            what: "sliderMax",
        })?;
        let unit = hints.unit().map(str::to_string);
        let current = slider_value(value, unit.as_deref(), path)?;

        let Some(extremity) = hints.extremity else {
            return Ok(FieldKind::Slider {
                min,
                max,
                step: hints.step.unwrap_or(self.settings.default_slider_step),
                unit,
                value: current,
            });
        };

        let range_id = hints.range_id.clone().ok_or_else(|| FormError::InvalidSchema {
            path: path.clone(),
            reason: "sliderExtremity without sliderRangeId".to_string(),
        })?;
        Ok(FieldKind::RangeSliderHalf(RangeSliderHalf {
            extremity,
            range_id,
            min,
            max,
            step: hints.step,
            unit,
            semantic: hints.extremity_semantic.clone(),
            value: current,
        }))
    }

    fn is_hidden(&self, node: &SchemaNode, path: &ValuePath) -> Result<bool> {
        if node.x_onyxia.as_ref().and_then(|x| x.hidden) == Some(true) {
            return Ok(true);
        }
        match &node.hidden {
            None => Ok(false),
            Some(Hidden::Flag(hidden)) => Ok(*hidden),
            Some(Hidden::When {
                value,
                path: target,
                is_path_relative,
            }) => {
                let target = if *is_path_relative {
                    path.parent().join(target)
                } else {
                    target.clone()
                };
                match target.get(self.values) {
                    Some(current) => Ok(current == value),
                    None => Err(FormError::PathNotFound { path: target }),
                }
            }
        }
    }

    fn title(&self, node: &SchemaNode, path: &ValuePath, parent_title: Option<&str>) -> String {
        if let Some(title) = &node.title {
            return title.clone();
        }
        match path.last() {
            Some(PathSegment::Key(key)) => key.clone(),
            Some(PathSegment::Index(index)) => {
                format!("{} {}", parent_title.unwrap_or(&self.settings.root_title), index)
            }
            None => self.settings.root_title.clone(),
        }
    }
}

fn mismatch(path: &ValuePath, expected: &'static str, found: &Value) -> FormError {
    FormError::ValueTypeMismatch {
        path: path.clone(),
        expected,
        found: kind_of(found),
    }
}

fn as_bool(value: &Value, path: &ValuePath) -> Result<bool> {
    value
        .as_bool()
        .or_else(|| coerce(value, SchemaType::Boolean).and_then(|v| v.as_bool()))
        .ok_or_else(|| mismatch(path, "boolean", value))
}

fn as_f64(value: &Value, path: &ValuePath) -> Result<f64> {
    value
        .as_f64()
        .or_else(|| coerce(value, SchemaType::Number).and_then(|v| v.as_f64()))
        .ok_or_else(|| mismatch(path, "number", value))
}

fn as_text(value: &Value, path: &ValuePath) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => match coerce(other, SchemaType::String) {
            Some(Value::String(s)) => Ok(s),
            _ => Err(mismatch(path, "string", value)),
        },
    }
}

/// Numeric position of a slider; `"150m"` with unit `m` is `150`
fn slider_value(value: &Value, unit: Option<&str>, path: &ValuePath) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let digits = unit.and_then(|u| s.trim().strip_suffix(u)).unwrap_or(s);
            parse_number(digits)
        }
        _ => None,
    };
    parsed.ok_or_else(|| mismatch(path, "number", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AccessTracker;
    use crate::value_path;
    use serde_json::json;

    fn build(schema: Value, values: Value) -> Result<FormFieldGroup> {
        let node = SchemaNode::from_value(&schema).unwrap();
        let context = json!({ "regions": ["eu", "us"] });
        let tracker = AccessTracker::new();
        let view = ContextView::new(&context, &tracker);
        let settings = EngineSettings::default();
        FormBuilder::new(&values, &view, &settings).build_root(&node)
    }

    fn field_at<'g>(group: &'g FormFieldGroup, index: usize) -> &'g FormField {
        match &group.nodes[index] {
            FormNode::Field(field) => field,
            FormNode::Group(group) => panic!("expected a field, got group {}", group.path),
        }
    }

    #[test]
    fn test_widget_selection() {
        let root = build(
            json!({
                "type": "object",
                "properties": {
                    "enabled": { "type": "boolean" },
                    "name": { "type": "string", "pattern": "^[a-z]+$", "render": "password" },
                    "replicas": { "type": "integer", "minimum": 1 },
                    "labels": { "type": "object" },
                    "region": { "type": "string", "x-onyxia": { "overwriteListEnumWith": "{{regions}}" } }
                }
            }),
            json!({ "enabled": "yes", "name": "web", "replicas": 2, "labels": { "a": "b" }, "region": "us" }),
        )
        .unwrap();

        assert_eq!(root.title, "<root>");
        assert_eq!(field_at(&root, 0).kind, FieldKind::Checkbox { value: true });
        assert_eq!(
            field_at(&root, 1).kind,
            FieldKind::Text {
                value: "web".to_string(),
                pattern: Some("^[a-z]+$".to_string()),
                is_text_area: false,
                is_sensitive: true,
            }
        );
        assert_eq!(
            field_at(&root, 2).kind,
            FieldKind::Number {
                value: 2.0,
                is_integer: true,
                minimum: Some(1.0)
            }
        );
        assert_eq!(
            field_at(&root, 3).kind,
            FieldKind::YamlCodeBlock { value: json!({ "a": "b" }) }
        );
        assert_eq!(
            field_at(&root, 4).kind,
            FieldKind::Select {
                options: vec![json!("eu"), json!("us")],
                selected_option_index: 1
            }
        );
    }

    #[test]
    fn test_array_items_and_titles() {
        let root = build(
            json!({
                "type": "object",
                "properties": {
                    "ports": {
                        "type": "array",
                        "title": "Ports",
                        "minItems": 1,
                        "maxItems": 2,
                        "items": { "type": "integer" }
                    }
                }
            }),
            json!({ "ports": [80, 443] }),
        )
        .unwrap();

        let FormNode::Group(ports) = &root.nodes[0] else {
            panic!("expected a group");
        };
        assert_eq!(ports.path, value_path!["ports"]);
        assert!(!ports.can_add);
        assert!(ports.can_remove);
        assert_eq!(field_at(ports, 1).title, "Ports 1");
        assert_eq!(field_at(ports, 1).path, value_path!["ports", 1usize]);
    }

    #[test]
    fn test_hidden_rules() {
        let root = build(
            json!({
                "type": "object",
                "properties": {
                    "enabled": { "type": "boolean" },
                    "secret": { "type": "string", "hidden": true },
                    "host": {
                        "type": "string",
                        "hidden": { "value": false, "path": "enabled", "isPathRelative": true }
                    },
                    "internal": { "type": "string", "x-onyxia": { "hidden": true } }
                }
            }),
            json!({ "enabled": false, "secret": "s", "host": "h", "internal": "i" }),
        )
        .unwrap();
        assert_eq!(root.nodes.len(), 1);
        assert_eq!(root.nodes[0].path(), &value_path!["enabled"]);
    }

    #[test]
    fn test_readonly_and_absent_properties() {
        let root = build(
            json!({
                "type": "object",
                "properties": {
                    "kind": { "type": "string", "const": "Deployment" },
                    "missing": { "type": "string" }
                }
            }),
            json!({ "kind": "Deployment" }),
        )
        .unwrap();
        assert_eq!(root.nodes.len(), 1);
        assert!(field_at(&root, 0).is_readonly);
    }

    #[test]
    fn test_sliders() {
        let root = build(
            json!({
                "type": "object",
                "properties": {
                    "memory": {
                        "type": "string",
                        "render": "slider",
                        "sliderMin": 1,
                        "sliderMax": 64,
                        "sliderUnit": "Gi"
                    },
                    "cpu": {
                        "type": "string",
                        "render": "slider",
                        "sliderMin": 50,
                        "sliderMax": 40000,
                        "sliderStep": 50,
                        "sliderUnit": "m",
                        "sliderExtremity": "down",
                        "sliderRangeId": "cpu"
                    }
                }
            }),
            json!({ "memory": "8Gi", "cpu": "150m" }),
        )
        .unwrap();

        assert_eq!(
            field_at(&root, 0).kind,
            FieldKind::Slider {
                min: 1.0,
                max: 64.0,
                step: 1.0,
                unit: Some("Gi".to_string()),
                value: 8.0
            }
        );
        match &field_at(&root, 1).kind {
            FieldKind::RangeSliderHalf(half) => {
                assert_eq!(half.range_id, "cpu");
                assert_eq!(half.value, 150.0);
                assert_eq!(half.step, Some(50.0));
            }
            other => panic!("expected a range slider half, got {:?}", other),
        }
    }

    #[test]
    fn test_slider_without_bounds_is_fatal() {
        let err = build(
            json!({ "type": "integer", "render": "slider", "sliderMax": 4 }),
            json!(2),
        )
        .unwrap_err();
        assert!(matches!(err, FormError::SliderBounds { what: "sliderMin", .. }));
    }

    #[test]
    fn test_extremity_without_range_id_is_fatal() {
        let err = build(
            json!({
                "type": "object",
                "properties": {
                    "cpu": {
                        "type": "string",
                        "render": "slider",
                        "sliderMin": 50,
                        "sliderMax": 400,
                        "sliderStep": 50,
                        "sliderUnit": "m",
                        "sliderExtremity": "down"
                    }
                }
            }),
            json!({ "cpu": "100m" }),
        )
        .unwrap_err();
        match err {
            FormError::InvalidSchema { path, reason } => {
                assert_eq!(path, value_path!["cpu"]);
                assert!(reason.contains("sliderRangeId"));
            }
            other => panic!("expected an invalid schema error, got {:?}", other),
        }
    }
}
