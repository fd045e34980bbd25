//! Root form assembly
//!
//! Splits the built tree along the chart conventions: the top-level `global`
//! object is shared by every chart, each named dependency owns the subtree
//! under its name (with its own `global`), and everything else belongs to the
//! main chart.

use serde_json::Value;

use super::builder::FormBuilder;
use super::range_slider::{merge_range_sliders, prune_empty_groups};
use super::types::{ChartDependency, DependencyForm, FormNode, RootForm};
use crate::config::EngineSettings;
use crate::context::{AccessTracker, ContextView};
use crate::error::Result;
use crate::path::PathSegment;
use crate::schema::SchemaNode;

const GLOBAL_KEY: &str = "global";

/// Build the complete form of a chart from its schema and current values
pub fn compute_root_form(
    schema: &SchemaNode,
    values: &Value,
    context: &Value,
    dependencies: &[ChartDependency],
    settings: &EngineSettings,
) -> Result<RootForm> {
    let tracker = AccessTracker::new();
    let view = ContextView::new(context, &tracker);

    let mut root = FormBuilder::new(values, &view, settings).build_root(schema)?;
    merge_range_sliders(&mut root.nodes)?;
    prune_empty_groups(&mut root.nodes);

    Ok(split_sections(root.nodes, values, dependencies))
}

fn is_disabled(dependency: &ChartDependency, values: &Value) -> bool {
    dependency
        .condition
        .as_ref()
        .and_then(|condition| condition.get(values))
        .is_some_and(|enabled| *enabled == Value::Bool(false))
}

fn segment_key(node: &FormNode, depth: usize) -> Option<&str> {
    node.path().segments().get(depth).and_then(PathSegment::as_key)
}

/// Nodes of a group, or the node itself for a field
fn into_children(node: FormNode) -> Vec<FormNode> {
    match node {
        FormNode::Group(group) => group.nodes,
        field => vec![field],
    }
}

fn split_sections(nodes: Vec<FormNode>, values: &Value, dependencies: &[ChartDependency]) -> RootForm {
    let mut form = RootForm::default();
    for dependency in dependencies {
        if is_disabled(dependency, values) {
            tracing::debug!("dependency '{}' is disabled", dependency.chart_name);
            form.disabled_dependencies.push(dependency.chart_name.clone());
        } else {
            form.dependencies
                .insert(dependency.chart_name.clone(), DependencyForm::default());
        }
    }

    for node in nodes {
        let key = segment_key(&node, 0).map(str::to_string);
        match key.as_deref() {
            Some(GLOBAL_KEY) => form.global.extend(into_children(node)),
            Some(name) if form.disabled_dependencies.iter().any(|d| d == name) => {}
            Some(name) if form.dependencies.contains_key(name) => {
                let name = name.to_string();
                let mut section = DependencyForm::default();
                for child in into_children(node) {
                    if segment_key(&child, 1) == Some(GLOBAL_KEY) {
                        section.global.extend(into_children(child));
                    } else {
                        section.main.push(child);
                    }
                }
                form.dependencies.insert(name, section);
            }
            _ => form.main.push(node),
        }
    }
    form
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_path;
    use serde_json::json;

    fn schema() -> SchemaNode {
        SchemaNode::from_value(&json!({
            "type": "object",
            "properties": {
                "global": {
                    "type": "object",
                    "properties": { "suspend": { "type": "boolean" } }
                },
                "service": {
                    "type": "object",
                    "properties": { "image": { "type": "string" } }
                },
                "postgres": {
                    "type": "object",
                    "properties": {
                        "enabled": { "type": "boolean" },
                        "global": {
                            "type": "object",
                            "properties": { "storageClass": { "type": "string" } }
                        }
                    }
                },
                "redis": {
                    "type": "object",
                    "properties": { "enabled": { "type": "boolean" } }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_sections_follow_chart_conventions() {
        let values = json!({
            "global": { "suspend": false },
            "service": { "image": "nginx" },
            "postgres": { "enabled": true, "global": { "storageClass": "ssd" } },
            "redis": { "enabled": false }
        });
        let dependencies = vec![
            ChartDependency::new("postgres").with_condition(value_path!["postgres", "enabled"]),
            ChartDependency::new("redis").with_condition(value_path!["redis", "enabled"]),
        ];

        let form = compute_root_form(&schema(), &values, &json!({}), &dependencies, &EngineSettings::default()).unwrap();

        assert_eq!(form.global.len(), 1);
        assert_eq!(form.global[0].path(), &value_path!["global", "suspend"]);
        assert_eq!(form.main.len(), 1);
        assert_eq!(form.main[0].path(), &value_path!["service"]);
        assert_eq!(form.disabled_dependencies, vec!["redis".to_string()]);
        assert!(!form.dependencies.contains_key("redis"));

        let postgres = &form.dependencies["postgres"];
        assert_eq!(postgres.main.len(), 1);
        assert_eq!(postgres.main[0].path(), &value_path!["postgres", "enabled"]);
        assert_eq!(postgres.global[0].path(), &value_path!["postgres", "global", "storageClass"]);
    }

    #[test]
    fn test_without_dependencies_everything_is_main() {
        let values = json!({
            "global": { "suspend": true },
            "service": { "image": "nginx" },
            "postgres": { "enabled": true, "global": { "storageClass": "ssd" } },
            "redis": { "enabled": true }
        });
        let form = compute_root_form(&schema(), &values, &json!({}), &[], &EngineSettings::default()).unwrap();
        assert_eq!(form.main.len(), 3);
        assert_eq!(form.global.len(), 1);
        assert!(form.dependencies.is_empty());
    }
}
