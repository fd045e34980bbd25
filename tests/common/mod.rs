#![allow(dead_code)]

use helm_form::{FormEngine, FormField, FormNode, SchemaNode};
use serde_json::Value;
use std::path::Path;

/// Parse a YAML fixture from `tests/fixtures` into a JSON tree
pub fn fixture(name: &str) -> Value {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
    let text = std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("reading {}: {}", path.display(), e));
    serde_yaml::from_str(&text).unwrap_or_else(|e| panic!("parsing {}: {}", path.display(), e))
}

pub fn schema(engine: &FormEngine, value: &Value) -> SchemaNode {
    engine.parse_schema(value).expect("schema should parse")
}

/// Every field of `nodes`, depth first
pub fn fields(nodes: &[FormNode]) -> Vec<&FormField> {
    let mut out = Vec::new();
    for node in nodes {
        match node {
            FormNode::Field(field) => out.push(field),
            FormNode::Group(group) => out.extend(fields(&group.nodes)),
        }
    }
    out
}
