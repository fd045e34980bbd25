//! Core types of a generated form

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::path::ValuePath;
use crate::schema::SliderExtremity;

// ============================================================================
// Fields
// ============================================================================

/// One editable field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub title: String,
    /// Location of the edited value in the values document
    pub path: ValuePath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_readonly: bool,
    #[serde(flatten)]
    pub kind: FieldKind,
}

/// Widget-specific payload of a [`FormField`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FieldKind {
    Checkbox {
        value: bool,
    },
    /// Free-form object or array edited as YAML text
    YamlCodeBlock {
        value: Value,
    },
    #[serde(rename_all = "camelCase")]
    Number {
        value: f64,
        is_integer: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    Select {
        options: Vec<Value>,
        selected_option_index: usize,
    },
    #[serde(rename_all = "camelCase")]
    Text {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
        is_text_area: bool,
        is_sensitive: bool,
    },
    Slider {
        min: f64,
        max: f64,
        step: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
        value: f64,
    },
    #[serde(rename_all = "camelCase")]
    RangeSlider {
        step: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
        low_end_range: RangeEnd,
        high_end_range: RangeEnd,
    },
    /// One extremity of a range slider awaiting its partner
    ///
    /// Only exists between tree building and range-slider merging.
    RangeSliderHalf(RangeSliderHalf),
}

/// One handle of a merged range slider
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeEnd {
    pub path: ValuePath,
    pub min: f64,
    pub max: f64,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeSliderHalf {
    pub extremity: SliderExtremity,
    pub range_id: String,
    pub min: f64,
    pub max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic: Option<String>,
    pub value: f64,
}

impl FormField {
    pub fn is_range_slider_half(&self) -> bool {
        matches!(self.kind, FieldKind::RangeSliderHalf(_))
    }
}

// ============================================================================
// Tree
// ============================================================================

/// A field or a nested group
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormNode {
    Field(FormField),
    Group(FormFieldGroup),
}

impl FormNode {
    pub fn path(&self) -> &ValuePath {
        match self {
            FormNode::Field(field) => &field.path,
            FormNode::Group(group) => &group.path,
        }
    }
}

/// An object or array of the values document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldGroup {
    pub path: ValuePath,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub nodes: Vec<FormNode>,
    /// An element can be appended (arrays below `maxItems`)
    pub can_add: bool,
    /// Elements can be removed (arrays above `minItems`)
    pub can_remove: bool,
}

/// Depth-first search of a field in `nodes`
pub(crate) fn find_in<'n>(nodes: &'n [FormNode], predicate: &dyn Fn(&FormField) -> bool) -> Option<&'n FormField> {
    nodes.iter().find_map(|node| match node {
        FormNode::Field(field) if predicate(field) => Some(field),
        FormNode::Field(_) => None,
        FormNode::Group(group) => find_in(&group.nodes, predicate),
    })
}

// ============================================================================
// Root Form
// ============================================================================

/// Form of one chart dependency
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyForm {
    pub main: Vec<FormNode>,
    pub global: Vec<FormNode>,
}

/// Complete form of a chart, split along the `global` / dependency convention
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootForm {
    pub main: Vec<FormNode>,
    pub global: Vec<FormNode>,
    pub dependencies: BTreeMap<String, DependencyForm>,
    pub disabled_dependencies: Vec<String>,
}

impl RootForm {
    fn sections(&self) -> impl Iterator<Item = &[FormNode]> {
        [self.main.as_slice(), self.global.as_slice()]
            .into_iter()
            .chain(
                self.dependencies
                    .values()
                    .flat_map(|dep| [dep.main.as_slice(), dep.global.as_slice()]),
            )
    }

    /// Find the field editing the value at `path`
    pub fn find_field(&self, path: &ValuePath) -> Option<&FormField> {
        self.sections()
            .find_map(|nodes| find_in(nodes, &|field| field.path == *path))
    }

    /// Find the range slider whose handles edit `low` and `high`
    pub fn find_range_slider(&self, low: &ValuePath, high: &ValuePath) -> Option<&FormField> {
        self.sections().find_map(|nodes| {
            find_in(nodes, &|field| match &field.kind {
                FieldKind::RangeSlider {
                    low_end_range,
                    high_end_range,
                    ..
                } => low_end_range.path == *low && high_end_range.path == *high,
                _ => false,
            })
        })
    }
}

/// A chart dependency, possibly gated by a boolean in the values document
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDependency {
    pub chart_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ValuePath>,
}

impl ChartDependency {
    pub fn new(chart_name: impl Into<String>) -> Self {
        Self {
            chart_name: chart_name.into(),
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: ValuePath) -> Self {
        self.condition = Some(condition);
        self
    }
}

// ============================================================================
// Edits
// ============================================================================

/// Value of one handle in a range-slider edit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeEndValue {
    pub path: ValuePath,
    pub value: f64,
}

/// One edit coming back from the rendering layer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FormFieldValue {
    Checkbox {
        path: ValuePath,
        value: bool,
    },
    YamlCodeBlock {
        path: ValuePath,
        value: Value,
    },
    Number {
        path: ValuePath,
        value: f64,
    },
    Text {
        path: ValuePath,
        value: String,
    },
    #[serde(rename_all = "camelCase")]
    Select {
        path: ValuePath,
        selected_option_index: usize,
    },
    Slider {
        path: ValuePath,
        value: f64,
    },
    #[serde(rename_all = "camelCase")]
    RangeSlider {
        low_end_range: RangeEndValue,
        high_end_range: RangeEndValue,
    },
}
