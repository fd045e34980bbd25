//! Chart values schema model
//!
//! A [`SchemaNode`] is the typed form of one JSON-Schema-like node of a
//! chart's `values.schema.json`. Only the vocabulary the engine acts on is
//! modelled; other keywords are kept verbatim in [`SchemaNode::extra`].

pub mod resolver;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use resolver::DEFAULT_MAX_DEPTH;

/// Primitive type of a schema node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SchemaType {
    Object,
    Array,
    String,
    Boolean,
    Integer,
    Number,
}

impl SchemaType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "object" => Some(SchemaType::Object),
            "array" => Some(SchemaType::Array),
            "string" => Some(SchemaType::String),
            "boolean" => Some(SchemaType::Boolean),
            "integer" => Some(SchemaType::Integer),
            "number" => Some(SchemaType::Number),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::String => "string",
            SchemaType::Boolean => "boolean",
            SchemaType::Integer => "integer",
            SchemaType::Number => "number",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, SchemaType::Integer | SchemaType::Number)
    }

    /// Type a bare value would have if it were declared as a `const`
    pub fn infer(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(SchemaType::Boolean),
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    Some(SchemaType::Integer)
                } else {
                    Some(SchemaType::Number)
                }
            }
            Value::String(_) => Some(SchemaType::String),
            Value::Array(_) => Some(SchemaType::Array),
            Value::Object(_) => Some(SchemaType::Object),
        }
    }
}

/// Presentation hint from the `render` keyword
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderHint {
    TextArea,
    Password,
    List,
    Slider,
}

impl RenderHint {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "textArea" => Some(RenderHint::TextArea),
            "password" => Some(RenderHint::Password),
            "list" => Some(RenderHint::List),
            "slider" => Some(RenderHint::Slider),
            _ => None,
        }
    }
}

/// Which end of a range a slider controls
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliderExtremity {
    Down,
    Up,
}

/// Slider presentation hints (`sliderMin`, `sliderMax`...)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SliderHints {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub unit: Option<String>,
    pub extremity: Option<SliderExtremity>,
    pub extremity_semantic: Option<String>,
    pub range_id: Option<String>,
}

impl SliderHints {
    /// Unit, with an empty string treated as no unit
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref().filter(|u| !u.is_empty())
    }
}

/// A `pattern` keyword, compiled once when the schema is parsed
#[derive(Clone, Debug)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Pattern)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, s: &str) -> bool {
        self.0.is_match(s)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// Visibility rule of a schema node
#[derive(Clone, Debug, PartialEq)]
pub enum Hidden {
    Flag(bool),
    /// Hidden when the value at `path` equals `value`
    When {
        value: Value,
        path: crate::path::ValuePath,
        is_path_relative: bool,
    },
}

/// The `x-onyxia` extension block
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OnyxiaExtension {
    /// Expression resolved against the context to override the default
    pub overwrite_default_with: Option<Value>,
    /// Expression resolved against the context to override the option list
    pub overwrite_list_enum_with: Option<Value>,
    pub hidden: Option<bool>,
    pub readonly: Option<bool>,
}

/// A schema node with the vocabulary used by the engine
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SchemaNode {
    /// Explicit `type`
    pub schema_type: Option<SchemaType>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub const_value: Option<Value>,
    pub default: Option<Value>,
    pub enum_values: Option<Vec<Value>>,
    pub list_enum: Option<Vec<Value>>,
    pub pattern: Option<Pattern>,
    pub items: Option<Box<SchemaNode>>,
    /// Properties in declaration order
    pub properties: Option<Vec<(String, SchemaNode)>>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub minimum: Option<f64>,
    pub slider: SliderHints,
    /// `minimum` and slider keywords exactly as written, for the editor schema
    pub presentation: Map<String, Value>,
    pub render: Option<RenderHint>,
    pub hidden: Option<Hidden>,
    pub x_onyxia: Option<OnyxiaExtension>,
    /// Keywords the engine does not interpret, kept for the editor schema
    pub extra: Map<String, Value>,
}

impl SchemaNode {
    /// Effective type: the explicit `type`, else inferred from `const`
    pub fn resolved_type(&self) -> Option<SchemaType> {
        self.schema_type
            .or_else(|| self.const_value.as_ref().and_then(SchemaType::infer))
    }

    /// Check if this node declares at least one property
    pub fn has_properties(&self) -> bool {
        self.properties.as_ref().is_some_and(|p| !p.is_empty())
    }

    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties
            .as_ref()?
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, node)| node)
    }

    pub fn overwrite_default_with(&self) -> Option<&Value> {
        self.x_onyxia.as_ref()?.overwrite_default_with.as_ref()
    }

    pub fn overwrite_list_enum_with(&self) -> Option<&Value> {
        self.x_onyxia.as_ref()?.overwrite_list_enum_with.as_ref()
    }

    pub fn is_readonly(&self) -> bool {
        self.x_onyxia.as_ref().and_then(|x| x.readonly).unwrap_or(false)
            || self.const_value.is_some()
    }

    pub fn is_slider(&self) -> bool {
        self.render == Some(RenderHint::Slider)
    }

    /// Schema governing the value at `path`, walking properties and items
    pub fn schema_at(&self, path: &crate::path::ValuePath) -> Option<&SchemaNode> {
        use crate::path::PathSegment;
        path.segments()
            .iter()
            .try_fold(self, |node, segment| match segment {
                PathSegment::Key(key) => node.property(key),
                PathSegment::Index(_) => node.items.as_deref(),
            })
    }
}
