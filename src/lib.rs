//! # helm-form - Chart values resolution and form generation
//!
//! helm-form turns a chart's JSON-schema-like values description into a
//! concrete values document and into a typed, editable form tree, then applies
//! user edits back onto the document.
//!
//! ## Features
//!
//! - **Values compilation**: const, context overrides, defaults, previous values, `minItems` synthesis
//! - **Context references**: `{{path}}` placeholders, interpolation and bare paths
//! - **Lenient validation**: failures come with a best-effort coerced value when one exists
//! - **Form trees**: checkboxes, selects, text, numbers, sliders, merged range sliders, YAML blocks
//! - **Edits**: field updates, array item insertion and removal
//! - **Autocomplete**: suggestions for context-driven arrays of objects
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use helm_form::{CompileMode, EngineSettings, FormEngine};
//! use serde_json::json;
//!
//! fn main() -> anyhow::Result<()> {
//!     let engine = FormEngine::new(EngineSettings::load("helm-form.toml")?);
//!
//!     let schema = engine.parse_schema(&json!({
//!         "type": "object",
//!         "properties": {
//!             "user": { "type": "string", "x-onyxia": { "overwriteDefaultWith": "user.idep" } }
//!         }
//!     }))?;
//!     let context = json!({ "user": { "idep": "jdoe" } });
//!
//!     let compiled = engine.compute_helm_values(&schema, None, &context, CompileMode::Strict)?;
//!     let form = engine.compute_root_form(&schema, &compiled.values, &context, &[])?;
//!     println!("{}", serde_json::to_string_pretty(&form)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Leaves first:
//! - **Schema**: typed schema model and parsing
//! - **Template / Enum options / Validation**: context references, option lists, checks and coercions
//! - **Compile**: the values precedence engine and the editor schema
//! - **Form**: tree building, range-slider merging, root form assembly
//! - **Mutate / Autocomplete**: edits and suggestions on top of the above
//! - **Engine**: facade bound to [`EngineSettings`]

pub mod autocomplete;
pub mod compile;
pub mod config;
pub mod context;
pub mod engine;
pub mod enum_options;
pub mod error;
pub mod form;
pub mod mutate;
pub mod path;
pub mod schema;
pub mod template;
pub mod validation;

pub use autocomplete::{compute_autocomplete_options, AutocompleteOption, Overwrite};
pub use compile::{compute_helm_values, CompileMode, CompiledValues};
pub use config::EngineSettings;
pub use engine::FormEngine;
pub use error::{FormError, Result};
pub use form::{
    compute_root_form, ChartDependency, DependencyForm, FieldKind, FormField, FormFieldGroup, FormFieldValue,
    FormNode, RangeEnd, RangeEndValue, RootForm,
};
pub use path::{PathSegment, ValuePath};
pub use schema::{SchemaNode, SchemaType};
pub use validation::{validate, Validation};
