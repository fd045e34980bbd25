//! Form-tree generation
//!
//! This module provides:
//! - The serialisable form model (`types`)
//! - Depth-first tree building from schema and values (`builder`)
//! - Range-slider pairing and empty-group pruning (`range_slider`)
//! - Assembly of the final [`RootForm`] (`root`)

mod builder;
mod range_slider;
mod root;
pub mod types;

pub use root::compute_root_form;
pub use types::{
    ChartDependency, DependencyForm, FieldKind, FormField, FormFieldGroup, FormFieldValue, FormNode, RangeEnd,
    RangeEndValue, RangeSliderHalf, RootForm,
};
