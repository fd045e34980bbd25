//! Error types for values compilation and form building
//!
//! Every variant is a fatal condition: it points at an authoring defect in the
//! chart schema (or a malformed edit from the caller) and aborts the current
//! operation. Recoverable situations never surface here, they are expressed as
//! `Option` or [`crate::validation::Validation`] values instead.

use thiserror::Error;

use crate::path::ValuePath;

/// Errors that abort a top-level engine operation
#[derive(Debug, Error)]
pub enum FormError {
    /// No precedence tier produced a value
    #[error("No value could be resolved for '{path}'")]
    UnresolvableValue { path: ValuePath },

    /// A `const` that does not satisfy its own schema
    #[error("The const at '{path}' does not satisfy its own schema")]
    ConstViolatesSchema { path: ValuePath },

    /// The previous values document holds a value the schema rejects
    #[error("The previous value at '{path}' does not satisfy the schema")]
    LegacyValueInvalid { path: ValuePath },

    /// A list-rendered field for which no option list can be computed
    #[error("Field '{path}' is rendered as a list but no options could be resolved")]
    MissingEnumOptions { path: ValuePath },

    /// Invalid regular expression in a `pattern` keyword
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Slider hint without usable bounds
    #[error("Slider at '{path}' is missing {what}")]
    SliderBounds { path: ValuePath, what: &'static str },

    /// A `down` range-slider extremity without its `up` counterpart
    #[error("Range slider '{range_id}' has a lower end at '{path}' but no upper end")]
    RangeSliderUnpaired { range_id: String, path: ValuePath },

    /// The two ends of a range slider disagree on their unit
    #[error("Range slider '{range_id}' has mismatching units '{low}' and '{high}'")]
    RangeSliderUnitMismatch {
        range_id: String,
        low: String,
        high: String,
    },

    /// The two ends of a range slider disagree on their step, or neither has one
    #[error("Range slider '{range_id}' has an invalid step: {reason}")]
    RangeSliderStep { range_id: String, reason: String },

    /// No field with the given path exists in the form
    #[error("No {kind} field found at '{path}'")]
    FieldNotFound { path: ValuePath, kind: &'static str },

    /// A path that does not resolve inside the values document
    #[error("Path '{path}' does not exist in the values document")]
    PathNotFound { path: ValuePath },

    /// Neither the item schema nor the array schema yields a new element
    #[error("Cannot derive a default for a new item of the array at '{path}'")]
    NoArrayItemDefault { path: ValuePath },

    /// A select edit whose option index is out of range
    #[error("Option index {index} is out of range for the select at '{path}'")]
    OptionIndexOutOfRange { path: ValuePath, index: usize },

    /// A value whose runtime type cannot be presented with its schema type
    #[error("Value at '{path}' is a {found}, expected {expected}")]
    ValueTypeMismatch {
        path: ValuePath,
        expected: &'static str,
        found: &'static str,
    },

    /// Schema nesting beyond the configured limit
    #[error("Schema nesting exceeds the maximum depth of {max_depth} at '{path}'")]
    DepthExceeded { path: ValuePath, max_depth: usize },

    /// Structurally invalid schema
    #[error("Invalid schema at '{path}': {reason}")]
    InvalidSchema { path: ValuePath, reason: String },
}

/// Result alias used throughout the crate
pub type Result<T, E = FormError> = std::result::Result<T, E>;
