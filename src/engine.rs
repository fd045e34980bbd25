//! The engine facade
//!
//! [`FormEngine`] binds the free functions of the crate to one set of
//! [`EngineSettings`].

use serde_json::Value;

use crate::autocomplete::{self, AutocompleteOption};
use crate::compile::{self, CompileMode, CompiledValues};
use crate::config::EngineSettings;
use crate::error::Result;
use crate::form::{self, ChartDependency, FormFieldValue, RootForm};
use crate::mutate;
use crate::path::ValuePath;
use crate::schema::{resolver::resolve_schema, SchemaNode};

#[derive(Clone, Debug, Default)]
pub struct FormEngine {
    settings: EngineSettings,
}

impl FormEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Parse a schema, enforcing the configured nesting limit
    pub fn parse_schema(&self, schema: &Value) -> Result<SchemaNode> {
        resolve_schema(schema, self.settings.max_schema_depth)
    }

    /// Compile the values document and the editor schema
    pub fn compute_helm_values(
        &self,
        schema: &SchemaNode,
        legacy_values: Option<&Value>,
        context: &Value,
        mode: CompileMode,
    ) -> Result<CompiledValues> {
        compile::compute_helm_values(
            schema,
            legacy_values,
            context,
            mode,
            &self.settings.reserved_context_key,
        )
    }

    pub fn compute_root_form(
        &self,
        schema: &SchemaNode,
        values: &Value,
        context: &Value,
        dependencies: &[ChartDependency],
    ) -> Result<RootForm> {
        form::compute_root_form(schema, values, context, dependencies, &self.settings)
    }

    pub fn compute_autocomplete_options(
        &self,
        schema: &SchemaNode,
        values: &Value,
        context: &Value,
        source_context: &Value,
        path: &ValuePath,
    ) -> Vec<AutocompleteOption> {
        autocomplete::compute_autocomplete_options(schema, values, context, source_context, path)
    }

    /// Apply one edit from the rendering layer
    pub fn update(&self, values: &mut Value, root_form: &RootForm, edit: &FormFieldValue) -> Result<()> {
        mutate::update(values, root_form, edit)
    }

    pub fn add_array_item(
        &self,
        values: &mut Value,
        schema: &SchemaNode,
        context: &Value,
        legacy_values: Option<&Value>,
        path: &ValuePath,
    ) -> Result<()> {
        mutate::add_array_item(values, schema, context, legacy_values, path)
    }

    pub fn remove_array_item(&self, values: &mut Value, path: &ValuePath) -> Result<()> {
        mutate::remove_array_item(values, path)
    }
}
