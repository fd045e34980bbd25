use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod validator;

pub use validator::{SettingsValidator, ValidationError};

const DEFAULT_RESERVED_CONTEXT_KEY: &str = "s3";
const DEFAULT_ROOT_TITLE: &str = "<root>";
const DEFAULT_SLIDER_STEP: f64 = 1.0;

/// Tunables of the form engine
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct EngineSettings {
    /// Context key whose reads are reported by `compute_helm_values`
    #[serde(default = "default_reserved_context_key")]
    pub reserved_context_key: String,
    /// Maximum schema nesting accepted when parsing
    #[serde(default = "default_max_schema_depth")]
    pub max_schema_depth: usize,
    /// Title given to the root group of a form
    #[serde(default = "default_root_title")]
    pub root_title: String,
    /// Step of a single slider that declares none
    #[serde(default = "default_slider_step")]
    pub default_slider_step: f64,
}

fn default_reserved_context_key() -> String {
    DEFAULT_RESERVED_CONTEXT_KEY.to_string()
}

fn default_max_schema_depth() -> usize {
    crate::schema::DEFAULT_MAX_DEPTH
}

fn default_root_title() -> String {
    DEFAULT_ROOT_TITLE.to_string()
}

fn default_slider_step() -> f64 {
    DEFAULT_SLIDER_STEP
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            reserved_context_key: default_reserved_context_key(),
            max_schema_depth: default_max_schema_depth(),
            root_title: default_root_title(),
            default_slider_step: default_slider_step(),
        }
    }
}

impl EngineSettings {
    /// Load settings from `path` (TOML, YAML or JSON by extension) and the
    /// `HELM_FORM_*` environment, over the built-in defaults
    ///
    /// A missing file is not an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        Self::load_with_env(path, Environment::with_prefix("HELM_FORM").try_parsing(true))
    }

    fn load_with_env(path: impl AsRef<Path>, env: Environment) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .set_default("reserved_context_key", DEFAULT_RESERVED_CONTEXT_KEY)?
            .set_default("max_schema_depth", crate::schema::DEFAULT_MAX_DEPTH as i64)?
            .set_default("root_title", DEFAULT_ROOT_TITLE)?
            .set_default("default_slider_step", DEFAULT_SLIDER_STEP)?
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(env)
            .build()?;

        let settings: EngineSettings = s.try_deserialize()?;

        SettingsValidator::validate(&settings).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!("Settings validation failed:\n{}", error_messages.join("\n"))
        })?;

        Ok(settings)
    }
}
