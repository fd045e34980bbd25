use thiserror::Error;

use crate::config::EngineSettings;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub struct SettingsValidator;

impl SettingsValidator {
    /// Collect every problem with `settings`
    pub fn validate(settings: &EngineSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if settings.reserved_context_key.is_empty() {
            errors.push(ValidationError::MissingField("reserved_context_key".to_string()));
        }

        if settings.max_schema_depth == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "max_schema_depth".to_string(),
                reason: "Depth must be greater than 0".to_string(),
            });
        }

        if settings.root_title.is_empty() {
            errors.push(ValidationError::MissingField("root_title".to_string()));
        }

        if !(settings.default_slider_step.is_finite() && settings.default_slider_step > 0.0) {
            errors.push(ValidationError::InvalidValue {
                field: "default_slider_step".to_string(),
                reason: format!("Step must be positive, got {}", settings.default_slider_step),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_settings() {
        assert!(SettingsValidator::validate(&EngineSettings::default()).is_ok());
    }

    #[test]
    fn test_invalid_step() {
        let settings = EngineSettings {
            default_slider_step: 0.0,
            ..Default::default()
        };

        let result = SettingsValidator::validate(&settings);
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_every_problem_is_reported() {
        let settings = EngineSettings {
            reserved_context_key: String::new(),
            max_schema_depth: 0,
            root_title: String::new(),
            default_slider_step: -1.0,
        };

        let errors = SettingsValidator::validate(&settings).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| matches!(e, ValidationError::MissingField(f) if f == "root_title")));
    }
}
