//! Parameter presets.
//!
//! A preset is a named set of starting values for the four live parameters.
//! It carries no engine constants; those live in [`GritConfig`](crate::GritConfig).
//!
//! # TOML Format
//!
//! ```toml
//! name = "Dusty"
//! description = "Light crackle, short slap"
//!
//! [params]
//! density = 25
//! noise = 10
//! mix = 0.35
//! feedback = 0.2
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use grit_core::ParamSnapshot;

use crate::config::ParamsSection;
use crate::error::ConfigError;
use crate::validation::{ValidationResult, validate_param};

/// A named parameter set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Parameter values.
    #[serde(default)]
    pub params: ParamsSection,
}

impl Preset {
    /// Create a preset holding the default parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            params: ParamsSection::default(),
        }
    }

    /// Create a preset with a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the parameter values.
    #[must_use]
    pub fn with_params(mut self, params: impl Into<ParamsSection>) -> Self {
        self.params = params.into();
        self
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        std::fs::write(path, self.to_toml()?).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Parameter values as an engine snapshot.
    pub fn snapshot(&self) -> ParamSnapshot {
        self.params.into()
    }

    /// Check every parameter against its range.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors: Vec<_> = grit_core::ParamId::ALL
            .into_iter()
            .filter_map(|id| validate_param(id, self.params.get(id)).err())
            .collect();
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(crate::ValidationError::Multiple(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_missing_params() {
        let preset = Preset::from_toml("name = \"Bare\"").unwrap();
        assert_eq!(preset.name, "Bare");
        assert_eq!(preset.snapshot(), ParamSnapshot::default());
    }

    #[test]
    fn builder_and_round_trip() {
        let preset = Preset::new("Test")
            .with_description("round trip")
            .with_params(ParamSnapshot {
                density: 10,
                noise_amount: 5,
                mix: 0.25,
                feedback: 0.5,
            });
        let text = preset.to_toml().unwrap();
        assert_eq!(Preset::from_toml(&text).unwrap(), preset);
    }

    #[test]
    fn validate_reports_bad_values() {
        let mut preset = Preset::new("Bad");
        preset.params.mix = 2.0;
        assert!(preset.validate().is_err());
        preset.params.mix = 1.0;
        assert!(preset.validate().is_ok());
    }
}
