//! The engine setup file.
//!
//! A [`GritConfig`] holds everything that is fixed when the engine is built
//! (pool sizing, delay and filter constants, limiter envelope) plus the
//! parameter values the engine starts with. Every field has a default, so a
//! file only needs the keys it wants to change.
//!
//! # TOML Format
//!
//! ```toml
//! [engine]
//! sample_rate = 44100
//! pool_blocks = 60
//! queue_depth = 4
//!
//! [delay]
//! max_ms = 500.0
//! left_ms = 200.0
//! right_ms = 200.0
//!
//! [filter]
//! cutoff_hz = 500.0
//! resonance = 0.7
//!
//! [limiter]
//! attack_ms = 5.0
//! hold_ms = 50.0
//! release_ms = 100.0
//! threshold_db = -1.0
//!
//! [params]
//! density = 50
//! noise = 20
//! mix = 0.5
//! feedback = 0.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use grit_core::{Channel, EngineSettings, Lcg, LimiterSettings, ParamId, ParamSnapshot};

use crate::error::ConfigError;
use crate::validation::{ValidationResult, validate_config};

/// `[engine]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineSection {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Blocks in the pool.
    pub pool_blocks: usize,
    /// Capacity of each block queue.
    pub queue_depth: usize,
    /// Seed for the distortion random source.
    pub seed: u32,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            pool_blocks: 60,
            queue_depth: 4,
            seed: Lcg::DEFAULT_SEED,
        }
    }
}

/// `[delay]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DelaySection {
    /// Longest tap the delay line can hold.
    pub max_ms: f32,
    /// Left (and feedback) tap.
    pub left_ms: f32,
    /// Right tap.
    pub right_ms: f32,
}

impl Default for DelaySection {
    fn default() -> Self {
        Self {
            max_ms: 500.0,
            left_ms: 200.0,
            right_ms: 200.0,
        }
    }
}

/// `[filter]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterSection {
    /// Input low-pass cutoff.
    pub cutoff_hz: f32,
    /// Input low-pass Q.
    pub resonance: f32,
}

impl Default for FilterSection {
    fn default() -> Self {
        Self {
            cutoff_hz: 500.0,
            resonance: 0.7,
        }
    }
}

/// `[limiter]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LimiterSection {
    /// Envelope attack time.
    pub attack_ms: f32,
    /// Peak hold time.
    pub hold_ms: f32,
    /// Envelope release time.
    pub release_ms: f32,
    /// Output ceiling in dBFS.
    pub threshold_db: f32,
}

impl Default for LimiterSection {
    fn default() -> Self {
        let d = LimiterSettings::default();
        Self {
            attack_ms: d.attack_ms,
            hold_ms: d.hold_ms,
            release_ms: d.release_ms,
            threshold_db: d.threshold_db,
        }
    }
}

impl From<&LimiterSection> for LimiterSettings {
    fn from(s: &LimiterSection) -> Self {
        LimiterSettings {
            attack_ms: s.attack_ms,
            hold_ms: s.hold_ms,
            release_ms: s.release_ms,
            threshold_db: s.threshold_db,
        }
    }
}

/// `[params]` section: starting values for the live tunables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParamsSection {
    /// Crush probability in percent (0-100).
    pub density: u8,
    /// Crush depth and noise level (0-60).
    #[serde(alias = "noise_amount")]
    pub noise: u8,
    /// Dirty share of the output (0-1).
    pub mix: f32,
    /// Feedback request (0-1).
    pub feedback: f32,
}

impl Default for ParamsSection {
    fn default() -> Self {
        ParamSnapshot::default().into()
    }
}

impl From<ParamSnapshot> for ParamsSection {
    fn from(s: ParamSnapshot) -> Self {
        Self {
            density: s.density,
            noise: s.noise_amount,
            mix: s.mix,
            feedback: s.feedback,
        }
    }
}

impl From<ParamsSection> for ParamSnapshot {
    fn from(p: ParamsSection) -> Self {
        ParamSnapshot {
            density: p.density,
            noise_amount: p.noise,
            mix: p.mix,
            feedback: p.feedback,
        }
    }
}

impl ParamsSection {
    /// Sets one parameter. Integer parameters are rounded.
    ///
    /// The value is range-checked as given, before rounding, and left
    /// unchanged if it is out of range.
    pub fn set(&mut self, id: ParamId, value: f32) -> ValidationResult<()> {
        crate::validation::validate_param(id, value)?;
        match id {
            ParamId::Density => self.density = round_to_u8(value),
            ParamId::NoiseAmount => self.noise = round_to_u8(value),
            ParamId::Mix => self.mix = value,
            ParamId::Feedback => self.feedback = value,
        }
        Ok(())
    }

    /// Current value of one parameter.
    pub fn get(&self, id: ParamId) -> f32 {
        match id {
            ParamId::Density => f32::from(self.density),
            ParamId::NoiseAmount => f32::from(self.noise),
            ParamId::Mix => self.mix,
            ParamId::Feedback => self.feedback,
        }
    }
}

fn round_to_u8(value: f32) -> u8 {
    // Range-checked by the caller
    value.round() as u8
}

/// Complete setup file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GritConfig {
    /// Pool and scheduling constants.
    pub engine: EngineSection,
    /// Delay network constants.
    pub delay: DelaySection,
    /// Input filter constants.
    pub filter: FilterSection,
    /// Output limiter constants.
    pub limiter: LimiterSection,
    /// Starting parameter values.
    pub params: ParamsSection,
}

impl GritConfig {
    /// Load a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the config to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Serialize the config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_config(self)
    }

    /// Engine construction constants.
    pub fn engine_settings(&self) -> EngineSettings {
        let mut tap_ms = [0.0; Channel::COUNT];
        tap_ms[Channel::Left.index()] = self.delay.left_ms;
        tap_ms[Channel::Right.index()] = self.delay.right_ms;

        EngineSettings {
            sample_rate: self.engine.sample_rate as f32,
            pool_blocks: self.engine.pool_blocks,
            queue_depth: self.engine.queue_depth,
            max_delay_ms: self.delay.max_ms,
            tap_ms,
            filter_cutoff_hz: self.filter.cutoff_hz,
            filter_resonance: self.filter.resonance,
            limiter: (&self.limiter).into(),
            seed: self.engine.seed,
        }
    }

    /// Starting parameter values.
    pub fn initial_params(&self) -> ParamSnapshot {
        self.params.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;

    #[test]
    fn empty_file_gives_defaults() {
        let config = GritConfig::from_toml("").unwrap();
        assert_eq!(config, GritConfig::default());
        assert_eq!(config.engine_settings(), EngineSettings::default());
        assert_eq!(config.initial_params(), ParamSnapshot::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = GritConfig::from_toml(
            r#"
            [delay]
            right_ms = 333.0

            [params]
            noise_amount = 40
            "#,
        )
        .unwrap();
        assert_eq!(config.delay.right_ms, 333.0);
        assert_eq!(config.delay.left_ms, 200.0);
        assert_eq!(config.params.noise, 40);
        assert_eq!(config.params.density, 50);

        let settings = config.engine_settings();
        assert_eq!(settings.tap_ms, [200.0, 333.0]);
    }

    #[test]
    fn toml_round_trip() {
        let mut config = GritConfig::default();
        config.engine.pool_blocks = 16;
        config.limiter.threshold_db = -3.0;
        config.params.set(ParamId::Mix, 0.8).unwrap();

        let text = config.to_toml().unwrap();
        assert!(text.contains("[limiter]"));
        assert_eq!(GritConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn params_set_rounds_integers() {
        let mut p = ParamsSection::default();
        p.set(ParamId::Density, 49.6).unwrap();
        assert_eq!(p.density, 50);
        assert_eq!(p.get(ParamId::Density), 50.0);
    }

    #[test]
    fn params_set_reports_the_value_given() {
        let mut p = ParamsSection::default();
        let before = p;
        let err = p.set(ParamId::Density, 300.0).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange { value, .. } if value == 300.0
        ));
        assert!(err.to_string().contains("300"));
        assert!(p.set(ParamId::NoiseAmount, 1e9).is_err());
        assert!(p.set(ParamId::Mix, f32::NAN).is_err());
        assert_eq!(p, before);
    }

    #[test]
    fn wrong_types_are_parse_errors() {
        let err = GritConfig::from_toml("[engine]\nsample_rate = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }
}
