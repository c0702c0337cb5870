//! Setup files and presets for the grit engine.
//!
//! The engine itself never touches the file system. This crate turns TOML on
//! disk into the [`EngineSettings`](grit_core::EngineSettings) and
//! [`ParamSnapshot`](grit_core::ParamSnapshot) it is built from, and back.
//!
//! # Features
//!
//! - **Setup files**: [`GritConfig`] with engine, delay, filter, limiter, and
//!   starting parameter sections
//! - **Presets**: named parameter sets, with [factory presets](factory_presets)
//!   always available
//! - **Overrides**: `key=value` parameter edits via [`parse_override`]
//! - **Validation**: every field checked against its range
//! - **Paths**: platform-specific config and preset directories
//!
//! # Example
//!
//! ```rust
//! use grit_config::{GritConfig, get_factory_preset, parse_override};
//!
//! let mut config = GritConfig::from_toml("[delay]\nleft_ms = 120.0").unwrap();
//! config.params = get_factory_preset("dusty").unwrap().params;
//!
//! let (id, value) = parse_override("mix=80%").unwrap();
//! config.params.set(id, value).unwrap();
//! config.validate().unwrap();
//!
//! let settings = config.engine_settings();
//! assert_eq!(settings.tap_ms[0], 120.0);
//! ```

mod config;
mod error;
mod overrides;
mod preset;

/// Platform-specific paths for the setup file and presets.
#[cfg(feature = "std")]
pub mod paths;

/// Setup file and preset validation.
pub mod validation;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use config::{
    DelaySection, EngineSection, FilterSection, GritConfig, LimiterSection, ParamsSection,
};
pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_presets, get_factory_preset, is_factory_preset,
};
pub use overrides::{parse_override, parse_param_value};
#[cfg(feature = "std")]
pub use paths::{
    default_config_path, ensure_user_presets_dir, find_preset, list_user_presets,
    preset_name_from_path, user_config_dir, user_presets_dir,
};
pub use preset::Preset;
pub use validation::{ValidationError, ValidationResult, validate_config, validate_param};

/// Resolves a preset by factory name, file path, or user preset name, in
/// that order.
#[cfg(feature = "std")]
pub fn resolve_preset(name: &str) -> Result<Preset, ConfigError> {
    if let Some(preset) = get_factory_preset(name) {
        return Ok(preset);
    }
    let path = find_preset(name).ok_or_else(|| ConfigError::PresetNotFound(name.to_string()))?;
    Preset::load(path)
}
