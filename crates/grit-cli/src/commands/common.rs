//! Shared CLI helpers used across multiple commands.

use clap::Args;
use grit_config::{ConfigError, GritConfig, Preset, default_config_path, parse_override, resolve_preset};
use grit_core::ParamId;
use std::path::PathBuf;

/// Parse a `key=value` parameter override for clap's `value_parser`.
pub fn parse_param(s: &str) -> Result<(ParamId, f32), String> {
    parse_override(s).map_err(|e| e.to_string())
}

/// Options that decide how the engine is built and where it starts.
///
/// Precedence, lowest first: built-in defaults, the setup file, the preset,
/// then each `--param` in order.
#[derive(Args, Debug, Clone, Default)]
pub struct EngineArgs {
    /// Setup file (TOML). Defaults to the user config file when it exists.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Preset name (factory or user) or path to a preset file
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Parameter override, e.g. "density=80" or "mix=35%" (repeatable)
    #[arg(long, value_parser = parse_param, number_of_values = 1)]
    pub param: Vec<(ParamId, f32)>,

    /// Seed for the distortion random source
    #[arg(long)]
    pub seed: Option<u32>,
}

impl EngineArgs {
    /// Builds the effective setup and checks it.
    pub fn resolve(&self) -> anyhow::Result<GritConfig> {
        let mut config = match &self.config {
            Some(path) => GritConfig::load(path)?,
            None => {
                let path = default_config_path();
                if path.is_file() {
                    tracing::info!(path = %path.display(), "using user config");
                    GritConfig::load(&path)?
                } else {
                    GritConfig::default()
                }
            }
        };

        if let Some(name) = &self.preset {
            let preset = load_preset(name)?;
            tracing::info!(preset = %preset.name, "loaded preset");
            config.params = preset.params;
        }
        for &(id, value) in &self.param {
            config.params.set(id, value).map_err(ConfigError::from)?;
        }
        if let Some(seed) = self.seed {
            config.engine.seed = seed;
        }

        config.validate().map_err(ConfigError::from)?;
        Ok(config)
    }
}

/// Load a preset by factory name, user preset name, or path.
pub fn load_preset(name: &str) -> anyhow::Result<Preset> {
    match resolve_preset(name) {
        Ok(preset) => Ok(preset),
        Err(ConfigError::PresetNotFound(_)) => anyhow::bail!(
            "Preset '{}' not found. Use 'grit presets list' to see available presets.",
            name
        ),
        Err(e) => Err(e.into()),
    }
}

/// Formats a parameter value the way it is typed on the command line.
pub fn format_param(id: ParamId, value: f32) -> String {
    if id.spec().integer {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
