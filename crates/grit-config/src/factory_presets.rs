//! Factory presets bundled with the library.
//!
//! These are embedded at compile time and always available, whatever is on
//! disk.

use crate::Preset;

/// Names of the factory presets, in display order.
pub static FACTORY_PRESET_NAMES: &[&str] = &["clean", "dusty", "glitch", "wreck"];

static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("clean", CLEAN_PRESET),
    ("dusty", DUSTY_PRESET),
    ("glitch", GLITCH_PRESET),
    ("wreck", WRECK_PRESET),
];

const CLEAN_PRESET: &str = r#"
name = "Clean"
description = "Filtered input only, no dirt and no echo"

[params]
density = 0
noise = 0
mix = 0.0
feedback = 0.0
"#;

const DUSTY_PRESET: &str = r#"
name = "Dusty"
description = "Occasional 7-bit crackle under a short decaying echo"

[params]
density = 25
noise = 10
mix = 0.35
feedback = 0.2
"#;

const GLITCH_PRESET: &str = r#"
name = "Glitch"
description = "Power-on defaults of the hardware unit: half the samples crushed to 6 bits"

[params]
density = 50
noise = 20
mix = 0.5
feedback = 0.0
"#;

const WRECK_PRESET: &str = r#"
name = "Wreck"
description = "Every sample at 2 bits with heavy noise, long regenerating tail"

[params]
density = 100
noise = 60
mix = 0.8
feedback = 0.9
"#;

/// All factory presets.
///
/// Presets that fail to parse are skipped and logged; the embedded strings
/// are covered by tests, so this only matters while editing them.
pub fn factory_presets() -> Vec<Preset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(name, toml)| match Preset::from_toml(toml) {
            Ok(preset) => Some(preset),
            Err(e) => {
                tracing::error!(preset = name, error = %e, "factory preset does not parse");
                None
            }
        })
        .collect()
}

/// Get a factory preset by name (case-insensitive).
pub fn get_factory_preset(name: &str) -> Option<Preset> {
    let lower = name.to_ascii_lowercase();
    FACTORY_PRESETS_TOML
        .iter()
        .find(|(n, _)| *n == lower)
        .and_then(|(_, toml)| Preset::from_toml(toml).ok())
}

/// Whether `name` is a factory preset.
pub fn is_factory_preset(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    FACTORY_PRESET_NAMES.contains(&lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grit_core::ParamSnapshot;

    #[test]
    fn every_factory_preset_parses_and_validates() {
        let presets = factory_presets();
        assert_eq!(presets.len(), FACTORY_PRESET_NAMES.len());
        for preset in &presets {
            preset
                .validate()
                .unwrap_or_else(|e| panic!("{} invalid: {e}", preset.name));
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(get_factory_preset("WRECK").is_some());
        assert!(is_factory_preset("Dusty"));
        assert!(!is_factory_preset("fuzz"));
        assert!(get_factory_preset("fuzz").is_none());
    }

    #[test]
    fn glitch_matches_engine_defaults() {
        let glitch = get_factory_preset("glitch").unwrap();
        assert_eq!(glitch.snapshot(), ParamSnapshot::default());
    }

    #[test]
    fn clean_is_fully_dry() {
        let clean = get_factory_preset("clean").unwrap().snapshot();
        assert_eq!(clean.mix, 0.0);
        assert_eq!(clean.density, 0);
    }
}
