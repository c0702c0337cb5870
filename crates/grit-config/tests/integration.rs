//! Integration tests for grit-config.
//!
//! These tests go from files on disk to a running engine.

use std::sync::Arc;

use grit_config::{
    ConfigError, GritConfig, Preset, factory_presets, get_factory_preset, parse_override,
};
use grit_core::{BLOCK_SAMPLES, Engine, ParamId, ParameterSet};
use tempfile::TempDir;

/// A saved setup file builds the same engine as the one it was saved from.
#[test]
fn test_config_file_to_engine() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("grit.toml");

    let mut config = GritConfig::default();
    config.engine.pool_blocks = 24;
    config.delay.left_ms = 50.0;
    config.delay.right_ms = 75.0;
    config.save(&path).unwrap();

    let loaded = GritConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
    loaded.validate().unwrap();

    let params = Arc::new(ParameterSet::new(loaded.initial_params()));
    let mut engine = Engine::new(loaded.engine_settings(), params);
    assert_eq!(engine.pool().capacity(), 24);

    let input = [0.1_f32; BLOCK_SAMPLES];
    let mut left = [0.0_f32; BLOCK_SAMPLES];
    let mut right = [0.0_f32; BLOCK_SAMPLES];
    for _ in 0..8 {
        engine.process_block(&input, &mut left, &mut right);
    }
    assert!(left.iter().chain(&right).all(|s| s.is_finite()));
}

/// Every factory preset drives the engine without leaking blocks.
#[test]
fn test_factory_presets_run() {
    for preset in factory_presets() {
        let params = Arc::new(ParameterSet::new(preset.snapshot()));
        let config = GritConfig::default();
        let mut engine = Engine::new(config.engine_settings(), params);

        let input: Vec<f32> = (0..BLOCK_SAMPLES)
            .map(|i| (i as f32 * 0.05).sin() * 0.5)
            .collect();
        let mut left = [0.0_f32; BLOCK_SAMPLES];
        let mut right = [0.0_f32; BLOCK_SAMPLES];
        for _ in 0..32 {
            engine.process_block(&input, &mut left, &mut right);
        }

        assert_eq!(
            engine.pool().in_use(),
            0,
            "preset '{}' left blocks in flight",
            preset.name
        );
    }
}

/// User presets save and load through the file system.
#[test]
fn test_preset_save_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("mine.toml");

    let mut preset = get_factory_preset("wreck").unwrap();
    preset.name = "Mine".to_string();
    let (id, value) = parse_override("feedback=0.5").unwrap();
    preset.params.set(id, value).unwrap();
    preset.save(&path).unwrap();

    let loaded = Preset::load(&path).unwrap();
    assert_eq!(loaded.name, "Mine");
    assert_eq!(loaded.params.get(ParamId::Feedback), 0.5);
    assert_eq!(loaded.params.density, 100);
}

/// Overrides written into a live parameter set reach the engine snapshot.
#[test]
fn test_overrides_apply_to_parameter_set() {
    let params = ParameterSet::default();
    for text in ["density=90", "noise=35", "mix=10%", "feedback=0.25"] {
        let (id, value) = parse_override(text).unwrap();
        params.set_by_id(id, value);
    }
    let snapshot = params.snapshot();
    assert_eq!(snapshot.density, 90);
    assert_eq!(snapshot.noise_amount, 35);
    assert!((snapshot.mix - 0.1).abs() < 1e-6);
    assert_eq!(snapshot.feedback, 0.25);
}

/// Missing and malformed files produce the matching error variants.
#[test]
fn test_error_variants() {
    let temp_dir = TempDir::new().unwrap();

    let missing = GritConfig::load(temp_dir.path().join("absent.toml"));
    assert!(matches!(missing, Err(ConfigError::ReadFile { .. })));

    let bad = temp_dir.path().join("bad.toml");
    std::fs::write(&bad, "[params\ndensity = ").unwrap();
    assert!(matches!(
        Preset::load(&bad),
        Err(ConfigError::TomlParse(_))
    ));
}
