//! Integration tests for grit-cli.
//!
//! These run the `grit` binary built by cargo. Commands that touch the user
//! config directory point `XDG_CONFIG_HOME` at a temp dir, which only the
//! Linux `dirs` backend honors.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

fn grit_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_grit"));
    cmd.env("RUST_LOG", "warn");
    cmd
}

/// Write a mono 16-bit WAV with a decaying 220 Hz tone.
fn write_test_wav(path: &Path, frames: usize) {
    write_test_wav_at(path, frames, 44100);
}

fn write_test_wav_at(path: &Path, frames: usize, sample_rate: u32) {
    let spec = hound::WavSpec {
        sample_rate,
        ..hound_spec()
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        let t = i as f32 / sample_rate as f32;
        let s = (2.0 * std::f32::consts::PI * 220.0 * t).sin() * (-3.0 * t).exp() * 0.8;
        writer.write_sample((s * 32767.0) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

fn hound_spec() -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

// ---------------------------------------------------------------------------
// grit params / presets
// ---------------------------------------------------------------------------

#[test]
fn cli_params_lists_every_parameter() {
    let output = grit_bin().arg("params").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["density", "noise", "mix", "feedback"] {
        assert!(stdout.contains(name), "params listing should contain '{name}'");
    }
    assert!(stdout.contains("delay:1 -> dirty_queue_right:0"));
}

#[test]
fn cli_presets_list_shows_factory_presets() {
    let output = grit_bin()
        .args(["presets", "list", "--factory"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["clean", "dusty", "glitch", "wreck"] {
        assert!(stdout.contains(name), "missing factory preset '{name}'");
    }
}

#[test]
fn cli_presets_show_unknown_fails() {
    let output = grit_bin()
        .args(["presets", "show", "no-such-preset"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}

#[cfg(target_os = "linux")]
#[test]
fn cli_presets_save_show_delete() {
    let home = TempDir::new().unwrap();
    let run = |args: &[&str]| {
        grit_bin()
            .env("XDG_CONFIG_HOME", home.path())
            .args(args)
            .output()
            .unwrap()
    };

    let saved = run(&[
        "presets", "save", "mine", "--from", "dusty", "--param", "mix=90%",
    ]);
    assert!(saved.status.success(), "{}", String::from_utf8_lossy(&saved.stderr));
    assert!(home.path().join("grit/presets/mine.toml").is_file());

    let again = run(&["presets", "save", "mine"]);
    assert!(!again.status.success(), "save without --force must not overwrite");

    let shown = run(&["presets", "show", "mine"]);
    let stdout = String::from_utf8_lossy(&shown.stdout);
    assert!(stdout.contains("0.90"));
    assert!(stdout.contains("25"), "density should come from 'dusty'");

    assert!(run(&["presets", "delete", "mine"]).status.success());
    assert!(!home.path().join("grit/presets/mine.toml").exists());
}

#[test]
fn cli_presets_refuses_factory_names() {
    let output = grit_bin()
        .args(["presets", "delete", "wreck"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// grit config
// ---------------------------------------------------------------------------

#[test]
fn cli_config_init_then_validate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("grit.toml");
    let path_str = path.to_str().unwrap();

    let init = grit_bin().args(["config", "init", path_str]).output().unwrap();
    assert!(init.status.success());
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("[limiter]"));

    let again = grit_bin().args(["config", "init", path_str]).output().unwrap();
    assert!(!again.status.success());

    let ok = grit_bin()
        .args(["config", "validate", path_str])
        .output()
        .unwrap();
    assert!(ok.status.success());

    std::fs::write(&path, "[params]\nnoise = 90\n").unwrap();
    let bad = grit_bin()
        .args(["config", "validate", path_str])
        .output()
        .unwrap();
    assert!(!bad.status.success());
    assert!(String::from_utf8_lossy(&bad.stderr).contains("params.noise"));
}

#[test]
fn cli_config_show_applies_preset_and_params() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("grit.toml");
    std::fs::write(&path, "[delay]\nleft_ms = 123.0\n").unwrap();

    let output = grit_bin()
        .args(["config", "show", "--config"])
        .arg(&path)
        .args(["--preset", "wreck", "--param", "feedback=0.25"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("left_ms = 123.0"));
    assert!(stdout.contains("density = 100"));
    assert!(stdout.contains("feedback = 0.25"));
}

// ---------------------------------------------------------------------------
// grit process
// ---------------------------------------------------------------------------

#[test]
fn cli_process_writes_stereo_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output_path = dir.path().join("out.wav");
    write_test_wav(&input, 22050);

    let output = grit_bin()
        .arg("process")
        .arg(&input)
        .arg(&output_path)
        .args(["--preset", "dusty", "--tail-ms", "100", "--quiet"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "process failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let reader = hound::WavReader::open(&output_path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 44100);
    assert_eq!(spec.bits_per_sample, 16);
    // 0.5 s of input plus a 100 ms tail
    assert_eq!(reader.duration(), 22050 + 4410);
}

#[test]
fn cli_process_rejects_bad_override() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    write_test_wav(&input, 1000);

    let output = grit_bin()
        .arg("process")
        .arg(&input)
        .arg(dir.path().join("out.wav"))
        .args(["--param", "density=101"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(!dir.path().join("out.wav").exists());
}

#[test]
fn cli_process_rejects_unusable_sample_rate() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output_path = dir.path().join("out.wav");
    write_test_wav_at(&input, 64, 32);

    let output = grit_bin()
        .arg("process")
        .arg(&input)
        .arg(&output_path)
        .arg("--quiet")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("engine.sample_rate"));
    assert!(!output_path.exists());
}

#[test]
fn cli_process_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let output = grit_bin()
        .arg("process")
        .arg(dir.path().join("absent.wav"))
        .arg(dir.path().join("out.wav"))
        .output()
        .unwrap();
    assert!(!output.status.success());
}
