//! File-based processing command.

use super::common::{EngineArgs, format_param};
use anyhow::Context;
use clap::Args;
use grit_core::{ParamId, ParameterSet, linear_to_db};
use grit_io::{RenderOptions, WavSpec, read_wav, render_with_progress, write_wav_stereo};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file (mixed down to mono)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file (stereo)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    #[command(flatten)]
    engine: EngineArgs,

    /// Silence rendered after the input, in ms (default: until the echoes die)
    #[arg(long)]
    tail_ms: Option<f32>,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "16", value_parser = parse_bit_depth)]
    bit_depth: u16,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

fn parse_bit_depth(s: &str) -> Result<u16, String> {
    match s.parse::<u16>() {
        Ok(bits @ (16 | 24 | 32)) => Ok(bits),
        _ => Err(format!("unsupported bit depth '{}' (expected 16, 24, or 32)", s)),
    }
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    let mut config = args.engine.resolve()?;

    println!("Reading {}...", args.input.display());
    let (samples, spec) = read_wav(&args.input)?;
    println!(
        "  {} samples, {} Hz, {:.2}s",
        samples.len(),
        spec.sample_rate,
        samples.len() as f32 / spec.sample_rate as f32
    );

    // The file decides the rate, not the setup
    if config.engine.sample_rate != spec.sample_rate {
        tracing::debug!(
            configured = config.engine.sample_rate,
            file = spec.sample_rate,
            "using the input file's sample rate"
        );
        config.engine.sample_rate = spec.sample_rate;
    }
    config
        .validate()
        .with_context(|| format!("cannot process {}", args.input.display()))?;

    let snapshot = config.initial_params();
    let summary: Vec<_> = ParamId::ALL
        .iter()
        .map(|&id| format!("{}={}", id.name(), format_param(id, config.params.get(id))))
        .collect();
    println!("Processing with {}...", summary.join(" "));

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let output = render_with_progress(
        config.engine_settings(),
        Arc::new(ParameterSet::new(snapshot)),
        &samples,
        &RenderOptions {
            tail_ms: args.tail_ms,
        },
        |done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        },
    );
    pb.finish_with_message("done");

    let input_peak = samples.iter().fold(0.0_f32, |p, s| p.max(s.abs()));
    println!("\nStats:");
    println!("  Input peak:  {:.1} dB", linear_to_db(input_peak));
    println!("  Output peak: {:.1} dB", linear_to_db(output.peak()));
    println!(
        "  Length:      {:.2}s ({:.2}s tail)",
        output.len() as f32 / spec.sample_rate as f32,
        (output.len() - samples.len()) as f32 / spec.sample_rate as f32
    );

    let out_spec = WavSpec {
        channels: 2,
        sample_rate: spec.sample_rate,
        bits_per_sample: args.bit_depth,
    };
    write_wav_stereo(&args.output, &output, out_spec)?;
    println!("\nWrote {}", args.output.display());

    Ok(())
}
