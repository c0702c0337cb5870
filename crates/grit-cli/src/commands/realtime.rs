//! Live processing command.
//!
//! Audio runs on the device callbacks. This thread polls statistics and a
//! background thread reads parameter edits from stdin, one per line:
//!
//! ```text
//! density=80
//! mix=35%
//! show
//! quit
//! ```

use super::common::{EngineArgs, format_param};
use anyhow::Context;
use clap::Args;
use grit_config::parse_override;
use grit_core::{EngineStats, ParamId, ParameterSet, StatsSnapshot};
use grit_io::{AudioStream, StreamConfig, StreamEngine};
use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[derive(Args)]
pub struct RealtimeArgs {
    #[command(flatten)]
    engine: EngineArgs,

    /// Input device name, partial name, or index
    #[arg(long = "input")]
    input_device: Option<String>,

    /// Output device name, partial name, or index
    #[arg(long = "output")]
    output_device: Option<String>,

    /// Sample rate (default: the output device's rate)
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Host buffer size in frames (default: the host's choice)
    #[arg(long)]
    buffer_size: Option<u32>,

    /// Seconds between statistics reports (0 disables them)
    #[arg(long, default_value = "5")]
    stats_interval: u64,
}

pub fn run(args: RealtimeArgs) -> anyhow::Result<()> {
    let mut config = args.engine.resolve()?;

    let mut stream = AudioStream::new(StreamConfig {
        sample_rate: args.sample_rate,
        buffer_size: args.buffer_size,
        input_device: args.input_device,
        output_device: args.output_device,
    })?;
    config.engine.sample_rate = stream.sample_rate();
    config
        .validate()
        .context("the output device's sample rate is unusable")?;

    let params = Arc::new(ParameterSet::new(config.initial_params()));
    let engine = StreamEngine::new(config.engine_settings(), Arc::clone(&params));
    let stats = Arc::clone(engine.engine().stats());

    println!("Real-time processing");
    println!("  Input:       {}", stream.input_name());
    println!("  Output:      {}", stream.output_name());
    println!("  Sample rate: {} Hz", stream.sample_rate());
    print_params(&params);
    println!("\nType key=value to change a parameter, 'show' to list them.");
    println!("Press Ctrl+C or type 'quit' to stop...\n");

    let running = stream.running_flag();
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    spawn_control_thread(Arc::clone(&params), Arc::clone(&running));

    let mut reporter = StatsReporter::new(stats, Duration::from_secs(args.stats_interval));
    stream.run(engine, || reporter.poll())?;

    reporter.report();
    let dropped = stream.dropped_input_buffers();
    if dropped > 0 {
        println!("{dropped} input buffers were dropped");
    }
    println!("Done!");
    Ok(())
}

fn print_params(params: &ParameterSet) {
    for id in ParamId::ALL {
        println!("  {:<12} {}", id.name(), format_param(id, params.get(id)));
    }
}

/// Applies stdin edits to the live parameters until EOF or `quit`.
fn spawn_control_thread(params: Arc<ParameterSet>, running: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match apply_command(&params, line.trim()) {
                Control::Continue => {}
                Control::Quit => {
                    running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
    });
}

#[derive(Debug, PartialEq, Eq)]
enum Control {
    Continue,
    Quit,
}

fn apply_command(params: &ParameterSet, line: &str) -> Control {
    match line {
        "" => {}
        "quit" | "exit" | "q" => return Control::Quit,
        "show" | "params" => print_params(params),
        _ => match parse_override(line) {
            Ok((id, value)) => {
                params.set_by_id(id, value);
                tracing::info!(
                    param = id.name(),
                    value = %format_param(id, params.get(id)),
                    "parameter changed"
                );
            }
            Err(e) => eprintln!("{e}"),
        },
    }
    Control::Continue
}

/// Logs the statistics delta every `interval`.
struct StatsReporter {
    stats: Arc<EngineStats>,
    interval: Duration,
    last: StatsSnapshot,
    last_at: Instant,
}

impl StatsReporter {
    fn new(stats: Arc<EngineStats>, interval: Duration) -> Self {
        let last = stats.snapshot();
        Self {
            stats,
            interval,
            last,
            last_at: Instant::now(),
        }
    }

    fn poll(&mut self) {
        if !self.interval.is_zero() && self.last_at.elapsed() >= self.interval {
            self.report();
        }
    }

    fn report(&mut self) {
        let now = self.stats.snapshot();
        let delta = now.since(&self.last);
        if delta.dropped_blocks() > 0 {
            tracing::warn!(%delta, "engine dropped blocks");
        } else {
            tracing::info!(%delta, "engine statistics");
        }
        self.last = now;
        self.last_at = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_edit_parameters() {
        let params = ParameterSet::default();
        assert_eq!(apply_command(&params, "density=75"), Control::Continue);
        assert_eq!(apply_command(&params, "mix=20%"), Control::Continue);
        assert_eq!(params.density(), 75);
        assert!((params.mix() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn bad_edits_leave_parameters_alone() {
        let params = ParameterSet::default();
        let before = params.snapshot();
        apply_command(&params, "noise=200");
        apply_command(&params, "volume=3");
        apply_command(&params, "show");
        assert_eq!(params.snapshot(), before);
    }

    #[test]
    fn quit_stops() {
        let params = ParameterSet::default();
        assert_eq!(apply_command(&params, "quit"), Control::Quit);
        assert_eq!(apply_command(&params, "q"), Control::Quit);
    }

    #[test]
    fn reporter_tracks_deltas() {
        let stats = Arc::new(EngineStats::new());
        let mut reporter = StatsReporter::new(Arc::clone(&stats), Duration::ZERO);
        stats.record_mixed();
        stats.record_pool_exhausted();
        reporter.report();
        assert_eq!(reporter.last, stats.snapshot());
        // A zero interval never reports on its own
        reporter.poll();
    }
}
