//! Parameter reference command.

use super::common::format_param;
use grit_core::{BLOCK_SAMPLES, MAX_FEEDBACK_GAIN, PARAM_SPECS, TOPOLOGY};

pub fn run() -> anyhow::Result<()> {
    println!("Live Parameters");
    println!("===============\n");
    println!("  {:<10} {:>6} {:>6} {:>8}  Description", "Name", "Min", "Max", "Default");
    for spec in &PARAM_SPECS {
        println!(
            "  {:<10} {:>6} {:>6} {:>8}  {}",
            spec.id.name(),
            format_param(spec.id, spec.min),
            format_param(spec.id, spec.max),
            format_param(spec.id, spec.default),
            spec.description
        );
    }

    println!();
    println!("Notes:");
    println!("  - Crushed samples keep 8 - noise/10 bits (noise 60 leaves 2 bits).");
    println!(
        "  - Feedback requests are capped at {MAX_FEEDBACK_GAIN} so the echo always decays."
    );
    println!("  - Fractional values may be written as percentages, e.g. mix=35%.");
    println!("  - The engine runs in blocks of {BLOCK_SAMPLES} samples.");

    println!();
    println!("Signal Path");
    println!("===========\n");
    for connection in &TOPOLOGY {
        let tag = if connection.is_feedback() { "  (feedback)" } else { "" };
        println!("  {connection}{tag}");
    }

    Ok(())
}
