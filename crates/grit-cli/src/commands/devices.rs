//! Audio device listing command.

use clap::Args;
use grit_io::{AudioDevice, default_device, list_devices};

#[derive(Args)]
pub struct DevicesArgs {
    /// Show only the default input and output
    #[arg(long)]
    defaults: bool,
}

pub fn run(args: DevicesArgs) -> anyhow::Result<()> {
    let (default_in, default_out) = default_device()?;
    let default_in = default_in.map(|d| d.name);
    let default_out = default_out.map(|d| d.name);

    if args.defaults {
        println!("Input:  {}", default_in.as_deref().unwrap_or("none"));
        println!("Output: {}", default_out.as_deref().unwrap_or("none"));
        return Ok(());
    }

    let devices = list_devices()?;
    if devices.is_empty() {
        println!("No audio devices found.");
        return Ok(());
    }

    let inputs: Vec<_> = devices.iter().filter(|d| d.is_input).collect();
    let outputs: Vec<_> = devices.iter().filter(|d| d.is_output).collect();
    print_section("Inputs", &inputs, default_in.as_deref());
    print_section("Outputs", &outputs, default_out.as_deref());

    println!("Select with an index or part of a name:");
    println!("  grit realtime --input 0 --output \"USB\" --preset dusty");
    Ok(())
}

fn print_section(title: &str, devices: &[&AudioDevice], default: Option<&str>) {
    if devices.is_empty() {
        return;
    }
    println!("{title}:");
    for (idx, device) in devices.iter().enumerate() {
        let marker = if Some(device.name.as_str()) == default { "*" } else { " " };
        println!(
            " {marker}[{idx}] {} ({} Hz)",
            device.name, device.default_sample_rate
        );
    }
    println!();
}
