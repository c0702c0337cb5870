//! Preset management commands.
//!
//! Presets hold starting values for the four live parameters. Factory
//! presets are built in; user presets live in the user presets directory.

use super::common::{format_param, load_preset, parse_param};
use clap::{Args, Subcommand};
use grit_config::{
    Preset, ensure_user_presets_dir, factory_presets, is_factory_preset, list_user_presets,
    preset_name_from_path, user_presets_dir,
};
use grit_core::ParamId;

#[derive(Args)]
pub struct PresetsArgs {
    #[command(subcommand)]
    command: PresetsCommand,
}

#[derive(Subcommand)]
enum PresetsCommand {
    /// List available presets (factory and user)
    List {
        /// Show only factory presets
        #[arg(long)]
        factory: bool,

        /// Show only user presets
        #[arg(long)]
        user: bool,
    },

    /// Show details of a preset
    Show {
        /// Preset name or path
        name: String,
    },

    /// Save a parameter set as a user preset
    Save {
        /// Name for the new preset
        name: String,

        /// Preset to start from (default: engine defaults)
        #[arg(long)]
        from: Option<String>,

        /// Parameter override, e.g. "density=80" (repeatable)
        #[arg(long, value_parser = parse_param, number_of_values = 1)]
        param: Vec<(ParamId, f32)>,

        /// Description of the preset
        #[arg(short, long)]
        description: Option<String>,

        /// Overwrite if the preset already exists
        #[arg(long)]
        force: bool,
    },

    /// Delete a user preset
    Delete {
        /// Preset name to delete
        name: String,
    },

    /// Show the user presets directory
    Path,
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    match args.command {
        PresetsCommand::List { factory, user } => list(factory, user),
        PresetsCommand::Show { name } => show(&name),
        PresetsCommand::Save {
            name,
            from,
            param,
            description,
            force,
        } => save(&name, from.as_deref(), &param, description, force),
        PresetsCommand::Delete { name } => delete(&name),
        PresetsCommand::Path => {
            println!("{}", user_presets_dir().display());
            Ok(())
        }
    }
}

fn list(factory_only: bool, user_only: bool) -> anyhow::Result<()> {
    let show_factory = !user_only;
    let show_user = !factory_only;

    if show_factory {
        println!("Factory Presets:");
        for preset in factory_presets() {
            println!(
                "  {:<10} {}",
                preset.name.to_lowercase(),
                preset.description.as_deref().unwrap_or("")
            );
        }
        println!();
    }

    if show_user {
        let paths = list_user_presets();
        println!("User Presets ({}):", user_presets_dir().display());
        if paths.is_empty() {
            println!("  (none)");
        }
        for path in paths {
            let name = preset_name_from_path(&path).unwrap_or_default();
            match Preset::load(&path) {
                Ok(preset) => println!(
                    "  {:<10} {}",
                    name,
                    preset.description.as_deref().unwrap_or("")
                ),
                Err(e) => println!("  {:<10} [invalid: {}]", name, e),
            }
        }
    }

    Ok(())
}

fn show(name: &str) -> anyhow::Result<()> {
    let preset = load_preset(name)?;

    println!("{}", preset.name);
    if let Some(desc) = &preset.description {
        println!("  {desc}");
    }
    println!();
    for id in ParamId::ALL {
        println!(
            "  {:<10} {}",
            id.name(),
            format_param(id, preset.params.get(id))
        );
    }
    if let Err(e) = preset.validate() {
        println!("\n  Warning: {e}");
    }
    Ok(())
}

fn save(
    name: &str,
    from: Option<&str>,
    overrides: &[(ParamId, f32)],
    description: Option<String>,
    force: bool,
) -> anyhow::Result<()> {
    if is_factory_preset(name) {
        anyhow::bail!("'{}' is a factory preset name; pick another", name);
    }

    let mut preset = match from {
        Some(base) => load_preset(base)?,
        None => Preset::new(name),
    };
    preset.name = name.to_string();
    preset.description = description.or(preset.description);
    for &(id, value) in overrides {
        preset.params.set(id, value)?;
    }
    preset.validate()?;

    let path = ensure_user_presets_dir()?.join(format!("{name}.toml"));
    if path.exists() && !force {
        anyhow::bail!(
            "Preset '{}' already exists at {} (use --force to overwrite)",
            name,
            path.display()
        );
    }
    preset.save(&path)?;
    println!("Saved preset '{}' to {}", name, path.display());
    Ok(())
}

fn delete(name: &str) -> anyhow::Result<()> {
    if is_factory_preset(name) {
        anyhow::bail!("Cannot delete factory preset '{}'", name);
    }
    let path = user_presets_dir().join(format!("{name}.toml"));
    if !path.is_file() {
        anyhow::bail!("User preset '{}' not found", name);
    }
    std::fs::remove_file(&path)?;
    println!("Deleted preset '{}'", name);
    Ok(())
}
