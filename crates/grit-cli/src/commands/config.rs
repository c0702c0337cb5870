//! Setup file commands.

use super::common::EngineArgs;
use clap::{Args, Subcommand};
use grit_config::{GritConfig, default_config_path};
use std::path::PathBuf;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write a setup file with every default spelled out
    Init {
        /// Where to write it (default: the user config file)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective setup after presets and overrides
    Show {
        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Check a setup file
    Validate {
        /// Setup file to check
        path: PathBuf,
    },

    /// Show the user config file location
    Path,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Init { path, force } => {
            let path = path.unwrap_or_else(default_config_path);
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            GritConfig::default().save(&path)?;
            println!("Wrote {}", path.display());
        }
        ConfigCommand::Show { engine } => {
            let config = engine.resolve()?;
            print!("{}", config.to_toml()?);
        }
        ConfigCommand::Validate { path } => {
            let config = GritConfig::load(&path)?;
            match config.validate() {
                Ok(()) => println!("{}: ok", path.display()),
                Err(e) => anyhow::bail!("{}: {}", path.display(), e),
            }
        }
        ConfigCommand::Path => println!("{}", default_config_path().display()),
    }
    Ok(())
}
