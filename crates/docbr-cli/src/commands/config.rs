//! Config command - inspect and scaffold pipeline configuration.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;

use docbr_core::PipelineConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as JSON
    Show {
        /// Config file to show (default: built-in defaults)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Write a default configuration file
    Init {
        /// Destination path
        #[arg(default_value = "docbr.json")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.action {
        ConfigAction::Show { file } => {
            let config = match &file {
                Some(path) => PipelineConfig::from_file(path)?,
                None => PipelineConfig::default(),
            };
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Init { path, force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            PipelineConfig::default().save(Path::new(&path))?;
            println!(
                "{} Default configuration written to {}",
                style("✓").green(),
                path.display()
            );
        }
    }
    Ok(())
}
