//! Command line interface for the engine bundler.
//!
//! Parses arguments, supplies platform default directories and renders
//! results. All real work is delegated to [`EngineManager`].

mod args;
pub mod output;

pub use args::{Args, BuildArgs, Command};

use crate::bundler::SettingsBuilder;
use crate::error::{CliError, Result};
use crate::manager::{EngineManager, installed_engines};
use std::path::PathBuf;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute(args).await
}

/// Executes already parsed arguments.
pub async fn execute(args: Args) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let manager = EngineManager::from_path(&args.engines)?;

    match args.command {
        Command::Build(build) => {
            let settings = SettingsBuilder::new()
                .cache_dir(build.cache_dir.map_or_else(default_cache_dir, Ok)?)
                .output_dir(build.out_dir.map_or_else(std::env::current_dir, Ok)?)
                .compressor(&build.p7zip)
                .extractor(&build.tar)
                .build()?;

            let archived = manager.build(&build.name, settings).await?;
            println!("Engine built successfully.\n");
            print!("{archived}");
        }
        Command::Info { name } => {
            print!("{}", manager.info(&name)?);
        }
        Command::List {
            installed,
            installed_dir,
        } => {
            let installed_dir = match (installed, installed_dir) {
                (false, _) => None,
                (true, Some(dir)) => Some(dir),
                (true, None) => Some(default_installed_dir()?),
            };
            let listing = manager.list(installed_dir.as_deref()).await?;

            println!("Available engines:");
            for engine in listing.available {
                println!("{engine}");
            }
            if let Some(installed) = &listing.installed {
                output::print_installed(installed);
            }
        }
        Command::Installed { dir } => {
            let dir = dir.map_or_else(default_installed_dir, Ok)?;
            output::print_installed(&installed_engines(&dir).await?);
        }
    }

    Ok(0)
}

/// `<user cache>/engine_bundler`
fn default_cache_dir() -> Result<PathBuf> {
    dirs::cache_dir()
        .map(|dir| dir.join("engine_bundler"))
        .ok_or_else(|| {
            CliError::NoDefaultDirectory {
                what: "cache directory",
            }
            .into()
        })
}

/// `<user data>/Wineskin/Engines`
fn default_installed_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("Wineskin").join("Engines"))
        .ok_or_else(|| {
            CliError::NoDefaultDirectory {
                what: "installed engines directory",
            }
            .into()
        })
}
