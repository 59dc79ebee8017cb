//! Command line argument parsing and validation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Builds installable engine archives from an engine catalog
#[derive(Parser, Debug)]
#[command(
    name = "engine_bundler",
    version,
    about = "Builds installable engine archives from an engine catalog",
    long_about = "Downloads a prebuilt engine distribution listed in the catalog, verifies its \
SHA-256 checksum, restructures it into the bundle layout and repackages it as <NAME>.tar.7z.

Usage:
  engine_bundler --engines engines.json list
  engine_bundler --engines engines.json info WS9Wine3.0.1
  engine_bundler --engines engines.json build WS9Wine3.0.1 --out-dir ./out --p7zip /usr/local/bin/7za

Exit code 0 = artifact guaranteed to exist in the output directory."
)]
pub struct Args {
    /// Path to the engine catalog (engines.json)
    #[arg(
        short = 'e',
        long,
        value_name = "PATH",
        env = "ENGINE_BUNDLER_CATALOG",
        default_value = "engines.json",
        global = true
    )]
    pub engines: PathBuf,

    /// Operation to perform
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build an engine archive
    Build(BuildArgs),

    /// Show one engine from the catalog
    Info {
        /// Engine name, e.g. WS9Wine3.0.1
        name: String,
    },

    /// List engines in the catalog
    List {
        /// Also list installed engines
        #[arg(long)]
        installed: bool,

        /// Directory of installed engines
        #[arg(long, value_name = "DIR", env = "ENGINE_BUNDLER_INSTALLED_DIR")]
        installed_dir: Option<PathBuf>,
    },

    /// List installed engines only
    Installed {
        /// Directory of installed engines
        #[arg(long, value_name = "DIR", env = "ENGINE_BUNDLER_INSTALLED_DIR")]
        dir: Option<PathBuf>,
    },
}

/// Arguments of `build`
#[derive(clap::Args, Debug)]
pub struct BuildArgs {
    /// Engine name, e.g. WS9Wine3.0.1
    pub name: String,

    /// Output directory for the built engine (defaults to the current directory)
    #[arg(short = 'o', long, value_name = "DIR", env = "ENGINE_BUNDLER_OUTPUT_DIR")]
    pub out_dir: Option<PathBuf>,

    /// Download cache directory (defaults to the user cache directory)
    #[arg(long, value_name = "DIR", env = "ENGINE_BUNDLER_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Path to 7za
    #[arg(long, value_name = "PATH", env = "ENGINE_BUNDLER_7ZA", default_value = "7za")]
    pub p7zip: PathBuf,

    /// Path to tar
    #[arg(long, value_name = "PATH", env = "ENGINE_BUNDLER_TAR", default_value = "tar")]
    pub tar: PathBuf,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        let name = match &self.command {
            Command::Build(build) => Some(&build.name),
            Command::Info { name } => Some(name),
            Command::List { .. } | Command::Installed { .. } => None,
        };
        if name.is_some_and(|n| n.trim().is_empty()) {
            return Err("Engine name cannot be empty".to_string());
        }
        if let Command::List {
            installed: false,
            installed_dir: Some(_),
        } = &self.command
        {
            return Err("--installed-dir requires --installed".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_build() {
        let args = Args::try_parse_from([
            "engine_bundler",
            "--engines",
            "cat.json",
            "build",
            "X",
            "--out-dir",
            "out",
            "--p7zip",
            "/opt/7za",
        ])
        .unwrap();
        assert_eq!(args.engines, PathBuf::from("cat.json"));
        match args.command {
            Command::Build(build) => {
                assert_eq!(build.name, "X");
                assert_eq!(build.out_dir, Some(PathBuf::from("out")));
                assert_eq!(build.p7zip, PathBuf::from("/opt/7za"));
            }
            other => panic!("expected build, got {other:?}"),
        }
    }

    #[test]
    fn rejects_blank_name() {
        let args = Args::try_parse_from(["engine_bundler", "info", " "]).unwrap();
        assert!(args.validate().is_err());
    }

    #[test]
    fn installed_dir_requires_flag() {
        let args =
            Args::try_parse_from(["engine_bundler", "list", "--installed-dir", "/tmp"]).unwrap();
        assert!(args.validate().is_err());
    }
}
