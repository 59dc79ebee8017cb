//! Console rendering of catalog entries and artifacts.

use crate::bundler::ArchivedEngine;
use crate::catalog::{Engine, EngineList};
use std::fmt;

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Description: {}", self.description)?;
        writeln!(f, "Author: {}", self.author)?;
        writeln!(f, "Homepage: {}", self.homepage)?;
        writeln!(f, "Sources:")?;
        for source in &self.sources {
            writeln!(f, " - {}", source.url)?;
            if let Some(arch) = &source.arch {
                writeln!(f, "   Arch: {}", crate::catalog::describe_arch(arch))?;
            }
            writeln!(f, "   SHA256: {}", source.sha256)?;
        }
        Ok(())
    }
}

impl fmt::Display for EngineList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Engines (catalog {}):", self.metadata.version)?;
        for engine in &self.engines {
            writeln!(f, "\t - {}", engine.name)?;
        }
        Ok(())
    }
}

impl fmt::Display for ArchivedEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name())?;
        writeln!(f, " - {}", self.path().display())?;
        writeln!(f, "   SHA256: {}", self.sha256())
    }
}

/// Prints installed engines, or a note when there are none.
pub fn print_installed(engines: &[ArchivedEngine]) {
    println!("Installed engines:");
    if engines.is_empty() {
        println!("\t(none)");
    }
    for engine in engines {
        print!("{engine}");
    }
}
