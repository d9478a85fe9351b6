//! Command-line argument definitions for the installer.
//!
//! The launcher itself takes no flags; every argument belongs to the delegate.

use clap::Parser;

use crate::install::{DEFAULT_PACKAGE, InstallOptions};

/// Install the tempo time tracker binary via cargo.
///
/// Runs `cargo install` once. On failure, prints what to do next.
#[derive(Debug, Parser)]
#[command(name = "tempo-install", version, about, long_about = None)]
pub struct InstallCli {
    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Crate to install.
    #[arg(long, default_value = DEFAULT_PACKAGE)]
    pub package: String,

    /// Print the cargo command instead of running it.
    #[arg(long)]
    pub dry_run: bool,
}

impl InstallCli {
    pub fn options(&self) -> InstallOptions {
        InstallOptions {
            package: self.package.clone(),
            dry_run: self.dry_run,
        }
    }
}
