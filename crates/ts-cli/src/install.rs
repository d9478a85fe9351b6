//! One-shot install of the delegate through `cargo`.
//!
//! Best effort: failures are reported with remediation steps and never
//! retried.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use anyhow::{Context, Result};

/// Crate that provides the delegate binary.
pub const DEFAULT_PACKAGE: &str = "tempo-cli";

/// What the install attempt ended with.
#[derive(Debug)]
pub enum InstallOutcome {
    /// No release target for this platform; nothing was attempted.
    Unsupported { os: String, arch: String },
    /// Dry run; the command was printed instead of run.
    DryRun,
    Installed,
    CargoMissing,
    CargoFailed(ExitStatus),
}

impl InstallOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unsupported { .. } | Self::DryRun | Self::Installed => 0,
            Self::CargoMissing | Self::CargoFailed(_) => 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub package: String,
    pub dry_run: bool,
}

/// Maps an OS/architecture pair (as in `std::env::consts`) to a release
/// target triple.
pub fn detect_target(os: &str, arch: &str) -> Option<&'static str> {
    let arm = arch.contains("arm") || arch.contains("aarch64");
    match os {
        "macos" if arm => Some("aarch64-apple-darwin"),
        "macos" => Some("x86_64-apple-darwin"),
        "linux" if arm => Some("aarch64-unknown-linux-gnu"),
        "linux" => Some("x86_64-unknown-linux-gnu"),
        "windows" => Some("x86_64-pc-windows-msvc"),
        _ => None,
    }
}

/// Finds `cargo` on `PATH`.
pub fn locate_cargo() -> Option<PathBuf> {
    which::which("cargo")
        .inspect_err(|err| tracing::debug!(error = %err, "cargo not on PATH"))
        .ok()
}

/// Runs `cargo install` once for the host described by `os`/`arch`.
///
/// Progress and remediation text go to `writer`; cargo itself inherits the
/// process's stdio.
pub fn run<W: Write>(
    writer: &mut W,
    options: &InstallOptions,
    os: &str,
    arch: &str,
    cargo: Option<&Path>,
) -> Result<InstallOutcome> {
    let Some(target) = detect_target(os, arch) else {
        writeln!(writer, "Unsupported platform: {os} {arch}")?;
        writeln!(
            writer,
            "Please install Tempo manually with: cargo install {}",
            options.package
        )?;
        return Ok(InstallOutcome::Unsupported {
            os: os.to_string(),
            arch: arch.to_string(),
        });
    };
    tracing::debug!(target, "detected release target");

    let Some(cargo) = cargo else {
        writeln!(
            writer,
            "Cargo not found. Please install Rust first: https://rustup.rs/"
        )?;
        writeln!(writer, "Then run: cargo install {}", options.package)?;
        return Ok(InstallOutcome::CargoMissing);
    };

    if options.dry_run {
        writeln!(
            writer,
            "Would run: {} install {}",
            cargo.display(),
            options.package
        )?;
        return Ok(InstallOutcome::DryRun);
    }

    writeln!(writer, "Installing Tempo via cargo...")?;
    writer.flush()?;
    let status = Command::new(cargo)
        .arg("install")
        .arg(&options.package)
        .status()
        .with_context(|| format!("failed to start {}", cargo.display()))?;

    if status.success() {
        write_quick_start(writer)?;
        Ok(InstallOutcome::Installed)
    } else {
        tracing::warn!(%status, "cargo install failed");
        writeln!(writer, "Failed to install via cargo.")?;
        writeln!(
            writer,
            "Please ensure Rust is installed: https://rustup.rs/"
        )?;
        writeln!(writer, "Then run: cargo install {}", options.package)?;
        Ok(InstallOutcome::CargoFailed(status))
    }
}

fn write_quick_start<W: Write>(writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "Tempo installed successfully!")?;
    writeln!(writer)?;
    writeln!(writer, "Quick start:")?;
    writeln!(writer, "  tempo start               # Start the daemon")?;
    writeln!(writer, "  tempo status              # Check status")?;
    writeln!(writer, "  tempo session start       # Begin tracking")?;
    writeln!(writer, "  tempo list                # View projects")?;
    writeln!(writer, "  tempo dashboard           # Interactive dashboard")?;
    Ok(())
}
