//! User-facing text printed when the delegate cannot be found.

use std::io::Write;

use ts_core::SearchPlan;

/// Writes the not-found report with numbered remediation steps.
pub fn write_not_found<W: Write>(writer: &mut W, plan: &SearchPlan) -> std::io::Result<()> {
    writeln!(writer, "tempo: the tempo binary was not found.")?;
    if !plan.aliases().is_empty() {
        writeln!(writer, "Searched PATH for: {}", plan.aliases().join(", "))?;
    }
    if !plan.probe_paths().is_empty() {
        writeln!(writer, "Checked:")?;
        for path in plan.probe_paths() {
            writeln!(writer, "  {}", path.display())?;
        }
    }
    writeln!(writer)?;
    writeln!(
        writer,
        "This usually means the installation didn't complete successfully."
    )?;
    writeln!(writer, "Please try one of these alternatives:")?;
    writeln!(writer, "  1. Install via cargo: cargo install tempo-cli")?;
    writeln!(writer, "  2. Install via homebrew: brew install tempo")?;
    writeln!(
        writer,
        "  3. Reinstall this package: pip install --force-reinstall tempo-tracker-cli"
    )?;
    Ok(())
}
