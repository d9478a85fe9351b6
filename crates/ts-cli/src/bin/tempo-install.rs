use anyhow::Result;
use clap::Parser;

use ts_cli::{InstallCli, install, logging};

fn main() -> Result<()> {
    let cli = InstallCli::parse();
    logging::init(cli.verbose);

    let cargo = install::locate_cargo();
    let outcome = install::run(
        &mut std::io::stdout().lock(),
        &cli.options(),
        std::env::consts::OS,
        std::env::consts::ARCH,
        cargo.as_deref(),
    )?;
    tracing::debug!(?outcome, "install finished");

    match outcome.exit_code() {
        0 => Ok(()),
        code => std::process::exit(code),
    }
}
