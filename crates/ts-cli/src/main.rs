use std::ffi::OsString;

use ts_cli::delegate::{self, FAILURE_EXIT_CODE};
use ts_cli::{Config, guidance, logging};
use ts_core::SystemHost;

/// Resolve the delegate and run it, returning the launcher's exit code.
fn launch(args: &[OsString]) -> i32 {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("tempo: invalid launcher configuration: {err}");
            return FAILURE_EXIT_CODE;
        }
    };
    tracing::debug!(?config, "loaded configuration");

    let plan = config.search_plan();
    let Some(target) = plan.resolve(&SystemHost::from_env()) else {
        if let Err(err) = guidance::write_not_found(&mut std::io::stderr().lock(), &plan) {
            tracing::warn!(error = %err, "failed to print guidance");
        }
        return FAILURE_EXIT_CODE;
    };

    match delegate::delegate(&target, args, config.interrupt_grace()) {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            eprintln!("tempo: {err}");
            FAILURE_EXIT_CODE
        }
    }
}

fn main() {
    logging::init(false);

    // Every argument belongs to the delegate, including --help and --version.
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    std::process::exit(launch(&args));
}
