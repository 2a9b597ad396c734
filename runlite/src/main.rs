use std::error::Error;

use clap::Parser;
use runlite::cli::Cli;
use runlite::launcher::Launcher;
use runlite_core::config::ObservabilityConfig;
use runlite_core::observability;
use runlite_env::LaunchError;

fn main() {
    let _cli = Cli::parse();
    observability::init(ObservabilityConfig::from_env());

    let mut launcher = Launcher::new();
    let code = match launcher.run() {
        Ok(()) => 0,
        Err(e) => {
            report(&e);
            e.exit_code()
        }
    };
    observability::audit_run_finished(launcher.reached().as_str(), code);
    if code != 0 {
        std::process::exit(code);
    }
}

/// A failed child has already printed its own diagnostics; only failures inside
/// the launcher get an error line.
fn report(e: &LaunchError) {
    if e.reported_by_child() {
        tracing::debug!(exit_code = e.exit_code(), "{}", e);
        return;
    }
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    tracing::error!("{}", message);
}
