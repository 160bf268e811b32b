mod cli;
mod extract_cmd;

use std::io::IsTerminal;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

/// Progress goes to stderr so stdout carries only JSON.
///
/// `--verbose` raises the default level to `info`; `RUST_LOG` overrides both.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .without_time()
        .with_target(false)
        .with_level(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(code) = extract_cmd::run(&cli) {
        std::process::exit(code);
    }
}
