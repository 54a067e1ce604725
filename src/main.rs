pub mod cli;
pub mod serve;

use colored::Colorize;
use tracing_subscriber::EnvFilter;

fn main() {
    let command_line_interface = cli::CommandLineInterface::load();
    init_tracing(command_line_interface.default_log_filter());
    if let Err(error) = command_line_interface.run() {
        eprintln!("{} {error:#}", "error:".red().bold());
        std::process::exit(exit_code(&error));
    }
}

fn init_tracing(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Codec failures keep their kind-specific code; everything else is 1.
fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<json_si::Error>()
        .map_or(1, |err| json_si::to_exit_code(err.kind()))
}
