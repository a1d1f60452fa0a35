// gridiron entry point.
//
// Startup sequence:
// 1. Parse the command line
// 2. Initialize tracing (stderr, or a file with --log-file)
// 3. Load config and dispatch the subcommand

use clap::Parser;
use gridiron_app::cli::Cli;
use gridiron_app::{commands, logging};
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    // 1. Parse the command line
    let cli = Cli::parse();

    // 2. Initialize tracing
    logging::init_tracing(cli.log_file.as_deref(), cli.verbose)?;
    info!("gridiron {} starting", env!("CARGO_PKG_VERSION"));

    // 3. Load config and run
    if let Err(e) = commands::run(cli) {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}
