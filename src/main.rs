use std::process;
use std::time::Instant;

use clap::Parser;

use funolympics_dashboard::config::{Cli, Command};
use funolympics_dashboard::logging::{init_logger, init_terminal_logger, log_dataset_loaded};
use funolympics_dashboard::server::Server;
use funolympics_dashboard::{terminal, Dashboard, DashboardError, Dataset};

fn main() {
    let cli = Cli::parse();
    let command = cli.resolved_command();
    match &command {
        Command::Tui { log_file } => {
            if let Err(e) = init_terminal_logger(cli.verbose, log_file) {
                eprintln!("Error: cannot open log file {}: {}", log_file.display(), e);
                process::exit(1);
            }
        }
        Command::Serve { .. } => init_logger(cli.verbose, cli.quiet),
    }

    if let Err(e) = run(&cli, command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli, command: Command) -> Result<(), DashboardError> {
    let started = Instant::now();
    let dataset = Dataset::load(&cli.data)?;
    log_dataset_loaded(&cli.data, &dataset.summary(), started.elapsed().as_millis());
    let dashboard = Dashboard::new(dataset);

    match command {
        Command::Serve { addr } => Server::new(dashboard).serve(&addr)?,
        Command::Tui { .. } => terminal::run(&dashboard)?,
    }
    Ok(())
}
