use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use log::{debug, info, LevelFilter};

use crate::dataset::DatasetSummary;

/// Initialize the logger. `RUST_LOG` is honoured, then narrowed or widened by
/// the verbosity flags.
pub fn init_logger(verbose: bool, quiet: bool) {
    let level = level_for(verbose, quiet);
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_module_path(false)
        .try_init();
    debug!("Logger initialized with level: {level:?}");
}

/// Terminal mode owns the screen, so log lines never reach stderr. With `-v`
/// they are appended to `log_file`; otherwise nothing is logged.
pub fn init_terminal_logger(verbose: bool, log_file: &Path) -> io::Result<()> {
    if !verbose {
        return Ok(());
    }
    let file = open_log_file(log_file)?;
    let _ = env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Debug)
        .format_module_path(false)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
    debug!("Terminal logging to {}", log_file.display());
    Ok(())
}

pub fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

pub fn level_for(verbose: bool, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

pub fn log_dataset_loaded(path: &Path, summary: &DatasetSummary, elapsed_ms: u128) {
    info!(
        "Loaded {} rows from {} ({}ms)",
        summary.rows,
        path.display(),
        elapsed_ms
    );
    info!(
        "Vocabulary: {} countries, {} sports, {} continents; {} total views",
        summary.countries, summary.sports, summary.continents, summary.total_views
    );
}
