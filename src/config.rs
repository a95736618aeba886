use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub const DEFAULT_DATA_PATH: &str = "data/FunOlympic.csv";
pub const DEFAULT_ADDR: &str = "127.0.0.1:8050";
pub const DEFAULT_TERMINAL_LOG: &str = "funolympics-dashboard.log";

#[derive(Debug, Parser)]
#[command(author, version, about = "FunOlympics viewership dashboard", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Viewership CSV loaded at startup
    #[arg(short = 'd', long, value_name = "PATH", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Enable debug logging
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Serve the dashboard to a browser (default)
    Serve {
        /// Address to listen on
        #[arg(short = 'a', long, value_name = "HOST:PORT", default_value = DEFAULT_ADDR)]
        addr: String,
    },
    /// Explore the dashboard in the terminal
    Tui {
        /// Where `-v` debug output goes while the terminal is in use
        #[arg(long, value_name = "PATH", default_value = DEFAULT_TERMINAL_LOG)]
        log_file: PathBuf,
    },
}

impl Cli {
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve {
            addr: DEFAULT_ADDR.to_string(),
        })
    }
}
