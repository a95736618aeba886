use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("malformed row {row}: {source}")]
    Malformed {
        row: u64,
        #[source]
        source: csv::Error,
    },

    #[error("invalid value in row {row}, column {column}: {reason}")]
    InvalidField {
        row: u64,
        column: &'static str,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Serve(#[from] ServeError),

    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}
