use std::io;
use std::path::PathBuf;

use thiserror::Error;
use ultpit::{ConfigError, UltpitError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ultpit(#[from] UltpitError),

    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("cannot open log file {}: {source}", path.display())]
    Log { path: PathBuf, source: io::Error },
}

pub type CliResult<T> = Result<T, CliError>;
