use crate::execution::phases::PhaseType;
use crate::graph::{EdgeListError, FormatError};
use crate::search::ContractViolation;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error on {path}: {source}")]
    IoAt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("Contract violation: {0}")]
    Contract(#[from] ContractViolation),

    #[error("Edge list error: {0}")]
    EdgeList(#[from] EdgeListError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Usage error: {0}")]
    Usage(String),

    #[error("{phase} task {task} of round {round} failed after {attempts} attempt(s): {source}")]
    TaskFailed {
        round: usize,
        phase: PhaseType,
        task: usize,
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::IoAt {
            path: path.into(),
            source,
        }
    }

    /// Whether re-running the same task on the same input could succeed
    ///
    /// Only I/O faults are transient. Malformed records and broken grouping
    /// invariants fail identically on every attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Io(_) | Error::IoAt { .. } => true,
            Error::TaskFailed { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Whether the error is caused by bad data rather than the environment
    pub fn is_data_error(&self) -> bool {
        match self {
            Error::Format(_) | Error::Contract(_) | Error::EdgeList(_) => true,
            Error::TaskFailed { source, .. } => source.is_data_error(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
