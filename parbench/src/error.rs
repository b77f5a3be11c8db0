use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid {name}: {reason}")]
    InvalidConfig { name: &'static str, reason: String },

    #[error("failed to allocate input array of {items} items")]
    Allocation { items: u64 },

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("worker {worker} panicked; run aborted")]
    WorkerPanicked { worker: usize },

    #[error("failed to write report: {0}")]
    Report(#[source] io::Error),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidConfig {
            name,
            reason: reason.into(),
        }
    }
}

/// Rejects zero for a count-like setting.
pub(crate) fn require_positive(name: &'static str, value: u64) -> Result<u64> {
    if value == 0 {
        Err(Error::invalid(name, "must be a positive integer"))
    } else {
        Ok(value)
    }
}
