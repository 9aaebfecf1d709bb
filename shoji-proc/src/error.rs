//! Error types for process supervision.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpawnError {
    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("child process is missing a standard stream")]
    MissingStdio,
}
