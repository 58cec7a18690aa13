use std::{io, process::ExitStatus};
use thiserror::Error;

/// Coarse classification of a failed bootloader environment call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// the tool could not be started or its stdout could not be attached
    Spawn,
    /// the tool printed a line which is not `KEY=VALUE`
    Parse,
    /// the tool ran but failed, or talking to it failed
    Process,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to spawn \"{command}\"")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("\"{command}\" printed malformed line: {line:?}")]
    Parse { command: String, line: String },
    #[error("\"{command}\" returned with {status}")]
    Exit { command: String, status: ExitStatus },
    #[error("\"{command}\" failed")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Spawn { .. } => ErrorKind::Spawn,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Exit { .. } | Self::Io { .. } => ErrorKind::Process,
        }
    }

    pub fn command(&self) -> &str {
        match self {
            Self::Spawn { command, .. }
            | Self::Parse { command, .. }
            | Self::Exit { command, .. }
            | Self::Io { command, .. } => command,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
