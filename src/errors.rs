// src/errors.rs

//! Crate-wide error type and helpers.

use nix::errno::Errno;
use nix::unistd::Pid;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProclabError {
    /// The OS refused to create another process (resource exhaustion).
    #[error("failed to spawn child process: {0}")]
    Spawn(Errno),

    #[error("cannot execute '{program}': {source}")]
    Exec {
        program: String,
        #[source]
        source: Errno,
    },

    #[error("permission denied: {0}")]
    Permission(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("waiting for child {pid} failed: {source}")]
    Wait {
        pid: Pid,
        #[source]
        source: Errno,
    },

    /// The pid is not (or no longer) tracked by the fleet.
    #[error("child {0} is not tracked by this fleet (already reaped?)")]
    UnknownChild(Pid),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProclabError {
    /// Classify an I/O failure of a read against `subsystem`.
    pub fn from_io(subsystem: &str, err: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(format!("{subsystem}: {err}")),
            ErrorKind::PermissionDenied => Self::Permission(format!("{subsystem}: {err}")),
            ErrorKind::Unsupported => Self::Unsupported(format!("{subsystem}: {err}")),
            _ => Self::IoError(err),
        }
    }

    /// Whether the scenario that hit this error can carry on.
    ///
    /// Only spawn failures, wait failures and broken configuration abort a
    /// scenario; everything else is reported and skipped.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::Spawn(_) | Self::Wait { .. } | Self::ConfigError(_) | Self::TomlError(_)
        )
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ProclabError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn io_errors_map_to_taxonomy() {
        let nf = ProclabError::from_io("status", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(nf, ProclabError::NotFound(ref m) if m.starts_with("status")));

        let perm = ProclabError::from_io("fd", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(perm, ProclabError::Permission(_)));

        let other = ProclabError::from_io("exe", io::Error::from(io::ErrorKind::InvalidData));
        assert!(matches!(other, ProclabError::IoError(_)));
    }

    #[test]
    fn spawn_failure_is_fatal_exec_failure_is_not() {
        assert!(!ProclabError::Spawn(Errno::EAGAIN).is_recoverable());
        let exec = ProclabError::Exec {
            program: "nope".into(),
            source: Errno::ENOENT,
        };
        assert!(exec.is_recoverable());
        assert!(ProclabError::Permission("nice".into()).is_recoverable());
    }
}
