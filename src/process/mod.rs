// src/process/mod.rs

//! OS process primitives: identity of the running process, exit status
//! decoding and image replacement.
//!
//! Nothing here keeps global state. Code that needs its own pid, its
//! parent or its scheduling priority receives a [`CurrentProcess`].

pub mod exec;
pub mod status;

pub use exec::replace_image;
pub use status::{ExitOutcome, ExitStatus};

use nix::errno::Errno;
use nix::unistd::{self, Pid};

use crate::errors::{ProclabError, Result};

/// Capability handle for "the process this code is running in".
///
/// A value is only valid in the process that acquired it; after a fork the
/// child must acquire its own (the fleet does this for child bodies).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentProcess {
    pid: Pid,
}

impl CurrentProcess {
    pub fn acquire() -> Self {
        Self {
            pid: unistd::getpid(),
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Live parent pid; changes when this process is orphaned.
    pub fn parent_pid(&self) -> Pid {
        unistd::getppid()
    }

    /// Current nice value of this process.
    pub fn niceness(&self) -> Result<i32> {
        Errno::clear();
        // SAFETY: getpriority has no memory-safety preconditions.
        let value = unsafe { libc::getpriority(libc::PRIO_PROCESS, 0) };
        if value == -1 && Errno::last_raw() != 0 {
            return Err(priority_error("getpriority", Errno::last()));
        }
        Ok(value)
    }

    /// Add `delta` to this process's nice value and return the new value.
    ///
    /// Lowering niceness (negative delta) needs privileges; denial comes
    /// back as [`ProclabError::Permission`].
    pub fn adjust_niceness(&self, delta: i32) -> Result<i32> {
        Errno::clear();
        // SAFETY: nice has no memory-safety preconditions.
        let value = unsafe { libc::nice(delta) };
        if value == -1 && Errno::last_raw() != 0 {
            return Err(priority_error("nice", Errno::last()));
        }
        Ok(value)
    }
}

fn priority_error(call: &str, errno: Errno) -> ProclabError {
    match errno {
        Errno::EPERM | Errno::EACCES => {
            ProclabError::Permission(format!("{call}: {}", errno.desc()))
        }
        other => ProclabError::Other(anyhow::anyhow!("{call} failed: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_process_matches_std() {
        let me = CurrentProcess::acquire();
        assert_eq!(me.pid().as_raw() as u32, std::process::id());
        assert_ne!(me.parent_pid(), me.pid());
    }

    #[test]
    fn zero_delta_leaves_niceness_unchanged() {
        let me = CurrentProcess::acquire();
        let before = me.niceness().unwrap();
        assert_eq!(me.adjust_niceness(0).unwrap(), before);
    }

    #[test]
    fn eperm_is_a_permission_error() {
        assert!(matches!(
            priority_error("nice", Errno::EPERM),
            ProclabError::Permission(_)
        ));
        assert!(matches!(
            priority_error("nice", Errno::EINVAL),
            ProclabError::Other(_)
        ));
    }
}
