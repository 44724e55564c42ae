// src/process/status.rs

use std::fmt;

use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;

/// How a child terminated. Decoded once from the raw wait status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    ExitedNormally(i32),
    KilledBySignal(Signal),
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::ExitedNormally(0))
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            ExitStatus::ExitedNormally(code) => Some(*code),
            ExitStatus::KilledBySignal(_) => None,
        }
    }

    /// Decode a terminal wait status. Stop/continue notifications are not
    /// terminations and yield `None`.
    pub fn from_wait_status(status: WaitStatus) -> Option<(Pid, ExitStatus)> {
        match status {
            WaitStatus::Exited(pid, code) => Some((pid, ExitStatus::ExitedNormally(code))),
            WaitStatus::Signaled(pid, sig, _core_dumped) => {
                Some((pid, ExitStatus::KilledBySignal(sig)))
            }
            _ => None,
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::ExitedNormally(code) => write!(f, "exited with code {code}"),
            ExitStatus::KilledBySignal(sig) => write!(f, "killed by signal {sig}"),
        }
    }
}

/// A reaped child and how it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    pub pid: Pid,
    pub status: ExitStatus,
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "child {} {}", self.pid, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_terminal_statuses_only() {
        let pid = Pid::from_raw(42);

        assert_eq!(
            ExitStatus::from_wait_status(WaitStatus::Exited(pid, 3)),
            Some((pid, ExitStatus::ExitedNormally(3)))
        );
        assert_eq!(
            ExitStatus::from_wait_status(WaitStatus::Signaled(pid, Signal::SIGKILL, false)),
            Some((pid, ExitStatus::KilledBySignal(Signal::SIGKILL)))
        );
        assert_eq!(ExitStatus::from_wait_status(WaitStatus::StillAlive), None);
        assert_eq!(ExitStatus::from_wait_status(WaitStatus::Continued(pid)), None);
    }

    #[test]
    fn only_code_zero_is_success() {
        assert!(ExitStatus::ExitedNormally(0).success());
        assert!(!ExitStatus::ExitedNormally(1).success());
        assert!(!ExitStatus::KilledBySignal(Signal::SIGTERM).success());
        assert_eq!(ExitStatus::KilledBySignal(Signal::SIGTERM).code(), None);
    }

    #[test]
    fn display_is_readable() {
        let out = ExitOutcome {
            pid: Pid::from_raw(7),
            status: ExitStatus::KilledBySignal(Signal::SIGSEGV),
        };
        assert_eq!(out.to_string(), "child 7 killed by signal SIGSEGV");
    }
}
