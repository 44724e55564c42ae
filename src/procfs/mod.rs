// src/procfs/mod.rs

//! Process inspector backed by the live `/proc` interface.
//!
//! The three reads (status, executable link, open descriptors) are
//! independent: [`inspect`] attempts all of them and records each result
//! separately, so one failure never hides the others.

use std::fmt::{self, Debug};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use crate::errors::{ProclabError, Result};

pub mod mock;
pub mod status;

pub use status::StatusSummary;

/// Which process to inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcTarget {
    Pid(u32),
    /// The inspecting process itself (`/proc/self`).
    SelfProcess,
}

impl ProcTarget {
    fn dir_name(&self) -> String {
        match self {
            ProcTarget::Pid(pid) => pid.to_string(),
            ProcTarget::SelfProcess => "self".to_string(),
        }
    }
}

impl FromStr for ProcTarget {
    type Err = ProclabError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ProclabError::InvalidInput(
                "missing target process identifier".to_string(),
            ));
        }
        if s.eq_ignore_ascii_case("self") {
            return Ok(ProcTarget::SelfProcess);
        }
        s.parse::<u32>()
            .map(ProcTarget::Pid)
            .map_err(|_| ProclabError::InvalidInput(format!("'{s}' is not a process id")))
    }
}

impl fmt::Display for ProcTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dir_name())
    }
}

/// Abstract source of live process metadata.
pub trait ProcSource: Send + Sync + Debug {
    /// Raw text of the status blob.
    fn read_status(&self, target: ProcTarget) -> Result<String>;

    /// Resolved path of the running executable.
    fn read_exe(&self, target: ProcTarget) -> Result<PathBuf>;

    /// Open descriptor numbers, ascending.
    fn list_fds(&self, target: ProcTarget) -> Result<Vec<u32>>;
}

/// Implementation reading a procfs mount (normally `/proc`).
#[derive(Debug, Clone)]
pub struct RealProcSource {
    root: PathBuf,
    supported: bool,
}

impl RealProcSource {
    /// The system's `/proc`. On platforms without procfs every read fails
    /// with [`ProclabError::Unsupported`].
    pub fn system() -> Self {
        Self {
            root: PathBuf::from("/proc"),
            supported: cfg!(target_os = "linux"),
        }
    }

    /// A procfs-shaped tree rooted somewhere else.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            supported: true,
        }
    }

    fn entry(&self, target: ProcTarget, leaf: &str) -> Result<PathBuf> {
        if !self.supported {
            return Err(ProclabError::Unsupported(format!(
                "/proc/{target}/{leaf}: no procfs on this platform"
            )));
        }
        Ok(self.root.join(target.dir_name()).join(leaf))
    }
}

impl Default for RealProcSource {
    fn default() -> Self {
        Self::system()
    }
}

impl ProcSource for RealProcSource {
    fn read_status(&self, target: ProcTarget) -> Result<String> {
        let path = self.entry(target, "status")?;
        fs::read_to_string(&path).map_err(|e| ProclabError::from_io(&display(&path), e))
    }

    fn read_exe(&self, target: ProcTarget) -> Result<PathBuf> {
        let path = self.entry(target, "exe")?;
        fs::read_link(&path).map_err(|e| ProclabError::from_io(&display(&path), e))
    }

    fn list_fds(&self, target: ProcTarget) -> Result<Vec<u32>> {
        let path = self.entry(target, "fd")?;
        let dir = fs::read_dir(&path).map_err(|e| ProclabError::from_io(&display(&path), e))?;

        let mut fds = Vec::new();
        for entry in dir {
            let entry = entry.map_err(|e| ProclabError::from_io(&display(&path), e))?;
            if let Some(fd) = entry.file_name().to_str().and_then(|n| n.parse().ok()) {
                fds.push(fd);
            }
        }
        fds.sort_unstable();
        Ok(fds)
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// Result of inspecting one process: one independent outcome per read.
#[derive(Debug)]
pub struct InspectionReport {
    pub target: ProcTarget,
    pub status: Result<StatusSummary>,
    pub exe: Result<PathBuf>,
    pub fds: Result<Vec<u32>>,
}

impl InspectionReport {
    /// Errors of the reads that failed, in read order.
    pub fn failures(&self) -> Vec<&ProclabError> {
        [
            self.status.as_ref().err(),
            self.exe.as_ref().err(),
            self.fds.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

impl fmt::Display for InspectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            Ok(summary) => write!(f, "{summary}")?,
            Err(e) => writeln!(f, "Error reading /proc/{}/status: {e}", self.target)?,
        }
        match &self.exe {
            Ok(path) => writeln!(f, "Executable Path: {}", path.display())?,
            Err(e) => writeln!(f, "Error reading exe: {e}")?,
        }
        match &self.fds {
            Ok(fds) => writeln!(f, "Open File Descriptors: {fds:?}"),
            Err(e) => writeln!(f, "Error reading fds: {e}"),
        }
    }
}

/// Attempt all three reads against `target`.
pub fn inspect(source: &dyn ProcSource, target: ProcTarget) -> InspectionReport {
    let status = source
        .read_status(target)
        .and_then(|text| StatusSummary::parse(&text));
    let exe = source.read_exe(target);
    let fds = source.list_fds(target);

    debug!(
        %target,
        status_ok = status.is_ok(),
        exe_ok = exe.is_ok(),
        fds_ok = fds.is_ok(),
        "inspected process"
    );

    InspectionReport {
        target,
        status,
        exe,
        fds,
    }
}

/// Read and parse only the status blob.
pub fn status_of(source: &dyn ProcSource, target: ProcTarget) -> Result<StatusSummary> {
    StatusSummary::parse(&source.read_status(target)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_parse_from_operator_input() {
        assert_eq!("42".parse::<ProcTarget>().unwrap(), ProcTarget::Pid(42));
        assert_eq!(" SELF ".parse::<ProcTarget>().unwrap(), ProcTarget::SelfProcess);
        assert!(matches!("".parse::<ProcTarget>(), Err(ProclabError::InvalidInput(_))));
        assert!(matches!("-3".parse::<ProcTarget>(), Err(ProclabError::InvalidInput(_))));
    }

    #[test]
    fn unsupported_platform_fails_every_read() {
        let src = RealProcSource {
            root: PathBuf::from("/proc"),
            supported: false,
        };
        let report = inspect(&src, ProcTarget::SelfProcess);
        assert_eq!(report.failures().len(), 3);
        assert!(report
            .failures()
            .iter()
            .all(|e| matches!(e, ProclabError::Unsupported(_))));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn self_inspection_succeeds_on_linux() {
        let report = inspect(&RealProcSource::system(), ProcTarget::SelfProcess);
        assert!(report.failures().is_empty(), "{report}");

        let summary = report.status.as_ref().unwrap();
        // The status blob describes the thread-group leader, which may be
        // sleeping while a test thread runs, so only check stable fields.
        assert!(summary.state_code().is_some());
        assert!(!summary.name.is_empty());
        let parent = nix::unistd::getppid().as_raw() as u32;
        assert_eq!(summary.ppid, Some(parent));
        assert!(report.fds.as_ref().unwrap().contains(&0));
    }
}
