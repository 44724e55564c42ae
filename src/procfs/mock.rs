// src/procfs/mock.rs

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::{ProcSource, ProcTarget};
use crate::errors::{ProclabError, Result};

/// One fake process. A `None` field fails that read with `Permission`.
#[derive(Debug, Clone, Default)]
pub struct MockProcess {
    pub status: Option<String>,
    pub exe: Option<PathBuf>,
    pub fds: Option<Vec<u32>>,
}

/// In-memory [`ProcSource`]. Unknown pids fail every read with `NotFound`.
#[derive(Debug, Clone, Default)]
pub struct MockProcSource {
    processes: Arc<Mutex<HashMap<u32, MockProcess>>>,
    self_pid: u32,
}

impl MockProcSource {
    pub fn new(self_pid: u32) -> Self {
        Self {
            processes: Arc::default(),
            self_pid,
        }
    }

    pub fn add_process(&self, pid: u32, process: MockProcess) {
        self.processes.lock().unwrap().insert(pid, process);
    }

    pub fn remove_process(&self, pid: u32) {
        self.processes.lock().unwrap().remove(&pid);
    }

    fn with_process<T>(
        &self,
        target: ProcTarget,
        leaf: &str,
        read: impl FnOnce(&MockProcess) -> Option<T>,
    ) -> Result<T> {
        let pid = match target {
            ProcTarget::Pid(pid) => pid,
            ProcTarget::SelfProcess => self.self_pid,
        };
        let processes = self.processes.lock().unwrap();
        let process = processes
            .get(&pid)
            .ok_or_else(|| ProclabError::NotFound(format!("/proc/{pid}/{leaf}")))?;
        read(process).ok_or_else(|| ProclabError::Permission(format!("/proc/{pid}/{leaf}")))
    }
}

impl ProcSource for MockProcSource {
    fn read_status(&self, target: ProcTarget) -> Result<String> {
        self.with_process(target, "status", |p| p.status.clone())
    }

    fn read_exe(&self, target: ProcTarget) -> Result<PathBuf> {
        self.with_process(target, "exe", |p| p.exe.clone())
    }

    fn list_fds(&self, target: ProcTarget) -> Result<Vec<u32>> {
        self.with_process(target, "fd", |p| p.fds.clone())
    }
}
