// src/fleet/mod.rs

//! Process fleet manager: fork a batch of children, run a body in each,
//! and reap every one of them exactly once.
//!
//! - [`spawn`] / [`spawn_one`] fork and hand back [`ChildHandle`]s.
//! - A child never returns into the caller's code: after its body finishes
//!   (or fails, or panics) the process `_exit`s. See [`child`].
//! - [`ChildHandle::reap`] consumes the handle, so a handle cannot be
//!   reaped twice. A handle dropped without being reaped is reaped by its
//!   destructor (blocking) so no zombie outlives it.
//! - [`ChildHandle::into_orphan`] is the one way to let go of a child
//!   without reaping it, for a parent that is exiting anyway.
//! - [`Fleet`] tracks a batch by pid; [`Fleet::reap`] rejects pids it no
//!   longer tracks.

pub mod child;

use std::io::{self, Write};

use nix::errno::Errno;
use nix::sys::wait::waitpid;
use nix::unistd::{self, ForkResult, Pid};
use tracing::{debug, warn};

use crate::errors::{ProclabError, Result};
use crate::process::{CurrentProcess, ExitOutcome, ExitStatus};

/// What a child body sees: its position in the batch and its own process.
///
/// Anything else the body needs is captured by value; the child runs in a
/// copy of the parent's address space, so mutations are never visible to
/// the parent.
#[derive(Debug, Clone, Copy)]
pub struct ChildContext {
    pub index: usize,
    pub process: CurrentProcess,
}

/// Code run inside each forked child.
///
/// `Ok(code)` becomes the child's exit code. `Err` is reported on the
/// child's stderr and the child exits with [`child::FAILURE_EXIT_CODE`].
pub trait ChildBody {
    fn run(&self, ctx: &ChildContext) -> Result<i32>;
}

impl<F> ChildBody for F
where
    F: Fn(&ChildContext) -> Result<i32>,
{
    fn run(&self, ctx: &ChildContext) -> Result<i32> {
        self(ctx)
    }
}

/// Parent-side handle to an unreaped child.
#[must_use = "an unreaped child stays a zombie until it is reaped"]
#[derive(Debug)]
pub struct ChildHandle {
    pid: Pid,
    index: usize,
    reaped: bool,
}

impl ChildHandle {
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Position in the batch this child was spawned in.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Block until the child terminates and collect its status.
    pub fn reap(mut self) -> Result<ExitOutcome> {
        let outcome = wait_for(self.pid);
        // Even a failed wait leaves nothing for the destructor to collect.
        self.reaped = true;
        outcome
    }

    /// Give up the handle without reaping.
    ///
    /// Only for a process that is about to exit itself: the child is then
    /// reparented to the system reaper, which collects it instead.
    pub fn into_orphan(mut self) -> Pid {
        self.reaped = true;
        self.pid
    }
}

impl Drop for ChildHandle {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }
        warn!(pid = %self.pid, "child handle dropped without reaping; reaping now");
        if let Err(err) = wait_for(self.pid) {
            warn!(pid = %self.pid, error = %err, "failed to reap dropped child");
        }
    }
}

/// An ordered batch of children spawned together.
#[derive(Debug, Default)]
pub struct Fleet {
    children: Vec<ChildHandle>,
}

impl Fleet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Pids still tracked, in spawn order.
    pub fn pids(&self) -> Vec<Pid> {
        self.children.iter().map(ChildHandle::pid).collect()
    }

    pub fn push(&mut self, handle: ChildHandle) {
        self.children.push(handle);
    }

    /// Reap one tracked child by pid and stop tracking it.
    ///
    /// A pid that was never spawned by this fleet, or was already reaped,
    /// is rejected with [`ProclabError::UnknownChild`].
    pub fn reap(&mut self, pid: Pid) -> Result<ExitOutcome> {
        let pos = self
            .children
            .iter()
            .position(|h| h.pid == pid)
            .ok_or(ProclabError::UnknownChild(pid))?;
        self.children.remove(pos).reap()
    }

    /// Reap every tracked child, one blocking wait per spawned child.
    ///
    /// All children are waited for even if one wait fails; the first failure
    /// is returned after the rest have been collected.
    pub fn reap_all(mut self) -> Result<Vec<ExitOutcome>> {
        let mut outcomes = Vec::with_capacity(self.children.len());
        let mut first_err = None;

        for handle in self.children.drain(..) {
            match handle.reap() {
                Ok(outcome) => {
                    debug!(pid = %outcome.pid, status = %outcome.status, "reaped child");
                    outcomes.push(outcome);
                }
                Err(err) => {
                    warn!(error = %err, "reap failed");
                    first_err.get_or_insert(err);
                }
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(outcomes),
        }
    }
}

/// Fork `count` children, each running `body`, and return the batch.
///
/// If a fork fails part-way, the children already spawned are reaped (by
/// dropping the partial fleet) and [`ProclabError::Spawn`] is returned.
pub fn spawn<B>(count: usize, body: &B) -> Result<Fleet>
where
    B: ChildBody + ?Sized,
{
    let mut fleet = Fleet {
        children: Vec::with_capacity(count),
    };

    for index in 0..count {
        fleet.push(spawn_one(index, body)?);
    }

    debug!(count, pids = ?fleet.pids(), "fleet spawned");
    Ok(fleet)
}

/// Fork a single child running `body` with the given batch index.
pub fn spawn_one<B>(index: usize, body: &B) -> Result<ChildHandle>
where
    B: ChildBody + ?Sized,
{
    // Anything still buffered would otherwise be written twice.
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();

    // SAFETY: the child branch only runs the body and then `_exit`s; it never
    // returns into the caller, unwinds past this frame or runs destructors.
    match unsafe { unistd::fork() } {
        Ok(ForkResult::Parent { child }) => {
            debug!(pid = %child, index, "spawned child");
            Ok(ChildHandle {
                pid: child,
                index,
                reaped: false,
            })
        }
        Ok(ForkResult::Child) => child::run_and_exit(index, body),
        Err(errno) => Err(ProclabError::Spawn(errno)),
    }
}

/// Blocking wait for one specific child until it has terminated.
fn wait_for(pid: Pid) -> Result<ExitOutcome> {
    loop {
        match waitpid(pid, None) {
            Ok(ws) => {
                if let Some((pid, status)) = ExitStatus::from_wait_status(ws) {
                    return Ok(ExitOutcome { pid, status });
                }
            }
            Err(Errno::EINTR) => continue,
            Err(source) => return Err(ProclabError::Wait { pid, source }),
        }
    }
}
