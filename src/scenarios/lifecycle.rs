// src/scenarios/lifecycle.rs

//! Task 3: zombie and orphan demonstrations.
//!
//! Both are timing-based: fixed sleeps stand in for any real signalling.

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::thread;
use std::time::Duration;

use nix::unistd::{self, Pid};
use tracing::{debug, info};

use crate::config::LifecycleSection;
use crate::errors::{ProclabError, Result};
use crate::fleet::{self, ChildContext};
use crate::procfs::{ProcSource, ProcTarget, StatusSummary, status_of};
use crate::process::ExitOutcome;

#[derive(Debug)]
pub struct ZombieReport {
    pub pid: Pid,
    /// Process state seen after the child exited but before it was reaped.
    pub before_reap: Result<StatusSummary>,
    pub outcome: ExitOutcome,
    /// Whether the process table still listed the pid after reaping.
    pub visible_after_reap: bool,
}

impl ZombieReport {
    pub fn observed_zombie(&self) -> bool {
        self.before_reap.as_ref().is_ok_and(StatusSummary::is_zombie)
    }
}

impl fmt::Display for ZombieReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.before_reap {
            Ok(summary) => writeln!(f, "[Parent] Before reap, child {} state: {}", self.pid, summary.state)?,
            Err(e) => writeln!(f, "[Parent] Could not observe child {} before reap: {e}", self.pid)?,
        }
        writeln!(f, "[Parent] Reaped zombie child {} ({})", self.pid, self.outcome.status)?;
        writeln!(
            f,
            "[Parent] After reap, child {} is {}",
            self.pid,
            if self.visible_after_reap { "still listed" } else { "gone from the process table" }
        )
    }
}

#[derive(Debug)]
pub struct OrphanReport {
    /// The short-lived parent that exited early.
    pub parent: Pid,
    pub orphan: Pid,
    pub parent_outcome: ExitOutcome,
    /// The orphan's parent pid read after the early parent was reaped.
    pub ppid_after: Result<u32>,
}

impl OrphanReport {
    pub fn reparented(&self) -> bool {
        matches!(self.ppid_after, Ok(ppid) if ppid as i32 != self.parent.as_raw())
    }
}

impl fmt::Display for OrphanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[Main] Early parent {} {}", self.parent, self.parent_outcome.status)?;
        match &self.ppid_after {
            Ok(ppid) => writeln!(
                f,
                "[Main] Orphan {} now has parent {ppid} (was {})",
                self.orphan, self.parent
            ),
            Err(e) => writeln!(f, "[Main] Could not read parent of orphan {}: {e}", self.orphan),
        }
    }
}

#[derive(Debug)]
pub struct LifecycleReport {
    pub zombie: ZombieReport,
    pub orphan: OrphanReport,
}

impl fmt::Display for LifecycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.zombie, self.orphan)
    }
}

pub fn run(
    cfg: &LifecycleSection,
    source: &dyn ProcSource,
    out: &mut dyn Write,
) -> Result<LifecycleReport> {
    let zombie = zombie(cfg.zombie_delay(), source, out)?;
    let orphan = orphan(cfg.orphan_sleep(), source, out)?;
    Ok(LifecycleReport { zombie, orphan })
}

/// Leave an exited child unreaped for `delay`, observing it meanwhile.
pub fn zombie(delay: Duration, source: &dyn ProcSource, out: &mut dyn Write) -> Result<ZombieReport> {
    let exit_now = |ctx: &ChildContext| -> Result<i32> {
        println!("[Zombie Child] PID={} exiting immediately...", ctx.process.pid());
        Ok(0)
    };

    let child = fleet::spawn_one(0, &exit_now)?;
    let pid = child.pid();
    writeln!(
        out,
        "[Parent] Created zombie child PID={pid}, sleeping {:.1} seconds...",
        delay.as_secs_f64()
    )?;
    out.flush()?;

    thread::sleep(delay);
    let before_reap = status_of(source, target(pid));
    debug!(%pid, zombie = before_reap.as_ref().is_ok_and(StatusSummary::is_zombie), "observed child before reap");

    let outcome = child.reap()?;
    let visible_after_reap = status_of(source, target(pid)).is_ok();
    info!(%pid, visible_after_reap, "zombie child reaped");

    Ok(ZombieReport {
        pid,
        before_reap,
        outcome,
        visible_after_reap,
    })
}

/// Fork an intermediate parent which forks the orphan and exits at once.
///
/// The intermediate passes the orphan's pid back over a pipe so the main
/// process can look up who adopted it.
pub fn orphan(sleep: Duration, source: &dyn ProcSource, out: &mut dyn Write) -> Result<OrphanReport> {
    let (read_end, write_end) = unistd::pipe().map_err(io::Error::from)?;

    let orphan_body = move |ctx: &ChildContext| -> Result<i32> {
        println!(
            "[Orphan Child] PID={} started. Parent={}",
            ctx.process.pid(),
            ctx.process.parent_pid()
        );
        println!(
            "[Orphan Child] Sleeping for {:.1} seconds (parent will exit)...",
            sleep.as_secs_f64()
        );
        let _ = io::stdout().flush();
        thread::sleep(sleep);
        println!(
            "[Orphan Child] Now adopted by PID {} (new parent)",
            ctx.process.parent_pid()
        );
        Ok(0)
    };

    let early_parent = |ctx: &ChildContext| -> Result<i32> {
        let orphan = fleet::spawn_one(0, &orphan_body)?;
        let pid = orphan.into_orphan();
        unistd::write(&write_end, &pid.as_raw().to_ne_bytes()).map_err(io::Error::from)?;
        println!(
            "[Parent] PID={} exiting before child {pid} finishes (to orphan it).",
            ctx.process.pid()
        );
        Ok(0)
    };

    let parent = fleet::spawn_one(0, &early_parent)?;
    let parent_pid = parent.pid();
    drop(write_end);

    let orphan_pid = read_pid(File::from(read_end));
    let parent_outcome = parent.reap()?;
    let orphan_pid = orphan_pid?;

    writeln!(out, "[Main] Early parent {parent_pid} exited; orphan is {orphan_pid}")?;
    let ppid_after = status_of(source, target(orphan_pid)).and_then(|summary| {
        summary.ppid.ok_or_else(|| {
            ProclabError::InvalidInput(format!("status of {orphan_pid} has no PPid field"))
        })
    });
    info!(parent = %parent_pid, orphan = %orphan_pid, ppid_after = ?ppid_after.as_ref().ok(), "orphan observed");

    Ok(OrphanReport {
        parent: parent_pid,
        orphan: orphan_pid,
        parent_outcome,
        ppid_after,
    })
}

fn read_pid(mut pipe: File) -> Result<Pid> {
    let mut buf = [0u8; 4];
    pipe.read_exact(&mut buf).map_err(|e| {
        ProclabError::from(anyhow::Error::new(e).context("early parent did not report the orphan's pid"))
    })?;
    Ok(Pid::from_raw(i32::from_ne_bytes(buf)))
}

fn target(pid: Pid) -> ProcTarget {
    ProcTarget::Pid(pid.as_raw() as u32)
}
