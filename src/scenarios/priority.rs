// src/scenarios/priority.rs

//! Task 5: CPU-bound children, each at its own nice level.
//!
//! Every child reports one [`ChildPriorityRecord`] back to the parent over a
//! shared pipe, so the parent's report knows which children ran at the
//! requested niceness and how long each took.

use std::fmt;
use std::fs::File;
use std::hint::black_box;
use std::io::{self, Read};
use std::time::{Duration, Instant};

use nix::unistd;
use tracing::{info, warn};

use crate::config::PrioritySection;
use crate::errors::{ProclabError, Result};
use crate::fleet::{self, ChildContext};
use crate::process::{CurrentProcess, ExitOutcome};

/// Something that can change the calling process's niceness.
///
/// Production code uses [`OwnNiceness`]; tests can substitute an adjuster
/// that always refuses.
pub trait NicenessAdjuster {
    /// Add `delta` to the calling process's niceness, returning the new value.
    fn adjust(&self, delta: i32) -> Result<i32>;
}

/// Adjusts the niceness of whichever process calls it.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnNiceness;

impl NicenessAdjuster for OwnNiceness {
    fn adjust(&self, delta: i32) -> Result<i32> {
        CurrentProcess::acquire().adjust_niceness(delta)
    }
}

impl NicenessAdjuster for CurrentProcess {
    fn adjust(&self, delta: i32) -> Result<i32> {
        self.adjust_niceness(delta)
    }
}

/// What became of a child's request to change its niceness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorityOutcome {
    Applied { niceness: i32 },
    /// The request failed; the child ran at the niceness it inherited.
    Default { requested: i32, reason: String },
}

impl PriorityOutcome {
    pub fn request(adjuster: &dyn NicenessAdjuster, delta: i32) -> Self {
        match adjuster.adjust(delta) {
            Ok(niceness) => PriorityOutcome::Applied { niceness },
            Err(err) => PriorityOutcome::Default {
                requested: delta,
                reason: err.to_string(),
            },
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, PriorityOutcome::Applied { .. })
    }
}

impl fmt::Display for PriorityOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityOutcome::Applied { niceness } => write!(f, "nice={niceness}"),
            PriorityOutcome::Default { requested, reason } => {
                write!(f, "nice=default (requested {requested}: {reason})")
            }
        }
    }
}

/// Keeps an encoded record well under `PIPE_BUF`.
const MAX_REASON_CHARS: usize = 120;

/// What one child reports about its run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildPriorityRecord {
    pub index: usize,
    pub pid: i32,
    pub priority: PriorityOutcome,
    pub duration: Duration,
}

impl ChildPriorityRecord {
    /// One tab-separated line; short enough to be written atomically.
    fn encode(&self) -> String {
        let (kind, value, reason) = match &self.priority {
            PriorityOutcome::Applied { niceness } => ("applied", *niceness, String::new()),
            PriorityOutcome::Default { requested, reason } => {
                let reason: String = reason
                    .chars()
                    .take(MAX_REASON_CHARS)
                    .map(|c| if c == '\t' || c == '\n' { ' ' } else { c })
                    .collect();
                ("default", *requested, reason)
            }
        };
        format!(
            "{}\t{}\t{kind}\t{value}\t{}\t{reason}\n",
            self.index,
            self.pid,
            self.duration.as_nanos()
        )
    }

    fn decode(line: &str) -> Result<Self> {
        let bad = || ProclabError::InvalidInput(format!("malformed priority record: {line:?}"));

        let mut fields = line.splitn(6, '\t');
        let mut next = || fields.next().ok_or_else(bad);

        let index: usize = next()?.parse().map_err(|_| bad())?;
        let pid: i32 = next()?.parse().map_err(|_| bad())?;
        let kind = next()?;
        let value: i32 = next()?.parse().map_err(|_| bad())?;
        let nanos: u64 = next()?.parse().map_err(|_| bad())?;
        let reason = next()?.to_string();

        let priority = match kind {
            "applied" => PriorityOutcome::Applied { niceness: value },
            "default" => PriorityOutcome::Default {
                requested: value,
                reason,
            },
            _ => return Err(bad()),
        };

        Ok(Self {
            index,
            pid,
            priority,
            duration: Duration::from_nanos(nanos),
        })
    }
}

impl fmt::Display for ChildPriorityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Child {} PID={} {} duration={:.3}s",
            self.index + 1,
            self.pid,
            self.priority,
            self.duration.as_secs_f64()
        )
    }
}

/// Busy loop standing in for real work.
pub fn cpu_intensive_task(limit: u64) -> u64 {
    let mut sum = 0u64;
    for i in 0..limit {
        sum = sum.wrapping_add(black_box(i) % 7);
    }
    sum
}

#[derive(Debug)]
pub struct PriorityReport {
    /// Records sent back by the children, ordered by index.
    pub children: Vec<ChildPriorityRecord>,
    pub outcomes: Vec<ExitOutcome>,
}

impl PriorityReport {
    /// Children that ran at their inherited niceness because the change failed.
    pub fn ran_at_default(&self) -> impl Iterator<Item = &ChildPriorityRecord> {
        self.children.iter().filter(|c| !c.priority.is_applied())
    }
}

impl fmt::Display for PriorityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for child in &self.children {
            writeln!(f, "{child}")?;
        }
        for outcome in &self.outcomes {
            writeln!(f, "Parent: {outcome}")?;
        }
        let defaulted = self.ran_at_default().count();
        if defaulted > 0 {
            writeln!(
                f,
                "{defaulted} of {} children ran at default priority.",
                self.children.len()
            )?;
        }
        writeln!(f, "All {} prioritised children reaped.", self.outcomes.len())
    }
}

pub fn run(cfg: &PrioritySection, children: usize) -> Result<PriorityReport> {
    run_with(cfg, children, &OwnNiceness)
}

/// Same as [`run`] with the niceness change delegated to `adjuster`.
pub fn run_with(
    cfg: &PrioritySection,
    children: usize,
    adjuster: &dyn NicenessAdjuster,
) -> Result<PriorityReport> {
    let workload = cfg.workload;
    let (read_end, write_end) = unistd::pipe().map_err(io::Error::from)?;

    let body = |ctx: &ChildContext| -> Result<i32> {
        let requested = cfg.nice_for(ctx.index);
        let priority = PriorityOutcome::request(adjuster, requested);
        if let PriorityOutcome::Default { reason, .. } = &priority {
            println!("Child {}: could not change nice value ({reason}).", ctx.index + 1);
        }

        let start = Instant::now();
        black_box(cpu_intensive_task(workload));
        let record = ChildPriorityRecord {
            index: ctx.index,
            pid: ctx.process.pid().as_raw(),
            priority,
            duration: start.elapsed(),
        };

        unistd::write(&write_end, record.encode().as_bytes()).map_err(io::Error::from)?;
        Ok(0)
    };

    info!(children, nice_step = cfg.nice_step, workload, "spawning prioritised children");
    let fleet = fleet::spawn(children, &body)?;
    drop(write_end);

    // EOF arrives once every child has exited and closed its copy.
    let mut text = String::new();
    let collected = File::from(read_end).read_to_string(&mut text);
    let outcomes = fleet.reap_all()?;
    collected?;

    let mut records = Vec::with_capacity(children);
    for line in text.lines().filter(|l| !l.is_empty()) {
        match ChildPriorityRecord::decode(line) {
            Ok(record) => records.push(record),
            Err(err) => warn!(error = %err, "dropping priority record"),
        }
    }
    records.sort_by_key(|r| r.index);

    Ok(PriorityReport {
        children: records,
        outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workload_sum_matches_closed_form() {
        // 0+1+..+6 per block of seven.
        assert_eq!(cpu_intensive_task(14), 42);
        assert_eq!(cpu_intensive_task(0), 0);
    }

    #[test]
    fn default_outcome_names_the_request() {
        let outcome = PriorityOutcome::Default {
            requested: -5,
            reason: "permission denied: nice".into(),
        };
        assert_eq!(
            outcome.to_string(),
            "nice=default (requested -5: permission denied: nice)"
        );
    }

    #[test]
    fn records_survive_the_pipe_format() {
        let denied = ChildPriorityRecord {
            index: 2,
            pid: 4242,
            priority: PriorityOutcome::Default {
                requested: -10,
                reason: "permission denied:\tnice".into(),
            },
            duration: Duration::from_micros(1234),
        };
        let line = denied.encode();
        let back = ChildPriorityRecord::decode(line.trim_end()).unwrap();

        assert_eq!(back.index, 2);
        assert_eq!(back.duration, Duration::from_micros(1234));
        assert_eq!(
            back.priority,
            PriorityOutcome::Default {
                requested: -10,
                reason: "permission denied: nice".into()
            }
        );
        assert_eq!(
            back.to_string(),
            "Child 3 PID=4242 nice=default (requested -10: permission denied: nice) duration=0.001s"
        );
    }

    #[test]
    fn long_reasons_stay_on_one_short_line() {
        let record = ChildPriorityRecord {
            index: 0,
            pid: 1,
            priority: PriorityOutcome::Default {
                requested: 1,
                reason: "é\n".repeat(500),
            },
            duration: Duration::ZERO,
        };
        let line = record.encode();
        assert_eq!(line.matches('\n').count(), 1);
        assert!(line.len() < 512);
    }

    #[test]
    fn garbage_record_is_rejected() {
        assert!(ChildPriorityRecord::decode("1\tx\tapplied\t0\t5\t").is_err());
        assert!(ChildPriorityRecord::decode("1\t2\tmaybe\t0\t5\t").is_err());
        assert!(ChildPriorityRecord::decode("1\t2").is_err());
    }
}
