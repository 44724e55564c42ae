// src/scenarios/creation.rs

//! Task 1: spawn a batch of children that each introduce themselves.

use std::fmt;
use std::io::Write;

use tracing::info;

use crate::errors::Result;
use crate::fleet::{self, ChildContext};
use crate::process::ExitOutcome;

#[derive(Debug)]
pub struct CreationReport {
    pub requested: usize,
    pub outcomes: Vec<ExitOutcome>,
}

impl fmt::Display for CreationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            writeln!(f, "Parent: Child {} finished ({})", outcome.pid, outcome.status)?;
        }
        writeln!(f)?;
        writeln!(f, "All child processes completed.")
    }
}

fn greet(ctx: &ChildContext) -> Result<i32> {
    let mut out = std::io::stdout().lock();
    writeln!(out, "Child {}:", ctx.index + 1)?;
    writeln!(out, "  PID     = {}", ctx.process.pid())?;
    writeln!(out, "  Parent  = {}", ctx.process.parent_pid())?;
    writeln!(out, "  Message = Hello from child {}!", ctx.index + 1)?;
    writeln!(out)?;
    Ok(0)
}

pub fn run(count: usize) -> Result<CreationReport> {
    info!(count, "creating children");
    let fleet = fleet::spawn(count, &greet)?;
    let outcomes = fleet.reap_all()?;

    Ok(CreationReport {
        requested: count,
        outcomes,
    })
}
