// src/scenarios/mod.rs

//! The five lab scenarios and a single dispatcher for them.
//!
//! Each scenario returns a report value; [`run_scenario`] writes the
//! banner before it starts (children print their own lines while it runs)
//! and the report after it completes.

pub mod command_exec;
pub mod creation;
pub mod lifecycle;
pub mod priority;

use std::io::Write;

use tracing::warn;

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::procfs::{self, ProcSource, ProcTarget};

/// One runnable scenario with its resolved parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scenario {
    Create { count: usize },
    Exec { commands: Vec<Vec<String>> },
    Lifecycle,
    Inspect { target: ProcTarget },
    Priority { children: usize },
}

impl Scenario {
    fn banner(&self) -> String {
        match self {
            Scenario::Create { count } => {
                format!("[TASK 1] Creating {count} child processes...")
            }
            Scenario::Exec { .. } => {
                "[TASK 2] Executing commands from child processes using execvp()".to_string()
            }
            Scenario::Lifecycle => "[TASK 3] Demonstrating Zombie and Orphan Processes".to_string(),
            Scenario::Inspect { target } => {
                format!("[TASK 4] Inspecting process info for PID={target}")
            }
            Scenario::Priority { children } => format!(
                "[TASK 5] Creating {children} CPU-intensive child processes with different priorities"
            ),
        }
    }
}

/// Run `scenario`, writing its banner and report to `out`.
///
/// Recoverable failures (bad executable, denied priority, unreadable
/// `/proc` entries) are part of the report. Only failures that abort the
/// scenario, such as a failed fork, come back as `Err`.
pub fn run_scenario(
    scenario: &Scenario,
    cfg: &ConfigFile,
    source: &dyn ProcSource,
    out: &mut dyn Write,
) -> Result<()> {
    writeln!(out, "\n{}\n", scenario.banner())?;
    out.flush()?;

    match scenario {
        Scenario::Create { count } => {
            let report = creation::run(*count)?;
            write!(out, "{report}")?;
        }
        Scenario::Exec { commands } => {
            let report = command_exec::run(commands)?;
            write!(out, "{report}")?;
        }
        Scenario::Lifecycle => {
            let report = lifecycle::run(&cfg.lifecycle, source, out)?;
            write!(out, "{report}")?;
        }
        Scenario::Inspect { target } => {
            let report = procfs::inspect(source, *target);
            for failure in report.failures() {
                warn!(%target, error = %failure, "inspector read failed");
            }
            write!(out, "{report}")?;
        }
        Scenario::Priority { children } => {
            let report = priority::run(&cfg.priority, *children)?;
            write!(out, "{report}")?;
        }
    }

    out.flush()?;
    Ok(())
}
