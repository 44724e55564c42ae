// src/scenarios/command_exec.rs

//! Task 2: each child replaces its image with a command.
//!
//! Children run one at a time; the parent reaps each before spawning the
//! next so command output does not interleave.

use std::fmt;

use tracing::{info, warn};

use crate::errors::Result;
use crate::fleet::{self, ChildContext, child::FAILURE_EXIT_CODE};
use crate::process::{ExitOutcome, replace_image};

#[derive(Debug)]
pub struct CommandRun {
    pub argv: Vec<String>,
    pub outcome: ExitOutcome,
}

#[derive(Debug, Default)]
pub struct ExecReport {
    pub runs: Vec<CommandRun>,
}

impl fmt::Display for ExecReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for run in &self.runs {
            writeln!(f, "`{}`: {}", run.argv.join(" "), run.outcome)?;
        }
        writeln!(f)?;
        writeln!(f, "All commands executed by child processes.")
    }
}

pub fn run(commands: &[Vec<String>]) -> Result<ExecReport> {
    let mut report = ExecReport::default();

    for (index, argv) in commands.iter().enumerate() {
        let body = |ctx: &ChildContext| -> Result<i32> {
            println!("Child {} executing command: {}", ctx.index + 1, argv.join(" "));
            let program = argv.first().map(String::as_str).unwrap_or_default();
            match replace_image(program, argv) {
                Ok(never) => match never {},
                Err(err) => {
                    eprintln!("Error executing {program}: {err}");
                    Ok(FAILURE_EXIT_CODE)
                }
            }
        };

        let outcome = fleet::spawn_one(index, &body)?.reap()?;
        if outcome.status.success() {
            info!(command = %argv.join(" "), "command finished");
        } else {
            warn!(command = %argv.join(" "), status = %outcome.status, "command failed");
        }

        report.runs.push(CommandRun {
            argv: argv.clone(),
            outcome,
        });
    }

    Ok(report)
}
