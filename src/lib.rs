// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod fleet;
pub mod logging;
pub mod menu;
pub mod process;
pub mod procfs;
pub mod scenarios;

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::cli::{CliArgs, ScenarioCommand};
use crate::config::{ConfigFile, load_or_default};
use crate::errors::ProclabError;
use crate::menu::MenuChoice;
use crate::procfs::{ProcTarget, RealProcSource};
use crate::scenarios::{Scenario, run_scenario};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file or built-in defaults)
/// - scenario selection (subcommand or interactive menu)
/// - running the scenario against the real `/proc`
pub fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(args.config.as_deref().map(Path::new))
        .context("loading configuration")?;

    let choice = match args.command {
        Some(cmd) => scenario_from_command(cmd, &cfg),
        None => {
            let stdin = io::stdin();
            menu::prompt(&mut stdin.lock(), &mut io::stdout(), &cfg)?
        }
    };

    let scenario = match choice {
        MenuChoice::Run(scenario) => scenario,
        MenuChoice::Invalid(msg) => {
            println!("{msg}");
            return Ok(());
        }
    };

    info!(?scenario, "running scenario");
    let source = RealProcSource::system();
    let result = run_scenario(&scenario, &cfg, &source, &mut io::stdout());
    finish_scenario(&scenario, result, &mut io::stdout())
}

/// Turn a scenario's result into the program's result.
///
/// Recoverable failures are reported on `out` and the run still succeeds;
/// anything else aborts with context.
pub fn finish_scenario(
    scenario: &Scenario,
    result: errors::Result<()>,
    out: &mut dyn Write,
) -> Result<()> {
    match result {
        Ok(()) => {
            debug!("scenario complete");
            Ok(())
        }
        Err(err) if err.is_recoverable() => {
            warn!(?scenario, error = %err, "scenario stopped early");
            writeln!(out, "Scenario stopped: {err}")?;
            Ok(())
        }
        Err(err) => Err(err).with_context(|| format!("scenario {scenario:?} aborted")),
    }
}

/// Resolve a subcommand into a scenario, filling gaps from the config.
pub fn scenario_from_command(cmd: ScenarioCommand, cfg: &ConfigFile) -> MenuChoice {
    let scenario = match cmd {
        ScenarioCommand::Create { count } => Scenario::Create {
            count: count.unwrap_or(cfg.creation.children),
        },
        ScenarioCommand::Exec { command } if command.is_empty() => Scenario::Exec {
            commands: cfg.exec.commands.clone(),
        },
        ScenarioCommand::Exec { command } => Scenario::Exec {
            commands: vec![command],
        },
        ScenarioCommand::Lifecycle => Scenario::Lifecycle,
        ScenarioCommand::Inspect { target } => match target.parse::<ProcTarget>() {
            Ok(target) => Scenario::Inspect { target },
            Err(ProclabError::InvalidInput(msg)) => return MenuChoice::Invalid(msg),
            Err(other) => return MenuChoice::Invalid(other.to_string()),
        },
        ScenarioCommand::Priority { children } => Scenario::Priority {
            children: children.unwrap_or(cfg.priority.children),
        },
    };
    MenuChoice::Run(scenario)
}
