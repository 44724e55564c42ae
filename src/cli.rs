// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `proclab`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "proclab",
    version,
    about = "Process management lab: fork, exec, wait, zombies, orphans, /proc and nice.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// If the default `Proclab.toml` does not exist, built-in defaults apply.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PROCLAB_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Scenario to run directly. Without one, the interactive menu is shown.
    #[command(subcommand)]
    pub command: Option<ScenarioCommand>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ScenarioCommand {
    /// Task 1: spawn N children and reap them all.
    Create {
        /// Number of children (defaults to `[creation].children`).
        #[arg(long, short = 'n')]
        count: Option<usize>,
    },

    /// Task 2: run commands from children via image replacement.
    Exec {
        /// A single command line to run instead of `[exec].commands`.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Task 3: zombie and orphan demonstrations.
    Lifecycle,

    /// Task 4: inspect /proc for a pid (or `self`).
    Inspect {
        #[arg(value_name = "PID")]
        target: String,
    },

    /// Task 5: CPU-bound children at increasing nice levels.
    Priority {
        #[arg(long)]
        children: Option<usize>,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
