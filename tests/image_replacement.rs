mod common;
use crate::common::{ConfigBuilder, init_tracing, run_to_string};

use proclab::errors::{ProclabError, Result};
use proclab::fleet::{self, ChildContext, child::FAILURE_EXIT_CODE};
use proclab::process::{ExitStatus, replace_image};
use proclab::procfs::mock::MockProcSource;
use proclab::scenarios::{Scenario, command_exec};

#[test]
fn code_after_successful_replacement_never_runs() {
    init_tracing();

    let body = |_: &ChildContext| -> Result<i32> {
        replace_image("sh", &["sh", "-c", "exit 7"])?;
        Ok(99)
    };
    let outcome = fleet::spawn_one(0, &body).unwrap().reap().unwrap();
    assert_eq!(outcome.status, ExitStatus::ExitedNormally(7));
}

#[test]
fn program_path_is_independent_of_argv0() {
    init_tracing();

    // The new image sees `renamed` as $0 while `sh` is what actually runs.
    let body = |_: &ChildContext| -> Result<i32> {
        replace_image("sh", &["renamed", "-c", "[ \"$0\" = renamed ] && exit 5 || exit 6"])?;
        Ok(99)
    };
    let outcome = fleet::spawn_one(0, &body).unwrap().reap().unwrap();
    assert_eq!(outcome.status, ExitStatus::ExitedNormally(5));
}

#[test]
fn failed_replacement_terminates_the_child_nonzero() {
    init_tracing();

    let body = |_: &ChildContext| -> Result<i32> {
        replace_image("/definitely/not/a/real/program", &["prog"])?;
        Ok(0)
    };
    let outcome = fleet::spawn_one(0, &body).unwrap().reap().unwrap();
    assert_eq!(outcome.status, ExitStatus::ExitedNormally(FAILURE_EXIT_CODE));
}

#[test]
fn failed_replacement_reports_exec_error() {
    // Runs the failing exec in a child and ships the error kind back as the
    // exit code.
    let body = |_: &ChildContext| -> Result<i32> {
        match replace_image("/definitely/not/a/real/program", &["prog"]) {
            Ok(never) => match never {},
            Err(ProclabError::Exec { program, source }) => {
                let right_program = program == "/definitely/not/a/real/program";
                Ok(if right_program && source == nix::errno::Errno::ENOENT { 0 } else { 3 })
            }
            Err(_) => Ok(4),
        }
    };
    let outcome = fleet::spawn_one(0, &body).unwrap().reap().unwrap();
    assert_eq!(outcome.status, ExitStatus::ExitedNormally(0));
}

#[test]
fn command_scenario_collects_each_status() {
    init_tracing();

    let commands = vec![
        vec!["true".to_string()],
        vec!["false".to_string()],
        vec!["no-such-command-proclab".to_string()],
    ];
    let report = command_exec::run(&commands).unwrap();

    let codes: Vec<_> = report.runs.iter().map(|r| r.outcome.status.code()).collect();
    assert_eq!(codes, vec![Some(0), Some(1), Some(FAILURE_EXIT_CODE)]);
    assert_eq!(report.runs[2].argv, commands[2]);
}

#[test]
fn command_scenario_output_ends_with_summary() {
    init_tracing();

    let cfg = ConfigBuilder::new().no_commands().command(&["true"]).build();
    let text = run_to_string(
        &Scenario::Exec {
            commands: cfg.exec.commands.clone(),
        },
        &cfg,
        &MockProcSource::new(1),
    );

    assert!(text.contains("[TASK 2]"));
    assert!(text.contains("`true`: child"));
    assert!(text.trim_end().ends_with("All commands executed by child processes."));
}
