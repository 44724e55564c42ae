// src/menu.rs

//! Interactive operator menu.
//!
//! Generic over the input/output streams so it can be driven from tests.

use std::io::{BufRead, Write};

use crate::config::ConfigFile;
use crate::errors::{ProclabError, Result};
use crate::procfs::ProcTarget;
use crate::scenarios::Scenario;

/// What the operator asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    Run(Scenario),
    /// Input that selects nothing; the message is shown and nothing runs.
    Invalid(String),
}

const ENTRIES: [&str; 5] = [
    "1. Task 1 - Process Creation",
    "2. Task 2 - Command Execution using exec()",
    "3. Task 3 - Zombie & Orphan Processes",
    "4. Task 4 - Inspect Process Info (/proc)",
    "5. Task 5 - Process Prioritization",
];

/// Show the menu on `out` and read the selection (plus any follow-up
/// value) from `input`.
pub fn prompt<R, W>(input: &mut R, out: &mut W, cfg: &ConfigFile) -> Result<MenuChoice>
where
    R: BufRead,
    W: Write,
{
    writeln!(out, "\n========= Process Management Lab =========\n")?;
    for entry in ENTRIES {
        writeln!(out, "{entry}")?;
    }
    writeln!(out)?;

    let Some(choice) = ask(input, out, "Select a task (1-5): ")? else {
        return Ok(MenuChoice::Invalid("No selection made.".to_string()));
    };

    let choice = match choice.as_str() {
        "1" => match ask(input, out, "Enter number of child processes: ")? {
            None => MenuChoice::Run(Scenario::Create {
                count: cfg.creation.children,
            }),
            Some(text) => match text.parse::<usize>() {
                Ok(count) => MenuChoice::Run(Scenario::Create { count }),
                Err(_) => MenuChoice::Invalid(format!("'{text}' is not a valid number of children.")),
            },
        },
        "2" => MenuChoice::Run(Scenario::Exec {
            commands: cfg.exec.commands.clone(),
        }),
        "3" => MenuChoice::Run(Scenario::Lifecycle),
        "4" => {
            let text = ask(input, out, "Enter PID to inspect: ")?.unwrap_or_default();
            match text.parse::<ProcTarget>() {
                Ok(target) => MenuChoice::Run(Scenario::Inspect { target }),
                Err(ProclabError::InvalidInput(msg)) => MenuChoice::Invalid(msg),
                Err(other) => return Err(other),
            }
        }
        "5" => MenuChoice::Run(Scenario::Priority {
            children: cfg.priority.children,
        }),
        _ => MenuChoice::Invalid("Invalid choice.".to_string()),
    };

    Ok(choice)
}

/// Print `question` and read one trimmed line; `None` on EOF or blank.
fn ask<R, W>(input: &mut R, out: &mut W, question: &str) -> Result<Option<String>>
where
    R: BufRead,
    W: Write,
{
    write!(out, "{question}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let line = line.trim();
    Ok((!line.is_empty()).then(|| line.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn choose(script: &str) -> MenuChoice {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        prompt(&mut input, &mut out, &ConfigFile::default()).unwrap()
    }

    #[test]
    fn create_with_explicit_count() {
        assert_eq!(choose("1\n7\n"), MenuChoice::Run(Scenario::Create { count: 7 }));
    }

    #[test]
    fn create_with_blank_count_uses_config() {
        assert_eq!(choose("1\n\n"), MenuChoice::Run(Scenario::Create { count: 3 }));
    }

    #[test]
    fn bad_count_is_reported_not_fatal() {
        assert!(matches!(choose("1\nmany\n"), MenuChoice::Invalid(m) if m.contains("many")));
    }

    #[test]
    fn inspect_reads_pid_or_self() {
        assert_eq!(
            choose("4\n1\n"),
            MenuChoice::Run(Scenario::Inspect { target: ProcTarget::Pid(1) })
        );
        assert_eq!(
            choose("4\nself\n"),
            MenuChoice::Run(Scenario::Inspect { target: ProcTarget::SelfProcess })
        );
        assert!(matches!(choose("4\n\n"), MenuChoice::Invalid(m) if m.contains("missing")));
    }

    #[test]
    fn unknown_choice_and_eof() {
        assert_eq!(choose("9\n"), MenuChoice::Invalid("Invalid choice.".to_string()));
        assert!(matches!(choose(""), MenuChoice::Invalid(_)));
    }

    #[test]
    fn menu_lists_all_tasks() {
        let mut out = Vec::new();
        prompt(&mut Cursor::new(b"3\n".to_vec()), &mut out, &ConfigFile::default()).unwrap();
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("5. Task 5 - Process Prioritization"));
        assert!(shown.ends_with("Select a task (1-5): "));
    }
}
