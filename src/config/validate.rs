// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{ProclabError, Result};

/// Range accepted by the scheduler for nice values.
const NICE_RANGE: std::ops::RangeInclusive<i32> = -20..=19;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ProclabError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_exec_commands(cfg)?;
    validate_priority(cfg)?;
    Ok(())
}

fn validate_exec_commands(cfg: &RawConfigFile) -> Result<()> {
    for (i, argv) in cfg.exec.commands.iter().enumerate() {
        match argv.first() {
            None => {
                return Err(ProclabError::ConfigError(format!(
                    "[exec].commands[{i}] is empty; expected [\"program\", args...]"
                )));
            }
            Some(program) if program.trim().is_empty() => {
                return Err(ProclabError::ConfigError(format!(
                    "[exec].commands[{i}] has an empty program name"
                )));
            }
            Some(_) => {}
        }

        if argv.iter().any(|arg| arg.contains('\0')) {
            return Err(ProclabError::ConfigError(format!(
                "[exec].commands[{i}] contains a NUL byte"
            )));
        }
    }
    Ok(())
}

fn validate_priority(cfg: &RawConfigFile) -> Result<()> {
    let p = &cfg.priority;

    if p.children == 0 {
        return Err(ProclabError::ConfigError(
            "[priority].children must be >= 1 (got 0)".to_string(),
        ));
    }

    if p.workload == 0 {
        return Err(ProclabError::ConfigError(
            "[priority].workload must be >= 1 (got 0)".to_string(),
        ));
    }

    let last = p.nice_for(p.children - 1);
    if !NICE_RANGE.contains(&last) {
        return Err(ProclabError::ConfigError(format!(
            "[priority] child {} would request nice {last}, outside {}..={}",
            p.children,
            NICE_RANGE.start(),
            NICE_RANGE.end()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Result<ConfigFile> {
        let raw: RawConfigFile = toml::from_str(toml_src)?;
        ConfigFile::try_from(raw)
    }

    #[test]
    fn empty_file_yields_lab_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.creation.children, 3);
        assert_eq!(cfg.exec.commands.len(), 3);
        assert_eq!(cfg.exec.commands[0], vec!["ls", "-l"]);
        assert_eq!(cfg.lifecycle.zombie_delay_ms, 5000);
        assert_eq!(cfg.priority.nice_for(2), 10);
    }

    #[test]
    fn empty_argv_is_rejected() {
        let err = parse("[exec]\ncommands = [[\"date\"], []]\n").unwrap_err();
        match err {
            ProclabError::ConfigError(msg) => assert!(msg.contains("commands[1]")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn nice_overflow_is_rejected() {
        let err = parse("[priority]\nchildren = 5\nnice_step = 10\n").unwrap_err();
        assert!(matches!(err, ProclabError::ConfigError(ref m) if m.contains("nice 40")));
    }

    #[test]
    fn negative_step_within_range_is_allowed() {
        let cfg = parse("[priority]\nchildren = 2\nnice_step = -5\n").unwrap();
        assert_eq!(cfg.priority.nice_for(1), -5);
    }

    #[test]
    fn unknown_section_is_a_toml_error() {
        assert!(matches!(parse("[nope]\nx = 1\n"), Err(ProclabError::TomlError(_))));
    }
}
