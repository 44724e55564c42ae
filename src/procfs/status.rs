// src/procfs/status.rs

use std::fmt;

use crate::errors::{ProclabError, Result};

/// The fields of a `/proc/<pid>/status` blob the lab reports on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSummary {
    pub name: String,
    /// e.g. `"S (sleeping)"` or `"Z (zombie)"`.
    pub state: String,
    pub ppid: Option<u32>,
    /// Absent for kernel threads and zombies.
    pub vm_rss: Option<String>,
}

impl StatusSummary {
    /// Parse the `Key:\tvalue` lines of a status blob.
    ///
    /// `Name` and `State` are required; everything else is optional.
    pub fn parse(text: &str) -> Result<Self> {
        let mut name = None;
        let mut state = None;
        let mut ppid = None;
        let mut vm_rss = None;

        for line in text.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "Name" => name = Some(value.to_string()),
                "State" => state = Some(value.to_string()),
                "PPid" => ppid = value.parse().ok(),
                "VmRSS" => vm_rss = Some(value.to_string()),
                _ => {}
            }
        }

        match (name, state) {
            (Some(name), Some(state)) => Ok(Self {
                name,
                state,
                ppid,
                vm_rss,
            }),
            _ => Err(ProclabError::InvalidInput(
                "status blob lacks Name/State fields".to_string(),
            )),
        }
    }

    /// Single-letter state code (`R`, `S`, `Z`, ...).
    pub fn state_code(&self) -> Option<char> {
        self.state.chars().next()
    }

    pub fn is_zombie(&self) -> bool {
        self.state_code() == Some('Z')
    }
}

impl fmt::Display for StatusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name:\t{}", self.name)?;
        writeln!(f, "State:\t{}", self.state)?;
        if let Some(ppid) = self.ppid {
            writeln!(f, "PPid:\t{ppid}")?;
        }
        if let Some(rss) = &self.vm_rss {
            writeln!(f, "VmRSS:\t{rss}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SLEEPING: &str = "Name:\tbash\nUmask:\t0022\nState:\tS (sleeping)\nTgid:\t812\nPid:\t812\nPPid:\t801\nVmRSS:\t    5120 kB\nThreads:\t1\n";

    #[test]
    fn parses_fields_of_interest() {
        let s = StatusSummary::parse(SLEEPING).unwrap();
        assert_eq!(s.name, "bash");
        assert_eq!(s.state, "S (sleeping)");
        assert_eq!(s.ppid, Some(801));
        assert_eq!(s.vm_rss.as_deref(), Some("5120 kB"));
        assert!(!s.is_zombie());
    }

    #[test]
    fn zombie_has_no_rss() {
        let s = StatusSummary::parse("Name:\tsleep\nState:\tZ (zombie)\nPPid:\t1\n").unwrap();
        assert!(s.is_zombie());
        assert_eq!(s.vm_rss, None);
    }

    #[test]
    fn missing_state_is_an_error() {
        assert!(StatusSummary::parse("Name:\tx\n").is_err());
    }

    proptest! {
        #[test]
        fn never_panics_on_arbitrary_text(text in ".{0,200}") {
            let _ = StatusSummary::parse(&text);
        }

        #[test]
        fn ppid_round_trips(ppid in 0u32..4_194_304) {
            let text = format!("Name:\tx\nState:\tR (running)\nPPid:\t{ppid}\n");
            prop_assert_eq!(StatusSummary::parse(&text).unwrap().ppid, Some(ppid));
        }
    }
}
