// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [creation]
/// children = 3
///
/// [exec]
/// commands = [["ls", "-l"], ["date"], ["ps", "aux"]]
///
/// [lifecycle]
/// zombie_delay_ms = 5000
/// orphan_sleep_ms = 5000
///
/// [priority]
/// children = 3
/// nice_step = 5
/// workload = 3000000
/// ```
///
/// All sections are optional and have the lab's defaults.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub creation: CreationSection,

    #[serde(default)]
    pub exec: ExecSection,

    #[serde(default)]
    pub lifecycle: LifecycleSection,

    #[serde(default)]
    pub priority: PrioritySection,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub creation: CreationSection,
    pub exec: ExecSection,
    pub lifecycle: LifecycleSection,
    pub priority: PrioritySection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            creation: raw.creation,
            exec: raw.exec,
            lifecycle: raw.lifecycle,
            priority: raw.priority,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}

/// `[creation]` section (Task 1).
#[derive(Debug, Clone, Deserialize)]
pub struct CreationSection {
    /// Children spawned when no count is given on the CLI or at the prompt.
    #[serde(default = "default_children")]
    pub children: usize,
}

impl Default for CreationSection {
    fn default() -> Self {
        Self {
            children: default_children(),
        }
    }
}

/// `[exec]` section (Task 2).
#[derive(Debug, Clone, Deserialize)]
pub struct ExecSection {
    /// Each entry is an argv; the first element is looked up on `PATH`.
    #[serde(default = "default_commands")]
    pub commands: Vec<Vec<String>>,
}

impl Default for ExecSection {
    fn default() -> Self {
        Self {
            commands: default_commands(),
        }
    }
}

/// `[lifecycle]` section (Task 3).
#[derive(Debug, Clone, Deserialize)]
pub struct LifecycleSection {
    /// How long the parent leaves its exited child unreaped.
    #[serde(default = "default_lifecycle_ms")]
    pub zombie_delay_ms: u64,

    /// How long the orphan outlives its parent before reporting.
    #[serde(default = "default_lifecycle_ms")]
    pub orphan_sleep_ms: u64,
}

impl LifecycleSection {
    pub fn zombie_delay(&self) -> Duration {
        Duration::from_millis(self.zombie_delay_ms)
    }

    pub fn orphan_sleep(&self) -> Duration {
        Duration::from_millis(self.orphan_sleep_ms)
    }
}

impl Default for LifecycleSection {
    fn default() -> Self {
        Self {
            zombie_delay_ms: default_lifecycle_ms(),
            orphan_sleep_ms: default_lifecycle_ms(),
        }
    }
}

/// `[priority]` section (Task 5).
#[derive(Debug, Clone, Deserialize)]
pub struct PrioritySection {
    #[serde(default = "default_children")]
    pub children: usize,

    /// Child `i` requests a nice increment of `i * nice_step`.
    ///
    /// Negative steps need privileges and demonstrate the denial path.
    #[serde(default = "default_nice_step")]
    pub nice_step: i32,

    /// Iterations of the CPU-bound loop each child runs.
    #[serde(default = "default_workload")]
    pub workload: u64,
}

impl PrioritySection {
    /// Nice increment requested by the child at `index`.
    pub fn nice_for(&self, index: usize) -> i32 {
        self.nice_step.saturating_mul(index as i32)
    }
}

impl Default for PrioritySection {
    fn default() -> Self {
        Self {
            children: default_children(),
            nice_step: default_nice_step(),
            workload: default_workload(),
        }
    }
}

fn default_children() -> usize {
    3
}

fn default_commands() -> Vec<Vec<String>> {
    [vec!["ls", "-l"], vec!["date"], vec!["ps", "aux"]]
        .into_iter()
        .map(|argv| argv.into_iter().map(String::from).collect())
        .collect()
}

fn default_lifecycle_ms() -> u64 {
    5000
}

fn default_nice_step() -> i32 {
    5
}

fn default_workload() -> u64 {
    3_000_000
}
