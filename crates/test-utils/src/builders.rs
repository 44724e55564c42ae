#![allow(dead_code)]

use proclab::config::{ConfigFile, RawConfigFile};

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from the built-in defaults with lifecycle delays shortened so
/// timing-based scenarios finish quickly.
pub struct ConfigBuilder {
    config: RawConfigFile,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.lifecycle.zombie_delay_ms = 300;
        config.lifecycle.orphan_sleep_ms = 500;
        config.priority.workload = 10_000;
        Self { config }
    }

    pub fn children(mut self, n: usize) -> Self {
        self.config.creation.children = n;
        self
    }

    pub fn command(mut self, argv: &[&str]) -> Self {
        self.config
            .exec
            .commands
            .push(argv.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn no_commands(mut self) -> Self {
        self.config.exec.commands.clear();
        self
    }

    pub fn zombie_delay_ms(mut self, ms: u64) -> Self {
        self.config.lifecycle.zombie_delay_ms = ms;
        self
    }

    pub fn orphan_sleep_ms(mut self, ms: u64) -> Self {
        self.config.lifecycle.orphan_sleep_ms = ms;
        self
    }

    pub fn priority(mut self, children: usize, nice_step: i32, workload: u64) -> Self {
        self.config.priority.children = children;
        self.config.priority.nice_step = nice_step;
        self.config.priority.workload = workload;
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
