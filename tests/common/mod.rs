#![allow(dead_code)]

use proclab::config::ConfigFile;
use proclab::procfs::ProcSource;
use proclab::scenarios::{Scenario, run_scenario};

pub use proclab_test_utils::builders::ConfigBuilder;
pub use proclab_test_utils::init_tracing;

/// Run a scenario and return everything the parent wrote.
pub fn run_to_string(scenario: &Scenario, cfg: &ConfigFile, source: &dyn ProcSource) -> String {
    let mut out = Vec::new();
    run_scenario(scenario, cfg, source, &mut out).expect("scenario failed");
    String::from_utf8(out).expect("scenario output is UTF-8")
}
