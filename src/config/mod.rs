// src/config/mod.rs

//! Configuration loading and validation for proclab.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, or fall back to defaults (`loader.rs`).
//! - Validate scenario parameters (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{
    ConfigFile, CreationSection, ExecSection, LifecycleSection, PrioritySection, RawConfigFile,
};
