//! Error types for Skirmish.
//!
//! Runtime combat and agent operations never fail: stale targets, swapped
//! weapons and despawned agents resolve as no-ops. Only configuration loading
//! can produce an error.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading weapon profiles or agent archetypes.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read file.
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to parse TOML.
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is present but unusable (NaN, empty name, ...).
    #[error("Config validation error: {0}")]
    Validation(String),

    /// Two entries share a name.
    #[error("Duplicate {kind} name: {name}")]
    DuplicateName {
        /// What kind of entry was duplicated
        kind: &'static str,
        /// The clashing name
        name: String,
    },

    /// An entry refers to another entry that does not exist.
    #[error("{owner} references unknown {kind} '{name}'")]
    UnknownReference {
        /// Entry holding the reference
        owner: String,
        /// What kind of entry was referenced
        kind: &'static str,
        /// The missing name
        name: String,
    },
}

/// Result type alias for config loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
