//! Core error types shared across the crate.

use std::path::Path;

use thiserror::Error;

/// Errors surfaced by crate-level plumbing (configuration, logging setup).
///
/// Playback conditions are never reported through this type; the engine
/// communicates those as values and signals.
#[derive(Error, Debug)]
pub enum PlayheadError {
    /// Configuration value is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse failure
    #[error("{0}")]
    TomlParse(String),
}

/// Result type for crate-level operations.
pub type Result<T> = std::result::Result<T, PlayheadError>;

impl PlayheadError {
    /// Build a TOML parse error with the offending path, when known.
    pub fn toml_parse(error: impl std::fmt::Display, path: Option<&Path>) -> Self {
        match path {
            Some(p) => {
                let clean_path = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
                PlayheadError::TomlParse(format!(
                    "Failed to parse TOML at {:?}: {}",
                    clean_path, error
                ))
            }
            None => PlayheadError::TomlParse(format!("Failed to parse TOML: {}", error)),
        }
    }
}
