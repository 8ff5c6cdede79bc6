//! Error types for loading multi-entry configuration
//!
//! The plugin hooks never fail on identifiers they do not own; these errors
//! only surface while reading caller configuration.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MultiEntryError>;

#[derive(Debug, Error, Diagnostic)]
pub enum MultiEntryError {
    #[error("multi-entry config not found: {}", .0.display())]
    #[diagnostic(
        code(fob::multi_entry::config_not_found),
        help("Check the path passed to MultiEntryOptions::from_file")
    )]
    ConfigNotFound(PathBuf),

    #[error("unsupported multi-entry config format: {0}")]
    #[diagnostic(
        code(fob::multi_entry::unsupported_format),
        help("Use a .toml or .json file")
    )]
    UnsupportedFormat(String),

    #[error("invalid multi-entry config: {message}")]
    #[diagnostic(
        code(fob::multi_entry::invalid_config),
        help(
            "Expected either {{ name, files, type = \"lib\" }} or a table of {{ files, type = \"app\" }} entries"
        )
    )]
    InvalidConfig { message: String },

    #[error("invalid log level: {0}")]
    #[diagnostic(
        code(fob::multi_entry::invalid_log_level),
        help("Use one of: silent, error, warn, info, debug, trace")
    )]
    InvalidLogLevel(String),
}

impl From<figment::Error> for MultiEntryError {
    fn from(error: figment::Error) -> Self {
        MultiEntryError::InvalidConfig {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for MultiEntryError {
    fn from(error: serde_json::Error) -> Self {
        MultiEntryError::InvalidConfig {
            message: error.to_string(),
        }
    }
}
