//! Error types for configuration parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for configuration operations.
///
/// Covers errors from parsing, merging, and file operations. Semantic
/// validation of the resulting options happens when the gate is built.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write configuration file (for init command).
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid response content type.
    #[error("Invalid content type '{value}': expected html, text, or json")]
    InvalidContentType {
        /// The invalid value provided
        value: String,
    },

    /// Invalid base directory for the response file.
    #[error("Invalid base directory '{value}': expected web-root, content-root, or none")]
    InvalidBaseDir {
        /// The invalid value provided
        value: String,
    },

    /// Invalid listen address.
    #[error("Invalid listen address '{value}': {reason}")]
    InvalidListenAddress {
        /// The invalid address string
        value: String,
        /// Reason for invalidity
        reason: String,
    },

    /// An inline response body was configured without being usable.
    #[error("Invalid inline response: {0}")]
    InvalidResponse(String),
}
